use chrono::NaiveDateTime;
use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Half-open `[start, end)` selection over the timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start >= end {
            return Err(PipelineError::Validation(format!(
                "window start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn contains_micros(&self, micros: i64) -> bool {
        let start = self.start.and_utc().timestamp_micros();
        let end = self.end.and_utc().timestamp_micros();
        micros >= start && micros < end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Keeps rows whose timestamp falls inside the window, preserving the input
/// row order. Rows with null timestamps are excluded.
pub fn filter_window(df: &DataFrame, window: TimeWindow) -> Result<DataFrame> {
    let timestamp = df.column("timestamp")?.datetime()?;

    let mut keep = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        keep.push(
            timestamp
                .get(idx)
                .is_some_and(|micros| window.contains_micros(micros)),
        );
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}
