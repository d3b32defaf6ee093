use chrono::{DateTime, Datelike, Weekday};
use polars::prelude::*;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Weekday,
        }
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adds the derived columns to a timestamp-sorted pedometer table:
/// `cumulative_distance_m` (single-pass running sum, nulls contribute zero),
/// `day_name`, `month_name`, `year` and `day_type`.
///
/// The input must already be sorted ascending by timestamp; out-of-order rows
/// are rejected rather than silently producing a misleading running total.
pub fn enrich_pedometer(df: &DataFrame) -> Result<DataFrame> {
    let len = df.height();
    let timestamp = df.column("timestamp")?.datetime()?;
    let distance = df.column("distance_m")?.f64()?;

    let mut cumulative: Vec<f64> = Vec::with_capacity(len);
    let mut day_name: Vec<String> = Vec::with_capacity(len);
    let mut month_name: Vec<String> = Vec::with_capacity(len);
    let mut year: Vec<i32> = Vec::with_capacity(len);
    let mut day_type: Vec<&'static str> = Vec::with_capacity(len);

    let mut running = 0.0f64;
    let mut previous_micros: Option<i64> = None;

    for idx in 0..len {
        let micros = timestamp.get(idx).ok_or_else(|| {
            PipelineError::Validation(format!("row {idx} has a null timestamp"))
        })?;

        if let Some(prev) = previous_micros {
            if micros < prev {
                return Err(PipelineError::Validation(format!(
                    "timestamps are not sorted ascending at row {idx}"
                )));
            }
        }
        previous_micros = Some(micros);

        let dt = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
            PipelineError::Validation(format!("timestamp {micros} is out of range"))
        })?;

        running += distance.get(idx).unwrap_or(0.0);
        cumulative.push(running);
        day_name.push(dt.format("%A").to_string());
        month_name.push(dt.format("%B").to_string());
        year.push(dt.year());
        day_type.push(DayType::from_weekday(dt.weekday()).as_str());
    }

    let mut output = df.clone();
    let columns = [
        Series::new("cumulative_distance_m".into(), cumulative).into(),
        Series::new("day_name".into(), day_name).into(),
        Series::new("month_name".into(), month_name).into(),
        Series::new("year".into(), year).into(),
        Series::new("day_type".into(), day_type).into(),
    ];
    output.hstack_mut(&columns)?;

    Ok(output)
}
