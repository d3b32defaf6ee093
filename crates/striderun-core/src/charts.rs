use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

use crate::enrichment::DayType;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Line,
    Bar,
    Scatter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimePoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    TimeSeries(Vec<TimePoint>),
    Categories(Vec<CategoryPoint>),
}

/// A renderer-agnostic chart description: everything the drawing layer needs
/// and nothing polars-specific.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub mark: Mark,
    pub data: ChartData,
}

fn time_points(df: &DataFrame, value_column: &str) -> Result<Vec<TimePoint>> {
    let timestamp = df.column("timestamp")?.datetime()?;
    let values = df.column(value_column)?.cast(&DataType::Float64)?;
    let values = values.f64()?;

    let mut points = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let (Some(micros), Some(value)) = (timestamp.get(idx), values.get(idx)) else {
            continue;
        };
        let dt = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
            PipelineError::Validation(format!("timestamp {micros} is out of range"))
        })?;
        points.push(TimePoint {
            timestamp: dt.naive_utc(),
            value,
        });
    }
    Ok(points)
}

pub fn daily_steps(df: &DataFrame) -> Result<ChartSpec> {
    Ok(ChartSpec {
        title: "Daily steps".to_string(),
        x_label: "date".to_string(),
        y_label: "steps".to_string(),
        mark: Mark::Bar,
        data: ChartData::TimeSeries(time_points(df, "step_count")?),
    })
}

pub fn cumulative_distance(df: &DataFrame) -> Result<ChartSpec> {
    let mut points = time_points(df, "cumulative_distance_m")?;
    for point in &mut points {
        point.value /= 1_000.0;
    }
    Ok(ChartSpec {
        title: "Cumulative distance".to_string(),
        x_label: "date".to_string(),
        y_label: "distance (km)".to_string(),
        mark: Mark::Line,
        data: ChartData::TimeSeries(points),
    })
}

pub fn heart_rate(df: &DataFrame) -> Result<ChartSpec> {
    Ok(ChartSpec {
        title: "Heart rate".to_string(),
        x_label: "date".to_string(),
        y_label: "heart rate (bpm)".to_string(),
        mark: Mark::Scatter,
        data: ChartData::TimeSeries(time_points(df, "heart_rate_bpm")?),
    })
}

pub fn floors(df: &DataFrame) -> Result<ChartSpec> {
    Ok(ChartSpec {
        title: "Floors climbed".to_string(),
        x_label: "date".to_string(),
        y_label: "floors".to_string(),
        mark: Mark::Bar,
        data: ChartData::TimeSeries(time_points(df, "floor_count")?),
    })
}

/// Mean steps per entry for weekday rows versus weekend rows. Requires the
/// enriched `day_type` column.
pub fn steps_by_day_type(df: &DataFrame) -> Result<ChartSpec> {
    let day_type = df.column("day_type")?.str()?;
    let steps = df.column("step_count")?.i64()?;

    let mut sums = [0.0f64; 2];
    let mut counts = [0usize; 2];
    for idx in 0..df.height() {
        let (Some(label), Some(value)) = (day_type.get(idx), steps.get(idx)) else {
            continue;
        };
        let slot = match label {
            "weekday" => 0,
            "weekend" => 1,
            other => {
                return Err(PipelineError::Processing(format!(
                    "unexpected day_type value '{other}'"
                )))
            }
        };
        sums[slot] += value as f64;
        counts[slot] += 1;
    }

    let points = [DayType::Weekday, DayType::Weekend]
        .iter()
        .enumerate()
        .map(|(slot, day_type)| CategoryPoint {
            label: day_type.as_str().to_string(),
            value: if counts[slot] == 0 {
                0.0
            } else {
                sums[slot] / counts[slot] as f64
            },
        })
        .collect();

    Ok(ChartSpec {
        title: "Mean steps by day type".to_string(),
        x_label: "day type".to_string(),
        y_label: "mean steps".to_string(),
        mark: Mark::Bar,
        data: ChartData::Categories(points),
    })
}
