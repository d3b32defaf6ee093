use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;

/// Aggregates over the cleaned (and optionally windowed) tables, matching the
/// inline readouts the charts are built from.
#[derive(Debug, Clone, Serialize)]
pub struct ActivitySummary {
    pub pedometer_rows: usize,
    pub heart_rate_rows: usize,
    pub floors_rows: usize,
    pub total_steps: i64,
    pub total_distance_km: f64,
    pub total_active_min: f64,
    pub total_calorie_kcal: f64,
    pub mean_heart_rate_bpm: Option<f64>,
    pub max_heart_rate_bpm: Option<f64>,
    pub total_floors: i64,
}

pub fn summarize(
    pedometer: &DataFrame,
    heart_rate: &DataFrame,
    floors: &DataFrame,
) -> Result<ActivitySummary> {
    let steps = pedometer.column("step_count")?.i64()?;
    let total_steps: i64 = steps.into_iter().flatten().sum();

    let distance_km = pedometer.column("distance_km")?.f64()?;
    let total_distance_km: f64 = distance_km.into_iter().flatten().sum();

    let active_min = pedometer.column("active_time_min")?.f64()?;
    let total_active_min: f64 = active_min.into_iter().flatten().sum();

    let calorie = pedometer.column("calorie_kcal")?.f64()?;
    let total_calorie_kcal: f64 = calorie.into_iter().flatten().sum();

    let bpm = heart_rate.column("heart_rate_bpm")?.f64()?;
    let mut bpm_sum = 0.0f64;
    let mut bpm_count = 0usize;
    let mut max_heart_rate_bpm: Option<f64> = None;
    for value in bpm.into_iter().flatten() {
        bpm_sum += value;
        bpm_count += 1;
        max_heart_rate_bpm = Some(match max_heart_rate_bpm {
            Some(current) if current >= value => current,
            _ => value,
        });
    }
    let mean_heart_rate_bpm = if bpm_count == 0 {
        None
    } else {
        Some(bpm_sum / bpm_count as f64)
    };

    let floor_count = floors.column("floor_count")?.i64()?;
    let total_floors: i64 = floor_count.into_iter().flatten().sum();

    Ok(ActivitySummary {
        pedometer_rows: pedometer.height(),
        heart_rate_rows: heart_rate.height(),
        floors_rows: floors.height(),
        total_steps,
        total_distance_km,
        total_active_min,
        total_calorie_kcal,
        mean_heart_rate_bpm,
        max_heart_rate_bpm,
        total_floors,
    })
}
