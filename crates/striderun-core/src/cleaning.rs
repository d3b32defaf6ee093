use std::collections::HashSet;

use polars::prelude::*;
use striderun_parser::ExportKind;

use crate::error::Result;

const MS_PER_MINUTE: f64 = 60_000.0;
const METERS_PER_KM: f64 = 1_000.0;

/// Normalizes a freshly parsed export table: rows with null timestamps or
/// negative counts are dropped, duplicate timestamps keep their first
/// occurrence in file order, and the result is sorted ascending by timestamp.
/// Pedometer tables additionally gain `active_time_min` and `distance_km`.
pub fn clean_export(df: &DataFrame, kind: ExportKind) -> Result<DataFrame> {
    let len = df.height();
    let timestamp = df.column("timestamp")?.datetime()?;

    let mut keep = vec![true; len];
    for (idx, flag) in keep.iter_mut().enumerate() {
        if timestamp.get(idx).is_none() {
            *flag = false;
        }
    }

    match kind {
        ExportKind::Pedometer => {
            let steps = df.column("step_count")?.i64()?;
            let distance = df.column("distance_m")?.f64()?;
            for (idx, flag) in keep.iter_mut().enumerate() {
                if steps.get(idx).is_some_and(|v| v < 0) {
                    *flag = false;
                }
                if distance.get(idx).is_some_and(|v| v < 0.0) {
                    *flag = false;
                }
            }
        }
        ExportKind::HeartRate => {
            let bpm = df.column("heart_rate_bpm")?.f64()?;
            for (idx, flag) in keep.iter_mut().enumerate() {
                if bpm.get(idx).is_some_and(|v| v < 0.0) {
                    *flag = false;
                }
            }
        }
        ExportKind::Floors => {
            let floors = df.column("floor_count")?.i64()?;
            for (idx, flag) in keep.iter_mut().enumerate() {
                if floors.get(idx).is_some_and(|v| v < 0) {
                    *flag = false;
                }
            }
        }
    }

    let mut seen: HashSet<i64> = HashSet::with_capacity(len);
    for (idx, flag) in keep.iter_mut().enumerate() {
        if !*flag {
            continue;
        }
        if let Some(ts) = timestamp.get(idx) {
            if !seen.insert(ts) {
                *flag = false;
            }
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let mut output = df
        .filter(&mask)?
        .sort(["timestamp"], SortMultipleOptions::default())?;

    if kind == ExportKind::Pedometer {
        let active_ms = output.column("active_time_ms")?.i64()?;
        let active_min: Vec<Option<f64>> = active_ms
            .into_iter()
            .map(|opt| opt.map(|ms| ms as f64 / MS_PER_MINUTE))
            .collect();

        let distance_m = output.column("distance_m")?.f64()?;
        let distance_km: Vec<Option<f64>> = distance_m
            .into_iter()
            .map(|opt| opt.map(|m| m / METERS_PER_KM))
            .collect();

        let columns = [
            Series::new("active_time_min".into(), active_min).into(),
            Series::new("distance_km".into(), distance_km).into(),
        ];
        output.hstack_mut(&columns)?;
    }

    Ok(output)
}
