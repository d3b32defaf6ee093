use chrono::{Duration, TimeZone, Utc};
use polars::prelude::*;

use striderun_core::cleaning::clean_export;
use striderun_parser::ExportKind;

fn datetime_series(name: &str, micros: Vec<i64>) -> Series {
    Series::new(name.into(), micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
        .unwrap()
}

#[test]
fn pedometer_cleaning_dedupes_sorts_and_converts_units() -> PolarsResult<()> {
    let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
    let t0 = base.timestamp_micros();
    let t1 = (base + Duration::days(1)).timestamp_micros();
    let t2 = (base + Duration::days(2)).timestamp_micros();
    let t3 = (base + Duration::days(3)).timestamp_micros();

    // Later timestamp first, one duplicate, one negative-step row.
    let df = DataFrame::new(vec![
        datetime_series("timestamp", vec![t1, t0, t0, t2, t3]).into(),
        Series::new("step_count".into(), vec![7000i64, 4000, 4100, -5, 1000]).into(),
        Series::new(
            "distance_m".into(),
            vec![Some(5000.0f64), Some(3000.0), Some(3100.0), Some(100.0), None],
        )
        .into(),
        Series::new(
            "active_time_ms".into(),
            vec![Some(3_600_000i64), Some(1_800_000), None, Some(60_000), None],
        )
        .into(),
        Series::new(
            "calorie_kcal".into(),
            vec![Some(250.0f64), Some(150.0), None, Some(4.0), None],
        )
        .into(),
        Series::new(
            "source_info".into(),
            vec![Some("watch"), Some("phone"), Some("tablet"), None, None],
        )
        .into(),
    ])?;

    let cleaned = clean_export(&df, ExportKind::Pedometer).unwrap();
    assert_eq!(cleaned.height(), 3);

    let timestamps = cleaned
        .column("timestamp")?
        .datetime()?
        .into_no_null_iter()
        .collect::<Vec<_>>();
    assert_eq!(timestamps, vec![t0, t1, t3]);

    // The duplicate timestamp keeps its first occurrence in file order.
    let sources = cleaned.column("source_info")?.str()?;
    assert_eq!(sources.get(0), Some("phone"));

    let active_min = cleaned.column("active_time_min")?.f64()?;
    assert_eq!(active_min.get(0), Some(30.0));
    assert_eq!(active_min.get(1), Some(60.0));
    assert!(active_min.get(2).is_none());

    let distance_km = cleaned.column("distance_km")?.f64()?;
    assert_eq!(distance_km.get(0), Some(3.0));
    assert_eq!(distance_km.get(1), Some(5.0));
    assert!(distance_km.get(2).is_none());

    Ok(())
}

#[test]
fn heart_rate_cleaning_drops_negative_samples() -> PolarsResult<()> {
    let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
    let micros: Vec<i64> = (0..4)
        .map(|i| (base + Duration::hours(i)).timestamp_micros())
        .collect();

    let df = DataFrame::new(vec![
        datetime_series("timestamp", micros).into(),
        Series::new(
            "heart_rate_bpm".into(),
            vec![Some(72.0f64), Some(-3.0), None, Some(90.0)],
        )
        .into(),
    ])?;

    let cleaned = clean_export(&df, ExportKind::HeartRate).unwrap();
    assert_eq!(cleaned.height(), 3);

    let bpm = cleaned.column("heart_rate_bpm")?.f64()?;
    assert_eq!(bpm.get(0), Some(72.0));
    assert!(bpm.get(1).is_none());
    assert_eq!(bpm.get(2), Some(90.0));

    Ok(())
}

#[test]
fn floors_cleaning_drops_negative_counts_and_null_timestamps() -> PolarsResult<()> {
    let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
    let micros = vec![
        Some(base.timestamp_micros()),
        None,
        Some((base + Duration::hours(1)).timestamp_micros()),
    ];

    let df = DataFrame::new(vec![
        Series::new("timestamp".into(), micros)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
            .into(),
        Series::new("floor_count".into(), vec![Some(5i64), Some(2), Some(-1)]).into(),
    ])?;

    let cleaned = clean_export(&df, ExportKind::Floors).unwrap();
    assert_eq!(cleaned.height(), 1);

    let floors = cleaned.column("floor_count")?.i64()?;
    assert_eq!(floors.get(0), Some(5));

    Ok(())
}
