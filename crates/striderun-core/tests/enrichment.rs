use chrono::{Duration, TimeZone, Utc};
use polars::prelude::*;

use striderun_core::enrichment::enrich_pedometer;
use striderun_core::error::PipelineError;

fn datetime_series(name: &str, micros: Vec<i64>) -> Series {
    Series::new(name.into(), micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
        .unwrap()
}

fn week_frame() -> DataFrame {
    // 2025-03-03 is a Monday.
    let monday = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
    let micros: Vec<i64> = (0..7)
        .map(|i| (monday + Duration::days(i)).timestamp_micros())
        .collect();
    let distances = vec![
        Some(1000.0f64),
        None,
        Some(2500.0),
        Some(0.0),
        Some(4000.0),
        Some(500.0),
        Some(1500.0),
    ];

    DataFrame::new(vec![
        datetime_series("timestamp", micros).into(),
        Series::new("distance_m".into(), distances).into(),
    ])
    .unwrap()
}

#[test]
fn cumulative_distance_is_non_decreasing_and_totals_the_inputs() -> PolarsResult<()> {
    let df = week_frame();
    let enriched = enrich_pedometer(&df).unwrap();
    assert_eq!(enriched.height(), df.height());

    let cumulative = enriched
        .column("cumulative_distance_m")?
        .f64()?
        .into_no_null_iter()
        .collect::<Vec<_>>();
    assert_eq!(cumulative.len(), df.height());

    for window in cumulative.windows(2) {
        assert!(window[1] >= window[0], "cumulative sum decreased");
    }

    // Null distances contribute zero; the final value equals the plain sum.
    assert_eq!(cumulative[0], 1000.0);
    assert_eq!(cumulative[1], 1000.0);
    assert_eq!(*cumulative.last().unwrap(), 9500.0);

    Ok(())
}

#[test]
fn calendar_labels_follow_the_iso_week() -> PolarsResult<()> {
    let enriched = enrich_pedometer(&week_frame()).unwrap();

    let day_names = enriched
        .column("day_name")?
        .str()?
        .into_no_null_iter()
        .collect::<Vec<_>>();
    assert_eq!(
        day_names,
        vec![
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday"
        ]
    );

    let day_types = enriched
        .column("day_type")?
        .str()?
        .into_no_null_iter()
        .collect::<Vec<_>>();
    assert_eq!(
        day_types,
        vec![
            "weekday", "weekday", "weekday", "weekday", "weekday", "weekend", "weekend"
        ]
    );
    assert!(day_types
        .iter()
        .all(|label| *label == "weekday" || *label == "weekend"));

    let months = enriched.column("month_name")?.str()?;
    assert_eq!(months.get(0), Some("March"));

    let years = enriched.column("year")?.i32()?;
    assert!(years.into_no_null_iter().all(|y| y == 2025));

    Ok(())
}

#[test]
fn unsorted_input_is_rejected() {
    let base = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
    let micros = vec![
        (base + Duration::days(1)).timestamp_micros(),
        base.timestamp_micros(),
    ];

    let df = DataFrame::new(vec![
        datetime_series("timestamp", micros).into(),
        Series::new("distance_m".into(), vec![Some(1.0f64), Some(2.0)]).into(),
    ])
    .unwrap();

    match enrich_pedometer(&df) {
        Err(PipelineError::Validation(message)) => {
            assert!(message.contains("sorted"), "unexpected message: {message}");
        }
        other => panic!("expected Validation error, got {other:?}"),
    }
}

#[test]
fn null_timestamp_is_rejected() {
    let base = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
    let micros = vec![Some(base.timestamp_micros()), None];

    let df = DataFrame::new(vec![
        Series::new("timestamp".into(), micros)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
            .unwrap()
            .into(),
        Series::new("distance_m".into(), vec![Some(1.0f64), Some(2.0)]).into(),
    ])
    .unwrap();

    match enrich_pedometer(&df) {
        Err(PipelineError::Validation(message)) => {
            assert!(
                message.contains("null timestamp"),
                "unexpected message: {message}"
            );
        }
        other => panic!("expected Validation error, got {other:?}"),
    }
}
