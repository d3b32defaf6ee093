use std::fs;

use chrono::{Duration, NaiveDate, NaiveTime};

use striderun_core::charts::{CategoryPoint, ChartData, ChartSpec, Mark, TimePoint};
use striderun_core::render::{render_chart, ChartFormat};

fn line_spec() -> ChartSpec {
    let base = NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_time(NaiveTime::MIN);
    let points = (0..5)
        .map(|i| TimePoint {
            timestamp: base + Duration::days(i),
            value: (i as f64) * 1.5,
        })
        .collect();

    ChartSpec {
        title: "Cumulative distance".to_string(),
        x_label: "date".to_string(),
        y_label: "distance (km)".to_string(),
        mark: Mark::Line,
        data: ChartData::TimeSeries(points),
    }
}

fn category_spec() -> ChartSpec {
    ChartSpec {
        title: "Mean steps by day type".to_string(),
        x_label: "day type".to_string(),
        y_label: "mean steps".to_string(),
        mark: Mark::Bar,
        data: ChartData::Categories(vec![
            CategoryPoint {
                label: "weekday".to_string(),
                value: 8250.0,
            },
            CategoryPoint {
                label: "weekend".to_string(),
                value: 4120.0,
            },
        ]),
    }
}

#[test]
fn renders_a_time_series_to_svg() {
    let path = std::env::temp_dir().join(format!("striderun-line-{}.svg", std::process::id()));
    render_chart(&line_spec(), &path, ChartFormat::Svg).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("<svg"));

    fs::remove_file(&path).ok();
}

#[test]
fn renders_a_category_chart_to_svg() {
    let path = std::env::temp_dir().join(format!("striderun-cat-{}.svg", std::process::id()));
    render_chart(&category_spec(), &path, ChartFormat::Svg).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("<svg"));

    fs::remove_file(&path).ok();
}

#[test]
fn empty_series_still_produces_a_chart_file() {
    let path = std::env::temp_dir().join(format!("striderun-empty-{}.svg", std::process::id()));
    let spec = ChartSpec {
        title: "Heart rate".to_string(),
        x_label: "date".to_string(),
        y_label: "heart rate (bpm)".to_string(),
        mark: Mark::Scatter,
        data: ChartData::TimeSeries(Vec::new()),
    };
    render_chart(&spec, &path, ChartFormat::Svg).unwrap();
    assert!(path.exists());

    fs::remove_file(&path).ok();
}

#[test]
fn chart_format_round_trips_through_strings() {
    assert_eq!("svg".parse::<ChartFormat>().unwrap(), ChartFormat::Svg);
    assert_eq!("PNG".parse::<ChartFormat>().unwrap(), ChartFormat::Png);
    assert!("jpeg".parse::<ChartFormat>().is_err());
    assert_eq!(ChartFormat::Svg.extension(), "svg");
    assert_eq!(ChartFormat::Png.to_string(), "png");
}
