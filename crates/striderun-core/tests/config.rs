use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use striderun_core::config::Config;
use striderun_core::render::ChartFormat;

fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("striderun-{name}-{}.toml", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn full_config_parses() {
    let path = write_config(
        "full",
        r#"
[sources]
pedometer = "exports/pedometer_day_summary.csv"
heart_rate = "https://example.org/exports/heart_rate.csv"
floors = "exports/floors_climbed.csv"

[charts]
output_dir = "out/charts"
format = "png"

[window]
start = "2025-03-01"
end = "2025-04-01"
"#,
    );

    let config = Config::load(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(config.sources.pedometer, "exports/pedometer_day_summary.csv");
    assert_eq!(config.charts.format, ChartFormat::Png);
    assert_eq!(config.charts.output_dir, PathBuf::from("out/charts"));
    assert_eq!(
        config.window.start,
        Some(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
    );
    assert_eq!(
        config.window.end,
        Some(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())
    );
}

#[test]
fn sources_only_config_uses_defaults() {
    let path = write_config(
        "minimal",
        r#"
[sources]
pedometer = "a.csv"
heart_rate = "b.csv"
floors = "c.csv"
"#,
    );

    let config = Config::load(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(config.charts.format, ChartFormat::Svg);
    assert_eq!(config.charts.output_dir, PathBuf::from("charts"));
    assert!(config.window.start.is_none());
    assert!(config.window.end.is_none());
}

#[test]
fn unknown_keys_are_rejected() {
    let path = write_config(
        "unknown",
        r#"
[sources]
pedometer = "a.csv"
heart_rate = "b.csv"
floors = "c.csv"
sleep = "d.csv"
"#,
    );

    let result = Config::load(&path);
    fs::remove_file(&path).ok();
    assert!(result.is_err());
}

#[test]
fn missing_config_file_is_an_io_error() {
    let result = Config::load(&PathBuf::from("/nonexistent/striderun.toml"));
    assert!(result.is_err());
}
