use std::path::Path;

use chrono::{Duration, NaiveDateTime};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Deserialize;

use crate::charts::{CategoryPoint, ChartData, ChartSpec, Mark, TimePoint};
use crate::error::{PipelineError, Result};

const CHART_SIZE: (u32, u32) = (1280, 720);
const SERIES_COLOR: RGBColor = RGBColor(70, 130, 180);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    Svg,
    Png,
}

impl ChartFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Svg => "svg",
            ChartFormat::Png => "png",
        }
    }
}

impl std::str::FromStr for ChartFormat {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(ChartFormat::Svg),
            "png" => Ok(ChartFormat::Png),
            other => Err(format!("unknown chart format '{other}'")),
        }
    }
}

impl std::fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

pub fn render_chart(spec: &ChartSpec, path: &Path, format: ChartFormat) -> Result<()> {
    match format {
        ChartFormat::Svg => {
            let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
            draw_spec(spec, &root)
        }
        ChartFormat::Png => {
            let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
            draw_spec(spec, &root)
        }
    }
}

fn draw_err(spec: &ChartSpec, err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Processing(format!("chart '{}' rendering failed: {err}", spec.title))
}

fn draw_spec<DB>(spec: &ChartSpec, root: &DrawingArea<DB, Shift>) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(|e| draw_err(spec, e))?;

    match &spec.data {
        ChartData::TimeSeries(points) => draw_time_series(spec, points, root)?,
        ChartData::Categories(points) => draw_categories(spec, points, root)?,
    }

    root.present().map_err(|e| draw_err(spec, e))?;
    Ok(())
}

fn draw_time_series<DB>(
    spec: &ChartSpec,
    points: &[TimePoint],
    root: &DrawingArea<DB, Shift>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x_min, x_max) = time_bounds(points);
    let y_max = value_ceiling(points.iter().map(|p| p.value));

    let x_range: RangedDateTime<NaiveDateTime> = (x_min..x_max).into();
    let mut chart = ChartBuilder::on(root)
        .margin(25)
        .caption(&spec.title, ("sans-serif", 28))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 45)
        .build_cartesian_2d(x_range, 0.0..y_max)
        .map_err(|e| draw_err(spec, e))?;

    chart
        .configure_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .x_label_formatter(&|dt: &NaiveDateTime| dt.format("%Y-%m-%d").to_string())
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| draw_err(spec, e))?;

    match spec.mark {
        Mark::Line => {
            chart
                .draw_series(LineSeries::new(
                    points.iter().map(|p| (p.timestamp, p.value)),
                    &SERIES_COLOR,
                ))
                .map_err(|e| draw_err(spec, e))?;
        }
        Mark::Scatter => {
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|p| Circle::new((p.timestamp, p.value), 3, SERIES_COLOR.filled())),
                )
                .map_err(|e| draw_err(spec, e))?;
        }
        Mark::Bar => {
            let half_width = bar_half_width(points, x_min, x_max);
            chart
                .draw_series(points.iter().map(|p| {
                    Rectangle::new(
                        [(p.timestamp - half_width, 0.0), (p.timestamp + half_width, p.value)],
                        SERIES_COLOR.filled(),
                    )
                }))
                .map_err(|e| draw_err(spec, e))?;
        }
    }

    Ok(())
}

fn draw_categories<DB>(
    spec: &ChartSpec,
    points: &[CategoryPoint],
    root: &DrawingArea<DB, Shift>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let count = points.len().max(1);
    let y_max = value_ceiling(points.iter().map(|p| p.value));
    let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();

    let mut chart = ChartBuilder::on(root)
        .margin(25)
        .caption(&spec.title, ("sans-serif", 28))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 45)
        .build_cartesian_2d(0f64..count as f64, 0.0..y_max)
        .map_err(|e| draw_err(spec, e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .x_labels(count * 2 + 1)
        .x_label_formatter(&move |v: &f64| {
            let center = *v - 0.5;
            let idx = center.round();
            if idx >= 0.0 && (center - idx).abs() < 0.25 {
                labels.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| draw_err(spec, e))?;

    chart
        .draw_series(points.iter().enumerate().map(|(idx, p)| {
            Rectangle::new(
                [(idx as f64 + 0.2, 0.0), (idx as f64 + 0.8, p.value)],
                SERIES_COLOR.filled(),
            )
        }))
        .map_err(|e| draw_err(spec, e))?;

    Ok(())
}

fn time_bounds(points: &[TimePoint]) -> (NaiveDateTime, NaiveDateTime) {
    let mut iter = points.iter().map(|p| p.timestamp);
    let Some(first) = iter.next() else {
        let origin = NaiveDateTime::default();
        return (origin, origin + Duration::days(1));
    };

    let (mut min, mut max) = (first, first);
    for ts in iter {
        if ts < min {
            min = ts;
        }
        if ts > max {
            max = ts;
        }
    }
    if min == max {
        max += Duration::days(1);
    }
    (min, max)
}

fn value_ceiling(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(f64::MIN, f64::max);
    if !max.is_finite() || max <= 0.0 {
        1.0
    } else {
        max * 1.1
    }
}

fn bar_half_width(points: &[TimePoint], x_min: NaiveDateTime, x_max: NaiveDateTime) -> Duration {
    let span = x_max - x_min;
    if span.is_zero() || points.len() < 2 {
        return Duration::hours(12);
    }
    span / (points.len() as i32 * 3)
}
