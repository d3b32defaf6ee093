use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use polars::prelude::DataFrame;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use striderun_core::charts;
use striderun_core::cleaning::clean_export;
use striderun_core::config::Config;
use striderun_core::enrichment::enrich_pedometer;
use striderun_core::ingestion::{ingest_sources, ExportSource, FileStatus, IngestionBatch};
use striderun_core::render::{render_chart, ChartFormat};
use striderun_core::summary::summarize;
use striderun_core::window::{filter_window, TimeWindow};
use striderun_parser::ExportKind;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fitness-tracker export analysis pipeline", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and render charts over the selected window
    Report(ReportArgs),
    /// Print windowed summary statistics without rendering charts
    Summary(SummaryArgs),
    /// Parse a single export file and print the detection outcome
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
struct ReportArgs {
    /// First day of the window (inclusive), e.g. 2025-03-01
    #[arg(long)]
    start: Option<NaiveDate>,
    /// First day past the window (exclusive)
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Directory the chart files are written into
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Chart output format (svg or png)
    #[arg(long)]
    format: Option<ChartFormat>,
}

#[derive(Args, Debug, Default)]
struct SummaryArgs {
    /// First day of the window (inclusive)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// First day past the window (exclusive)
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Emit the summary as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Export file to parse
    file: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Report(args) => run_report(cli.config, args),
        Command::Summary(args) => run_summary(cli.config, args),
        Command::Inspect(args) => run_inspect(args),
    }
}

fn config_path(cli_config: Option<PathBuf>) -> PathBuf {
    cli_config
        .or_else(|| std::env::var("STRIDERUN_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("striderun.toml"))
}

fn load_config(cli_config: Option<PathBuf>) -> Result<Config> {
    let path = config_path(cli_config);
    Config::load(&path).with_context(|| format!("failed to load config {}", path.display()))
}

struct Tables {
    pedometer: DataFrame,
    heart_rate: DataFrame,
    floors: DataFrame,
}

fn load_tables(config: &Config) -> Result<Tables> {
    let sources = [
        ExportSource::parse(&config.sources.pedometer),
        ExportSource::parse(&config.sources.heart_rate),
        ExportSource::parse(&config.sources.floors),
    ];

    let batch = ingest_sources(&sources);
    log_reports(&batch);

    let mut pedometer = None;
    let mut heart_rate = None;
    let mut floors = None;
    for parsed in batch.parsed {
        let slot = match parsed.kind {
            ExportKind::Pedometer => &mut pedometer,
            ExportKind::HeartRate => &mut heart_rate,
            ExportKind::Floors => &mut floors,
        };
        if slot.is_some() {
            warn!(kind = %parsed.kind, "ignoring additional export of an already loaded kind");
            continue;
        }
        *slot = Some(parsed);
    }

    let (Some(pedometer), Some(heart_rate), Some(floors)) = (pedometer, heart_rate, floors)
    else {
        bail!("not all three export kinds were loaded; check the ingest warnings above");
    };

    let pedometer_df = clean_export(&pedometer.df, ExportKind::Pedometer)?;
    let heart_rate_df = clean_export(&heart_rate.df, ExportKind::HeartRate)?;
    let floors_df = clean_export(&floors.df, ExportKind::Floors)?;
    info!(
        pedometer_rows = pedometer_df.height(),
        heart_rate_rows = heart_rate_df.height(),
        floors_rows = floors_df.height(),
        "cleaned export tables"
    );

    Ok(Tables {
        pedometer: pedometer_df,
        heart_rate: heart_rate_df,
        floors: floors_df,
    })
}

fn log_reports(batch: &IngestionBatch) {
    for report in &batch.reports {
        match report.status {
            FileStatus::Parsed => {
                info!(source = %report.source, hash = %report.hash, "parsed export");
            }
            FileStatus::Duplicate => {
                warn!(source = %report.source, hash = %report.hash, "skipping duplicate export");
            }
            FileStatus::Failed => {
                for attempt in &report.parser_attempts {
                    warn!(
                        source = %report.source,
                        parser = attempt.parser,
                        message = %attempt.message,
                        "export failed to parse"
                    );
                }
            }
        }
    }
}

fn resolve_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    config: &Config,
) -> Result<Option<TimeWindow>> {
    let start = start.or(config.window.start);
    let end = end.or(config.window.end);
    match (start, end) {
        (Some(start), Some(end)) => {
            let window = TimeWindow::new(
                start.and_time(NaiveTime::MIN),
                end.and_time(NaiveTime::MIN),
            )?;
            Ok(Some(window))
        }
        (None, None) => Ok(None),
        _ => bail!("window requires both --start and --end (or neither)"),
    }
}

fn apply_window(tables: Tables, window: Option<TimeWindow>) -> Result<Tables> {
    let Some(window) = window else {
        return Ok(tables);
    };
    info!(window = %window, "filtering tables to window");
    Ok(Tables {
        pedometer: filter_window(&tables.pedometer, window)?,
        heart_rate: filter_window(&tables.heart_rate, window)?,
        floors: filter_window(&tables.floors, window)?,
    })
}

fn run_report(cli_config: Option<PathBuf>, args: ReportArgs) -> Result<()> {
    let config = load_config(cli_config)?;
    let window = resolve_window(args.start, args.end, &config)?;
    let out_dir = args.out_dir.unwrap_or_else(|| config.charts.output_dir.clone());
    let format = args.format.unwrap_or(config.charts.format);

    let tables = load_tables(&config)?;
    let tables = apply_window(
        Tables {
            pedometer: enrich_pedometer(&tables.pedometer)?,
            heart_rate: tables.heart_rate,
            floors: tables.floors,
        },
        window,
    )?;

    let specs = [
        charts::daily_steps(&tables.pedometer)?,
        charts::cumulative_distance(&tables.pedometer)?,
        charts::steps_by_day_type(&tables.pedometer)?,
        charts::heart_rate(&tables.heart_rate)?,
        charts::floors(&tables.floors)?,
    ];
    let file_stems = [
        "daily_steps",
        "cumulative_distance",
        "steps_by_day_type",
        "heart_rate",
        "floors",
    ];

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    for (spec, stem) in specs.iter().zip(file_stems) {
        let path = out_dir.join(format!("{stem}.{}", format.extension()));
        render_chart(spec, &path, format)
            .with_context(|| format!("failed to render {}", path.display()))?;
        info!(chart = %path.display(), "wrote chart");
    }

    Ok(())
}

fn run_summary(cli_config: Option<PathBuf>, args: SummaryArgs) -> Result<()> {
    let config = load_config(cli_config)?;
    let window = resolve_window(args.start, args.end, &config)?;

    let tables = apply_window(load_tables(&config)?, window)?;
    let summary = summarize(&tables.pedometer, &tables.heart_rate, &tables.floors)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let format_bpm = |value: Option<f64>| {
        value
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| "-".to_string())
    };

    let mut table = Table::new();
    table.set_header(["metric", "value"]);
    let rows = [
        ("pedometer rows", summary.pedometer_rows.to_string()),
        ("heart-rate rows", summary.heart_rate_rows.to_string()),
        ("floors rows", summary.floors_rows.to_string()),
        ("total steps", summary.total_steps.to_string()),
        (
            "total distance (km)",
            format!("{:.2}", summary.total_distance_km),
        ),
        (
            "total active time (min)",
            format!("{:.1}", summary.total_active_min),
        ),
        (
            "total calories (kcal)",
            format!("{:.1}", summary.total_calorie_kcal),
        ),
        ("mean heart rate (bpm)", format_bpm(summary.mean_heart_rate_bpm)),
        ("max heart rate (bpm)", format_bpm(summary.max_heart_rate_bpm)),
        ("total floors", summary.total_floors.to_string()),
    ];
    for (metric, value) in rows {
        table.add_row([metric.to_string(), value]);
    }
    println!("{table}");

    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let source = ExportSource::Path(args.file.clone());
    let batch = ingest_sources(std::slice::from_ref(&source));

    let mut table = Table::new();
    table.set_header(["source", "status", "detail"]);

    for report in &batch.reports {
        match report.status {
            FileStatus::Parsed => {
                let parsed = batch
                    .parsed
                    .iter()
                    .find(|p| p.file_hash == report.hash)
                    .context("parsed export missing from batch")?;
                table.add_row([
                    report.source.clone(),
                    "parsed".to_string(),
                    format!(
                        "{} ({} rows, schema {})",
                        parsed.kind,
                        parsed.df.height(),
                        parsed.metadata.schema_version
                    ),
                ]);
            }
            FileStatus::Duplicate => {
                table.add_row([
                    report.source.clone(),
                    "duplicate".to_string(),
                    report.hash.clone(),
                ]);
            }
            FileStatus::Failed => {
                for attempt in &report.parser_attempts {
                    table.add_row([
                        report.source.clone(),
                        "failed".to_string(),
                        format!("{}: {}", attempt.parser, attempt.message),
                    ]);
                }
            }
        }
    }

    println!("{table}");

    if batch.parsed.is_empty() {
        bail!(
            "{} did not parse as any known export format",
            args.file.display()
        );
    }
    Ok(())
}
