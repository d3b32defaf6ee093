use chrono::NaiveDateTime;
use csv::StringRecord;
use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::ExportMetadata;

pub(crate) fn parse_banner(
    parser: &'static str,
    banner: &StringRecord,
) -> Result<ExportMetadata, ParserError> {
    if banner.len() < 2 {
        return Err(ParserError::FormatMismatch {
            parser,
            reason: format!("expected at least 2 banner fields, found {}", banner.len()),
        });
    }

    let tracker_id = banner.get(0).unwrap_or_default().trim();
    if tracker_id.is_empty() {
        return Err(ParserError::FormatMismatch {
            parser,
            reason: "banner tracker identifier is empty".to_string(),
        });
    }

    let schema_version = banner.get(1).unwrap_or_default().trim();
    if schema_version.is_empty() {
        return Err(ParserError::FormatMismatch {
            parser,
            reason: "banner schema version is empty".to_string(),
        });
    }

    Ok(ExportMetadata::new(tracker_id, schema_version))
}

/// Pulls the banner row (row 1) and column header row (row 2) off the record
/// iterator shared by all export formats.
pub(crate) fn read_preamble<R: std::io::Read>(
    parser: &'static str,
    records: &mut csv::StringRecordsIter<'_, R>,
) -> Result<(ExportMetadata, StringRecord), ParserError> {
    let banner = records
        .next()
        .ok_or(ParserError::FormatMismatch {
            parser,
            reason: "file missing banner row".to_string(),
        })?
        .map_err(|err| ParserError::Csv {
            parser,
            source: err,
        })?;
    let metadata = parse_banner(parser, &banner)?;

    let header = records
        .next()
        .ok_or(ParserError::FormatMismatch {
            parser,
            reason: "file missing column header row".to_string(),
        })?
        .map_err(|err| ParserError::Csv {
            parser,
            source: err,
        })?;

    Ok((metadata, header))
}

pub(crate) fn parse_timestamp(
    parser: &'static str,
    value: &str,
    line_index: usize,
) -> Result<i64, ParserError> {
    static FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];
    let trimmed = value.trim();
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            let micros = dt.and_utc().timestamp_micros();
            return Ok(micros);
        }
    }
    Err(ParserError::DataRow {
        parser,
        line_index,
        message: format!("invalid timestamp '{trimmed}'"),
    })
}

pub(crate) fn parse_required_i64(
    parser: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<i64, ParserError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|err| ParserError::DataRow {
            parser,
            line_index,
            message: format!("failed to parse column '{column}' as integer: {err}"),
        })
}

pub(crate) fn parse_optional_i64(
    parser: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<Option<i64>, ParserError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|err| ParserError::DataRow {
            parser,
            line_index,
            message: format!("failed to parse column '{column}' as integer: {err}"),
        })
}

pub(crate) fn parse_optional_f64(
    parser: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<Option<f64>, ParserError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|err| ParserError::DataRow {
            parser,
            line_index,
            message: format!("failed to parse column '{column}' as float: {err}"),
        })
}

pub(crate) fn trimmed_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn datetime_series(
    parser: &'static str,
    name: &str,
    values: Vec<i64>,
) -> Result<Series, ParserError> {
    Series::new(name.into(), values)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
        .map_err(|err| ParserError::Validation {
            parser,
            message: format!("failed to cast {name} column: {err}"),
        })
}
