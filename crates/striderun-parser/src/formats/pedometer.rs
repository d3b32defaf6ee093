use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::{ExportKind, ExportMetadata, ParsedExport};
use crate::registry::ExportParser;

use super::{
    datetime_series, parse_optional_f64, parse_optional_i64, parse_required_i64, parse_timestamp,
    read_preamble, trimmed_optional,
};

pub struct PedometerParser;

impl Default for PedometerParser {
    fn default() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRole {
    Timestamp,
    StepCount,
    Distance,
    ActiveTime,
    Calorie,
    SourceInfo,
}

impl PedometerParser {
    const NAME: &'static str = "PEDOMETER";

    fn validate_tracker(metadata: &ExportMetadata) -> Result<(), ParserError> {
        let lower = metadata.tracker_name.to_ascii_lowercase();
        if lower.contains("pedometer") {
            Ok(())
        } else {
            Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: format!(
                    "tracker '{}' does not match expected pedometer exports",
                    metadata.tracker_id
                ),
            })
        }
    }

    fn classify_column(column: &str) -> Result<ColumnRole, ParserError> {
        let trimmed = column.trim();
        if trimmed.eq_ignore_ascii_case("create_time") {
            return Ok(ColumnRole::Timestamp);
        }
        if trimmed.eq_ignore_ascii_case("step_count") {
            return Ok(ColumnRole::StepCount);
        }
        if trimmed.eq_ignore_ascii_case("distance") {
            return Ok(ColumnRole::Distance);
        }
        if trimmed.eq_ignore_ascii_case("active_time") {
            return Ok(ColumnRole::ActiveTime);
        }
        if trimmed.eq_ignore_ascii_case("calorie") {
            return Ok(ColumnRole::Calorie);
        }
        if trimmed.eq_ignore_ascii_case("source_info") {
            return Ok(ColumnRole::SourceInfo);
        }
        Err(ParserError::FormatMismatch {
            parser: Self::NAME,
            reason: format!("unrecognized column '{trimmed}'"),
        })
    }

    fn require_role(roles: &[ColumnRole], role: ColumnRole, name: &str) -> Result<(), ParserError> {
        if roles.contains(&role) {
            Ok(())
        } else {
            Err(ParserError::InvalidHeader {
                parser: Self::NAME,
                row_index: 2,
                message: format!("required column '{name}' missing"),
            })
        }
    }
}

impl ExportParser for PedometerParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, content: &str) -> Result<ParsedExport, ParserError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut records = reader.records();
        let (metadata, header) = read_preamble(Self::NAME, &mut records)?;
        Self::validate_tracker(&metadata)?;

        let roles = header
            .iter()
            .map(Self::classify_column)
            .collect::<Result<Vec<_>, _>>()?;
        Self::require_role(&roles, ColumnRole::Timestamp, "create_time")?;
        Self::require_role(&roles, ColumnRole::StepCount, "step_count")?;
        Self::require_role(&roles, ColumnRole::Distance, "distance")?;
        Self::require_role(&roles, ColumnRole::ActiveTime, "active_time")?;
        Self::require_role(&roles, ColumnRole::Calorie, "calorie")?;

        let mut timestamp: Vec<i64> = Vec::new();
        let mut step_count: Vec<i64> = Vec::new();
        let mut distance_m: Vec<Option<f64>> = Vec::new();
        let mut active_time_ms: Vec<Option<i64>> = Vec::new();
        let mut calorie_kcal: Vec<Option<f64>> = Vec::new();
        let mut source_info: Vec<Option<String>> = Vec::new();
        let source_info_present = roles.contains(&ColumnRole::SourceInfo);

        for (row_idx, record) in records.enumerate() {
            let record = record.map_err(|err| ParserError::Csv {
                parser: Self::NAME,
                source: err,
            })?;
            let line_index = row_idx + 3; // banner and header rows, 1-indexed

            if record.len() != roles.len() {
                return Err(ParserError::DataRow {
                    parser: Self::NAME,
                    line_index,
                    message: format!(
                        "expected {} columns but found {}",
                        roles.len(),
                        record.len()
                    ),
                });
            }

            for (idx, role) in roles.iter().enumerate() {
                let header_name = header.get(idx).unwrap_or("");
                let value = record.get(idx).unwrap_or("");
                match role {
                    ColumnRole::Timestamp => {
                        timestamp.push(parse_timestamp(Self::NAME, value, line_index)?);
                    }
                    ColumnRole::StepCount => {
                        step_count.push(parse_required_i64(
                            Self::NAME,
                            value,
                            line_index,
                            header_name,
                        )?);
                    }
                    ColumnRole::Distance => {
                        distance_m.push(parse_optional_f64(
                            Self::NAME,
                            value,
                            line_index,
                            header_name,
                        )?);
                    }
                    ColumnRole::ActiveTime => {
                        active_time_ms.push(parse_optional_i64(
                            Self::NAME,
                            value,
                            line_index,
                            header_name,
                        )?);
                    }
                    ColumnRole::Calorie => {
                        calorie_kcal.push(parse_optional_f64(
                            Self::NAME,
                            value,
                            line_index,
                            header_name,
                        )?);
                    }
                    ColumnRole::SourceInfo => {
                        source_info.push(trimmed_optional(value));
                    }
                }
            }
        }

        if timestamp.is_empty() {
            return Err(ParserError::EmptyData { parser: Self::NAME });
        }

        let mut columns: Vec<Column> = Vec::with_capacity(6);
        columns.push(datetime_series(Self::NAME, "timestamp", timestamp)?.into());
        columns.push(Series::new("step_count".into(), step_count).into());
        columns.push(Series::new("distance_m".into(), distance_m).into());
        columns.push(Series::new("active_time_ms".into(), active_time_ms).into());
        columns.push(Series::new("calorie_kcal".into(), calorie_kcal).into());
        if source_info_present {
            let utf8: Vec<Option<&str>> = source_info.iter().map(|v| v.as_deref()).collect();
            columns.push(Series::new("source_info".into(), utf8).into());
        }

        let df = DataFrame::new(columns).map_err(|err| ParserError::Validation {
            parser: Self::NAME,
            message: format!("failed to build pedometer dataframe: {err}"),
        })?;

        Ok(ParsedExport {
            file_hash: String::new(),
            raw_text: content.to_string(),
            metadata,
            kind: ExportKind::Pedometer,
            df,
        })
    }
}
