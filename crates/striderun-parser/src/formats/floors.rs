use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::{ExportKind, ExportMetadata, ParsedExport};
use crate::registry::ExportParser;

use super::{datetime_series, parse_optional_i64, parse_timestamp, read_preamble};

pub struct FloorsParser;

impl Default for FloorsParser {
    fn default() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRole {
    Timestamp,
    Floor,
}

impl FloorsParser {
    const NAME: &'static str = "FLOORS";

    fn validate_tracker(metadata: &ExportMetadata) -> Result<(), ParserError> {
        let lower = metadata.tracker_name.to_ascii_lowercase();
        if lower.contains("floors") {
            Ok(())
        } else {
            Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: format!(
                    "tracker '{}' does not match expected floors exports",
                    metadata.tracker_id
                ),
            })
        }
    }

    fn classify_column(column: &str) -> Result<ColumnRole, ParserError> {
        let trimmed = column.trim();
        if trimmed.eq_ignore_ascii_case("start_time") {
            return Ok(ColumnRole::Timestamp);
        }
        if trimmed.eq_ignore_ascii_case("floor") {
            return Ok(ColumnRole::Floor);
        }
        Err(ParserError::FormatMismatch {
            parser: Self::NAME,
            reason: format!("unrecognized column '{trimmed}'"),
        })
    }
}

impl ExportParser for FloorsParser {
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
        if !roles.contains(&ColumnRole::Timestamp) || !roles.contains(&ColumnRole::Floor) {
            return Err(ParserError::InvalidHeader {
                parser: Self::NAME,
                row_index: 2,
                message: "expected both 'start_time' and 'floor' columns".to_string(),
            });
        }

        let mut timestamp: Vec<i64> = Vec::new();
        let mut floor_count: Vec<Option<i64>> = Vec::new();

        for (row_idx, record) in records.enumerate() {
            let record = record.map_err(|err| ParserError::Csv {
                parser: Self::NAME,
                source: err,
            })?;
            let line_index = row_idx + 3;

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
                    ColumnRole::Floor => {
                        floor_count.push(parse_optional_i64(
                            Self::NAME,
                            value,
                            line_index,
                            header_name,
                        )?);
                    }
                }
            }
        }

        if timestamp.is_empty() {
            return Err(ParserError::EmptyData { parser: Self::NAME });
        }

        let df = DataFrame::new(vec![
            datetime_series(Self::NAME, "timestamp", timestamp)?.into(),
            Series::new("floor_count".into(), floor_count).into(),
        ])
        .map_err(|err| ParserError::Validation {
            parser: Self::NAME,
            message: format!("failed to build floors dataframe: {err}"),
        })?;

        Ok(ParsedExport {
            file_hash: String::new(),
            raw_text: content.to_string(),
            metadata,
            kind: ExportKind::Floors,
            df,
        })
    }
}
