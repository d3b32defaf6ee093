use std::fmt;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Which of the three supported tracker exports a file turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportKind {
    Pedometer,
    HeartRate,
    Floors,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Pedometer => "pedometer",
            ExportKind::HeartRate => "heart_rate",
            ExportKind::Floors => "floors",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ExportKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pedometer" | "steps" => Ok(ExportKind::Pedometer),
            "heart_rate" | "heartrate" | "hr" => Ok(ExportKind::HeartRate),
            "floors" | "floors_climbed" => Ok(ExportKind::Floors),
            other => Err(format!("unknown export kind '{other}'")),
        }
    }
}

/// Banner-row metadata: the line preceding the column header in every export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub tracker_id: String,
    pub tracker_name: String,
    pub schema_version: String,
}

impl ExportMetadata {
    pub fn new(tracker_id: impl Into<String>, schema_version: impl Into<String>) -> Self {
        let tracker_id = tracker_id.into();
        let tracker_name = tracker_id
            .rsplit('.')
            .next()
            .unwrap_or(tracker_id.as_str())
            .to_string();
        Self {
            tracker_id,
            tracker_name,
            schema_version: schema_version.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedExport {
    pub file_hash: String,
    pub raw_text: String,
    pub metadata: ExportMetadata,
    pub kind: ExportKind,
    pub df: DataFrame,
}
