use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::Result;
use crate::render::ChartFormat;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub sources: Sources,
    #[serde(default)]
    pub charts: ChartsConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

/// One entry per export file; each value is a filesystem path or a URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sources {
    pub pedometer: String,
    pub heart_rate: String,
    pub floors: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartsConfig {
    pub output_dir: PathBuf,
    pub format: ChartFormat,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("charts"),
            format: ChartFormat::Svg,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&text)?;
        Ok(config)
    }
}
