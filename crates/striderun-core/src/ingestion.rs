use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use blake3::Hasher;
use striderun_parser::{parse_export_file, ParsedExport, ParserError};
use tracing::warn;

use crate::error::Result;

/// Where an export file comes from. Anything containing a scheme separator is
/// treated as a URL, everything else as a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSource {
    Path(PathBuf),
    Url(String),
}

impl ExportSource {
    pub fn parse(raw: &str) -> Self {
        if raw.contains("://") {
            ExportSource::Url(raw.to_string())
        } else {
            ExportSource::Path(PathBuf::from(raw))
        }
    }

    pub fn fetch(&self) -> Result<Vec<u8>> {
        match self {
            ExportSource::Path(path) => Ok(fs::read(path)?),
            ExportSource::Url(url) => {
                let response = reqwest::blocking::get(url)?.error_for_status()?;
                Ok(response.bytes()?.to_vec())
            }
        }
    }
}

impl fmt::Display for ExportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportSource::Path(path) => write!(f, "{}", path.display()),
            ExportSource::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Duplicate,
    Parsed,
    Failed,
}

#[derive(Debug)]
pub struct ParserAttemptReport {
    pub parser: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct FileReport {
    pub source: String,
    pub hash: String,
    pub status: FileStatus,
    pub parser_attempts: Vec<ParserAttemptReport>,
}

#[derive(Debug)]
pub struct IngestionBatch {
    pub parsed: Vec<ParsedExport>,
    pub reports: Vec<FileReport>,
    pub new_hashes: Vec<String>,
}

/// Raw bytes already pulled from somewhere, ready for hashing and parsing.
#[derive(Debug)]
pub struct ExportInput<'a> {
    pub source: &'a str,
    pub contents: &'a [u8],
}

pub fn ingest_exports(
    inputs: &[ExportInput<'_>],
    existing_hashes: &HashSet<String>,
) -> IngestionBatch {
    let mut parsed_exports = Vec::new();
    let mut reports = Vec::new();
    let mut new_hashes = Vec::new();

    for input in inputs {
        let hash = compute_hash(input.contents);
        if existing_hashes.contains(&hash) || new_hashes.contains(&hash) {
            reports.push(FileReport {
                source: input.source.to_string(),
                hash,
                status: FileStatus::Duplicate,
                parser_attempts: Vec::new(),
            });
            continue;
        }

        let Ok(content_str) = std::str::from_utf8(input.contents) else {
            reports.push(FileReport {
                source: input.source.to_string(),
                hash,
                status: FileStatus::Failed,
                parser_attempts: vec![ParserAttemptReport {
                    parser: "utf8",
                    message: "file contents were not valid UTF-8".to_string(),
                }],
            });
            continue;
        };

        match parse_export_file(content_str) {
            Ok(mut parsed) => {
                parsed.file_hash = hash.clone();
                new_hashes.push(hash.clone());
                parsed_exports.push(parsed);
                reports.push(FileReport {
                    source: input.source.to_string(),
                    hash,
                    status: FileStatus::Parsed,
                    parser_attempts: Vec::new(),
                });
            }
            Err(err) => {
                reports.push(FileReport {
                    source: input.source.to_string(),
                    hash,
                    status: FileStatus::Failed,
                    parser_attempts: attempt_reports(err),
                });
            }
        }
    }

    IngestionBatch {
        parsed: parsed_exports,
        reports,
        new_hashes,
    }
}

/// Fetches every source and runs the parser registry over the results. Fetch
/// and parse failures become `Failed` reports rather than aborting the batch.
pub fn ingest_sources(sources: &[ExportSource]) -> IngestionBatch {
    let mut fetched: Vec<(String, Vec<u8>)> = Vec::with_capacity(sources.len());
    let mut fetch_failures: Vec<FileReport> = Vec::new();

    for source in sources {
        match source.fetch() {
            Ok(bytes) => fetched.push((source.to_string(), bytes)),
            Err(err) => {
                warn!(source = %source, error = %err, "failed to fetch export source");
                fetch_failures.push(FileReport {
                    source: source.to_string(),
                    hash: String::new(),
                    status: FileStatus::Failed,
                    parser_attempts: vec![ParserAttemptReport {
                        parser: "fetch",
                        message: err.to_string(),
                    }],
                });
            }
        }
    }

    let inputs: Vec<ExportInput<'_>> = fetched
        .iter()
        .map(|(source, contents)| ExportInput {
            source: source.as_str(),
            contents: contents.as_slice(),
        })
        .collect();

    let mut batch = ingest_exports(&inputs, &HashSet::new());
    batch.reports.extend(fetch_failures);
    batch
}

fn attempt_reports(err: ParserError) -> Vec<ParserAttemptReport> {
    match err {
        ParserError::NoMatchingParser { attempts } => attempts
            .into_iter()
            .map(|attempt| ParserAttemptReport {
                parser: attempt.parser,
                message: attempt.message,
            })
            .collect(),
        other => {
            let parser = match &other {
                ParserError::FormatMismatch { parser, .. }
                | ParserError::InvalidHeader { parser, .. }
                | ParserError::Csv { parser, .. }
                | ParserError::DataRow { parser, .. }
                | ParserError::Validation { parser, .. }
                | ParserError::EmptyData { parser } => *parser,
                ParserError::NoMatchingParser { .. } => "registry",
            };
            vec![ParserAttemptReport {
                parser,
                message: other.to_string(),
            }]
        }
    }
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}
