use crate::core::dedup::DedupConfig;
use crate::services::filter::FilterSummary;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Could not open report file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// One filter run, stored as a JSON line in the report file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: String,
    pub input: String,
    /// `None` for dry runs.
    pub output: Option<String>,
    pub config: DedupConfig,
    pub summary: FilterSummary,
}

impl RunRecord {
    pub fn new(
        input: &Path,
        output: Option<&Path>,
        config: DedupConfig,
        summary: FilterSummary,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            input: input.to_string_lossy().into_owned(),
            output: output.map(|p| p.to_string_lossy().into_owned()),
            config,
            summary,
        }
    }
}

pub fn append_report(path: &Path, record: &RunRecord) -> Result<(), ReportError> {
    let mut out = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ReportError::Open {
            path: path.display().to_string(),
            source,
        })?;
    writeln!(out, "{}", serde_json::to_string(record)?)?;
    Ok(())
}

/// Read every run in `path`, skipping lines that do not parse.
pub fn read_reports(path: &Path) -> Result<Vec<RunRecord>, ReportError> {
    let f = File::open(path).map_err(|source| ReportError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(f);

    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RunRecord>(&line) {
            Ok(rec) => records.push(rec),
            Err(err) => log::warn!("Skipping malformed report entry {}: {}", i, err),
        }
    }
    Ok(records)
}
