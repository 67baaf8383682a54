use crate::core::dedup::{ConfigError, DedupConfig, DedupStats, Deduplicator, Verdict};
use crate::core::record::parse_line;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("input file not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("progress bar template: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    /// Every line of the input, including blank and malformed ones.
    pub total_lines: usize,
    pub malformed: usize,
    pub retained: usize,
    pub stats: DedupStats,
    pub elapsed_ms: u64,
}

/// Output of an in-memory filter pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredLines {
    pub kept: Vec<String>,
    pub malformed: usize,
    pub stats: DedupStats,
}

/// Reads a coincidence log, drops near-duplicate events and writes the survivors.
pub struct FilterService {
    config: DedupConfig,
    show_progress: bool,
}

impl FilterService {
    pub fn new(config: DedupConfig) -> Result<Self, FilterError> {
        config.validate()?;
        Ok(Self {
            config,
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Filter `input` into `output`. With `output == None` nothing is written (dry run).
    pub fn run(&self, input: &Path, output: Option<&Path>) -> Result<FilterSummary, FilterError> {
        let start = Instant::now();

        let contents = fs::read_to_string(input).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FilterError::InputNotFound {
                path: input.to_path_buf(),
            },
            _ => FilterError::Io {
                context: format!("Failed to read {}", input.display()),
                source: e,
            },
        })?;
        let lines: Vec<&str> = contents.lines().collect();
        log::info!("read {} lines from {}", lines.len(), input.display());

        let progress = if self.show_progress {
            let bar = ProgressBar::new(lines.len() as u64);
            bar.set_style(ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )?);
            bar.set_message("Filtering events…");
            bar
        } else {
            ProgressBar::hidden()
        };

        let filtered = filter_with_progress(lines.as_slice(), self.config, &progress);
        progress.finish_with_message("Filtering complete");

        if let Some(path) = output {
            write_lines(path, &filtered.kept)?;
            log::info!("wrote {} lines to {}", filtered.kept.len(), path.display());
        }

        Ok(FilterSummary {
            total_lines: lines.len(),
            malformed: filtered.malformed,
            retained: filtered.kept.len(),
            stats: filtered.stats,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Filter already-loaded lines without touching the filesystem.
pub fn filter_lines<S>(lines: &[S], config: DedupConfig) -> FilteredLines
where
    S: AsRef<str> + Sync,
{
    filter_with_progress(lines, config, &ProgressBar::hidden())
}

fn filter_with_progress<S>(lines: &[S], config: DedupConfig, progress: &ProgressBar) -> FilteredLines
where
    S: AsRef<str> + Sync,
{
    // Parsing is independent per line; the dedup pass below must stay in input order.
    let parsed: Vec<_> = lines
        .par_iter()
        .enumerate()
        .map(|(i, line)| parse_line(i + 1, line.as_ref()))
        .collect();

    let mut dedup = Deduplicator::new(config);
    let mut result = FilteredLines::default();

    for (outcome, line) in parsed.into_iter().zip(lines) {
        progress.inc(1);
        let record = match outcome {
            Ok(record) => record,
            Err(e) => {
                result.malformed += 1;
                if line.as_ref().trim().is_empty() {
                    log::debug!("skipping blank line");
                } else {
                    log::warn!("skipping {}", e);
                }
                continue;
            }
        };

        if dedup.observe(&record.readings) == Verdict::Kept {
            result.kept.push(record.raw);
        }
    }

    result.stats = dedup.stats();
    result
}

fn write_lines(path: &Path, lines: &[String]) -> Result<(), FilterError> {
    let io_err = |source: io::Error| FilterError::Io {
        context: format!("Failed to write {}", path.display()),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    for line in lines {
        writeln!(out, "{}", line).map_err(io_err)?;
    }
    out.flush().map_err(io_err)
}
