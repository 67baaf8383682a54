use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+\.[0-9]+):\s*\[(.*)\]").expect("line pattern is a valid regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected `<timestamp>: [(<id>,<time>), ...]`")]
    MissingHeader { line: usize },

    #[error("line {line}: malformed reading `{item}`")]
    BadReading { line: usize, item: String },
}

/// One detector hit inside a coincidence record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub detector_id: i64,
    pub time: i64,
}

impl Reading {
    pub fn new(detector_id: i64, time: i64) -> Self {
        Self { detector_id, time }
    }
}

/// A parsed input line. `raw` is the trimmed source text, emitted verbatim when kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub line: usize,
    pub timestamp: f64,
    pub readings: Vec<Reading>,
    pub raw: String,
}

/// Parse `<float>: [(<int>,<int>), ...]`. `line_no` is 1-based and only used for errors.
///
/// Text after the last `]` is ignored. A bracket body with no items yields a
/// record with no readings rather than an error.
pub fn parse_line(line_no: usize, text: &str) -> Result<Record, ParseError> {
    let raw = text.trim();
    let caps = LINE_PATTERN
        .captures(raw)
        .ok_or(ParseError::MissingHeader { line: line_no })?;

    // The pattern only admits ASCII digits around a dot, which always parses.
    let timestamp: f64 = caps[1]
        .parse()
        .map_err(|_| ParseError::MissingHeader { line: line_no })?;

    let mut readings = Vec::new();
    for item in caps[2].split("),") {
        let item = item.trim_matches(|c| c == ' ' || c == '(' || c == ')');
        if item.is_empty() {
            continue;
        }
        readings.push(parse_reading(item).ok_or_else(|| ParseError::BadReading {
            line: line_no,
            item: item.to_string(),
        })?);
    }

    Ok(Record {
        line: line_no,
        timestamp,
        readings,
        raw: raw.to_string(),
    })
}

fn parse_reading(item: &str) -> Option<Reading> {
    let mut fields = item.split(',');
    let detector_id = fields.next()?.trim().parse().ok()?;
    let time = fields.next()?.trim().parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(Reading::new(detector_id, time))
}
