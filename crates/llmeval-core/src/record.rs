//! Outcome records and the append-only JSONL record log.
//!
//! One record per (model, term, prompt) request. The writer flushes after
//! every line so an interrupted run keeps everything but the in-flight
//! record.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::layout::{ArtifactKey, ArtifactKind};

/// Result of a single driver request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub model: String,
    pub term: String,
    pub prompt: String,
    /// Seconds, rounded to milliseconds. Absent when the request failed
    /// before a response arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub error: bool,
}

impl OutcomeRecord {
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey::new(&self.model, &self.term, &self.prompt)
    }

    pub fn artifact_kind(&self) -> ArtifactKind {
        ArtifactKind::from_error_flag(self.error)
    }
}

/// Append-only writer for the record log.
pub struct RecordWriter {
    path: PathBuf,
    file: File,
    written: usize,
}

impl RecordWriter {
    /// Create (or truncate) the log at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            file,
            written: 0,
        })
    }

    /// Append one record as a single line and flush.
    pub fn append(&mut self, record: &OutcomeRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended through this writer.
    pub fn written(&self) -> usize {
        self.written
    }
}

/// Read every record from the log at `path`, in log order.
///
/// Blank lines are skipped; any other undecodable line is fatal.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<OutcomeRecord>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| EvalError::MalformedRecord {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
