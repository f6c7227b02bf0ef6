//! File naming for one run, derived from a single path prefix.
//!
//! For prefix `out/llms-test`:
//!
//! - record log: `out/llms-test.log.jsonl`
//! - artifacts: `out/llms-test.<model, ':' -> '-'>.<term>-<prompt>.data|err`
//! - reports: `out/llms-test-report.html`,
//!   `out/llms-test-report-no-original-content.html`

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identity of one (model, term, prompt) combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub model: String,
    pub term: String,
    pub prompt: String,
}

impl ArtifactKey {
    pub fn new(model: &str, term: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            term: term.to_string(),
            prompt: prompt.to_string(),
        }
    }
}

/// Which artifact a record points at, selected by its error flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Response content of a successful request.
    Data,
    /// Error text of a failed request.
    Error,
}

impl ArtifactKind {
    pub fn from_error_flag(error: bool) -> Self {
        if error {
            ArtifactKind::Error
        } else {
            ArtifactKind::Data
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Data => "data",
            ArtifactKind::Error => "err",
        }
    }
}

/// Report flavour; both are rendered from one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportVariant {
    /// Includes base64 download links for the raw artifacts.
    Full,
    /// Same content without the download links.
    NoOriginalContent,
}

/// Paths for every file a run reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    prefix: String,
}

impl RunLayout {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.log.jsonl", self.prefix))
    }

    pub fn artifact_path(&self, key: &ArtifactKey, kind: ArtifactKind) -> PathBuf {
        PathBuf::from(format!(
            "{}.{}.{}-{}.{}",
            self.prefix,
            key.model.replace(':', "-"),
            key.term,
            key.prompt,
            kind.extension()
        ))
    }

    pub fn report_path(&self, variant: ReportVariant) -> PathBuf {
        match variant {
            ReportVariant::Full => PathBuf::from(format!("{}-report.html", self.prefix)),
            ReportVariant::NoOriginalContent => {
                PathBuf::from(format!("{}-report-no-original-content.html", self.prefix))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_replace_colons() {
        let layout = RunLayout::new("llms-test");
        let key = ArtifactKey::new("qwen2.5:7b", "0", "a");
        assert_eq!(
            layout.artifact_path(&key, ArtifactKind::Data),
            PathBuf::from("llms-test.qwen2.5-7b.0-a.data")
        );
        assert_eq!(
            layout.artifact_path(&key, ArtifactKind::Error),
            PathBuf::from("llms-test.qwen2.5-7b.0-a.err")
        );
    }

    #[test]
    fn log_and_report_paths() {
        let layout = RunLayout::new("out/run1");
        assert_eq!(layout.log_path(), PathBuf::from("out/run1.log.jsonl"));
        assert_eq!(
            layout.report_path(ReportVariant::Full),
            PathBuf::from("out/run1-report.html")
        );
        assert_eq!(
            layout.report_path(ReportVariant::NoOriginalContent),
            PathBuf::from("out/run1-report-no-original-content.html")
        );
    }

    #[test]
    fn kind_follows_error_flag() {
        assert_eq!(ArtifactKind::from_error_flag(false), ArtifactKind::Data);
        assert_eq!(ArtifactKind::from_error_flag(true), ArtifactKind::Error);
    }
}
