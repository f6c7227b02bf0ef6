//! Raw-content artifacts: one text blob per outcome record.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{EvalError, Result};
use crate::layout::{ArtifactKey, ArtifactKind, RunLayout};

/// Keyed storage for response content and error text.
pub trait ArtifactStore: Send + Sync {
    /// Store `text` for the combination, replacing any previous blob.
    fn put(&self, key: &ArtifactKey, kind: ArtifactKind, text: &str) -> Result<()>;

    /// Load the blob. A missing blob is [`EvalError::MissingArtifact`].
    fn get(&self, key: &ArtifactKey, kind: ArtifactKind) -> Result<String>;
}

/// Filesystem-backed artifact store using the [`RunLayout`] naming scheme.
pub struct FsArtifactStore {
    layout: RunLayout,
}

impl FsArtifactStore {
    pub fn new(layout: RunLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &RunLayout {
        &self.layout
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put(&self, key: &ArtifactKey, kind: ArtifactKind, text: &str) -> Result<()> {
        let path = self.layout.artifact_path(key, kind);
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        // Write to a temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn get(&self, key: &ArtifactKey, kind: ArtifactKind) -> Result<String> {
        let path = self.layout.artifact_path(key, kind);
        fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EvalError::MissingArtifact(path)
            } else {
                EvalError::Io(e)
            }
        })
    }
}
