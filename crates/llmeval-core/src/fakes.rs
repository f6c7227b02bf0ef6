//! In-memory fakes for the driver seams (testing only)
//!
//! Provides `MemoryArtifactStore` and `ScriptedBackend`, which satisfy the
//! `ArtifactStore` and `ChatBackend` contracts without touching disk or
//! network.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::artifact::ArtifactStore;
use crate::driver::{ChatBackend, Completion, RequestFailure};
use crate::error::{EvalError, RequestError, Result};
use crate::layout::{ArtifactKey, ArtifactKind};

// ---------------------------------------------------------------------------
// MemoryArtifactStore
// ---------------------------------------------------------------------------

/// Artifact store backed by a `HashMap<(key, kind), text>`.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: Mutex<HashMap<(ArtifactKey, ArtifactKind), String>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &ArtifactKey, kind: ArtifactKind) -> bool {
        self.blobs
            .lock()
            .unwrap()
            .contains_key(&(key.clone(), kind))
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn put(&self, key: &ArtifactKey, kind: ArtifactKind, text: &str) -> Result<()> {
        let mut blobs = self.blobs.lock().unwrap();
        blobs.insert((key.clone(), kind), text.to_string());
        Ok(())
    }

    fn get(&self, key: &ArtifactKey, kind: ArtifactKind) -> Result<String> {
        let blobs = self.blobs.lock().unwrap();
        blobs.get(&(key.clone(), kind)).cloned().ok_or_else(|| {
            EvalError::MissingArtifact(PathBuf::from(format!(
                "memory:{}/{}/{}.{}",
                key.term,
                key.model,
                key.prompt,
                kind.extension()
            )))
        })
    }
}

// ---------------------------------------------------------------------------
// ScriptedBackend
// ---------------------------------------------------------------------------

/// Backend that replays queued replies in call order and records every body
/// it receives. Once the queue is drained it answers `{}` in one second.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<std::result::Result<Completion, RequestFailure>>>,
    bodies: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn push_content(&self, content: &str, duration: f64) -> &Self {
        self.replies.lock().unwrap().push_back(Ok(Completion {
            content: content.to_string(),
            duration,
        }));
        self
    }

    /// Queue a failed reply.
    pub fn push_failure(&self, error: RequestError, duration: Option<f64>) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(RequestFailure { error, duration }));
        self
    }

    /// Bodies received so far, in call order.
    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, body: String) -> std::result::Result<Completion, RequestFailure> {
        self.bodies.lock().unwrap().push(body);
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(Completion {
                content: "{}".to_string(),
                duration: 1.0,
            })
        })
    }
}
