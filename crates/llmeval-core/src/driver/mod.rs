//! Sequential request driver.
//!
//! For each model (configured order) a warm-up greeting is sent first, then
//! one request per (term, prompt). Every request is awaited before the next
//! is built, so durations are attributable to a single inference. Backend
//! failures become `.err` artifacts; only local I/O errors stop the run.

pub mod backend;
pub mod encoder;

use tracing::{debug, info, warn, Instrument};

use crate::artifact::ArtifactStore;
use crate::config::{EvalConfig, PromptVariant, Term};
use crate::error::Result;
use crate::layout::{ArtifactKey, ArtifactKind};
use crate::metrics::METRICS;
use crate::obs;
use crate::record::{OutcomeRecord, RecordWriter};

pub use backend::{ChatBackend, Completion, HttpChatBackend, RequestFailure};
pub use encoder::{RequestEncoder, TemplateEncoder};

/// Counts for a finished driver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Evaluation requests issued (warm-ups excluded).
    pub requests: usize,
    pub failed: usize,
    pub warmup_failures: usize,
}

/// Issues every configured combination against one backend.
pub struct Driver<'a> {
    config: &'a EvalConfig,
    backend: &'a dyn ChatBackend,
    encoder: &'a dyn RequestEncoder,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a EvalConfig, backend: &'a dyn ChatBackend) -> Self {
        Self {
            config,
            backend,
            encoder: &TemplateEncoder,
        }
    }

    /// Swap the request body builder.
    pub fn with_encoder(mut self, encoder: &'a dyn RequestEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Run every (model, term, prompt) combination in configured order.
    ///
    /// Each outcome's artifact is written before its record is appended, so
    /// every record in the log has its artifact on disk.
    pub async fn run(
        &self,
        records: &mut RecordWriter,
        artifacts: &dyn ArtifactStore,
    ) -> Result<RunSummary> {
        obs::emit_run_started(
            records.path(),
            self.config.models.len(),
            self.config.terms.len(),
            self.config.prompts.len(),
        );
        let mut summary = RunSummary::default();
        for model in &self.config.models {
            self.run_model(model, records, artifacts, &mut summary)
                .instrument(obs::model_span(model))
                .await?;
        }
        obs::emit_run_finished(summary.requests, summary.failed);
        Ok(summary)
    }

    async fn run_model(
        &self,
        model: &str,
        records: &mut RecordWriter,
        artifacts: &dyn ArtifactStore,
        summary: &mut RunSummary,
    ) -> Result<()> {
        info!("--- Model: {}", model);
        if !self.warm_up(model).await {
            summary.warmup_failures += 1;
        }

        for term in &self.config.terms {
            info!(
                "Term: \"{}\" Context: \"{}\"",
                term.label,
                term.context_chain("\" > \"")
            );
            for prompt in &self.config.prompts {
                let failed = self
                    .evaluate(model, term, prompt, records, artifacts)
                    .await?;
                summary.requests += 1;
                if failed {
                    summary.failed += 1;
                }
            }
        }
        Ok(())
    }

    /// Load the model with a greeting; content is logged and discarded.
    async fn warm_up(&self, model: &str) -> bool {
        match self.backend.complete(self.encoder.encode_warmup(model)).await {
            Ok(completion) => {
                obs::emit_model_warmed(
                    model,
                    Some(completion.duration),
                    Some(completion.content.as_str()),
                );
                true
            }
            Err(failure) => {
                warn!(error = %failure.error, "warm-up failed");
                obs::emit_model_warmed(model, failure.duration, None);
                false
            }
        }
    }

    /// Issue one evaluation request and persist its outcome. Returns whether
    /// the request failed.
    async fn evaluate(
        &self,
        model: &str,
        term: &Term,
        prompt: &PromptVariant,
        records: &mut RecordWriter,
        artifacts: &dyn ArtifactStore,
    ) -> Result<bool> {
        debug!(prompt = %prompt.key, "sending request");
        let body = self.encoder.encode(&prompt.template, model, term);
        let key = ArtifactKey::new(model, &term.key, &prompt.key);
        METRICS.inc_requests_sent();

        let (duration, error) = match self.backend.complete(body).await {
            Ok(completion) => {
                artifacts.put(&key, ArtifactKind::Data, &completion.content)?;
                (Some(completion.duration), false)
            }
            Err(failure) => {
                METRICS.inc_requests_failed();
                warn!(error = %failure.error, "request failed");
                artifacts.put(&key, ArtifactKind::Error, &failure.error.to_string())?;
                (failure.duration, true)
            }
        };

        records.append(&OutcomeRecord {
            model: key.model,
            term: key.term,
            prompt: key.prompt,
            duration,
            error,
        })?;
        obs::emit_request_finished(&term.key, &prompt.key, duration, error);
        Ok(error)
    }
}
