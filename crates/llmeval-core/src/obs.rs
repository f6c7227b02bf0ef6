//! Structured observability hooks for driver and report lifecycle events.
//!
//! This module provides:
//! - A model-scoped tracing span
//! - Emission functions for key events: run start, warm-up, request outcome,
//!   record scoring, report output

use tracing::{info, warn};

/// Span tagged with the model name, for every request sent to that model.
///
/// # Example
///
/// ```ignore
/// driver.run_model(model).instrument(model_span(model)).await
/// ```
pub fn model_span(model: &str) -> tracing::Span {
    tracing::info_span!("llmeval.model", model = %model)
}

/// Emit event: driver run started.
pub fn emit_run_started(log: &std::path::Path, models: usize, terms: usize, prompts: usize) {
    info!(
        event = "run.started",
        log = %log.display(),
        models = models,
        terms = terms,
        prompts = prompts,
    );
}

/// Emit event: warm-up request for a model returned (or failed).
pub fn emit_model_warmed(model: &str, duration: Option<f64>, reply: Option<&str>) {
    info!(
        event = "model.warmed",
        model = %model,
        duration = ?duration,
        reply = reply.unwrap_or(""),
    );
}

/// Emit event: a single evaluation request finished.
pub fn emit_request_finished(term: &str, prompt: &str, duration: Option<f64>, error: bool) {
    if error {
        warn!(
            event = "request.failed",
            term = %term,
            prompt = %prompt,
            duration = ?duration,
        );
    } else {
        info!(
            event = "request.finished",
            term = %term,
            prompt = %prompt,
            duration = ?duration,
        );
    }
}

/// Emit event: driver run finished.
pub fn emit_run_finished(total: usize, failed: usize) {
    info!(event = "run.finished", total = total, failed = failed);
}

/// Emit event: a record could not be scored above zero.
pub fn emit_record_unscorable(
    model: &str,
    term: &str,
    prompt: &str,
    reason: &dyn std::fmt::Display,
) {
    warn!(
        event = "record.unscorable",
        model = %model,
        term = %term,
        prompt = %prompt,
        reason = %reason,
    );
}

/// Emit event: a report document was written.
pub fn emit_report_written(path: &std::path::Path, bytes: usize) {
    info!(event = "report.written", path = %path.display(), bytes = bytes);
}
