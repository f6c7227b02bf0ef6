//! llmeval core library
//!
//! Driver, record log, schema scoring and HTML report rendering for
//! comparing how chat-completion models follow a JSON output schema.

pub mod aggregate;
pub mod artifact;
pub mod config;
pub mod driver;
pub mod error;
pub mod fakes;
pub mod layout;
pub mod metrics;
pub mod obs;
pub mod record;
pub mod report;
pub mod scoring;
pub mod telemetry;

pub use aggregate::{aggregate, Hierarchy, ResultEntry};
pub use artifact::{ArtifactStore, FsArtifactStore};
pub use config::{ConfigOverrides, EvalConfig, PromptTemplate, PromptVariant, Term};
pub use driver::{
    ChatBackend, Completion, Driver, HttpChatBackend, RequestEncoder, RequestFailure, RunSummary,
    TemplateEncoder,
};
pub use error::{EvalError, RequestError, Result};
pub use layout::{ArtifactKey, ArtifactKind, ReportVariant, RunLayout};
pub use record::{read_records, OutcomeRecord, RecordWriter};
pub use report::{render_reports, RenderedReports};
pub use scoring::{score, score_text, Score};

pub use metrics::METRICS;
pub use obs::{emit_report_written, emit_run_finished, emit_run_started};
pub use telemetry::init_tracing;

/// llmeval version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
