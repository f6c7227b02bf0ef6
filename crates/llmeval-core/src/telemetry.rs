//! Log subscriber setup for the `llmeval` binary.
//!
//! `RUST_LOG` wins when set. Otherwise the level comes from `--verbose`, and
//! the HTTP stack is held at `warn` so per-request connection chatter does
//! not drown the driver's progress lines.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose debug output is transport noise for an evaluation run.
const QUIET_DEPENDENCIES: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "h2"];

/// `--verbose` maps to `DEBUG`, otherwise `INFO`.
pub fn verbosity_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Filter directives used when `RUST_LOG` is unset.
pub fn default_directives(level: Level) -> String {
    let mut directives = level.as_str().to_lowercase();
    for krate in QUIET_DEPENDENCIES {
        directives.push_str(&format!(",{}=warn", krate));
    }
    directives
}

/// Install the global subscriber: plain text, or one JSON object per line.
///
/// Later calls are ignored.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let text = (!json).then(|| fmt::layer().with_target(false));
    let structured = json.then(|| fmt::layer().with_target(false).json());

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(structured)
        .try_init()
        .ok();
}
