//! llmeval - structured-output evaluation harness CLI
//!
//! The `llmeval` command drives chat-completion models and builds the HTML
//! comparison report from what was recorded.
//!
//! ## Commands
//!
//! - `run`: issue every (model, term, prompt) request and record outcomes
//! - `report`: score recorded outcomes and render both HTML reports

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use llmeval_core::report::build_reports;
use llmeval_core::telemetry::verbosity_level;
use llmeval_core::{
    Driver, EvalConfig, FsArtifactStore, HttpChatBackend, RecordWriter, ReportVariant, RunLayout,
    METRICS,
};

#[derive(Parser, Debug)]
#[command(name = "llmeval")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compare how LLMs follow a JSON output schema", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send every configured request and record the outcomes
    Run {
        /// Backend as host:port or http(s):// base URL
        #[arg(short, long, env = "LLMEVAL_SERVER", default_value = "localhost:11434")]
        server: String,

        /// Path prefix for the record log and artifacts
        #[arg(short, long, env = "LLMEVAL_PREFIX", default_value = "llms-test")]
        prefix: String,

        /// JSON document overriding built-in prompts, models and terms
        #[arg(short, long, env = "LLMEVAL_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Score a recorded run and write the HTML reports
    Report {
        /// Path prefix the run was recorded under
        #[arg(short, long, env = "LLMEVAL_PREFIX", default_value = "llms-test")]
        prefix: String,

        /// JSON document overriding built-in prompts, models and terms
        #[arg(short, long, env = "LLMEVAL_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    llmeval_core::init_tracing(cli.json, verbosity_level(cli.verbose));

    match cli.command {
        Commands::Run {
            server,
            prefix,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            cmd_run(&server, &prefix, &config).await
        }
        Commands::Report { prefix, config } => {
            let config = load_config(config.as_deref())?;
            cmd_report(&prefix, &config)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EvalConfig> {
    EvalConfig::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load configuration from {}", p.display()),
        None => "Failed to load built-in configuration".to_string(),
    })
}

/// Drive every combination against the backend
async fn cmd_run(server: &str, prefix: &str, config: &EvalConfig) -> Result<()> {
    let layout = RunLayout::new(prefix);
    let backend = HttpChatBackend::new(server).context("Failed to build HTTP client")?;
    info!(
        endpoint = backend.endpoint(),
        combinations = config.combinations(),
        "starting run"
    );

    let log_path = layout.log_path();
    let mut records = RecordWriter::create(&log_path)
        .with_context(|| format!("Failed to create record log {}", log_path.display()))?;
    let store = FsArtifactStore::new(layout);
    let driver = Driver::new(config, &backend);

    let summary = tokio::select! {
        result = driver.run(&mut records, &store) => result.context("Run aborted")?,
        _ = tokio::signal::ctrl_c() => {
            warn!(log = %log_path.display(), "interrupted; log holds completed requests only");
            METRICS.flush();
            std::process::exit(130);
        }
    };

    METRICS.flush();
    println!(
        "Recorded {} requests ({} failed, {} warm-up failures) in {}",
        summary.requests,
        summary.failed,
        summary.warmup_failures,
        log_path.display()
    );
    Ok(())
}

/// Build both reports from a recorded run
fn cmd_report(prefix: &str, config: &EvalConfig) -> Result<()> {
    let layout = RunLayout::new(prefix);
    let hierarchy = build_reports(config, &layout)
        .with_context(|| format!("Failed to build report for prefix '{}'", prefix))?;

    println!("Scored {} results", hierarchy.len());
    for variant in [ReportVariant::Full, ReportVariant::NoOriginalContent] {
        println!("  {}", layout.report_path(variant).display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn run_defaults() {
        let cli = Cli::try_parse_from(["llmeval", "run"]).unwrap();
        match cli.command {
            Commands::Run {
                server,
                prefix,
                config,
            } => {
                // Environment may set these; only check when unset.
                if std::env::var_os("LLMEVAL_SERVER").is_none() {
                    assert_eq!(server, "localhost:11434");
                }
                if std::env::var_os("LLMEVAL_PREFIX").is_none() {
                    assert_eq!(prefix, "llms-test");
                }
                if std::env::var_os("LLMEVAL_CONFIG").is_none() {
                    assert!(config.is_none());
                }
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "llmeval", "report", "--prefix", "out/x", "--verbose", "--json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Report { ref prefix, .. } if prefix == "out/x"));
    }

    #[test]
    fn load_config_reports_bad_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"prompts": [{"a": ["only", "three", "parts"]}]}"#)
            .unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to load configuration"));
        assert!(format!("{:#}", err).contains("exactly 4 template parts"));
    }

    #[test]
    fn report_on_missing_log_fails() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("none");
        let err = cmd_report(&prefix.to_string_lossy(), &EvalConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to build report"));
    }
}
