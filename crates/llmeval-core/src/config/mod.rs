//! Run configuration: prompts, models, terms and report preamble.
//!
//! [`EvalConfig::load`] starts from the built-in defaults and overlays an
//! optional JSON override document. The result is immutable and shared by
//! reference between the driver and the report builder.
//!
//! Override document shape (every key optional):
//!
//! ```json
//! {
//!   "heading": "<h1>..</h1>",
//!   "description": "<p>..</p>",
//!   "prompts": [{"a": ["prefix", "after-model", "after-term", "closing"]}],
//!   "models": ["qwen2.5:7b"],
//!   "terms": [{"0": {"t": "conflict", "c": ["world", "countries"]}}]
//! }
//! ```

pub mod defaults;

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EvalError, Result};

pub use defaults::CONTEXT_SEPARATOR;

/// A concept under evaluation. `key` is the identity; `label` may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub key: String,
    pub label: String,
    /// Narrowing from general to specific.
    pub contexts: Vec<String>,
}

impl Term {
    pub fn new(key: &str, label: &str, contexts: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            contexts: contexts.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Join the context chain with `sep`.
    pub fn context_chain(&self, sep: &str) -> String {
        self.contexts.join(sep)
    }
}

/// Four literal fragments interleaved with model, term label and context chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub prefix: String,
    pub after_model: String,
    pub after_term: String,
    pub closing: String,
}

impl PromptTemplate {
    pub fn new(prefix: &str, after_model: &str, after_term: &str, closing: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            after_model: after_model.to_string(),
            after_term: after_term.to_string(),
            closing: closing.to_string(),
        }
    }

    fn from_parts(key: &str, parts: Vec<String>) -> Result<Self> {
        let [prefix, after_model, after_term, closing]: [String; 4] =
            parts.try_into().map_err(|parts: Vec<String>| {
                EvalError::InvalidConfig(format!(
                    "prompt '{}' must have exactly 4 template parts, got {}",
                    key,
                    parts.len()
                ))
            })?;
        Ok(Self {
            prefix,
            after_model,
            after_term,
            closing,
        })
    }
}

/// A named prompt variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptVariant {
    pub key: String,
    pub template: PromptTemplate,
}

/// Effective configuration for one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Raw HTML placed at the top of the report.
    pub heading: String,
    /// Raw HTML placed under the heading; omitted when empty.
    pub description: String,
    pub prompts: Vec<PromptVariant>,
    pub models: Vec<String>,
    pub terms: Vec<Term>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            heading: defaults::DEFAULT_HEADING.to_string(),
            description: String::new(),
            prompts: defaults::prompts(),
            models: defaults::models(),
            terms: defaults::terms(),
        }
    }
}

/// Wire form of a term entry body: `{"t": label, "c": [contexts]}`.
#[derive(Debug, Deserialize)]
struct TermBody {
    t: String,
    #[serde(default)]
    c: Vec<String>,
}

/// The optional override document as written on disk.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigOverrides {
    heading: Option<String>,
    description: Option<String>,
    prompts: Option<Vec<BTreeMap<String, Vec<String>>>>,
    models: Option<Vec<String>>,
    terms: Option<Vec<BTreeMap<String, TermBody>>>,
}

impl ConfigOverrides {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Each list entry is a single-key object; the key is the entry's identity.
fn single_entry<V>(kind: &str, index: usize, entry: BTreeMap<String, V>) -> Result<(String, V)> {
    let len = entry.len();
    let mut iter = entry.into_iter();
    match (iter.next(), iter.next()) {
        (Some(kv), None) => Ok(kv),
        _ => Err(EvalError::InvalidConfig(format!(
            "{} entry #{} must have exactly one key, got {}",
            kind, index, len
        ))),
    }
}

fn ensure_unique<'a>(kind: &str, keys: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(EvalError::InvalidConfig(format!(
                "duplicate {} key '{}'",
                kind, key
            )));
        }
    }
    Ok(())
}

impl EvalConfig {
    /// Defaults, overlaid with the document at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = Self::default();
        match path {
            None => Ok(base),
            Some(path) => {
                info!(path = %path.display(), "loading configuration");
                let raw = std::fs::read_to_string(path)?;
                base.with_overrides(ConfigOverrides::from_json_str(&raw)?)
            }
        }
    }

    /// Replace every section present in `overrides`; absent sections keep
    /// their current value.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(heading) = overrides.heading {
            info!("setting heading");
            self.heading = heading;
        }
        if let Some(description) = overrides.description {
            info!("setting description");
            self.description = description;
        }
        if let Some(prompts) = overrides.prompts {
            info!(count = prompts.len(), "setting prompts");
            self.prompts = prompts
                .into_iter()
                .enumerate()
                .map(|(i, entry)| -> Result<PromptVariant> {
                    let (key, parts) = single_entry("prompt", i, entry)?;
                    let template = PromptTemplate::from_parts(&key, parts)?;
                    Ok(PromptVariant { key, template })
                })
                .collect::<Result<Vec<_>>>()?;
            ensure_unique("prompt", self.prompts.iter().map(|p| p.key.as_str()))?;
        }
        if let Some(models) = overrides.models {
            info!(count = models.len(), "setting models");
            ensure_unique("model", models.iter().map(String::as_str))?;
            self.models = models;
        }
        if let Some(terms) = overrides.terms {
            info!(count = terms.len(), "setting terms");
            self.terms = terms
                .into_iter()
                .enumerate()
                .map(|(i, entry)| -> Result<Term> {
                    let (key, body) = single_entry("term", i, entry)?;
                    Ok(Term {
                        key,
                        label: body.t,
                        contexts: body.c,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            ensure_unique("term", self.terms.iter().map(|t| t.key.as_str()))?;
        }
        Ok(self)
    }

    pub fn term(&self, key: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.key == key)
    }

    pub fn prompt(&self, key: &str) -> Option<&PromptVariant> {
        self.prompts.iter().find(|p| p.key == key)
    }

    /// Number of evaluation requests a full driver run issues.
    pub fn combinations(&self) -> usize {
        self.models.len() * self.terms.len() * self.prompts.len()
    }
}
