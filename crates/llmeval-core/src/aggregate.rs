//! Replays the record log into a term → model → prompt hierarchy.
//!
//! Every record's artifact is loaded and scored on each build, so changing
//! the scoring rule only needs a new report, not a new driver run.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::artifact::ArtifactStore;
use crate::error::Result;
use crate::layout::ArtifactKey;
use crate::metrics::METRICS;
use crate::obs;
use crate::record::OutcomeRecord;
use crate::scoring::{score, Score};

/// Scored outcome of one (term, model, prompt) combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    pub duration: Option<f64>,
    pub error: bool,
    /// Artifact text: response content, or error text when `error` is set.
    pub raw: String,
    /// `None` for failed requests and unparseable content.
    pub parsed: Option<Value>,
    pub score: Score,
}

impl ResultEntry {
    /// Build the entry for `record` from its artifact text.
    pub fn from_artifact(record: &OutcomeRecord, raw: String) -> Self {
        if record.error {
            obs::emit_record_unscorable(&record.model, &record.term, &record.prompt, &raw);
            return Self {
                duration: record.duration,
                error: true,
                raw,
                parsed: None,
                score: Score::UNPARSED,
            };
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => {
                let score = score(Some(&value));
                Self {
                    duration: record.duration,
                    error: false,
                    raw,
                    parsed: Some(value),
                    score,
                }
            }
            Err(e) => {
                METRICS.inc_parse_failures();
                obs::emit_record_unscorable(&record.model, &record.term, &record.prompt, &e);
                Self {
                    duration: record.duration,
                    error: false,
                    raw,
                    parsed: None,
                    score: Score::UNPARSED,
                }
            }
        }
    }
}

type PromptMap = BTreeMap<String, ResultEntry>;
type ModelMap = BTreeMap<String, PromptMap>;

/// Nested results keyed by term key, model name, prompt key.
///
/// Only combinations that produced a record are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Hierarchy {
    terms: BTreeMap<String, ModelMap>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at `key`, returning the entry it replaced, if any.
    pub fn insert(&mut self, key: ArtifactKey, entry: ResultEntry) -> Option<ResultEntry> {
        self.terms
            .entry(key.term)
            .or_default()
            .entry(key.model)
            .or_default()
            .insert(key.prompt, entry)
    }

    pub fn get(&self, term: &str, model: &str, prompt: &str) -> Option<&ResultEntry> {
        self.terms.get(term)?.get(model)?.get(prompt)
    }

    pub fn has_term(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    pub fn has_model(&self, term: &str, model: &str) -> bool {
        self.terms
            .get(term)
            .is_some_and(|models| models.contains_key(model))
    }

    /// Number of leaf entries.
    pub fn len(&self) -> usize {
        self.terms
            .values()
            .flat_map(|models| models.values())
            .map(|prompts| prompts.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// All leaves as `(term, model, prompt, entry)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str, &ResultEntry)> {
        self.terms.iter().flat_map(|(term, models)| {
            models.iter().flat_map(move |(model, prompts)| {
                prompts.iter().map(move |(prompt, entry)| {
                    (term.as_str(), model.as_str(), prompt.as_str(), entry)
                })
            })
        })
    }
}

/// Load, score and nest every record, in log order.
///
/// A later record for the same combination replaces the earlier one. A
/// record whose artifact cannot be loaded aborts the build.
pub fn aggregate(records: &[OutcomeRecord], artifacts: &dyn ArtifactStore) -> Result<Hierarchy> {
    let mut hierarchy = Hierarchy::new();
    for record in records {
        let key = record.key();
        let raw = artifacts.get(&key, record.artifact_kind())?;
        let entry = ResultEntry::from_artifact(record, raw);
        METRICS.inc_records_scored();
        if hierarchy.insert(key, entry).is_some() {
            debug!(
                model = %record.model,
                term = %record.term,
                prompt = %record.prompt,
                "record replaced an earlier entry"
            );
        }
    }
    Ok(hierarchy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(error: bool) -> OutcomeRecord {
        OutcomeRecord {
            model: "m1".to_string(),
            term: "0".to_string(),
            prompt: "a".to_string(),
            duration: Some(0.25),
            error,
        }
    }

    #[test]
    fn error_record_scores_zero_and_keeps_text() {
        let entry = ResultEntry::from_artifact(&record(true), "TransportError: refused".into());
        assert!(entry.error);
        assert_eq!(entry.score, Score::UNPARSED);
        assert_eq!(entry.raw, "TransportError: refused");
        assert!(entry.parsed.is_none());
    }

    #[test]
    fn error_record_is_not_parsed_even_if_json() {
        let entry = ResultEntry::from_artifact(&record(true), "{}".into());
        assert!(entry.parsed.is_none());
        assert_eq!(entry.score, Score::UNPARSED);
    }

    #[test]
    fn unparseable_content_scores_zero() {
        let entry = ResultEntry::from_artifact(&record(false), "not json".into());
        assert!(!entry.error);
        assert!(entry.parsed.is_none());
        assert_eq!(entry.score, Score::UNPARSED);
        assert_eq!(entry.raw, "not json");
    }

    #[test]
    fn parsed_content_is_scored() {
        let entry = ResultEntry::from_artifact(&record(false), r#"{"d":[],"hc":[],"ct":[]}"#.into());
        assert_eq!(entry.score, Score::ARRAYS);
        assert!(entry.parsed.is_some());
        assert_eq!(entry.duration, Some(0.25));
    }

    #[test]
    fn hierarchy_insert_and_lookup() {
        let mut h = Hierarchy::new();
        let entry = ResultEntry::from_artifact(&record(false), "{}".into());
        assert!(h.insert(ArtifactKey::new("m1", "0", "a"), entry.clone()).is_none());
        assert!(h.insert(ArtifactKey::new("m1", "0", "a"), entry).is_some());
        assert_eq!(h.len(), 1);
        assert!(h.has_term("0"));
        assert!(h.has_model("0", "m1"));
        assert!(!h.has_model("0", "m2"));
        assert!(h.get("0", "m1", "a").is_some());
        assert!(h.get("0", "m1", "b").is_none());
    }
}
