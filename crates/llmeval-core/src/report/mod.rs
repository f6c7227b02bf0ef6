//! HTML comparison report.
//!
//! The report nests collapsible tabs term → model → prompt. Tabs follow
//! configuration order and skip anything without data; the first tab with
//! data at each level is opened by default. Two variants are produced in one
//! walk: the full report embeds every raw artifact as a base64 download link,
//! the other omits those links.

pub mod summary;

use base64::Engine;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::Value;

use crate::aggregate::{aggregate, Hierarchy, ResultEntry};
use crate::artifact::FsArtifactStore;
use crate::config::{EvalConfig, PromptVariant, Term};
use crate::driver::{RequestEncoder, TemplateEncoder};
use crate::error::Result;
use crate::layout::{ReportVariant, RunLayout};
use crate::metrics::METRICS;
use crate::obs;
use crate::record::read_records;
use crate::scoring::Score;

use summary::describe_content;

const STYLE: &str = include_str!("style.css");
const TITLE: &str = "Comparison of LLMs returning JSON structure";
const MODEL_LIBRARY_URL: &str = "https://ollama.com/library/";

const SCORE_INFO: &str = concat!(
    r#"<details class="di" name="tg1"><summary class="dt">Score info</summary><div class="dc"><p>Scoring requirements:</p><ul>"#,
    "<li>Content returned by LLM is JSON object and contains keys d (definition), hc (higher contexts), ct (context terms).</li>",
    "<li>Key d value type is array with 8 elements. Each element is array of 5 non-empty strings.</li>",
    "<li>Key hc value type is array of 10 non-empty strings.</li>",
    "<li>Key ct value type is array of 30 non-empty strings.</li>",
    "</ul><p>Score values:</p><ul>",
    r#"<li><span class="pmr s6">(6)</span> - JSON object conforms to requirements</li>"#,
    r#"<li><span class="pmr s5">(5)</span> - two of d, hc, ct conform to requirements</li>"#,
    r#"<li><span class="pmr s4">(4)</span> - one of d, hc, ct conforms to requirements</li>"#,
    r#"<li><span class="pmr s3">(3)</span> - objects d, hc, ct are arrays</li>"#,
    r#"<li><span class="pmr s2">(2)</span> - JSON structure contains objects d, hc, ct</li>"#,
    r#"<li><span class="pmr s1">(1)</span> - returned content is valid JSON</li>"#,
    r#"<li><span class="pmr s0">(0)</span> - returned content is not valid JSON</li>"#,
    "</ul></div></details>",
);

/// Both rendered documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReports {
    full: String,
    no_original_content: String,
}

impl RenderedReports {
    pub fn get(&self, variant: ReportVariant) -> &str {
        match variant {
            ReportVariant::Full => &self.full,
            ReportVariant::NoOriginalContent => &self.no_original_content,
        }
    }

    /// Write both documents to their layout paths.
    pub fn write(&self, layout: &RunLayout) -> Result<()> {
        for variant in [ReportVariant::Full, ReportVariant::NoOriginalContent] {
            let path = layout.report_path(variant);
            let html = self.get(variant);
            std::fs::write(&path, html)?;
            obs::emit_report_written(&path, html.len());
        }
        Ok(())
    }
}

/// Replay the run under `layout`, score every artifact and write both
/// report files. Returns the hierarchy the reports were rendered from.
pub fn build_reports(config: &EvalConfig, layout: &RunLayout) -> Result<Hierarchy> {
    let records = read_records(layout.log_path())?;
    let store = FsArtifactStore::new(layout.clone());
    let hierarchy = aggregate(&records, &store)?;
    render_reports(config, &hierarchy).write(layout)?;
    METRICS.flush();
    Ok(hierarchy)
}

/// Writer feeding both variants; only the download links diverge.
struct DualHtml {
    full: String,
    lite: String,
}

impl DualHtml {
    fn new() -> Self {
        Self {
            full: String::new(),
            lite: String::new(),
        }
    }

    fn push(&mut self, s: &str) {
        self.full.push_str(s);
        self.lite.push_str(s);
    }

    fn push_full_only(&mut self, s: &str) {
        self.full.push_str(s);
    }
}

/// Render both report variants for `hierarchy`.
pub fn render_reports(config: &EvalConfig, hierarchy: &Hierarchy) -> RenderedReports {
    let mut html = DualHtml::new();
    html.push(&format!(
        r#"<!DOCTYPE html><html lang="en"><head><title>{}</title><meta charset="UTF-8"><style>{}</style></head><body>"#,
        TITLE, STYLE
    ));
    html.push(&config.heading);
    if !config.description.is_empty() {
        html.push(&config.description);
    }
    html.push(r#"<div class="dts">"#);
    render_results(&mut html, config, hierarchy);
    html.push(&models_info(config));
    html.push(&prompts_info(config));
    html.push(SCORE_INFO);
    html.push("</div></body></html>");

    RenderedReports {
        full: html.full,
        no_original_content: html.lite,
    }
}

fn open_attr(open: bool) -> &'static str {
    if open {
        " open"
    } else {
        ""
    }
}

/// The "Results (N ...)" count is the number of terms rendered, i.e. terms
/// with at least one record, not the number of configured terms.
fn render_results(html: &mut DualHtml, config: &EvalConfig, hierarchy: &Hierarchy) {
    let terms: Vec<&Term> = config
        .terms
        .iter()
        .filter(|t| hierarchy.has_term(&t.key))
        .collect();

    html.push(&format!(
        r#"<details class="di" name="tg1" open><summary class="dt">Results ({} different terms in specific context)</summary><div class="dc"><div class="dts">"#,
        terms.len()
    ));

    // Tab group names; tabs sharing a name behave as one accordion.
    let mut model_group = 0usize;
    let mut prompt_group = 0usize;

    for (term_index, term) in terms.iter().enumerate() {
        model_group += 1;
        html.push(&format!(
            r#"<details class="di" name="tg2"{}><summary class="dt"><span class="l">Term:</span> "{}"<br><span class="l">Context:</span> "{}"</summary><div class="dc"><div class="dts">"#,
            open_attr(term_index == 0),
            encode_text(&term.label),
            encode_text(&term.context_chain("\" > \"")),
        ));

        let models = config
            .models
            .iter()
            .filter(|m| hierarchy.has_model(&term.key, m));
        for (model_index, model) in models.enumerate() {
            prompt_group += 1;
            let prompts: Vec<(&PromptVariant, &ResultEntry)> = config
                .prompts
                .iter()
                .filter_map(|p| hierarchy.get(&term.key, model, &p.key).map(|e| (p, e)))
                .collect();

            html.push(&format!(
                r#"<details class="di" name="tgm{}"{}><summary class="dt">{} "#,
                model_group,
                open_attr(model_index == 0),
                encode_text(model),
            ));
            for (prompt, entry) in &prompts {
                html.push(&score_badge(&prompt.key, entry.score));
            }
            html.push(r#"</summary><div class="dc"><div class="dts">"#);

            for (prompt_index, (prompt, entry)) in prompts.iter().enumerate() {
                html.push(&format!(
                    r#"<details class="di" name="tgp{}"{}><summary class="dt"><span class="l">Model:</span> {} <span class="l">Prompt:</span> {} <span class="l">Duration:</span> {}</summary><div class="dc">"#,
                    prompt_group,
                    open_attr(prompt_index == 0),
                    encode_text(model),
                    encode_text(&prompt.key),
                    format_duration(entry.duration),
                ));
                html.push_full_only(&download_link(term, model, &prompt.key, &entry.raw));
                html.push(&content_details(entry));
                html.push("</div></details>");
            }
            html.push("</div></div></details>");
        }
        html.push("</div></div></details>");
    }
    html.push("</div></div></details>");
}

/// Compact coloured badge, e.g. `a(6)`.
pub fn score_badge(prompt: &str, score: Score) -> String {
    format!(
        r#"<span class="pmr s{score}">&nbsp;{}({score})&nbsp;</span>"#,
        encode_text(prompt)
    )
}

/// Seconds with at least one decimal (`1.234s`, `2.0s`), or `n/a`.
pub fn format_duration(duration: Option<f64>) -> String {
    match duration {
        Some(d) if d.fract() == 0.0 => format!("{:.1}s", d),
        Some(d) => format!("{}s", d),
        None => "n/a".to_string(),
    }
}

/// File name offered for the raw artifact download.
pub fn download_file_name(term: &Term, model: &str, prompt: &str) -> String {
    let name = format!(
        "term({})-context({})-model({})-prompt({}).txt",
        term.label,
        term.contexts.join("#"),
        model.replace(':', "-"),
        prompt
    );
    name.chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '_',
            other => other,
        })
        .collect()
}

fn download_link(term: &Term, model: &str, prompt: &str, raw: &str) -> String {
    let data = base64::engine::general_purpose::STANDARD.encode(raw.as_bytes());
    format!(
        r#"<a href="data:text/plain;charset=UTF-8;base64,{}" download="{}">Original content</a>"#,
        data,
        encode_double_quoted_attribute(&download_file_name(term, model, prompt))
    )
}

fn content_details(entry: &ResultEntry) -> String {
    match &entry.parsed {
        Some(value) => format!(
            " {}<pre>{}</pre>",
            encode_text(&describe_content(value)),
            encode_text(&pretty_json(value, &entry.raw))
        ),
        None if entry.error => format!(
            r#"<p class="err">*** ERROR: Request failed. ***</p><pre>{}</pre>"#,
            encode_text(&entry.raw)
        ),
        None => format!(
            r#"<p class="err">*** ERROR: Not valid JSON structure. ***</p><pre>{}</pre>"#,
            encode_text(&entry.raw)
        ),
    }
}

fn pretty_json(value: &Value, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
}

fn models_info(config: &EvalConfig) -> String {
    let items: String = config
        .models
        .iter()
        .map(|model| {
            format!(
                r#"<li><a href="{}{}" target="_blank">{}</a></li>"#,
                MODEL_LIBRARY_URL,
                encode_double_quoted_attribute(model),
                encode_text(model)
            )
        })
        .collect();
    format!(
        r#"<details class="di" name="tg1"><summary class="dt">Models info ({} models)</summary><div class="dc"><ul>{}</ul></div></details>"#,
        config.models.len(),
        items
    )
}

/// Each template rendered with placeholder values, as the backend sees it.
fn prompts_info(config: &EvalConfig) -> String {
    let sample = Term::new("", "pqr", &["abc", "def", "ghi"]);
    let items: String = config
        .prompts
        .iter()
        .map(|prompt| {
            let body = TemplateEncoder.encode(&prompt.template, "xyz", &sample);
            format!(
                "<li>{}:<pre>{}</pre></li>",
                encode_text(&prompt.key),
                encode_text(&body)
            )
        })
        .collect();
    format!(
        r#"<details class="di" name="tg1"><summary class="dt">Prompts info ({} prompt variations)</summary><div class="dc"><ul>{}</ul></div></details>"#,
        config.prompts.len(),
        items
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ArtifactKey;
    use crate::record::OutcomeRecord;

    fn config() -> EvalConfig {
        EvalConfig {
            heading: "<h1>Heading</h1>".to_string(),
            description: String::new(),
            prompts: vec![
                PromptVariant {
                    key: "a".to_string(),
                    template: crate::config::PromptTemplate::new("[", "|", "|", "]"),
                },
                PromptVariant {
                    key: "b".to_string(),
                    template: crate::config::PromptTemplate::new("(", "|", "|", ")"),
                },
            ],
            models: vec!["m1".to_string(), "m2:7b".to_string()],
            terms: vec![
                Term::new("0", "conflict", &["world", "countries"]),
                Term::new("1", "organ", &["human", "body"]),
            ],
        }
    }

    fn insert(h: &mut Hierarchy, model: &str, term: &str, prompt: &str, raw: &str) {
        let record = OutcomeRecord {
            model: model.to_string(),
            term: term.to_string(),
            prompt: prompt.to_string(),
            duration: Some(1.5),
            error: false,
        };
        h.insert(
            ArtifactKey::new(model, term, prompt),
            ResultEntry::from_artifact(&record, raw.to_string()),
        );
    }

    #[test]
    fn badge_markup() {
        assert_eq!(
            score_badge("a", Score::MAX),
            r#"<span class="pmr s6">&nbsp;a(6)&nbsp;</span>"#
        );
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(Some(1.234)), "1.234s");
        assert_eq!(format_duration(Some(2.0)), "2.0s");
        assert_eq!(format_duration(None), "n/a");
    }

    #[test]
    fn download_name_is_sanitized() {
        let term = Term::new("0", "conflict", &["world", "political regimes"]);
        assert_eq!(
            download_file_name(&term, "qwen2.5:7b", "a"),
            "term(conflict)-context(world#political_regimes)-model(qwen2.5-7b)-prompt(a).txt"
        );
    }

    #[test]
    fn variants_differ_only_by_download_links() {
        let mut h = Hierarchy::new();
        insert(&mut h, "m1", "0", "a", "{}");
        let reports = render_reports(&config(), &h);
        let full = reports.get(ReportVariant::Full);
        let lite = reports.get(ReportVariant::NoOriginalContent);

        assert!(full.contains("Original content"));
        assert!(full.contains("data:text/plain;charset=UTF-8;base64,e30="));
        assert!(!lite.contains("Original content"));
        assert!(!lite.contains("base64,"));

        let link_start = full.find("<a href=\"data:").unwrap();
        let link_end = full[link_start..].find("</a>").unwrap() + link_start + 4;
        let stripped = format!("{}{}", &full[..link_start], &full[link_end..]);
        assert_eq!(stripped, lite);
    }

    #[test]
    fn first_open_tab_follows_configuration_order() {
        let mut h = Hierarchy::new();
        insert(&mut h, "m2:7b", "1", "b", "{}");
        insert(&mut h, "m1", "1", "b", "{}");
        insert(&mut h, "m1", "0", "a", "{}");

        let mut cfg = config();
        cfg.terms.reverse();
        let reports = render_reports(&cfg, &h);
        let html = reports.get(ReportVariant::NoOriginalContent);

        let organ = html.find("\"organ\"").unwrap();
        let conflict = html.find("\"conflict\"").unwrap();
        assert!(organ < conflict);
        assert!(html.contains(r#"<details class="di" name="tg2" open><summary class="dt"><span class="l">Term:</span> "organ""#));
        assert!(html.contains(r#"<details class="di" name="tgm1" open><summary class="dt">m1 "#));
        assert!(html.contains(r#"<details class="di" name="tgm1"><summary class="dt">m2:7b "#));
    }

    #[test]
    fn results_count_covers_terms_with_data_not_configured_terms() {
        let mut h = Hierarchy::new();
        insert(&mut h, "m1", "1", "a", "{}");
        let mut cfg = config();
        cfg.terms.push(Term::new("2", "spare", &["x"]));
        assert_eq!(cfg.terms.len(), 3);
        let reports = render_reports(&cfg, &h);
        let html = reports.get(ReportVariant::Full);
        assert!(html.contains("Results (1 different terms in specific context)"));
        assert!(!html.contains("Results (3 different terms"));
    }

    #[test]
    fn missing_combinations_render_no_placeholders() {
        let mut h = Hierarchy::new();
        insert(&mut h, "m1", "0", "b", "{}");
        let reports = render_reports(&config(), &h);
        let html = reports.get(ReportVariant::Full);

        assert!(html.contains("Results (1 different terms in specific context)"));
        assert!(!html.contains("\"organ\""));
        assert!(!html.contains("<summary class=\"dt\">m2:7b"));
        assert!(html.contains(r#"<span class="pmr s1">&nbsp;b(1)&nbsp;</span>"#));
        assert!(!html.contains("&nbsp;a("));
        assert!(html.contains(r#"<details class="di" name="tgp1" open><summary class="dt"><span class="l">Model:</span> m1 <span class="l">Prompt:</span> b"#));
    }

    #[test]
    fn unparseable_content_is_escaped_in_diagnostic() {
        let mut h = Hierarchy::new();
        insert(&mut h, "m1", "0", "a", "<script>alert(1)</script>");
        let reports = render_reports(&config(), &h);
        let html = reports.get(ReportVariant::NoOriginalContent);
        assert!(html.contains("*** ERROR: Not valid JSON structure. ***"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn failed_request_shows_error_text() {
        let mut h = Hierarchy::new();
        let record = OutcomeRecord {
            model: "m1".to_string(),
            term: "0".to_string(),
            prompt: "a".to_string(),
            duration: None,
            error: true,
        };
        h.insert(
            record.key(),
            ResultEntry::from_artifact(&record, "TransportError: refused".to_string()),
        );
        let reports = render_reports(&config(), &h);
        let html = reports.get(ReportVariant::Full);
        assert!(html.contains("*** ERROR: Request failed. ***"));
        assert!(html.contains("TransportError: refused"));
        assert!(html.contains("<span class=\"l\">Duration:</span> n/a"));
        assert!(html.contains(r#"<span class="pmr s0">&nbsp;a(0)&nbsp;</span>"#));
    }

    #[test]
    fn preamble_and_info_sections() {
        let mut cfg = config();
        cfg.description = "<p>About this run</p>".to_string();
        let reports = render_reports(&cfg, &Hierarchy::new());
        let html = reports.get(ReportVariant::Full);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</div></body></html>"));
        assert!(html.contains("<h1>Heading</h1><p>About this run</p>"));
        assert!(html.contains("Results (0 different terms in specific context)"));
        assert!(html.contains("Models info (2 models)"));
        assert!(html.contains(r#"<a href="https://ollama.com/library/m2:7b" target="_blank">m2:7b</a>"#));
        assert!(html.contains("Prompts info (2 prompt variations)"));
        assert!(html.contains(r#"<li>a:<pre>[xyz|pqr|abc\" &gt; \"def\" &gt; \"ghi]</pre></li>"#));
        assert!(html.contains("Score info"));
    }

    #[test]
    fn parsed_content_shows_summary_and_pretty_json() {
        let mut h = Hierarchy::new();
        insert(&mut h, "m1", "0", "a", r#"{"hc":["x"],"d":[]}"#);
        let reports = render_reports(&config(), &h);
        let html = reports.get(ReportVariant::NoOriginalContent);
        assert!(html.contains("Content info: JSON object contains key d=array(0)[], key hc=array(1)"));
        assert!(html.contains("<pre>{\n  \"hc\": [\n    \"x\"\n  ],"));
        assert!(html.contains("<span class=\"l\">Duration:</span> 1.5s"));
    }
}
