//! Request body construction.
//!
//! [`TemplateEncoder`] splices model name, term label and context chain into
//! the prompt template verbatim. Values are NOT escaped: a label containing
//! `"` or `\` produces an invalid body, and the backend's rejection is
//! recorded like any other failure.

use crate::config::defaults::{WARMUP_PREFIX, WARMUP_SUFFIX};
use crate::config::{PromptTemplate, Term, CONTEXT_SEPARATOR};

/// Builds the wire body for chat-completion requests.
pub trait RequestEncoder: Send + Sync {
    /// Body for evaluating `term` with `template` on `model`.
    fn encode(&self, template: &PromptTemplate, model: &str, term: &Term) -> String;

    /// Body for the per-model warm-up greeting.
    fn encode_warmup(&self, model: &str) -> String;
}

/// Literal string substitution into the four template parts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateEncoder;

impl RequestEncoder for TemplateEncoder {
    fn encode(&self, template: &PromptTemplate, model: &str, term: &Term) -> String {
        let contexts = term.context_chain(CONTEXT_SEPARATOR);
        let mut body = String::with_capacity(
            template.prefix.len()
                + model.len()
                + template.after_model.len()
                + term.label.len()
                + template.after_term.len()
                + contexts.len()
                + template.closing.len(),
        );
        body.push_str(&template.prefix);
        body.push_str(model);
        body.push_str(&template.after_model);
        body.push_str(&term.label);
        body.push_str(&template.after_term);
        body.push_str(&contexts);
        body.push_str(&template.closing);
        body
    }

    fn encode_warmup(&self, model: &str) -> String {
        format!("{}{}{}", WARMUP_PREFIX, model, WARMUP_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvalConfig;
    use serde_json::Value;

    #[test]
    fn literal_substitution_order() {
        let template = PromptTemplate::new("<", "|", "|", ">");
        let term = Term::new("0", "organ", &["human", "body"]);
        let body = TemplateEncoder.encode(&template, "m:1b", &term);
        assert_eq!(body, r#"<m:1b|organ|human\" > \"body>"#);
    }

    #[test]
    fn default_prompts_produce_valid_chat_bodies() {
        let config = EvalConfig::default();
        for prompt in &config.prompts {
            for term in &config.terms {
                let body = TemplateEncoder.encode(&prompt.template, "qwen2.5:7b", term);
                let v: Value = serde_json::from_str(&body).expect("body is JSON");
                assert_eq!(v["model"], "qwen2.5:7b");
                assert_eq!(v["temperature"], 0.0);
                assert_eq!(v["response_format"]["type"], "json_object");
                assert_eq!(v["messages"][0]["role"], "system");
                let user = v["messages"][1]["content"].as_str().expect("user content");
                assert!(user.starts_with(&format!("Term: \"{}\"\nContext: \"", term.label)));
                assert!(user.contains("\" > \""));
            }
        }
    }

    #[test]
    fn user_message_carries_context_chain() {
        let config = EvalConfig::default();
        let term = config.term("2").expect("default term 2");
        let body = TemplateEncoder.encode(&config.prompts[0].template, "m", term);
        let v: Value = serde_json::from_str(&body).expect("body is JSON");
        assert_eq!(
            v["messages"][1]["content"],
            "Term: \"organ\"\nContext: \"human\" > \"body\""
        );
    }

    #[test]
    fn warmup_body_is_json() {
        let body = TemplateEncoder.encode_warmup("aya:8b");
        let v: Value = serde_json::from_str(&body).expect("warm-up is JSON");
        assert_eq!(v["model"], "aya:8b");
        assert_eq!(v["messages"][1]["content"], "Hi!");
    }

    #[test]
    fn quote_in_label_is_not_escaped() {
        let config = EvalConfig::default();
        let term = Term::new("x", "say \"hi\"", &["c"]);
        let body = TemplateEncoder.encode(&config.prompts[0].template, "m", &term);
        assert!(serde_json::from_str::<Value>(&body).is_err());
    }
}
