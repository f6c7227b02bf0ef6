//! Built-in run configuration used when no override document is supplied.

use super::{PromptTemplate, PromptVariant, Term};

/// Joins a term's context chain inside the user message. The quotes are
/// pre-escaped because the joined text lands inside a JSON string literal.
pub const CONTEXT_SEPARATOR: &str = r#"\" > \""#;

/// Describes the setup the reference run used; override it per deployment.
pub const DEFAULT_HEADING: &str = "<h1>Tests were run on Kubernetes with 2x NVIDIA Quadro RTX 8000 (48GB RAM) GPU cards using ollama:0.4.2 container in November 2024.</h1>";

/// Greeting sent once per model so the weights are resident before timing.
pub const WARMUP_PREFIX: &str = r#"{"model": ""#;
pub const WARMUP_SUFFIX: &str = r#"", "temperature": 0.0, "response_format": {"type": "json_object"}, "messages": [{"role": "system", "content": "Respond in json to the user."}, {"role": "user", "content": "Hi!"}]}"#;

const PROMPT_PREFIX: &str = r#"{"model": ""#;
const PROMPT_AFTER_TERM: &str = r#"\"\nContext: \""#;
const PROMPT_CLOSING: &str = r#"\""}]}"#;

const PROMPT_A_AFTER_MODEL: &str = r#"", "temperature": 0.0, "response_format": {"type": "json_object"}, "messages": [{"role": "system", "content": "Fill in json structure {\"d\":[[],[],[],[],[],[],[],[]],\"hc\":[],\"ct\":[]} that contains term definition (d) in its context as array of exactly 8 paragraphs. Each paragraph is array of exactly 5 elements. Each element contains exactly one sentence. Add array of exactly 10 typical higher level contexts (hc) of term. Add array of exactly 30 highly specific context terms (ct) of term."}, {"role": "user", "content": "Term: \""#;

const PROMPT_B_AFTER_MODEL: &str = r#"", "temperature": 0.0, "response_format": {"type": "json_object"}, "messages": [{"role": "system", "content": "Fill in json structure {\"d\":[[],[],[],[],[],[],[],[]],\"hc\":[],\"ct\":[]} that contains term definition (d) in its context as array of exactly 8 paragraphs. Each paragraph is array of 5 elements each containing exactly one sentence. Add array of exactly 10 typical higher level contexts (hc) of term. Add array of exactly 30 highly specific context terms (ct) of term."}, {"role": "user", "content": "Term: \""#;

const MODELS: &[&str] = &[
    "aya:8b",
    "aya:35b",
    "command-r:35b",
    "deepseek-v2:16b",
    "glm4:9b",
    "hermes3:8b",
    "hermes3:70b",
    "llama3.1:8b",
    "llama3.1:70b",
    "llama3.2:3b",
    "llama3.2-vision:11b",
    "llama3.2-vision:90b",
    "mistral-large:123b",
    "mistral-nemo:12b",
    "mistral-small:22b",
    "mixtral:8x7b",
    "mixtral:8x22b",
    "nemotron:70b",
    "phi3:14b",
    "qwen2.5:7b",
    "qwen2.5:14b",
    "qwen2.5:32b",
    "qwen2.5:72b",
    "solar:10.7b",
    "solar-pro:22b",
    "stablelm2:12b",
];

pub fn prompts() -> Vec<PromptVariant> {
    vec![
        PromptVariant {
            key: "a".to_string(),
            template: PromptTemplate::new(
                PROMPT_PREFIX,
                PROMPT_A_AFTER_MODEL,
                PROMPT_AFTER_TERM,
                PROMPT_CLOSING,
            ),
        },
        PromptVariant {
            key: "b".to_string(),
            template: PromptTemplate::new(
                PROMPT_PREFIX,
                PROMPT_B_AFTER_MODEL,
                PROMPT_AFTER_TERM,
                PROMPT_CLOSING,
            ),
        },
    ]
}

pub fn models() -> Vec<String> {
    MODELS.iter().map(|m| m.to_string()).collect()
}

pub fn terms() -> Vec<Term> {
    vec![
        Term::new("0", "conflict", &["world", "countries", "political regimes"]),
        Term::new("1", "conflict", &["business", "companies", "competition"]),
        Term::new("2", "organ", &["human", "body"]),
        Term::new("3", "organ", &["world", "countries", "cities", "governance"]),
    ]
}
