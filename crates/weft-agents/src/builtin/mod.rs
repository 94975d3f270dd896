use std::sync::Arc;

use weft_core::error::{Result, WeftError};
use weft_core::traits::DeterministicAgent;

pub mod data;
pub mod network;
pub mod text;

/// All built-in agents, in catalog id order.
pub fn all() -> Vec<Arc<dyn DeterministicAgent>> {
    vec![
        Arc::new(data::CsvToJsonAgent),
        Arc::new(data::JsonToCsvAgent),
        Arc::new(data::JsonQueryAgent),
        Arc::new(text::TextTemplateAgent),
        Arc::new(text::WordCountAgent),
        Arc::new(network::HttpFetchAgent::new()),
    ]
}

/// Pull the upstream output as text; agents that transform text fail
/// structurally when fed nothing or a non-string value.
pub(crate) fn require_text_input(
    agent: &str,
    input: Option<serde_json::Value>,
) -> Result<String> {
    match input {
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(other) => Err(WeftError::AgentExecution {
            agent: agent.to_string(),
            message: format!("expected textual input, got {}", value_kind(&other)),
        }),
        None => Err(WeftError::AgentExecution {
            agent: agent.to_string(),
            message: "no upstream input".to_string(),
        }),
    }
}

fn value_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
