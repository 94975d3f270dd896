use futures::future::BoxFuture;

use weft_core::error::Result;
use weft_core::settings::SettingsMap;
use weft_core::traits::DeterministicAgent;
use weft_core::types::SettingField;

use super::require_text_input;

// ── TextTemplateAgent ───────────────────────────────────────────

/// Substitute the upstream output into a fixed template. `{{input}}` marks
/// the insertion point.
pub struct TextTemplateAgent;

impl DeterministicAgent for TextTemplateAgent {
    fn name(&self) -> &str {
        "Text Template"
    }
    fn description(&self) -> &str {
        "Insert the previous step's output into a template at {{input}}."
    }
    fn settings_schema(&self) -> Vec<SettingField> {
        vec![SettingField::new("template", "Template", "string", true)]
    }
    fn execute(
        &self,
        input: Option<serde_json::Value>,
        settings: SettingsMap,
    ) -> BoxFuture<'_, Result<serde_json::Value>> {
        Box::pin(async move {
            let template = settings.require_str("template")?.to_string();
            let text = match input {
                Some(serde_json::Value::String(s)) => s,
                Some(other) => serde_json::to_string_pretty(&other)?,
                None => String::new(),
            };
            Ok(serde_json::Value::String(
                template.replace("{{input}}", &text),
            ))
        })
    }
}

// ── WordCountAgent ──────────────────────────────────────────────

/// Count words, characters, and lines of the upstream text.
pub struct WordCountAgent;

impl DeterministicAgent for WordCountAgent {
    fn name(&self) -> &str {
        "Word Count"
    }
    fn description(&self) -> &str {
        "Count words, characters, and lines of the input text."
    }
    fn execute(
        &self,
        input: Option<serde_json::Value>,
        _settings: SettingsMap,
    ) -> BoxFuture<'_, Result<serde_json::Value>> {
        Box::pin(async move {
            let text = require_text_input("word-count", input)?;
            Ok(serde_json::json!({
                "words": text.split_whitespace().count(),
                "characters": text.chars().count(),
                "lines": text.lines().count(),
            }))
        })
    }
}
