use std::sync::Arc;

use tracing::debug;

use weft_core::error::Result;
use weft_core::settings::SettingsMap;
use weft_core::traits::TextProvider;
use weft_core::types::ExecutionContext;

/// Fixed closing instruction appended to every assembled prompt.
const CLOSING_INSTRUCTION: &str =
    "Process the content above according to the instructions and return only this step's output.";

/// Builds the prompt for a generative step and submits it to the provider.
///
/// Failure classification happens in the provider client (connection vs.
/// timeout vs. anything else); the invoker just propagates the typed error
/// for the dispatcher to normalize.
pub struct GenerativeInvoker {
    provider: Arc<dyn TextProvider>,
}

impl GenerativeInvoker {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self { provider }
    }

    pub async fn invoke(
        &self,
        prompt: &str,
        settings: &SettingsMap,
        input: Option<&serde_json::Value>,
        context: Option<&ExecutionContext>,
    ) -> Result<String> {
        let assembled = build_prompt(prompt, settings, input, context);
        debug!(chars = assembled.len(), "Submitting generative step");
        self.provider.generate(assembled).await
    }
}

/// Assemble the prompt. Section order is fixed; sections with no data are
/// omitted; sections are separated by a blank line:
/// 1. the node's raw prompt text verbatim
/// 2. the previous step's output
/// 3. the node's 1-based position in the pipeline
/// 4. the node's configuration
/// 5. the closing instruction
pub fn build_prompt(
    prompt: &str,
    settings: &SettingsMap,
    input: Option<&serde_json::Value>,
    context: Option<&ExecutionContext>,
) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !prompt.is_empty() {
        sections.push(prompt.to_string());
    }

    if let Some(input) = input {
        sections.push(format!("Previous step output:\n{}", render_value(input)));
    }

    if let Some(ctx) = context {
        sections.push(format!(
            "Step {} of {} in the workflow.",
            ctx.current_index + 1,
            ctx.total_nodes
        ));
    }

    if !settings.is_empty() {
        let dump = settings
            .iter()
            .map(|(key, s)| format!("{}: {}", key, render_value(&s.value)))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("Configuration:\n{}", dump));
    }

    sections.push(CLOSING_INSTRUCTION.to_string());
    sections.join("\n\n")
}

/// Text used as-is; anything structured becomes a readable dump.
pub(crate) fn render_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
