use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use weft_core::config::ProviderConfig;
use weft_core::error::{Result, WeftError};
use weft_core::traits::TextProvider;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible completions client. Works with OpenAI, Ollama, vLLM,
/// Groq, OpenRouter, etc. Non-streaming: the engine's contract is one
/// prompt in, one response text out.
pub struct HttpTextProvider {
    http: Client,
    config: ProviderConfig,
}

impl HttpTextProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }
}

// Request types
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<OaiMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct OaiMessage {
    role: String,
    content: String,
}

// Response types
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Map a reqwest transport error to the discriminated provider failure.
fn classify_transport(e: reqwest::Error, timeout_secs: u64) -> WeftError {
    if e.is_timeout() {
        WeftError::ProviderTimeout(timeout_secs)
    } else if e.is_connect() {
        WeftError::ProviderConnection(e.to_string())
    } else {
        WeftError::ProviderRequest(e.to_string())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

impl TextProvider for HttpTextProvider {
    fn generate(&self, prompt: String) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let url = self.config.base_url.as_deref().unwrap_or(OPENAI_API_URL);

            let request = ChatRequest {
                model: self.config.model.clone(),
                messages: vec![OaiMessage {
                    role: "user".to_string(),
                    content: prompt,
                }],
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            };

            let mut req = self
                .http
                .post(url)
                .timeout(Duration::from_secs(self.config.timeout_secs))
                .json(&request);
            if let Some(ref key) = self.config.api_key {
                req = req.bearer_auth(key);
            }

            debug!(model = %self.config.model, url, "Sending provider request");

            let response = req
                .send()
                .await
                .map_err(|e| classify_transport(e, self.config.timeout_secs))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(WeftError::ProviderRequest(format!(
                    "{}: {}",
                    status,
                    truncate(&body, 300)
                )));
            }

            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| WeftError::ProviderParse(e.to_string()))?;

            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| WeftError::ProviderParse("response contained no choices".into()))
        })
    }
}
