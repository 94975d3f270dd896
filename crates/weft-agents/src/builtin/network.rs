use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use tracing::debug;

use weft_core::error::{Result, WeftError};
use weft_core::settings::SettingsMap;
use weft_core::traits::DeterministicAgent;
use weft_core::types::SettingField;

const FETCH_TIMEOUT_SECS: u64 = 25;

// ── HttpFetchAgent ──────────────────────────────────────────────

/// Fetch a URL and hand the body text downstream. POST requests forward
/// the upstream output as the request body.
pub struct HttpFetchAgent {
    http: Client,
}

impl HttpFetchAgent {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for HttpFetchAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl DeterministicAgent for HttpFetchAgent {
    fn name(&self) -> &str {
        "HTTP Fetch"
    }
    fn description(&self) -> &str {
        "Fetch a URL (GET or POST) and return the response body as text."
    }
    fn settings_schema(&self) -> Vec<SettingField> {
        vec![
            SettingField::new("url", "URL", "string", true),
            SettingField::new("method", "Method", "string", false)
                .with_default(serde_json::json!("GET")),
        ]
    }
    fn execute(
        &self,
        input: Option<serde_json::Value>,
        settings: SettingsMap,
    ) -> BoxFuture<'_, Result<serde_json::Value>> {
        Box::pin(async move {
            let url = settings.require_str("url")?.to_string();
            let method = settings.get_str("method").unwrap_or("GET").to_uppercase();

            debug!(url = %url, method = %method, "Fetching");

            let request = match method.as_str() {
                "GET" => self.http.get(&url),
                "POST" => {
                    let body = match input {
                        Some(serde_json::Value::String(s)) => s,
                        Some(other) => other.to_string(),
                        None => String::new(),
                    };
                    self.http.post(&url).body(body)
                }
                other => {
                    return Err(WeftError::InvalidSettings(format!(
                        "unsupported method '{}'",
                        other
                    )))
                }
            };

            let response = request
                .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
                .send()
                .await
                .map_err(|e| WeftError::AgentExecution {
                    agent: "http-fetch".to_string(),
                    message: e.to_string(),
                })?;

            let status = response.status();
            let body = response.text().await.map_err(|e| WeftError::AgentExecution {
                agent: "http-fetch".to_string(),
                message: e.to_string(),
            })?;

            if !status.is_success() {
                let snippet: String = body.chars().take(200).collect();
                return Err(WeftError::AgentExecution {
                    agent: "http-fetch".to_string(),
                    message: format!("{}: {}", status, snippet),
                });
            }

            Ok(serde_json::Value::String(body))
        })
    }
}
