use std::collections::HashMap;
use std::sync::Arc;

use weft_core::error::{Result, WeftError};
use weft_core::settings::SettingsMap;
use weft_core::traits::DeterministicAgent;

/// Derive the canonical registry identifier from an agent's display name:
/// lowercase, drop anything that is neither alphanumeric nor whitespace,
/// collapse whitespace runs to a single separator.
///
/// "Excel to CSV" → "excel-to-csv".
pub fn registry_slug(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Registry of deterministic agents, keyed by slug.
///
/// Built once at startup and shared read-only across runs.
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn DeterministicAgent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Register an agent under the slug derived from its name.
    pub fn register(&mut self, agent: impl DeterministicAgent) {
        self.register_arc(Arc::new(agent));
    }

    pub fn register_arc(&mut self, agent: Arc<dyn DeterministicAgent>) {
        self.agents.insert(registry_slug(agent.name()), agent);
    }

    pub fn has(&self, identifier: &str) -> bool {
        self.agents.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<Arc<dyn DeterministicAgent>> {
        self.agents.get(identifier).cloned()
    }

    /// List all registered identifiers.
    pub fn list(&self) -> Vec<&str> {
        self.agents.keys().map(|s| s.as_str()).collect()
    }

    /// Execute an agent by identifier.
    ///
    /// A missing registration is a structured `AgentNotFound`, never a
    /// panic, so the runner's failure-reporting policy stays uniform.
    pub async fn execute(
        &self,
        identifier: &str,
        input: Option<serde_json::Value>,
        settings: SettingsMap,
    ) -> Result<serde_json::Value> {
        let agent = self
            .get(identifier)
            .ok_or_else(|| WeftError::AgentNotFound(identifier.to_string()))?;

        let timeout = std::time::Duration::from_secs(agent.timeout_secs());

        match tokio::time::timeout(timeout, agent.execute(input, settings)).await {
            Ok(result) => result,
            Err(_) => Err(WeftError::AgentTimeout {
                agent: identifier.to_string(),
                timeout_secs: agent.timeout_secs(),
            }),
        }
    }

    /// Create a registry with all built-in agents registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for agent in crate::builtin::all() {
            registry.register_arc(agent);
        }
        registry
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
