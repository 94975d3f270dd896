use futures::future::BoxFuture;

use crate::error::Result;
use crate::settings::SettingsMap;
use crate::types::SettingField;

/// Text-generation provider, the generative step's black box.
///
/// Connection and timeout failures must surface as the distinct
/// `ProviderConnection` / `ProviderTimeout` error variants so node results
/// can carry a discriminating code.
pub trait TextProvider: Send + Sync + 'static {
    /// Submit an assembled prompt and return the provider's text response.
    fn generate(&self, prompt: String) -> BoxFuture<'_, Result<String>>;
}

/// A deterministic, registry-resolved executable unit.
///
/// Agents perform a fixed transformation (format conversion, lookup,
/// bounded I/O) and never free-form generation. The registry keys each
/// agent by the slug derived from `name()`.
pub trait DeterministicAgent: Send + Sync + 'static {
    /// Display name; the registry identifier is derived from it.
    fn name(&self) -> &str;

    /// Human-readable description, surfaced by the catalog.
    fn description(&self) -> &str;

    /// Declared settings metadata for the authoring surface.
    fn settings_schema(&self) -> Vec<SettingField> {
        Vec::new()
    }

    /// Execute with the upstream output and decoded settings.
    fn execute(
        &self,
        input: Option<serde_json::Value>,
        settings: SettingsMap,
    ) -> BoxFuture<'_, Result<serde_json::Value>>;

    /// Timeout in seconds for this agent.
    fn timeout_secs(&self) -> u64 {
        30
    }
}
