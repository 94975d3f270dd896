pub mod provider;
pub mod retry;

use std::sync::Arc;

use weft_core::config::ProviderConfig;
use weft_core::traits::TextProvider;

pub use provider::HttpTextProvider;
pub use retry::RetryingProvider;

/// Create the configured provider client wrapped with retry handling.
///
/// Every supported backend speaks the OpenAI-compatible completions shape,
/// so the provider name only picks defaults (base URL via config).
pub fn create_provider(config: &ProviderConfig) -> Arc<dyn TextProvider> {
    let inner = Box::new(HttpTextProvider::new(config.clone()));
    Arc::new(RetryingProvider::new(inner, config.retry.clone()))
}
