use std::sync::Arc;

use weft_agents::AgentCatalog;
use weft_core::config::GatewayConfig;
use weft_engine::WorkflowRunner;

/// Shared application state for axum handlers.
pub struct AppState {
    pub config: GatewayConfig,
    pub runner: Arc<WorkflowRunner>,
    pub catalog: Arc<AgentCatalog>,
}
