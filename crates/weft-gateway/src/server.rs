use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

use weft_agents::AgentCatalog;
use weft_core::config::GatewayConfig;
use weft_engine::WorkflowRunner;

use crate::routes;
use crate::state::AppState;

/// HTTP gateway server built on axum.
pub struct GatewayServer {
    config: GatewayConfig,
    runner: Arc<WorkflowRunner>,
    catalog: Arc<AgentCatalog>,
}

impl GatewayServer {
    pub fn new(
        config: GatewayConfig,
        runner: Arc<WorkflowRunner>,
        catalog: Arc<AgentCatalog>,
    ) -> Self {
        Self {
            config,
            runner,
            catalog,
        }
    }

    /// Run the gateway server until the cancellation token is triggered.
    pub async fn run(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let state = Arc::new(AppState {
            config: self.config.clone(),
            runner: self.runner.clone(),
            catalog: self.catalog.clone(),
        });

        let app = Router::new()
            .route("/api/health", get(routes::health))
            .route("/api/agents", get(routes::list_agents))
            .route("/api/workflows/execute", post(routes::execute_workflow))
            .route("/api/nodes/execute", post(routes::execute_node))
            .layer(CorsLayer::permissive())
            .with_state(state);

        let listener = TcpListener::bind(&self.config.bind).await?;
        info!(bind = %self.config.bind, "Gateway listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Gateway shut down");
        Ok(())
    }
}
