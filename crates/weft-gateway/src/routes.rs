use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use weft_core::types::{ExecutionContext, NodeSpec, RunMetadata, RunReport, WorkflowGraph};

use crate::state::AppState;

// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// GET /api/agents: the catalog the authoring surface builds against
pub async fn list_agents(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let agents: Vec<&weft_agents::CatalogEntry> = state.catalog.entries().collect();
    Json(serde_json::json!({ "agents": agents }))
}

// POST /api/workflows/execute
pub async fn execute_workflow(
    State(state): State<Arc<AppState>>,
    Json(graph): Json<WorkflowGraph>,
) -> Json<RunReport> {
    let metadata = RunMetadata::new(graph.team_id.clone());
    info!(run_id = %metadata.run_id, nodes = graph.nodes.len(), "Workflow execution requested");

    let nodes = match state.catalog.resolve_all(graph.nodes) {
        Ok(nodes) => nodes,
        Err(e) => return Json(failure_report(e.to_string())),
    };

    match state.runner.run(&nodes, &graph.edges, &metadata).await {
        Ok(report) => Json(report),
        // Structural failure: nothing executed, same response shape.
        Err(e) => Json(failure_report(e.to_string())),
    }
}

fn failure_report(message: String) -> RunReport {
    RunReport {
        success: false,
        message,
        results: Vec::new(),
        execution_order: Vec::new(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteNodeRequest {
    pub node: NodeSpec,
    #[serde(default)]
    pub input: Option<serde_json::Value>,
    #[serde(default)]
    pub workflow_context: Option<ExecutionContext>,
}

// POST /api/nodes/execute: ad-hoc single-node execution
pub async fn execute_node(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExecuteNodeRequest>,
) -> Json<serde_json::Value> {
    let node = match state.catalog.resolve(body.node) {
        Ok(node) => node,
        Err(e) => {
            return Json(serde_json::json!({
                "success": false,
                "error": e.to_string(),
            }))
        }
    };

    info!(node_id = %node.id, "Single-node execution requested");

    let result = state
        .runner
        .run_node(&node, body.input.as_ref(), body.workflow_context.as_ref())
        .await;

    Json(serde_json::json!({
        "success": result.success,
        "nodeId": result.node_id,
        "nodeName": result.node_name,
        "result": result,
    }))
}
