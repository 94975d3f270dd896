use std::sync::Arc;

use tracing::warn;

use weft_agents::AgentRegistry;
use weft_core::error::WeftError;
use weft_core::traits::TextProvider;
use weft_core::types::{ExecutionContext, ExecutionType, NodeDefinition, NodeError, NodeKind};

use crate::invoker::GenerativeInvoker;

/// Outcome of dispatching one node, without its id/name; the caller tags
/// those when recording the result.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub success: bool,
    pub error: Option<NodeError>,
    pub output: Option<serde_json::Value>,
    pub execution_type: ExecutionType,
}

impl DispatchOutcome {
    fn completed(output: serde_json::Value, execution_type: ExecutionType) -> Self {
        Self {
            success: true,
            error: None,
            output: Some(output),
            execution_type,
        }
    }

    fn failed(error: &WeftError, execution_type: ExecutionType) -> Self {
        Self {
            success: false,
            error: Some(NodeError::from(error)),
            output: None,
            execution_type,
        }
    }
}

/// Routes a node to its execution strategy and normalizes both strategies
/// into one result shape.
///
/// A node's mode is a hard choice: a deterministic node whose identifier
/// cannot be resolved fails with NOT_FOUND instead of falling through to
/// the generative path, because deterministic agents must never free-form
/// generate.
pub struct NodeDispatcher {
    registry: Arc<AgentRegistry>,
    invoker: GenerativeInvoker,
}

impl NodeDispatcher {
    pub fn new(registry: Arc<AgentRegistry>, provider: Arc<dyn TextProvider>) -> Self {
        Self {
            registry,
            invoker: GenerativeInvoker::new(provider),
        }
    }

    pub async fn dispatch(
        &self,
        node: &NodeDefinition,
        input: Option<&serde_json::Value>,
        context: Option<&ExecutionContext>,
    ) -> DispatchOutcome {
        match &node.kind {
            NodeKind::Generative { prompt } => {
                match self
                    .invoker
                    .invoke(prompt, &node.settings, input, context)
                    .await
                {
                    Ok(text) => DispatchOutcome::completed(
                        serde_json::Value::String(text),
                        ExecutionType::Generative,
                    ),
                    Err(e) => {
                        warn!(node_id = %node.id, error = %e, "Generative step failed");
                        DispatchOutcome::failed(&e, ExecutionType::Generative)
                    }
                }
            }
            NodeKind::Deterministic { identifier } => {
                match self
                    .registry
                    .execute(identifier, input.cloned(), node.settings.clone())
                    .await
                {
                    Ok(output) => {
                        DispatchOutcome::completed(output, ExecutionType::Deterministic)
                    }
                    Err(e) => {
                        warn!(node_id = %node.id, identifier = %identifier, error = %e, "Deterministic step failed");
                        DispatchOutcome::failed(&e, ExecutionType::Deterministic)
                    }
                }
            }
            NodeKind::Dangling { catalog_id } => {
                let e = WeftError::AgentNotFound(format!("catalog entry {}", catalog_id));
                warn!(node_id = %node.id, catalog_id, "Node references an unknown catalog entry");
                DispatchOutcome::failed(&e, ExecutionType::Deterministic)
            }
        }
    }
}
