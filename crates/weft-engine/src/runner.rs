use std::collections::HashMap;
use std::time::Instant;

use tracing::{info, warn};

use weft_core::error::{Result, WeftError};
use weft_core::types::{
    Edge, ExecutionContext, NodeDefinition, NodeResult, RunMetadata, RunReport,
};

use crate::dispatch::NodeDispatcher;
use crate::order::execution_order;

/// Executes a workflow: orders the graph, walks the order dispatching each
/// node with the previous node's output, and halts on the first failure.
///
/// Strictly sequential within a run; concurrent runs share nothing but the
/// read-only registry and provider behind the dispatcher.
pub struct WorkflowRunner {
    dispatcher: NodeDispatcher,
}

impl WorkflowRunner {
    pub fn new(dispatcher: NodeDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run a resolved workflow graph end to end.
    ///
    /// Structural failures (no nodes, cycle) are returned as errors before
    /// any node executes. Everything after that is captured per node in
    /// the result log, never raised.
    pub async fn run(
        &self,
        nodes: &[NodeDefinition],
        edges: &[Edge],
        metadata: &RunMetadata,
    ) -> Result<RunReport> {
        if nodes.is_empty() {
            return Err(WeftError::EmptyGraph);
        }

        let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
        let order = execution_order(&ids, edges);
        if order.len() < nodes.len() {
            return Err(WeftError::CyclicGraph {
                ordered: order.len(),
                total: nodes.len(),
            });
        }

        info!(
            run_id = %metadata.run_id,
            team_id = metadata.team_id.as_deref().unwrap_or("-"),
            nodes = nodes.len(),
            "Executing workflow"
        );

        let by_id: HashMap<&str, &NodeDefinition> =
            nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut results: Vec<NodeResult> = Vec::new();
        let mut previous: Option<serde_json::Value> = None;

        for id in &order {
            let Some(node) = by_id.get(id.as_str()).copied() else {
                // Dangling reference, not a failed execution: log and move
                // on with the carried-forward output unchanged.
                warn!(run_id = %metadata.run_id, node_id = %id, "Ordered node has no definition, skipping");
                continue;
            };

            info!(run_id = %metadata.run_id, node_id = %node.id, node_name = %node.name, "Executing node");

            let context = ExecutionContext {
                total_nodes: nodes.len(),
                current_index: results.len(),
                previous_results: results.clone(),
            };

            let started = Instant::now();
            let outcome = self
                .dispatcher
                .dispatch(node, previous.as_ref(), Some(&context))
                .await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            // The next node sees this output even when the node failed.
            // Halt-on-failure breaks before that matters; a future
            // continue-on-failure mode must revisit this choice.
            previous = outcome.output.clone();

            let success = outcome.success;
            results.push(NodeResult {
                node_id: node.id.clone(),
                node_name: node.name.clone(),
                success,
                error: outcome.error,
                output: outcome.output,
                execution_type: outcome.execution_type,
                elapsed_ms,
            });

            if !success {
                warn!(run_id = %metadata.run_id, node_id = %node.id, "Node failed, halting run");
                break;
            }
        }

        let success = results.iter().all(|r| r.success);
        let message = match results.iter().find(|r| !r.success) {
            None => format!("{} of {} steps completed", results.len(), nodes.len()),
            Some(failed) => {
                let completed = results.iter().filter(|r| r.success).count();
                let code = failed
                    .error
                    .as_ref()
                    .map(|e| e.code.to_string())
                    .unwrap_or_else(|| "GENERIC".to_string());
                format!(
                    "{} of {} steps completed; step '{}' failed ({})",
                    completed, nodes.len(), failed.node_name, code
                )
            }
        };

        info!(run_id = %metadata.run_id, success, steps = results.len(), "Workflow finished");

        Ok(RunReport {
            success,
            message,
            results,
            execution_order: order,
        })
    }

    /// Execute a single node outside a full run: same dispatch contract,
    /// no ordering or chaining.
    pub async fn run_node(
        &self,
        node: &NodeDefinition,
        input: Option<&serde_json::Value>,
        context: Option<&ExecutionContext>,
    ) -> NodeResult {
        let started = Instant::now();
        let outcome = self.dispatcher.dispatch(node, input, context).await;
        NodeResult {
            node_id: node.id.clone(),
            node_name: node.name.clone(),
            success: outcome.success,
            error: outcome.error,
            output: outcome.output,
            execution_type: outcome.execution_type,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use futures::future::BoxFuture;

    use weft_agents::{AgentCatalog, AgentRegistry};
    use weft_core::error::ErrorCode;
    use weft_core::settings::{RawSettings, SettingsMap};
    use weft_core::traits::TextProvider;
    use weft_core::types::{ExecutionType, NodeKind, NodeSpec};

    use super::*;

    /// Echoes "echo:<node position>" and records every prompt it sees.
    struct RecordingProvider {
        calls: Arc<AtomicU32>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingProvider {
        fn new() -> (Self, Arc<AtomicU32>, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(AtomicU32::new(0));
            let prompts = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    calls: calls.clone(),
                    prompts: prompts.clone(),
                },
                calls,
                prompts,
            )
        }
    }

    impl TextProvider for RecordingProvider {
        fn generate(&self, prompt: String) -> BoxFuture<'_, weft_core::error::Result<String>> {
            Box::pin(async move {
                let n = self.calls.fetch_add(1, Ordering::SeqCst);
                self.prompts.lock().unwrap().push(prompt);
                Ok(format!("echo:{}", n))
            })
        }
    }

    fn generative(id: &str, prompt: &str) -> NodeDefinition {
        NodeDefinition {
            id: id.to_string(),
            name: format!("Node {}", id),
            description: None,
            settings: SettingsMap::new(),
            kind: NodeKind::Generative {
                prompt: prompt.to_string(),
            },
        }
    }

    fn deterministic(id: &str, identifier: &str) -> NodeDefinition {
        NodeDefinition {
            id: id.to_string(),
            name: format!("Node {}", id),
            description: None,
            settings: SettingsMap::new(),
            kind: NodeKind::Deterministic {
                identifier: identifier.to_string(),
            },
        }
    }

    fn runner_with(registry: AgentRegistry) -> (WorkflowRunner, Arc<AtomicU32>, Arc<Mutex<Vec<String>>>) {
        let (provider, calls, prompts) = RecordingProvider::new();
        let dispatcher = NodeDispatcher::new(Arc::new(registry), Arc::new(provider));
        (WorkflowRunner::new(dispatcher), calls, prompts)
    }

    #[tokio::test]
    async fn test_empty_graph_fails_before_execution() {
        let (runner, calls, _) = runner_with(AgentRegistry::new());
        let err = runner
            .run(&[], &[], &RunMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WeftError::EmptyGraph));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cycle_fails_before_execution() {
        let (runner, calls, _) = runner_with(AgentRegistry::new());
        let nodes = vec![generative("a", "one"), generative("b", "two")];
        let edges = vec![Edge::new("a", "b"), Edge::new("b", "a")];

        let err = runner
            .run(&nodes, &edges, &RunMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WeftError::CyclicGraph {
                ordered: 0,
                total: 2
            }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_linear_chain_completes() {
        let (runner, _, _) = runner_with(AgentRegistry::new());
        let nodes = vec![
            generative("a", "first"),
            generative("b", "second"),
            generative("c", "third"),
        ];
        let edges = vec![Edge::new("a", "b"), Edge::new("b", "c")];

        let report = runner
            .run(&nodes, &edges, &RunMetadata::default())
            .await
            .unwrap();
        assert!(report.success);
        assert_eq!(report.execution_order, vec!["a", "b", "c"]);
        assert_eq!(report.results.len(), 3);
        assert!(report.results.iter().all(|r| r.success));
        assert_eq!(report.message, "3 of 3 steps completed");
    }

    #[tokio::test]
    async fn test_halt_on_failure_skips_downstream() {
        // B is deterministic with nothing registered, so it fails; C must
        // never be dispatched.
        let (runner, calls, _) = runner_with(AgentRegistry::new());
        let nodes = vec![
            generative("a", "first"),
            deterministic("b", "missing-agent"),
            generative("c", "third"),
        ];
        let edges = vec![Edge::new("a", "b"), Edge::new("b", "c")];

        let report = runner
            .run(&nodes, &edges, &RunMetadata::default())
            .await
            .unwrap();
        assert!(!report.success);
        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].success);
        assert!(!report.results[1].success);
        // Only node a hit the provider.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            report.message,
            "1 of 3 steps completed; step 'Node b' failed (NOT_FOUND)"
        );
    }

    #[tokio::test]
    async fn test_output_chains_into_next_prompt() {
        let (runner, _, prompts) = runner_with(AgentRegistry::new());
        let nodes = vec![generative("a", "first"), generative("b", "second")];
        let edges = vec![Edge::new("a", "b")];

        let report = runner
            .run(&nodes, &edges, &RunMetadata::default())
            .await
            .unwrap();
        assert!(report.success);

        // B's recorded input is exactly A's recorded output.
        let a_output = report.results[0].output.clone().unwrap();
        assert_eq!(a_output, serde_json::json!("echo:0"));

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(!prompts[0].contains("Previous step output:"));
        assert!(prompts[1].contains("Previous step output:\necho:0"));
    }

    #[tokio::test]
    async fn test_context_position_in_prompts() {
        let (runner, _, prompts) = runner_with(AgentRegistry::new());
        let nodes = vec![generative("a", "one"), generative("b", "two")];
        let edges = vec![Edge::new("a", "b")];

        runner
            .run(&nodes, &edges, &RunMetadata::default())
            .await
            .unwrap();

        let prompts = prompts.lock().unwrap();
        assert!(prompts[0].contains("Step 1 of 2 in the workflow."));
        assert!(prompts[1].contains("Step 2 of 2 in the workflow."));
    }

    #[tokio::test]
    async fn test_example_scenario_unregistered_common_agent() {
        // Catalog knows entry 7 ("Excel to CSV" would be the authored
        // name, but only "excel-to-csv" semantics matter); the registry
        // has a different identifier registered, so node b resolves to an
        // identifier with no executable behind it.
        struct GhostAgent;
        impl weft_core::traits::DeterministicAgent for GhostAgent {
            fn name(&self) -> &str {
                "Data Cleaner"
            }
            fn description(&self) -> &str {
                "Placeholder catalog entry."
            }
            fn execute(
                &self,
                _input: Option<serde_json::Value>,
                _settings: SettingsMap,
            ) -> BoxFuture<'_, weft_core::error::Result<serde_json::Value>> {
                Box::pin(async { Ok(serde_json::Value::Null) })
            }
        }

        let mut catalog = AgentCatalog::new();
        catalog.add(7, &GhostAgent);

        let specs = vec![
            NodeSpec {
                id: "a".into(),
                name: "a".into(),
                description: None,
                prompt: Some("Summarize".into()),
                settings: RawSettings::default(),
                is_common_agent: false,
                common_agent_id: None,
            },
            NodeSpec {
                id: "b".into(),
                name: "b".into(),
                description: None,
                prompt: None,
                settings: RawSettings::default(),
                is_common_agent: true,
                common_agent_id: Some(7),
            },
        ];
        let nodes = catalog.resolve_all(specs).unwrap();
        assert_eq!(
            nodes[1].kind,
            NodeKind::Deterministic {
                identifier: "data-cleaner".into()
            }
        );

        // Registry only has excel-to-csv.
        struct ExcelAgent;
        impl weft_core::traits::DeterministicAgent for ExcelAgent {
            fn name(&self) -> &str {
                "Excel to CSV"
            }
            fn description(&self) -> &str {
                "Converts spreadsheets."
            }
            fn execute(
                &self,
                _input: Option<serde_json::Value>,
                _settings: SettingsMap,
            ) -> BoxFuture<'_, weft_core::error::Result<serde_json::Value>> {
                Box::pin(async { Ok(serde_json::json!("csv")) })
            }
        }
        let mut registry = AgentRegistry::new();
        registry.register(ExcelAgent);
        assert!(registry.has("excel-to-csv"));

        let (runner, _, _) = runner_with(registry);
        let edges = vec![Edge::new("a", "b")];
        let report = runner
            .run(&nodes, &edges, &RunMetadata::default())
            .await
            .unwrap();

        assert!(!report.success);
        assert_eq!(report.execution_order, vec!["a", "b"]);
        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].success);
        assert_eq!(report.results[0].execution_type, ExecutionType::Generative);
        let failure = &report.results[1];
        assert!(!failure.success);
        assert_eq!(failure.execution_type, ExecutionType::Deterministic);
        assert_eq!(failure.error.as_ref().unwrap().code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_branching_graph_walks_single_sequence() {
        let (runner, calls, _) = runner_with(AgentRegistry::new());
        // a fans out to b and c; the orderer flattens to one sequence.
        let nodes = vec![
            generative("a", "root"),
            generative("b", "left"),
            generative("c", "right"),
        ];
        let edges = vec![Edge::new("a", "b"), Edge::new("a", "c")];

        let report = runner
            .run(&nodes, &edges, &RunMetadata::default())
            .await
            .unwrap();
        assert!(report.success);
        assert_eq!(report.execution_order, vec!["a", "b", "c"]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_node_single_dispatch() {
        let (runner, calls, _) = runner_with(AgentRegistry::new());
        let node = generative("solo", "Do one thing");

        let result = runner
            .run_node(&node, Some(&serde_json::json!("input")), None)
            .await;
        assert!(result.success);
        assert_eq!(result.node_id, "solo");
        assert_eq!(result.node_name, "Node solo");
        assert_eq!(result.execution_type, ExecutionType::Generative);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
