use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ErrorCode, WeftError};
use crate::settings::{RawSettings, SettingsMap};

/// A node as submitted by the authoring layer.
///
/// This is the loosely-typed wire shape; [`NodeDefinition`] is what the
/// engine executes after the catalog resolves the execution mode once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub settings: RawSettings,
    #[serde(default)]
    pub is_common_agent: bool,
    #[serde(default)]
    pub common_agent_id: Option<i64>,
}

/// Resolved execution mode of a node.
///
/// Resolution happens once, when the definition is loaded; dispatch never
/// re-derives identifiers. A node's mode is a hard choice: a deterministic
/// node that cannot be resolved fails with NOT_FOUND instead of falling
/// back to the generative path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Prompt-driven step submitted to the text provider.
    Generative { prompt: String },
    /// Catalog-backed executable, keyed by its registry identifier.
    Deterministic { identifier: String },
    /// Declared deterministic but the catalog has no entry for the id.
    Dangling { catalog_id: i64 },
}

/// A fully resolved workflow node, immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: SettingsMap,
    pub kind: NodeKind,
}

/// A directed dependency: `to` consumes the output of `from`.
///
/// Authoring clients disagree on field names, so `{source, target}` is
/// accepted alongside `{from, to}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    #[serde(alias = "source")]
    pub from: String,
    #[serde(alias = "target")]
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// One workflow execution request: nodes plus edges, submitted together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowGraph {
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub team_id: Option<String>,
}

/// Which execution strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionType {
    Generative,
    Deterministic,
}

/// Structured failure recorded on a node result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeError {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&WeftError> for NodeError {
    fn from(e: &WeftError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

/// Result of executing a single node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResult {
    pub node_id: String,
    pub node_name: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<NodeError>,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    pub execution_type: ExecutionType,
    /// Execution time in milliseconds.
    #[serde(default)]
    pub elapsed_ms: u64,
}

/// Per-run bookkeeping threaded through dispatch: where the current node
/// sits in the pipeline and what ran before it. Owned by the runner,
/// rebuilt per node, discarded with the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    pub total_nodes: usize,
    /// Zero-based position of the current node in the execution order.
    pub current_index: usize,
    #[serde(default)]
    pub previous_results: Vec<NodeResult>,
}

/// Result of executing an entire workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub success: bool,
    pub message: String,
    /// Per-node results in execution order, up to the halt point.
    pub results: Vec<NodeResult>,
    pub execution_order: Vec<String>,
}

/// Correlation data for one run; shows up in logs, never in dispatch logic.
#[derive(Debug, Clone)]
pub struct RunMetadata {
    pub run_id: String,
    pub team_id: Option<String>,
}

impl RunMetadata {
    pub fn new(team_id: Option<String>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            team_id,
        }
    }
}

impl Default for RunMetadata {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Declared metadata for one field of an agent's settings schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingField {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl SettingField {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        field_type: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type: field_type.into(),
            required,
            default: None,
        }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_spec_camel_case() {
        let spec: NodeSpec = serde_json::from_str(
            r#"{"id": "b", "name": "Convert", "isCommonAgent": true, "commonAgentId": 7}"#,
        )
        .unwrap();
        assert_eq!(spec.id, "b");
        assert!(spec.is_common_agent);
        assert_eq!(spec.common_agent_id, Some(7));
        assert!(spec.prompt.is_none());
    }

    #[test]
    fn test_node_spec_defaults() {
        let spec: NodeSpec = serde_json::from_str(r#"{"id": "a"}"#).unwrap();
        assert_eq!(spec.name, "");
        assert!(!spec.is_common_agent);
        assert!(matches!(spec.settings, RawSettings::Triples(ref t) if t.is_empty()));
    }

    #[test]
    fn test_edge_field_aliases() {
        let e: Edge = serde_json::from_str(r#"{"from": "a", "to": "b"}"#).unwrap();
        assert_eq!(e.from, "a");
        assert_eq!(e.to, "b");

        let e: Edge = serde_json::from_str(r#"{"source": "a", "target": "b"}"#).unwrap();
        assert_eq!(e.from, "a");
        assert_eq!(e.to, "b");
    }

    #[test]
    fn test_node_result_wire_shape() {
        let result = NodeResult {
            node_id: "n1".into(),
            node_name: "Summarize".into(),
            success: false,
            error: Some(NodeError {
                code: ErrorCode::NotFound,
                message: "deterministic agent not found: excel-to-csv".into(),
            }),
            output: None,
            execution_type: ExecutionType::Deterministic,
            elapsed_ms: 3,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["nodeId"], "n1");
        assert_eq!(json["executionType"], "deterministic");
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[test]
    fn test_workflow_graph_decode() {
        let graph: WorkflowGraph = serde_json::from_str(
            r#"{
                "nodes": [{"id": "a", "prompt": "Summarize"}],
                "edges": [{"from": "a", "to": "b"}],
                "teamId": "t-9"
            }"#,
        )
        .unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.team_id.as_deref(), Some("t-9"));
    }

    #[test]
    fn test_run_metadata_ids_are_unique() {
        let a = RunMetadata::new(None);
        let b = RunMetadata::new(None);
        assert_ne!(a.run_id, b.run_id);
    }

    #[test]
    fn test_node_kind_serde_tag() {
        let kind = NodeKind::Deterministic {
            identifier: "csv-to-json".into(),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "deterministic");
        assert_eq!(json["identifier"], "csv-to-json");
    }
}
