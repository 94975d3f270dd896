use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeftError {
    // Provider errors
    #[error("provider connection failed: {0}")]
    ProviderConnection(String),

    #[error("provider timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("provider request failed: {0}")]
    ProviderRequest(String),

    #[error("provider response parse error: {0}")]
    ProviderParse(String),

    // Deterministic agent errors
    #[error("deterministic agent not found: {0}")]
    AgentNotFound(String),

    #[error("agent execution failed: {agent}: {message}")]
    AgentExecution { agent: String, message: String },

    #[error("agent timed out after {timeout_secs}s: {agent}")]
    AgentTimeout { agent: String, timeout_secs: u64 },

    #[error("invalid agent settings: {0}")]
    InvalidSettings(String),

    // Graph errors
    #[error("workflow graph has no nodes")]
    EmptyGraph,

    #[error("workflow graph contains a cycle ({ordered} of {total} nodes orderable)")]
    CyclicGraph { ordered: usize, total: usize },

    // Config errors
    #[error("config error: {0}")]
    Config(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WeftError>;

/// Discriminating error code attached to failed node results so callers
/// can tell a dead provider from a missing agent registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ConnectionError,
    TimeoutError,
    NotFound,
    Generic,
}

impl WeftError {
    /// Classify this error for node-level reporting.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ProviderConnection(_) => ErrorCode::ConnectionError,
            Self::ProviderTimeout(_) | Self::AgentTimeout { .. } => ErrorCode::TimeoutError,
            Self::AgentNotFound(_) => ErrorCode::NotFound,
            _ => ErrorCode::Generic,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Generic => "GENERIC",
        };
        write!(f, "{}", s)
    }
}
