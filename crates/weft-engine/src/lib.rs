//! Workflow execution engine: ordered, pipelined execution of node graphs.
//!
//! A workflow is a set of `NodeDefinition`s plus directed `Edge`s. The
//! engine flattens the graph into one deterministic sequence (Kahn's
//! topological sort), then walks it: each node is dispatched to the
//! generative invoker or the deterministic agent registry, its output is
//! handed to the next node, and the run halts on the first failure with a
//! per-node result log.

pub mod dispatch;
pub mod invoker;
pub mod order;
pub mod runner;

pub use dispatch::{DispatchOutcome, NodeDispatcher};
pub use invoker::GenerativeInvoker;
pub use order::execution_order;
pub use runner::WorkflowRunner;
