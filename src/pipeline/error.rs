//! Pipeline-specific error types.

use crate::pipeline::id::NodeId;
use crate::pipeline::node_kind::NodeKind;
use thiserror::Error;

/// Structural problems found when preparing a graph for submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No processing nodes added to the pipeline")]
    NoProcessingNodes,

    #[error("Edge {from} -> {to} references a node that does not exist")]
    DanglingEdge { from: NodeId, to: NodeId },

    #[error("Pipeline must connect from Input to Output")]
    DisconnectedPipeline,
}

/// Errors raised while editing a node's parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("{kind} has no parameter named '{name}'")]
    UnknownParameter { kind: NodeKind, name: String },

    #[error("Cannot use '{value}' for '{name}': expected {expected}")]
    InvalidValue {
        name: String,
        value: String,
        expected: &'static str,
    },
}

/// Errors raised by graph mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Node {0} is a terminal and has no parameters")]
    NotAProcessingNode(NodeId),

    #[error("Edge index {0} out of range")]
    EdgeNotFound(usize),

    #[error("Node {node_id}: {source}")]
    Parameter {
        node_id: NodeId,
        #[source]
        source: ParameterError,
    },
}

/// A drag payload or document named a node kind that is not in the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown node kind '{0}'")]
pub struct UnknownNodeKind(pub String);

pub type GraphResult<T> = std::result::Result<T, GraphError>;
