// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph engine errors.

use crate::connection::ConnectionId;
use crate::node::NodeId;
use crate::port::PortId;
use crate::value::ValueType;
use thiserror::Error;

/// Why a connection was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRejection {
    /// Source is not an output or target is not an input
    DirectionMismatch,
    /// Both ports belong to the same node
    SelfLoop,
    /// Target input already has an incoming connection
    InputOccupied,
    /// Source and target value types differ
    TypeMismatch,
    /// Target validator refused the source value
    ValidatorRejected,
}

impl std::fmt::Display for ConnectionRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::DirectionMismatch => "connections run from an output to an input",
            Self::SelfLoop => "a node cannot feed itself",
            Self::InputOccupied => "input already has a producer",
            Self::TypeMismatch => "port types are incompatible",
            Self::ValidatorRejected => "target port rejected the source value",
        };
        f.write_str(reason)
    }
}

/// Graph errors
#[derive(Debug, Error)]
pub enum GraphError {
    /// Connection preconditions failed
    #[error("Invalid connection: {0}")]
    InvalidConnection(ConnectionRejection),

    /// Connection would close a dependency cycle
    #[error("Connection from {from} to {to} would create a cycle")]
    CyclicConnection {
        /// Source node
        from: NodeId,
        /// Target node
        to: NodeId,
    },

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// A node with this ID is already in the context
    #[error("Node already present: {0}")]
    DuplicateNode(NodeId),

    /// A port with this ID already belongs to a node in the context
    #[error("Port already present: {0}")]
    DuplicatePort(PortId),

    /// Connection not found
    #[error("Connection not found: {0}")]
    ConnectionNotFound(ConnectionId),

    /// Port not found
    #[error("Port not found: {0}")]
    PortNotFound(PortId),

    /// Node has no port with this name
    #[error("Node {node} has no port named {name:?}")]
    PortNameNotFound {
        /// Node searched
        node: NodeId,
        /// Requested name
        name: String,
    },

    /// Kind missing from the registry
    #[error("Unknown node kind: {0}")]
    UnknownNodeKind(String),

    /// Snapshot cannot be rebuilt into a graph
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Value of the wrong type written to a port
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Port type
        expected: ValueType,
        /// Written value type
        found: ValueType,
    },

    /// Outputs are only written by compute
    #[error("Output port {0} is not writable")]
    OutputNotWritable(PortId),

    /// Input is driven by a connection
    #[error("Port {0} is driven by a connection")]
    PortConnected(PortId),

    /// Port validator refused the value
    #[error("Value rejected by port {0}")]
    InvalidValue(PortId),

    /// RON encoding error
    #[error("RON encoding error: {0}")]
    RonEncode(#[from] ron::Error),

    /// RON decoding error
    #[error("RON decoding error: {0}")]
    RonDecode(#[from] ron::error::SpannedError),

    /// JSON codec error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ConnectionRejection> for GraphError {
    fn from(reason: ConnectionRejection) -> Self {
        Self::InvalidConnection(reason)
    }
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
