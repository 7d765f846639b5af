use thiserror::Error;

/// Errors raised while decoding a graph document coming from the graph editor.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Failed to decode graph JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Node '{node_id}' has an unknown node type: '{type_name}'")]
    UnknownNodeType { node_id: String, type_name: String },

    #[error("Node '{node_id}' carries invalid data: {message}")]
    InvalidNodeData { node_id: String, message: String },
}

/// Errors returned by a running synchronization session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("The document session has been closed")]
    Closed,

    #[error("The document session task stopped before replying")]
    NoReply,
}
