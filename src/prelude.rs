//! Prelude module for convenient imports
//!
//! Re-exports the pipeline functions, the document model and the sync controller.
//!
//! # Example
//!
//! ```rust
//! use sagflow::prelude::*;
//!
//! let graph = layout(&parse("agent Echo {\n  on message {\n  }\n}\n"));
//! assert_eq!(graph.nodes_of_kind(NodeKind::Event).count(), 1);
//!
//! let text = generate(&graph);
//! assert!(code_equivalent(&text, "agent Echo {\n\n  on message {\n    // Handle event here\n  }\n}\n"));
//! ```

// Pipeline
pub use crate::generator::{code_equivalent, generate, lint};
pub use crate::layout::{LayoutConfig, layout, layout_with};
pub use crate::parser::parse;

// Document model
pub use crate::model::{
    Diagnostic, EventType, NodeData, NodeKind, ParseResult, Position, Severity, WorkflowEdge,
    WorkflowGraph, WorkflowNode,
};

// Synchronization
pub use crate::sync::{
    Change, ChangeEvent, Document, DslTranscoder, Effect, Provenance, Revision, SyncConfig,
    SyncController, SyncHandle, SyncPhase, SyncSession, SyncUpdate, Transcoder,
};

// Error types
pub use crate::error::{GraphError, SyncError};
