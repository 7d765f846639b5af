//! Shared vocabulary of the crate: parsed DSL entities, workflow graph nodes and
//! edges, and diagnostics.

pub mod diagnostic;
pub mod entity;
pub mod graph;

pub use diagnostic::*;
pub use entity::*;
pub use graph::*;
