//! # SagFlow - Text and Graph Editing for Agent Workflows
//!
//! **SagFlow** keeps two views of an agent workflow in step: SAG source text, a small
//! language of `agent`, `tool`, `on`, `state` and `type` blocks, and a node/edge graph
//! as drawn by a visual editor. Either side can be edited; the other follows.
//!
//! ## Core Workflow
//!
//! 1.  **Parse**: [`parser::parse`] turns SAG text into a [`model::ParseResult`]. It
//!     never fails; structural problems are reported as diagnostics.
//! 2.  **Lay Out**: [`layout::layout`] places the parsed entities on a canvas and links
//!     them with edges. Node ids derive from entity names, so they are stable across
//!     re-parses.
//! 3.  **Generate**: [`generator::generate`] serializes a (possibly hand-edited) graph
//!     back into canonical SAG text.
//! 4.  **Synchronize**: [`sync::SyncController`] arbitrates between the two views,
//!     debouncing graph edits and dropping echoes of its own updates.
//!
//! ## Quick Start
//!
//! ```rust
//! use sagflow::prelude::*;
//!
//! let source = r#"
//! agent WeatherAgent {
//!   description: "Looks up the weather"
//!
//!   state {
//!     lastCity?: string
//!   }
//!
//!   tool get_weather(city: string) -> WeatherData {
//!     description: "Current conditions for a city"
//!   }
//! }
//! "#;
//!
//! let parsed = parse(source);
//! assert!(parsed.diagnostics.is_empty());
//!
//! let graph = layout(&parsed);
//! assert_eq!(graph.nodes.len(), 3);
//! assert_eq!(graph.edges.len(), 2);
//!
//! let text = generate(&graph);
//! assert!(text.contains("tool get_weather(city: string) -> WeatherData {"));
//! assert!(text.contains("lastCity?: string"));
//! ```

pub mod error;
pub mod generator;
pub mod layout;
pub mod model;
pub mod parser;
pub mod prelude;
pub mod sync;
