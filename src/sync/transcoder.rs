use crate::generator::generate;
use crate::layout::{LayoutConfig, layout_with};
use crate::model::{Diagnostic, WorkflowGraph};
use crate::parser::parse;

/// Converts between the two document representations.
///
/// The controller only ever talks to the parser, layout and generator through
/// this trait, so hosts can substitute their own pipeline.
pub trait Transcoder {
    /// Text to graph, along with the problems found in the text.
    fn text_to_graph(&self, text: &str) -> (WorkflowGraph, Vec<Diagnostic>);

    fn graph_to_text(&self, graph: &WorkflowGraph) -> String;
}

/// Parser → layout in one direction, generator in the other.
#[derive(Debug, Clone, Default)]
pub struct DslTranscoder {
    layout: LayoutConfig,
}

impl DslTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }
}

impl Transcoder for DslTranscoder {
    fn text_to_graph(&self, text: &str) -> (WorkflowGraph, Vec<Diagnostic>) {
        let parsed = parse(text);
        let graph = layout_with(&parsed, &self.layout);
        (graph, parsed.diagnostics)
    }

    fn graph_to_text(&self, graph: &WorkflowGraph) -> String {
        generate(graph)
    }
}
