use super::adjacency::Adjacency;
use crate::model::{Diagnostic, NodeData, NodeKind, WorkflowGraph, WorkflowNode};
use ahash::AHashSet;
use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("valid identifier pattern"));

static TYPE_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w\[\]<>.]+(?:,\s*[\w\[\]<>.]+)*$").expect("valid type expression pattern")
});

/// Reports graph shapes the code generator handles only partially.
///
/// Nothing reported here stops [`generate`](super::generate); the diagnostics
/// explain why some nodes are missing from, or repeated in, the generated text.
/// Graph diagnostics carry no source line, so `line` is always 0.
pub fn lint(graph: &WorkflowGraph) -> Vec<Diagnostic> {
    let adjacency = Adjacency::build(graph);
    let mut diagnostics = Vec::new();

    let mut seen = AHashSet::new();
    for node in &graph.nodes {
        if !seen.insert(node.id.as_str()) {
            diagnostics.push(Diagnostic::error(
                0,
                format!("node id '{}' is used by more than one node", node.id),
            ));
        }
    }

    for edge in &graph.edges {
        for endpoint in [&edge.source, &edge.target] {
            if adjacency.node(endpoint).is_none() {
                diagnostics.push(Diagnostic::warning(
                    0,
                    format!("edge '{}' references missing node '{}'", edge.id, endpoint),
                ));
            }
        }
    }

    let owners = adjacency.tool_owners();
    for tool in graph.nodes_of_kind(NodeKind::Tool) {
        if let Some(agents) = owners.get(tool.id.as_str()).filter(|a| a.len() > 1) {
            diagnostics.push(Diagnostic::warning(
                0,
                format!(
                    "tool '{}' is linked to {} agents ({}) and is emitted under each",
                    tool.label(),
                    agents.len(),
                    agents.iter().sorted().join(", ")
                ),
            ));
        }
    }

    let has_agents = graph.nodes_of_kind(NodeKind::Agent).next().is_some();
    if has_agents {
        let linked = adjacency.linked_tools();
        for tool in graph
            .nodes_of_kind(NodeKind::Tool)
            .filter(|t| !linked.contains(t.id.as_str()))
        {
            diagnostics.push(Diagnostic::warning(
                0,
                format!(
                    "tool '{}' is not linked to any agent and is dropped",
                    tool.label()
                ),
            ));
        }
    }

    let linked = adjacency.linked_events();
    for event in graph
        .nodes_of_kind(NodeKind::Event)
        .filter(|e| !linked.contains(e.id.as_str()))
    {
        diagnostics.push(Diagnostic::warning(
            0,
            format!(
                "event '{}' is not linked to any agent and is dropped",
                event.label()
            ),
        ));
    }

    let linked_states = adjacency.linked_states();
    for node in &graph.nodes {
        // A linked state is written as a `state` block, which has no name.
        let named = !(node.kind() == NodeKind::State
            && (linked_states.contains(node.id.as_str()) || node.label().is_empty()));
        check_round_trip(node, named, &mut diagnostics);
    }

    diagnostics
}

/// Values the generator writes verbatim but the parser cannot read back.
fn check_round_trip(node: &WorkflowNode, named: bool, diagnostics: &mut Vec<Diagnostic>) {
    let kind = node.kind();
    let label = node.label();
    if named && !IDENTIFIER.is_match(label) {
        diagnostics.push(Diagnostic::warning(
            0,
            format!("{} label '{}' is not an identifier and does not parse back", kind, label),
        ));
    }

    let quoted: Vec<(&str, &Option<String>)> = match &node.data {
        NodeData::Agent(agent) => vec![
            ("description", &agent.description),
            ("version", &agent.version),
            ("model", &agent.model),
            ("provider", &agent.provider),
        ],
        NodeData::Tool(tool) => {
            if tool.params.as_deref().is_some_and(|p| p.contains(')')) {
                diagnostics.push(Diagnostic::warning(
                    0,
                    format!("tool '{}' parameters contain ')' and do not parse back", label),
                ));
            }
            let returns = tool.returns.as_deref().unwrap_or("");
            if !returns.is_empty() && !TYPE_EXPR.is_match(returns) {
                diagnostics.push(Diagnostic::warning(
                    0,
                    format!("tool '{}' return type '{}' does not parse back", label, returns),
                ));
            }
            vec![("description", &tool.description)]
        }
        NodeData::Event(_) | NodeData::State(_) => Vec::new(),
    };

    for (field, value) in quoted {
        if value
            .as_deref()
            .is_some_and(|v| v.contains(['"', '\'', '\n']))
        {
            diagnostics.push(Diagnostic::warning(
                0,
                format!(
                    "{} '{}' {} contains a quote or line break and does not parse back",
                    kind, label, field
                ),
            ));
        }
    }
}
