//! Canonical SAG text from a workflow graph.
//!
//! Generation is the inverse direction of [`parser`](crate::parser) +
//! [`layout`](crate::layout), but not an exact one: the graph keeps entity
//! names, signatures and descriptions, so whitespace, comments and tool bodies
//! are replaced by a fixed canonical form.

mod adjacency;
mod lint;

pub use lint::lint;

use crate::model::{AgentData, NodeData, NodeKind, StateData, ToolData, WorkflowGraph};
use adjacency::Adjacency;
use tracing::debug;

/// Provider written into a `model` block when the agent node carries none.
pub const DEFAULT_PROVIDER: &str = "anthropic";
/// Name of the agent synthesized to host tools when the graph has no agents.
pub const PLACEHOLDER_AGENT: &str = "UnnamedAgent";
/// Type name used for an unlinked state node without a label.
pub const FALLBACK_TYPE_NAME: &str = "CustomState";

const PLACEHOLDER_DESCRIPTION: &str = "Auto-generated agent";
const TOOL_BODY: &str = "    // Implement tool logic here";
const EVENT_BODY: &str = "    // Handle event here";

/// Generates SAG source text for a graph.
///
/// Agents are emitted in node order. Tools, handlers and state are attached
/// through edges in either direction. When the graph has tool nodes but no agent
/// nodes, the unlinked tools are wrapped in a single [`PLACEHOLDER_AGENT`];
/// state nodes linked to no agent become top-level `type` declarations.
pub fn generate(graph: &WorkflowGraph) -> String {
    let adjacency = Adjacency::build(graph);
    let mut out = SagWriter::default();

    let agents: Vec<_> = graph
        .nodes
        .iter()
        .filter_map(|node| match &node.data {
            NodeData::Agent(data) => Some((node.id.as_str(), data)),
            _ => None,
        })
        .collect();

    for (index, (agent_id, agent)) in agents.iter().enumerate() {
        if index > 0 {
            out.blank();
        }
        emit_agent(&mut out, &adjacency, agent_id, agent);
    }

    if agents.is_empty() {
        let linked = adjacency.linked_tools();
        let orphans: Vec<&ToolData> = graph
            .nodes
            .iter()
            .filter(|node| !linked.contains(node.id.as_str()))
            .filter_map(|node| match &node.data {
                NodeData::Tool(data) => Some(data),
                _ => None,
            })
            .collect();
        if !orphans.is_empty() {
            out.line(format!("agent {} {{", PLACEHOLDER_AGENT));
            out.line(format!("  description: \"{}\"", PLACEHOLDER_DESCRIPTION));
            for tool in orphans {
                emit_tool(&mut out, tool);
            }
            out.line("}");
        }
    }

    let linked_states = adjacency.linked_states();
    for node in graph.nodes_of_kind(NodeKind::State) {
        if linked_states.contains(node.id.as_str()) {
            continue;
        }
        if let NodeData::State(state) = &node.data {
            emit_type(&mut out, state);
        }
    }

    let text = out.finish();
    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        bytes = text.len(),
        "generated SAG text"
    );
    text
}

/// Whether two texts differ only in indentation, trailing spaces or blank lines.
pub fn code_equivalent(a: &str, b: &str) -> bool {
    normalized_lines(a).eq(normalized_lines(b))
}

fn normalized_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

fn emit_agent(out: &mut SagWriter, adjacency: &Adjacency<'_>, agent_id: &str, agent: &AgentData) {
    out.line(format!("agent {} {{", agent.label));
    if let Some(description) = non_empty(&agent.description) {
        out.line(format!("  description: \"{}\"", description));
    }
    if let Some(version) = non_empty(&agent.version) {
        out.line(format!("  version: \"{}\"", version));
    }

    if let Some(model) = non_empty(&agent.model) {
        let provider = non_empty(&agent.provider).unwrap_or(DEFAULT_PROVIDER);
        out.blank();
        out.line("  model {");
        out.line(format!("    provider: \"{}\"", provider));
        out.line(format!("    name: \"{}\"", model));
        out.line("  }");
    }

    let Some(links) = adjacency.links(agent_id) else {
        out.line("}");
        return;
    };

    let state = links
        .state
        .and_then(|id| adjacency.node(id))
        .and_then(|node| match &node.data {
            NodeData::State(data) => data.fields.as_deref(),
            _ => None,
        })
        .filter(|fields| !fields.is_empty());
    if let Some(fields) = state {
        out.blank();
        out.line("  state {");
        for field in fields {
            out.line(format!("    {}", field));
        }
        out.line("  }");
    }

    for node in links.tools.iter().filter_map(|id| adjacency.node(id)) {
        if let NodeData::Tool(tool) = &node.data {
            emit_tool(out, tool);
        }
    }

    for node in links.events.iter().filter_map(|id| adjacency.node(id)) {
        if let NodeData::Event(event) = &node.data {
            out.blank();
            out.line(format!("  on {} {{", event.label));
            out.line(EVENT_BODY);
            out.line("  }");
        }
    }

    out.line("}");
}

fn emit_tool(out: &mut SagWriter, tool: &ToolData) {
    let params = tool.params.as_deref().unwrap_or("");
    let returns = non_empty(&tool.returns)
        .map(|r| format!(" -> {}", r))
        .unwrap_or_default();

    out.blank();
    out.line(format!("  tool {}({}){} {{", tool.label, params, returns));
    if let Some(description) = non_empty(&tool.description) {
        out.line(format!("    description: \"{}\"", description));
    }
    out.line(TOOL_BODY);
    out.line("  }");
}

/// An unlinked state node as a record type. Optional markers are dropped since
/// a free-standing type has no optional fields.
fn emit_type(out: &mut SagWriter, state: &StateData) {
    let Some(fields) = state.fields.as_deref().filter(|f| !f.is_empty()) else {
        return;
    };
    let name = if state.label.is_empty() {
        FALLBACK_TYPE_NAME
    } else {
        state.label.as_str()
    };

    if !out.is_empty() {
        out.blank();
    }
    out.line(format!("type {} {{", name));
    for field in fields {
        out.line(format!("  {}", field.replace('?', "")));
    }
    out.line("}");
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Line buffer for generated text.
#[derive(Default)]
struct SagWriter {
    lines: Vec<String>,
}

impl SagWriter {
    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}
