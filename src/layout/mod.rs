//! Deterministic placement of parsed entities onto the workflow canvas.
//!
//! Agents are stacked in a single column; each agent's tools sit in a column to
//! its left, its event handlers to its right and its state block below it.
//! Top-level type declarations become unlinked state nodes in a column of their
//! own. Node ids are derived from entity names only, so laying out the same
//! text twice yields identical ids.

use crate::model::{
    AgentData, EventData, NodeData, ParseResult, Position, StateData, ToolData, WorkflowEdge,
    WorkflowGraph, WorkflowNode,
};
use ahash::{AHashMap, AHashSet};
use tracing::debug;

/// Handle marking the agent→state edge.
pub const STATE_HANDLE: &str = "state";
/// Label given to agent state nodes.
pub const STATE_LABEL: &str = "State";

/// Canvas geometry used by [`layout_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub agent_x: f64,
    pub agent_y_start: f64,
    /// Vertical distance between consecutive agents.
    pub agent_y_spacing: f64,
    pub tool_x_offset: f64,
    pub tool_y_offset: f64,
    pub tool_y_spacing: f64,
    pub event_x_offset: f64,
    pub event_y_offset: f64,
    pub event_y_spacing: f64,
    pub state_x_offset: f64,
    pub state_y_offset: f64,
    pub type_x_offset: f64,
    pub type_y_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            agent_x: 300.0,
            agent_y_start: 100.0,
            agent_y_spacing: 400.0,
            tool_x_offset: -250.0,
            tool_y_offset: -50.0,
            tool_y_spacing: 100.0,
            event_x_offset: 250.0,
            event_y_offset: -30.0,
            event_y_spacing: 80.0,
            state_x_offset: 0.0,
            state_y_offset: 200.0,
            type_x_offset: 600.0,
            type_y_spacing: 200.0,
        }
    }
}

/// Lays out a parse result with the default geometry.
pub fn layout(parsed: &ParseResult) -> WorkflowGraph {
    layout_with(parsed, &LayoutConfig::default())
}

/// Lays out a parse result. Pure: the output depends only on `parsed` and `config`.
pub fn layout_with(parsed: &ParseResult, config: &LayoutConfig) -> WorkflowGraph {
    let mut builder = GraphBuilder::default();
    let mut placed_agents: AHashSet<&str> = AHashSet::new();

    for agent in &parsed.agents {
        // Repeated names were already reported by the parser; their members
        // are attached by name, so the first occurrence carries them all.
        if !placed_agents.insert(agent.name.as_str()) {
            continue;
        }
        let row = (placed_agents.len() - 1) as f64;
        let agent_y = config.agent_y_start + row * config.agent_y_spacing;
        let agent_id = builder.add_node(
            format!("agent-{}", agent.name),
            Position::new(config.agent_x, agent_y),
            NodeData::Agent(AgentData {
                label: agent.name.clone(),
                description: agent.description.clone(),
                version: agent.version.clone(),
                model: agent.model.as_ref().and_then(|m| m.name.clone()),
                provider: agent.model.as_ref().and_then(|m| m.provider.clone()),
            }),
        );

        for (i, tool) in parsed.tools_of(&agent.name).enumerate() {
            let tool_id = builder.add_node(
                format!("tool-{}-{}", agent.name, tool.name),
                Position::new(
                    config.agent_x + config.tool_x_offset,
                    agent_y + config.tool_y_offset + i as f64 * config.tool_y_spacing,
                ),
                NodeData::Tool(ToolData {
                    label: tool.name.clone(),
                    params: Some(tool.params.clone()),
                    returns: tool.return_type.clone(),
                    description: tool.description.clone(),
                }),
            );
            builder.add_edge(WorkflowEdge::between(tool_id, agent_id.clone()));
        }

        for (i, event) in parsed.events_of(&agent.name).enumerate() {
            let event_id = builder.add_node(
                format!("event-{}-{}", agent.name, event.name),
                Position::new(
                    config.agent_x + config.event_x_offset,
                    agent_y + config.event_y_offset + i as f64 * config.event_y_spacing,
                ),
                NodeData::Event(EventData {
                    label: event.name.clone(),
                    event_type: Some(event.event_type),
                }),
            );
            builder.add_edge(WorkflowEdge::between(agent_id.clone(), event_id));
        }

        if let Some(state) = parsed.state_of(&agent.name) {
            let state_id = builder.add_node(
                format!("state-{}", agent.name),
                Position::new(
                    config.agent_x + config.state_x_offset,
                    agent_y + config.state_y_offset,
                ),
                NodeData::State(StateData {
                    label: STATE_LABEL.to_string(),
                    fields: Some(state.fields.iter().map(ToString::to_string).collect()),
                }),
            );
            builder.add_edge(
                WorkflowEdge::between(agent_id.clone(), state_id).with_source_handle(STATE_HANDLE),
            );
        }
    }

    for (i, declared) in parsed.types.iter().enumerate() {
        builder.add_node(
            format!("type-{}", declared.name),
            Position::new(
                config.agent_x + config.type_x_offset,
                config.agent_y_start + i as f64 * config.type_y_spacing,
            ),
            NodeData::State(StateData {
                label: declared.name.clone(),
                fields: Some(declared.fields.iter().map(ToString::to_string).collect()),
            }),
        );
    }

    let graph = builder.finish();
    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "laid out workflow graph"
    );
    graph
}

/// Accumulates nodes and edges, keeping node ids unique.
#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
    // base id -> times seen
    seen: AHashMap<String, usize>,
}

impl GraphBuilder {
    /// Adds a node and returns the id it was given. A colliding id gets a
    /// numeric suffix: `tool-A-t`, `tool-A-t-2`, `tool-A-t-3`, ...
    fn add_node(&mut self, base_id: String, position: Position, data: NodeData) -> String {
        let count = self.seen.entry(base_id.clone()).or_insert(0);
        *count += 1;
        let id = if *count == 1 {
            base_id
        } else {
            format!("{}-{}", base_id, count)
        };
        self.nodes.push(WorkflowNode::new(id.clone(), position, data));
        id
    }

    fn add_edge(&mut self, edge: WorkflowEdge) {
        self.edges.push(edge);
    }

    fn finish(self) -> WorkflowGraph {
        WorkflowGraph::new(self.nodes, self.edges)
    }
}
