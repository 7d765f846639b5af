use crate::model::{NodeKind, WorkflowGraph, WorkflowNode};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

/// Members linked to one agent node, in edge order.
#[derive(Debug, Default, Clone)]
pub(crate) struct AgentLinks<'g> {
    pub tools: Vec<&'g str>,
    pub events: Vec<&'g str>,
    /// The last state node linked to the agent.
    pub state: Option<&'g str>,
}

/// Agent-centred view of a graph: which tools, events and state each agent owns.
///
/// Edges are read in both directions and classified by the type of the
/// non-agent endpoint, so `tool → agent` and `agent → tool` mean the same thing.
pub(crate) struct Adjacency<'g> {
    nodes: AHashMap<&'g str, &'g WorkflowNode>,
    links: AHashMap<&'g str, AgentLinks<'g>>,
}

impl<'g> Adjacency<'g> {
    pub fn build(graph: &'g WorkflowGraph) -> Self {
        let mut nodes: AHashMap<&str, &WorkflowNode> = AHashMap::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            // First node wins when ids collide.
            nodes.entry(node.id.as_str()).or_insert(node);
        }

        let mut links: AHashMap<&str, AgentLinks> = graph
            .nodes_of_kind(NodeKind::Agent)
            .map(|agent| (agent.id.as_str(), AgentLinks::default()))
            .collect();

        for edge in &graph.edges {
            let (Some(source), Some(target)) =
                (nodes.get(edge.source.as_str()), nodes.get(edge.target.as_str()))
            else {
                continue;
            };
            let (agent, member) = match (source.kind(), target.kind()) {
                (NodeKind::Agent, NodeKind::Agent) => continue,
                (NodeKind::Agent, _) => (*source, *target),
                (_, NodeKind::Agent) => (*target, *source),
                _ => continue,
            };
            let Some(entry) = links.get_mut(agent.id.as_str()) else {
                continue;
            };
            match member.kind() {
                NodeKind::Tool => entry.tools.push(member.id.as_str()),
                NodeKind::Event => entry.events.push(member.id.as_str()),
                NodeKind::State => entry.state = Some(member.id.as_str()),
                NodeKind::Agent => {}
            }
        }

        for entry in links.values_mut() {
            entry.tools = std::mem::take(&mut entry.tools).into_iter().unique().collect();
            entry.events = std::mem::take(&mut entry.events).into_iter().unique().collect();
        }

        Self { nodes, links }
    }

    pub fn node(&self, id: &str) -> Option<&'g WorkflowNode> {
        self.nodes.get(id).copied()
    }

    pub fn links(&self, agent_id: &str) -> Option<&AgentLinks<'g>> {
        self.links.get(agent_id)
    }

    /// Ids of every tool linked to at least one agent.
    pub fn linked_tools(&self) -> AHashSet<&'g str> {
        self.links.values().flat_map(|l| l.tools.iter().copied()).collect()
    }

    pub fn linked_events(&self) -> AHashSet<&'g str> {
        self.links.values().flat_map(|l| l.events.iter().copied()).collect()
    }

    /// Ids of the states actually emitted inside an agent.
    pub fn linked_states(&self) -> AHashSet<&'g str> {
        self.links.values().filter_map(|l| l.state).collect()
    }

    /// Agent ids each tool is linked to, for tools shared between agents.
    pub fn tool_owners(&self) -> AHashMap<&'g str, Vec<&'g str>> {
        let mut owners: AHashMap<&str, Vec<&str>> = AHashMap::new();
        for (agent, links) in &self.links {
            for tool in &links.tools {
                owners.entry(*tool).or_default().push(*agent);
            }
        }
        owners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgentData, NodeData, Position, StateData, ToolData, WorkflowEdge};

    fn agent(id: &str) -> WorkflowNode {
        WorkflowNode::new(
            id,
            Position::default(),
            NodeData::Agent(AgentData {
                label: id.to_string(),
                ..Default::default()
            }),
        )
    }

    fn tool(id: &str) -> WorkflowNode {
        WorkflowNode::new(
            id,
            Position::default(),
            NodeData::Tool(ToolData {
                label: id.to_string(),
                ..Default::default()
            }),
        )
    }

    fn state(id: &str) -> WorkflowNode {
        WorkflowNode::new(id, Position::default(), NodeData::State(StateData::default()))
    }

    #[test]
    fn test_edges_are_read_in_both_directions() {
        let graph = WorkflowGraph::new(
            vec![agent("a"), tool("t1"), tool("t2")],
            vec![WorkflowEdge::between("t1", "a"), WorkflowEdge::between("a", "t2")],
        );
        let adjacency = Adjacency::build(&graph);
        assert_eq!(adjacency.links("a").unwrap().tools, vec!["t1", "t2"]);
    }

    #[test]
    fn test_repeated_links_collapse_and_last_state_wins() {
        let graph = WorkflowGraph::new(
            vec![agent("a"), tool("t"), state("s1"), state("s2")],
            vec![
                WorkflowEdge::between("t", "a"),
                WorkflowEdge::between("a", "t"),
                WorkflowEdge::between("a", "s1"),
                WorkflowEdge::between("s2", "a"),
            ],
        );
        let adjacency = Adjacency::build(&graph);
        let links = adjacency.links("a").unwrap();
        assert_eq!(links.tools, vec!["t"]);
        assert_eq!(links.state, Some("s2"));
        assert!(!adjacency.linked_states().contains("s1"));
    }

    #[test]
    fn test_dangling_and_member_to_member_edges_ignored() {
        let graph = WorkflowGraph::new(
            vec![agent("a"), tool("t"), state("s")],
            vec![WorkflowEdge::between("t", "s"), WorkflowEdge::between("ghost", "a")],
        );
        let adjacency = Adjacency::build(&graph);
        assert!(adjacency.linked_tools().is_empty());
        assert!(adjacency.links("a").unwrap().state.is_none());
    }
}
