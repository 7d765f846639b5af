use crate::error::GraphError;
use crate::model::entity::EventType;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Canvas coordinates of a node's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The four node types the graph editor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Agent,
    Tool,
    Event,
    State,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Agent => "agent",
            NodeKind::Tool => "tool",
            NodeKind::Event => "event",
            NodeKind::State => "state",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgentData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Model name, e.g. `claude-sonnet-4-20250514`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateData {
    pub label: String,
    /// Field declarations as written, e.g. `lastCity?: string`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

/// Type-tagged node payload. The variant decides the node's `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Agent(AgentData),
    Tool(ToolData),
    Event(EventData),
    State(StateData),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Agent(_) => NodeKind::Agent,
            NodeData::Tool(_) => NodeKind::Tool,
            NodeData::Event(_) => NodeKind::Event,
            NodeData::State(_) => NodeKind::State,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            NodeData::Agent(d) => &d.label,
            NodeData::Tool(d) => &d.label,
            NodeData::Event(d) => &d.label,
            NodeData::State(d) => &d.label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct WorkflowNode {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, position: Position, data: NodeData) -> Self {
        Self {
            id: id.into(),
            position,
            data,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn label(&self) -> &str {
        self.data.label()
    }
}

impl Serialize for WorkflowNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut node = serializer.serialize_struct("WorkflowNode", 4)?;
        node.serialize_field("id", &self.id)?;
        node.serialize_field("type", self.kind().as_str())?;
        node.serialize_field("position", &self.position)?;
        match &self.data {
            NodeData::Agent(d) => node.serialize_field("data", d)?,
            NodeData::Tool(d) => node.serialize_field("data", d)?,
            NodeData::Event(d) => node.serialize_field("data", d)?,
            NodeData::State(d) => node.serialize_field("data", d)?,
        }
        node.end()
    }
}

// Wire shape used by the graph editor. `data` is decoded once `type` is known.
#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    data: serde_json::Value,
}

impl TryFrom<RawNode> for WorkflowNode {
    type Error = GraphError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let invalid = |e: serde_json::Error| GraphError::InvalidNodeData {
            node_id: raw.id.clone(),
            message: e.to_string(),
        };
        let data = match raw.node_type.as_str() {
            "agent" => NodeData::Agent(serde_json::from_value(raw.data.clone()).map_err(invalid)?),
            "tool" => NodeData::Tool(serde_json::from_value(raw.data.clone()).map_err(invalid)?),
            "event" => NodeData::Event(serde_json::from_value(raw.data.clone()).map_err(invalid)?),
            "state" => NodeData::State(serde_json::from_value(raw.data.clone()).map_err(invalid)?),
            other => {
                return Err(GraphError::UnknownNodeType {
                    node_id: raw.id.clone(),
                    type_name: other.to_string(),
                });
            }
        };
        Ok(WorkflowNode {
            id: raw.id,
            position: raw.position,
            data,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl WorkflowEdge {
    /// Creates an edge with the conventional `edge-<source>-<target>` id.
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("edge-{}-{}", source, target),
            source,
            target,
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_source_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    /// Whether this edge touches `node_id` at either end.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// A complete node/edge collection as shown by the graph editor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowGraph {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
}

impl WorkflowGraph {
    pub fn new(nodes: Vec<WorkflowNode>, edges: Vec<WorkflowEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Decodes the graph editor's JSON document.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        serde_json::from_str(json).map_err(GraphError::from)
    }

    pub fn to_json_pretty(&self) -> Result<String, GraphError> {
        serde_json::to_string_pretty(self).map_err(GraphError::from)
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &WorkflowNode> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_wire_shape() {
        let node = WorkflowNode::new(
            "event-Bot-user_message",
            Position::new(550.0, 70.0),
            NodeData::Event(EventData {
                label: "user_message".to_string(),
                event_type: Some(EventType::Input),
            }),
        );
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "event-Bot-user_message",
                "type": "event",
                "position": { "x": 550.0, "y": 70.0 },
                "data": { "label": "user_message", "eventType": "input" }
            })
        );
    }

    #[test]
    fn test_unknown_node_type_rejected() {
        let raw = json!({ "id": "n1", "type": "router", "position": { "x": 0, "y": 0 }, "data": { "label": "x" } });
        let err = serde_json::from_value::<WorkflowNode>(raw).unwrap_err();
        assert!(err.to_string().contains("router"));
    }

    #[test]
    fn test_edge_handles_use_camel_case() {
        let edge = WorkflowEdge::between("agent-A", "state-A").with_source_handle("state");
        let value = serde_json::to_value(&edge).unwrap();
        assert_eq!(value["sourceHandle"], "state");
        assert!(value.get("targetHandle").is_none());
        assert_eq!(value["id"], "edge-agent-A-state-A");
    }
}
