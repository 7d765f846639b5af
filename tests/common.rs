//! Common test utilities: sample SAG documents and graph builders.
use sagflow::prelude::*;
use sagflow::model::{AgentData, EventData, StateData, ToolData};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A complete document: model block, state, a tool with a real body, a handler
/// and a top-level type.
#[allow(dead_code)]
pub const WEATHER_SAG: &str = r#"agent WeatherAgent {
  description: "An agent that provides weather information"
  version: "1.0.0"

  model {
    provider: "anthropic"
    name: "claude-sonnet-4-20250514"
  }

  state {
    lastCity?: string
  }

  tool get_weather(city: string) -> WeatherData {
    description: "Get current weather for a city"
    let data = await http.get(`https://api.weather.com/${city}`)
    return data
  }

  on user_message {
    let weather = get_weather("San Francisco")
    emit response(weather)
  }
}

type WeatherData {
  temperature: number
  humidity: number
  description: string
}
"#;

/// One agent with a state block and one tool, nothing else.
#[allow(dead_code)]
pub const STATE_AND_TOOL_SAG: &str = r#"agent WeatherAgent {
  state {
    lastCity?: string
  }

  tool get_weather(city: string) -> WeatherData {
  }
}
"#;

#[allow(dead_code)]
pub fn agent_node(id: &str, label: &str) -> WorkflowNode {
    WorkflowNode::new(
        id,
        Position::default(),
        NodeData::Agent(AgentData {
            label: label.to_string(),
            ..Default::default()
        }),
    )
}

#[allow(dead_code)]
pub fn tool_node(id: &str, label: &str, params: &str, returns: Option<&str>) -> WorkflowNode {
    WorkflowNode::new(
        id,
        Position::default(),
        NodeData::Tool(ToolData {
            label: label.to_string(),
            params: Some(params.to_string()),
            returns: returns.map(str::to_string),
            description: None,
        }),
    )
}

#[allow(dead_code)]
pub fn event_node(id: &str, label: &str) -> WorkflowNode {
    WorkflowNode::new(
        id,
        Position::default(),
        NodeData::Event(EventData {
            label: label.to_string(),
            event_type: Some(EventType::classify(label)),
        }),
    )
}

#[allow(dead_code)]
pub fn state_node(id: &str, label: &str, fields: &[&str]) -> WorkflowNode {
    WorkflowNode::new(
        id,
        Position::default(),
        NodeData::State(StateData {
            label: label.to_string(),
            fields: Some(fields.iter().map(|f| f.to_string()).collect()),
        }),
    )
}

#[allow(dead_code)]
pub fn edge(source: &str, target: &str) -> WorkflowEdge {
    WorkflowEdge::between(source, target)
}

/// A graph with one agent per label, nothing else.
#[allow(dead_code)]
pub fn agents_graph(labels: &[&str]) -> WorkflowGraph {
    let nodes = labels
        .iter()
        .map(|label| agent_node(&format!("agent-{}", label), label))
        .collect();
    WorkflowGraph::new(nodes, Vec::new())
}

#[allow(dead_code)]
pub fn node_ids(graph: &WorkflowGraph) -> BTreeSet<String> {
    graph.nodes.iter().map(|n| n.id.clone()).collect()
}

#[allow(dead_code)]
pub fn edge_ids(graph: &WorkflowGraph) -> BTreeSet<String> {
    graph.edges.iter().map(|e| e.id.clone()).collect()
}

/// `(kind, label)` of every node, order-independent.
#[allow(dead_code)]
pub fn labels(graph: &WorkflowGraph) -> BTreeSet<(NodeKind, String)> {
    graph
        .nodes
        .iter()
        .map(|n| (n.kind(), n.label().to_string()))
        .collect()
}

/// Wraps the default transcoder and counts how often each direction runs.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct CountingTranscoder {
    inner: DslTranscoder,
    pub text_to_graph_calls: Arc<AtomicUsize>,
    pub graph_to_text_calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingTranscoder {
    pub fn generations(&self) -> usize {
        self.graph_to_text_calls.load(Ordering::SeqCst)
    }

    pub fn parses(&self) -> usize {
        self.text_to_graph_calls.load(Ordering::SeqCst)
    }
}

impl Transcoder for CountingTranscoder {
    fn text_to_graph(&self, text: &str) -> (WorkflowGraph, Vec<Diagnostic>) {
        self.text_to_graph_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.text_to_graph(text)
    }

    fn graph_to_text(&self, graph: &WorkflowGraph) -> String {
        self.graph_to_text_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.graph_to_text(graph)
    }
}
