use serde::{Deserialize, Serialize};
use std::fmt;

use super::diagnostic::Diagnostic;

/// A 1-based line/column location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Model reference declared in an agent's `model { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelRef {
    pub provider: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAgent {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub model: Option<ModelRef>,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTool {
    pub name: String,
    /// Raw parameter list as written between the parentheses, trimmed.
    pub params: String,
    pub return_type: Option<String>,
    pub description: Option<String>,
    pub agent_name: String,
    pub position: SourcePosition,
}

/// Classification of an event handler, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Input,
    Output,
    Start,
    Stop,
    #[default]
    Custom,
}

impl EventType {
    /// Maps a handler name onto its event class. Unknown names are `Custom`.
    pub fn classify(name: &str) -> Self {
        match name {
            "user_message" | "message" => EventType::Input,
            "response" | "output" => EventType::Output,
            "start" | "init" => EventType::Start,
            "stop" | "shutdown" => EventType::Stop,
            _ => EventType::Custom,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Input => "input",
            EventType::Output => "output",
            EventType::Start => "start",
            EventType::Stop => "stop",
            EventType::Custom => "custom",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEvent {
    pub name: String,
    pub event_type: EventType,
    pub agent_name: String,
    pub position: SourcePosition,
}

/// A field of an agent `state` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub optional: bool,
}

impl fmt::Display for StateField {
    /// Renders the field the way it is written in a state block: `name?: type`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.optional { "?" } else { "" };
        write!(f, "{}{}: {}", self.name, marker, self.type_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedState {
    pub agent_name: String,
    pub fields: Vec<StateField>,
    pub position: SourcePosition,
}

/// A field of a top-level `type` declaration. Types have no optional marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl fmt::Display for TypeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.type_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedType {
    pub name: String,
    pub fields: Vec<TypeField>,
    pub position: SourcePosition,
}

/// Everything the parser extracted from one document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub agents: Vec<ParsedAgent>,
    pub tools: Vec<ParsedTool>,
    pub events: Vec<ParsedEvent>,
    pub states: Vec<ParsedState>,
    pub types: Vec<ParsedType>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    pub fn tools_of<'a>(&'a self, agent_name: &'a str) -> impl Iterator<Item = &'a ParsedTool> {
        self.tools.iter().filter(move |t| t.agent_name == agent_name)
    }

    pub fn events_of<'a>(
        &'a self,
        agent_name: &'a str,
    ) -> impl Iterator<Item = &'a ParsedEvent> {
        self.events.iter().filter(move |e| e.agent_name == agent_name)
    }

    /// The first state block declared for the agent.
    pub fn state_of(&self, agent_name: &str) -> Option<&ParsedState> {
        self.states.iter().find(|s| s.agent_name == agent_name)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// True when nothing at all was recognized.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
            && self.tools.is_empty()
            && self.events.is_empty()
            && self.states.is_empty()
            && self.types.is_empty()
    }
}
