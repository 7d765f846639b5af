use crate::model::{StateField, TypeField};

/// One unclosed `{` in the document, tagged with what opened it.
#[derive(Debug, Clone)]
pub(super) enum Scope {
    Agent {
        name: String,
        line: usize,
    },
    /// `owner` is `None` for a state block found outside any agent; its fields
    /// are collected so braces balance, then dropped.
    State {
        owner: Option<String>,
        line: usize,
        column: usize,
        fields: Vec<StateField>,
    },
    Type {
        name: String,
        line: usize,
        column: usize,
        fields: Vec<TypeField>,
    },
    /// Any other brace pair: tool and handler bodies, `model { }`, nested code.
    Block {
        line: usize,
    },
}

impl Scope {
    pub(super) fn line(&self) -> usize {
        match self {
            Scope::Agent { line, .. }
            | Scope::State { line, .. }
            | Scope::Type { line, .. }
            | Scope::Block { line } => *line,
        }
    }

    pub(super) fn describe(&self) -> String {
        match self {
            Scope::Agent { name, .. } => format!("agent '{}'", name),
            Scope::State { .. } => "state block".to_string(),
            Scope::Type { name, .. } => format!("type '{}'", name),
            Scope::Block { .. } => "block".to_string(),
        }
    }
}

/// The stack of open scopes, innermost last.
#[derive(Debug, Default)]
pub(super) struct ScopeStack {
    frames: Vec<Scope>,
}

impl ScopeStack {
    pub(super) fn push(&mut self, scope: Scope) {
        self.frames.push(scope);
    }

    pub(super) fn pop(&mut self) -> Option<Scope> {
        self.frames.pop()
    }

    pub(super) fn top_mut(&mut self) -> Option<&mut Scope> {
        self.frames.last_mut()
    }

    /// Name of the innermost agent enclosing the current position.
    pub(super) fn enclosing_agent(&self) -> Option<&str> {
        self.frames.iter().rev().find_map(|scope| match scope {
            Scope::Agent { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Drains every still-open scope, innermost first.
    pub(super) fn drain_open(&mut self) -> impl Iterator<Item = Scope> + '_ {
        self.frames.drain(..).rev()
    }
}
