use crate::model::WorkflowGraph;
use std::fmt;

/// Sequence number of a sync the controller applied to one of the two views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Revision(pub u64);

impl Revision {
    pub(crate) fn next(self) -> Self {
        Revision(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Which representation a change happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Text,
    Graph,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Text => f.write_str("text"),
            Origin::Graph => f.write_str("graph"),
        }
    }
}

/// Who caused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// A user edit. Always synchronized to the other side.
    User,
    /// A view reporting the change it went through after applying the
    /// controller's update with this revision. Never synchronized.
    Echo(Revision),
    /// A view that cannot tell user edits from applied updates. The controller
    /// treats the change as an echo while the opposite direction is syncing.
    Untracked,
}

/// New content of one representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Text(String),
    Graph(WorkflowGraph),
}

impl Change {
    pub fn origin(&self) -> Origin {
        match self {
            Change::Text(_) => Origin::Text,
            Change::Graph(_) => Origin::Graph,
        }
    }
}

/// A change together with its provenance, as routed through the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub provenance: Provenance,
    pub change: Change,
}

impl ChangeEvent {
    pub fn new(provenance: Provenance, change: Change) -> Self {
        Self { provenance, change }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Provenance::User, Change::Text(text.into()))
    }

    pub fn user_graph(graph: WorkflowGraph) -> Self {
        Self::new(Provenance::User, Change::Graph(graph))
    }

    pub fn echo(revision: Revision, change: Change) -> Self {
        Self::new(Provenance::Echo(revision), change)
    }

    pub fn untracked(change: Change) -> Self {
        Self::new(Provenance::Untracked, change)
    }

    pub fn origin(&self) -> Origin {
        self.change.origin()
    }
}
