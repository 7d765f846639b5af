use super::event::{Change, ChangeEvent, Origin, Provenance, Revision};
use super::transcoder::{DslTranscoder, Transcoder};
use crate::generator::code_equivalent;
use crate::model::{Diagnostic, WorkflowGraph};
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_GRACE_WINDOW: Duration = Duration::from_millis(50);

/// Which direction, if any, the controller is currently synchronizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    SyncingFromText,
    SyncingFromGraph,
}

impl SyncPhase {
    /// Whether an untracked change from `origin` is presumed to be an echo.
    fn suppresses(self, origin: Origin) -> bool {
        matches!(
            (self, origin),
            (SyncPhase::SyncingFromText, Origin::Graph) | (SyncPhase::SyncingFromGraph, Origin::Text)
        )
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPhase::Idle => f.write_str("idle"),
            SyncPhase::SyncingFromText => f.write_str("syncing-from-text"),
            SyncPhase::SyncingFromGraph => f.write_str("syncing-from-graph"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Defers graph → text regeneration until a burst of graph edits pauses.
    Debounce,
    /// Returns the controller to idle after a sync.
    Grace,
}

/// Identifies one scheduled timer. A fired timer whose token is no longer the
/// current one for its kind was superseded and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId {
    pub kind: TimerKind,
    pub token: u64,
}

/// Work the controller asks its host to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Replace the graph view's content.
    ApplyGraph {
        revision: Revision,
        graph: WorkflowGraph,
        diagnostics: Vec<Diagnostic>,
    },
    /// Replace the text view's content.
    ApplyText { revision: Revision, text: String },
    /// Call [`SyncController::fire`] with `timer` after `delay`.
    Schedule { timer: TimerId, delay: Duration },
    /// A previously scheduled timer must not fire.
    Cancel(TimerId),
}

/// Timer settings for [`SyncController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    pub debounce: Duration,
    pub grace_window: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            grace_window: DEFAULT_GRACE_WINDOW,
        }
    }
}

/// Snapshot of the document owned by a controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub text: String,
    pub graph: WorkflowGraph,
    /// Diagnostics from the last parse of user text.
    pub diagnostics: Vec<Diagnostic>,
    pub phase: SyncPhase,
    /// Revision of the last update the controller applied.
    pub revision: Revision,
    /// A graph edit is waiting for the debounce timer.
    pub regeneration_pending: bool,
}

/// Keeps a text view and a graph view of one document in step.
///
/// The controller is a synchronous state machine: every input returns the
/// [`Effect`]s the host must perform, including scheduling and cancelling
/// timers. [`SyncSession`](super::SyncSession) runs it on tokio.
pub struct SyncController<T = DslTranscoder> {
    transcoder: T,
    config: SyncConfig,
    document: Document,
    debounce: Option<TimerId>,
    grace: Option<TimerId>,
    next_token: u64,
    closed: bool,
}

pub struct SyncControllerBuilder<T = DslTranscoder> {
    transcoder: T,
    config: SyncConfig,
}

impl SyncControllerBuilder<DslTranscoder> {
    pub fn new() -> Self {
        Self {
            transcoder: DslTranscoder::default(),
            config: SyncConfig::default(),
        }
    }
}

impl Default for SyncControllerBuilder<DslTranscoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transcoder> SyncControllerBuilder<T> {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.config.debounce = debounce;
        self
    }

    pub fn with_grace_window(mut self, grace_window: Duration) -> Self {
        self.config.grace_window = grace_window;
        self
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_transcoder<U: Transcoder>(self, transcoder: U) -> SyncControllerBuilder<U> {
        SyncControllerBuilder {
            transcoder,
            config: self.config,
        }
    }

    pub fn build(self) -> SyncController<T> {
        SyncController::new(self.transcoder, self.config)
    }
}

impl SyncController<DslTranscoder> {
    pub fn builder() -> SyncControllerBuilder<DslTranscoder> {
        SyncControllerBuilder::new()
    }
}

impl<T: Transcoder> SyncController<T> {
    pub fn new(transcoder: T, config: SyncConfig) -> Self {
        Self {
            transcoder,
            config,
            document: Document::default(),
            debounce: None,
            grace: None,
            next_token: 0,
            closed: false,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn phase(&self) -> SyncPhase {
        self.document.phase
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Routes one change event. Echoes are dropped; untracked changes are
    /// dropped while the opposite direction is syncing; everything else is
    /// synchronized.
    pub fn dispatch(&mut self, event: ChangeEvent) -> Vec<Effect> {
        if self.closed {
            trace!(origin = %event.origin(), "document closed; change ignored");
            return Vec::new();
        }
        let origin = event.origin();
        match event.provenance {
            Provenance::Echo(revision) => {
                trace!(%origin, %revision, "echo ignored");
                return Vec::new();
            }
            Provenance::Untracked if self.document.phase.suppresses(origin) => {
                trace!(%origin, phase = %self.document.phase, "untracked change treated as echo");
                return Vec::new();
            }
            Provenance::User | Provenance::Untracked => {}
        }

        match event.change {
            Change::Text(text) => self.sync_from_text(text),
            Change::Graph(graph) => self.queue_regeneration(graph),
        }
    }

    /// Handles a timer the host scheduled. Superseded timers are ignored.
    pub fn fire(&mut self, timer: TimerId) -> Vec<Effect> {
        if self.closed {
            return Vec::new();
        }
        match timer.kind {
            TimerKind::Debounce if self.debounce == Some(timer) => {
                self.debounce = None;
                self.document.regeneration_pending = false;
                self.sync_from_graph()
            }
            TimerKind::Grace if self.grace == Some(timer) => {
                self.grace = None;
                trace!(phase = %self.document.phase, "grace window over");
                self.document.phase = SyncPhase::Idle;
                Vec::new()
            }
            _ => {
                trace!(?timer, "stale timer ignored");
                Vec::new()
            }
        }
    }

    /// Tears the document down. Pending timers are cancelled and all later
    /// input is ignored.
    pub fn close(&mut self) -> Vec<Effect> {
        if self.closed {
            return Vec::new();
        }
        self.closed = true;
        self.document.phase = SyncPhase::Idle;
        self.document.regeneration_pending = false;
        let effects: Vec<Effect> = [self.debounce.take(), self.grace.take()]
            .into_iter()
            .flatten()
            .map(Effect::Cancel)
            .collect();
        debug!(cancelled = effects.len(), "document closed");
        effects
    }

    fn sync_from_text(&mut self, text: String) -> Vec<Effect> {
        let mut effects = Vec::new();

        // The text edit is newer than any graph edit still waiting.
        if let Some(timer) = self.debounce.take() {
            effects.push(Effect::Cancel(timer));
            self.document.regeneration_pending = false;
        }

        self.document.phase = SyncPhase::SyncingFromText;
        let (graph, diagnostics) = self.transcoder.text_to_graph(&text);
        self.document.revision = self.document.revision.next();
        self.document.text = text;
        self.document.graph = graph.clone();
        self.document.diagnostics = diagnostics.clone();
        debug!(
            revision = %self.document.revision,
            nodes = graph.nodes.len(),
            diagnostics = diagnostics.len(),
            "synced text to graph"
        );
        effects.push(Effect::ApplyGraph {
            revision: self.document.revision,
            graph,
            diagnostics,
        });

        self.start_grace(&mut effects);
        effects
    }

    fn queue_regeneration(&mut self, graph: WorkflowGraph) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.document.graph = graph;
        self.document.regeneration_pending = true;

        if let Some(timer) = self.debounce.take() {
            effects.push(Effect::Cancel(timer));
        }
        let timer = self.timer(TimerKind::Debounce);
        self.debounce = Some(timer);
        effects.push(Effect::Schedule {
            timer,
            delay: self.config.debounce,
        });
        trace!(token = timer.token, "graph edit; regeneration debounced");
        effects
    }

    fn sync_from_graph(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.document.phase = SyncPhase::SyncingFromGraph;

        let text = self.transcoder.graph_to_text(&self.document.graph);
        if code_equivalent(&text, &self.document.text) {
            debug!("regenerated text is equivalent to the current text; not replaced");
        } else {
            self.document.revision = self.document.revision.next();
            self.document.text = text.clone();
            debug!(revision = %self.document.revision, bytes = text.len(), "synced graph to text");
            effects.push(Effect::ApplyText {
                revision: self.document.revision,
                text,
            });
        }

        self.start_grace(&mut effects);
        effects
    }

    fn start_grace(&mut self, effects: &mut Vec<Effect>) {
        if let Some(timer) = self.grace.take() {
            effects.push(Effect::Cancel(timer));
        }
        let timer = self.timer(TimerKind::Grace);
        self.grace = Some(timer);
        effects.push(Effect::Schedule {
            timer,
            delay: self.config.grace_window,
        });
    }

    fn timer(&mut self, kind: TimerKind) -> TimerId {
        self.next_token += 1;
        TimerId {
            kind,
            token: self.next_token,
        }
    }
}
