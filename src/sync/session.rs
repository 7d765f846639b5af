use super::controller::{Document, Effect, SyncController, TimerId};
use super::event::{Change, ChangeEvent, Revision};
use super::transcoder::Transcoder;
use crate::error::SyncError;
use crate::model::{Diagnostic, WorkflowGraph};
use ahash::AHashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Content a view must display, pushed by a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncUpdate {
    Graph {
        revision: Revision,
        graph: WorkflowGraph,
        diagnostics: Vec<Diagnostic>,
    },
    Text {
        revision: Revision,
        text: String,
    },
}

impl SyncUpdate {
    pub fn revision(&self) -> Revision {
        match self {
            SyncUpdate::Graph { revision, .. } | SyncUpdate::Text { revision, .. } => *revision,
        }
    }
}

enum Command {
    Dispatch(ChangeEvent),
    Snapshot(oneshot::Sender<Document>),
    Close(oneshot::Sender<()>),
}

/// Cloneable handle to a running [`SyncSession`].
#[derive(Clone)]
pub struct SyncHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SyncHandle {
    pub fn dispatch(&self, event: ChangeEvent) -> Result<(), SyncError> {
        self.commands
            .send(Command::Dispatch(event))
            .map_err(|_| SyncError::Closed)
    }

    /// Reports a user edit in the text view.
    pub fn edit_text(&self, text: impl Into<String>) -> Result<(), SyncError> {
        self.dispatch(ChangeEvent::user_text(text))
    }

    /// Reports a user edit in the graph view.
    pub fn edit_graph(&self, graph: WorkflowGraph) -> Result<(), SyncError> {
        self.dispatch(ChangeEvent::user_graph(graph))
    }

    /// Reports the change a view went through while applying update `revision`.
    pub fn echo(&self, revision: Revision, change: Change) -> Result<(), SyncError> {
        self.dispatch(ChangeEvent::echo(revision, change))
    }

    pub async fn snapshot(&self) -> Result<Document, SyncError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(reply))
            .map_err(|_| SyncError::Closed)?;
        response.await.map_err(|_| SyncError::NoReply)
    }

    /// Closes the document, cancelling pending timers, and waits for the
    /// session task to stop.
    pub async fn close(&self) -> Result<(), SyncError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Close(reply))
            .map_err(|_| SyncError::Closed)?;
        response.await.map_err(|_| SyncError::NoReply)
    }
}

/// Runs a [`SyncController`] on a tokio task, executing its effects: updates
/// are sent to the views and timers become spawned sleep tasks.
///
/// The session stops on [`SyncHandle::close`] or when every handle is dropped;
/// either way its pending timers are aborted.
pub struct SyncSession<T> {
    controller: SyncController<T>,
    updates: mpsc::UnboundedSender<SyncUpdate>,
    fired: mpsc::UnboundedSender<TimerId>,
    timers: AHashMap<TimerId, JoinHandle<()>>,
}

impl<T: Transcoder + Send + 'static> SyncSession<T> {
    /// Spawns the session. Returns the handle for reporting changes and the
    /// stream of updates the views must apply.
    pub fn spawn(
        controller: SyncController<T>,
    ) -> (SyncHandle, mpsc::UnboundedReceiver<SyncUpdate>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();

        let session = SyncSession {
            controller,
            updates: updates_tx,
            fired: fired_tx,
            timers: AHashMap::new(),
        };
        tokio::spawn(session.run(commands_rx, fired_rx));

        (
            SyncHandle {
                commands: commands_tx,
            },
            updates_rx,
        )
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut fired: mpsc::UnboundedReceiver<TimerId>,
    ) {
        debug!("sync session started");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Dispatch(event)) => {
                        let effects = self.controller.dispatch(event);
                        self.execute(effects);
                    }
                    Some(Command::Snapshot(reply)) => {
                        let _ = reply.send(self.controller.document().clone());
                    }
                    Some(Command::Close(reply)) => {
                        self.shutdown();
                        let _ = reply.send(());
                        break;
                    }
                    None => {
                        self.shutdown();
                        break;
                    }
                },
                Some(timer) = fired.recv() => {
                    self.timers.remove(&timer);
                    let effects = self.controller.fire(timer);
                    self.execute(effects);
                }
            }
        }
        debug!("sync session stopped");
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ApplyGraph {
                    revision,
                    graph,
                    diagnostics,
                } => self.publish(SyncUpdate::Graph {
                    revision,
                    graph,
                    diagnostics,
                }),
                Effect::ApplyText { revision, text } => {
                    self.publish(SyncUpdate::Text { revision, text })
                }
                Effect::Schedule { timer, delay } => {
                    let fired = self.fired.clone();
                    let task = tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = fired.send(timer);
                    });
                    if let Some(previous) = self.timers.insert(timer, task) {
                        previous.abort();
                    }
                }
                Effect::Cancel(timer) => {
                    if let Some(task) = self.timers.remove(&timer) {
                        task.abort();
                    }
                }
            }
        }
    }

    fn publish(&self, update: SyncUpdate) {
        if self.updates.send(update).is_err() {
            trace!("no view is listening for updates");
        }
    }

    fn shutdown(&mut self) {
        let effects = self.controller.close();
        self.execute(effects);
        // Anything left was scheduled but never handed back to the controller.
        for (_, task) in self.timers.drain() {
            task.abort();
        }
    }
}
