//! Keeps the text and graph views of a document synchronized.
//!
//! Text edits are parsed and laid out immediately. Graph edits are debounced,
//! then regenerated into text, which replaces the editor content only when it
//! differs by more than whitespace. Each applied update carries a [`Revision`];
//! views report the change they go through while applying it as an echo, and
//! echoes never trigger another sync.

mod controller;
mod event;
mod session;
mod transcoder;

pub use controller::{
    DEFAULT_DEBOUNCE, DEFAULT_GRACE_WINDOW, Document, Effect, SyncConfig, SyncController,
    SyncControllerBuilder, SyncPhase, TimerId, TimerKind,
};
pub use event::{Change, ChangeEvent, Origin, Provenance, Revision};
pub use session::{SyncHandle, SyncSession, SyncUpdate};
pub use transcoder::{DslTranscoder, Transcoder};
