//! Chat session coordination: conversation state, message dispatch, and
//! PDF upload.

mod dispatcher;
mod error;
mod state;
mod uploader;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::auth::AuthToken;
use crate::backend::ChatBackend;
use crate::models::{Message, PendingUpload};

pub use dispatcher::{Delivery, MessageDispatcher};
pub use error::ChatError;
pub use state::{Activity, InFlight, SessionState, StateEvent};
pub use uploader::{UploadCoordinator, UploadFailure, UploadReport};

/// First bot message of an interactive conversation.
pub const GREETING: &str = "Hello! I'm your AI assistant. You can send me messages and upload PDF files. How can I help you today?";

/// One conversation: shared state plus the dispatcher and uploader bound to it.
pub struct Conversation<B> {
    state: SessionState,
    dispatcher: MessageDispatcher<B>,
    uploader: UploadCoordinator<B>,
}

impl<B: ChatBackend> Conversation<B> {
    pub fn new(backend: B) -> Self {
        Self::from_state(SessionState::new(), backend)
    }

    /// Create a conversation whose state changes are reported on the returned
    /// receiver.
    pub fn with_events(backend: B) -> (Self, mpsc::UnboundedReceiver<StateEvent>) {
        let (state, events) = SessionState::with_events();
        (Self::from_state(state, backend), events)
    }

    fn from_state(state: SessionState, backend: B) -> Self {
        let backend = Arc::new(backend);
        Self {
            dispatcher: MessageDispatcher::new(state.clone(), backend.clone()),
            uploader: UploadCoordinator::new(state.clone(), backend),
            state,
        }
    }

    /// Append the greeting message.
    pub fn greet(&self) {
        self.state.append_message(Message::bot(GREETING));
    }

    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    pub async fn send(&self, text: &str, token: Option<&AuthToken>) -> Result<Delivery, ChatError> {
        self.dispatcher.send(text, token).await
    }

    pub async fn upload(&self, token: Option<&AuthToken>) -> Result<UploadReport, ChatError> {
        self.uploader.upload_all(token).await
    }

    /// Stage files from disk. Non-PDF paths are dropped; returns how many
    /// were accepted.
    pub fn stage_paths<P: AsRef<Path>>(&self, paths: impl IntoIterator<Item = P>) -> usize {
        self.state.stage_files(
            paths
                .into_iter()
                .map(|p| PendingUpload::from_path(p.as_ref())),
        )
    }

    pub fn unstage(&self, index: usize) -> Option<PendingUpload> {
        self.state.unstage_file(index)
    }
}
