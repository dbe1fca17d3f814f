//! Conversation state: the transcript, the backend session id, staged files,
//! and the busy flags for sending and uploading.
//!
//! `SessionState` is a cheap handle; clones share the same state. Every
//! mutation is reported on the optional event channel so a front end can
//! redraw.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::models::{Message, PendingUpload};

use super::error::ChatError;

/// Work that holds a busy flag while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Sending,
    Uploading,
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sending => write!(f, "message send"),
            Self::Uploading => write!(f, "PDF upload"),
        }
    }
}

/// Change notification emitted after every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// A message was appended to the transcript.
    MessageAppended(Message),
    /// The backend session id was set or replaced.
    SessionChanged(String),
    /// The staging set changed; carries the new contents.
    StagingChanged(Vec<PendingUpload>),
    /// A busy flag was raised or lowered.
    BusyChanged { activity: Activity, busy: bool },
}

#[derive(Debug, Default)]
struct Inner {
    messages: Vec<Message>,
    session_id: Option<String>,
    staged: Vec<PendingUpload>,
    sending: bool,
    uploading: bool,
}

impl Inner {
    fn flag_mut(&mut self, activity: Activity) -> &mut bool {
        match activity {
            Activity::Sending => &mut self.sending,
            Activity::Uploading => &mut self.uploading,
        }
    }
}

/// Single source of truth for one conversation.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<Mutex<Inner>>,
    events: Option<mpsc::UnboundedSender<StateEvent>>,
}

impl SessionState {
    /// Create an empty state with no event channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty state together with a receiver for change events.
    pub fn with_events() -> (Self, mpsc::UnboundedReceiver<StateEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Self {
            inner: Arc::default(),
            events: Some(tx),
        };
        (state, rx)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Report a change. Callers hold the `Inner` lock so events arrive in
    /// the same order as the mutations they describe.
    fn emit(&self, event: StateEvent) {
        if let Some(ref tx) = self.events {
            // The receiver going away just means nobody is rendering.
            let _ = tx.send(event);
        }
    }

    /// Append a message to the end of the transcript.
    pub fn append_message(&self, message: Message) {
        let mut inner = self.lock();
        inner.messages.push(message.clone());
        self.emit(StateEvent::MessageAppended(message));
    }

    /// Set the backend session id. Returns `true` if the value changed.
    ///
    /// Empty ids are ignored so an established session is never cleared.
    pub fn set_session_id(&self, id: &str) -> bool {
        if id.is_empty() {
            return false;
        }
        let mut inner = self.lock();
        if inner.session_id.as_deref() == Some(id) {
            return false;
        }
        inner.session_id = Some(id.to_string());
        self.emit(StateEvent::SessionChanged(id.to_string()));
        true
    }

    /// Stage files for upload, keeping only PDFs in their original order.
    /// Returns how many were accepted.
    pub fn stage_files(&self, files: impl IntoIterator<Item = PendingUpload>) -> usize {
        let accepted: Vec<_> = files.into_iter().filter(PendingUpload::is_pdf).collect();
        if accepted.is_empty() {
            return 0;
        }
        let count = accepted.len();
        let mut inner = self.lock();
        inner.staged.extend(accepted);
        self.emit(StateEvent::StagingChanged(inner.staged.clone()));
        count
    }

    /// Remove the staged file at `index`. Out-of-range indices are a no-op.
    pub fn unstage_file(&self, index: usize) -> Option<PendingUpload> {
        let mut inner = self.lock();
        if index >= inner.staged.len() {
            return None;
        }
        let removed = inner.staged.remove(index);
        self.emit(StateEvent::StagingChanged(inner.staged.clone()));
        Some(removed)
    }

    /// Drop the staging entries with the given ids.
    pub(crate) fn remove_staged(&self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        let mut inner = self.lock();
        inner.staged.retain(|f| !ids.contains(&f.id));
        self.emit(StateEvent::StagingChanged(inner.staged.clone()));
    }

    /// Raise the busy flag for `activity`, failing if it is already raised.
    /// The flag is lowered when the returned guard is dropped.
    pub fn begin(&self, activity: Activity) -> Result<InFlight, ChatError> {
        let mut inner = self.lock();
        let flag = inner.flag_mut(activity);
        if *flag {
            return Err(ChatError::Busy(activity));
        }
        *flag = true;
        self.emit(StateEvent::BusyChanged {
            activity,
            busy: true,
        });
        drop(inner);
        Ok(InFlight {
            state: self.clone(),
            activity,
        })
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn session_id(&self) -> Option<String> {
        self.lock().session_id.clone()
    }

    pub fn staged(&self) -> Vec<PendingUpload> {
        self.lock().staged.clone()
    }

    pub fn is_sending(&self) -> bool {
        self.lock().sending
    }

    pub fn is_uploading(&self) -> bool {
        self.lock().uploading
    }
}

/// Holds a busy flag raised; lowers it on drop, whatever the outcome.
#[derive(Debug)]
pub struct InFlight {
    state: SessionState,
    activity: Activity,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut inner = self.state.lock();
        *inner.flag_mut(self.activity) = false;
        self.state.emit(StateEvent::BusyChanged {
            activity: self.activity,
            busy: false,
        });
    }
}
