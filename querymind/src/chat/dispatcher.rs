//! Sends one user message and records the outcome in the transcript.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::AuthToken;
use crate::backend::{ChatBackend, ChatRequest};
use crate::models::Message;

use super::error::ChatError;
use super::state::{Activity, SessionState};

/// Bot message appended after a send, tagged by outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The backend answered; carries the reply message.
    Replied(Message),
    /// The call failed; carries the error message shown in the transcript.
    Failed(Message),
}

impl Delivery {
    pub const fn message(&self) -> &Message {
        match self {
            Self::Replied(m) | Self::Failed(m) => m,
        }
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

pub struct MessageDispatcher<B> {
    state: SessionState,
    backend: Arc<B>,
}

impl<B: ChatBackend> MessageDispatcher<B> {
    pub const fn new(state: SessionState, backend: Arc<B>) -> Self {
        Self { state, backend }
    }

    /// Send `text` to the backend.
    ///
    /// The user message is appended before the request goes out. Backend
    /// failures become a bot error message; only precondition failures are
    /// returned as `Err`, and in that case nothing is appended.
    pub async fn send(&self, text: &str, token: Option<&AuthToken>) -> Result<Delivery, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let token = token.ok_or(ChatError::MissingToken)?;
        let _busy = self.state.begin(Activity::Sending)?;

        self.state.append_message(Message::user(text));
        let session_id = self.state.session_id().unwrap_or_default();

        let result = self
            .backend
            .send_message(ChatRequest {
                text,
                session_id: &session_id,
                token,
            })
            .await;

        let delivery = match result {
            Ok(reply) => {
                if let Some(id) = reply.session_id() {
                    if self.state.set_session_id(id) {
                        info!(session_id = id, "backend session changed");
                    }
                }
                Delivery::Replied(Message::bot(reply.text()))
            }
            Err(e) => {
                warn!(error = %e, "chat message failed");
                Delivery::Failed(Message::bot(format!("Sorry, I encountered an error: {e}")))
            }
        };
        self.state.append_message(delivery.message().clone());
        Ok(delivery)
    }
}
