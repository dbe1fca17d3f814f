//! The external chat backend, seen from the client.
//!
//! The coordinators only talk to the `ChatBackend` trait; `HttpBackend` is the
//! real implementation and tests substitute in-memory fakes.

mod http;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthToken;

pub use http::HttpBackend;

/// Text used when a reply carries no usable message.
pub const FALLBACK_REPLY: &str = "I received your message. Thank you!";

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with a non-success status.
    #[error("{status} - {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A staged file could not be read before upload.
    #[error("could not read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// One outgoing chat message.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub text: &'a str,
    /// Current session id, empty when no session exists yet.
    pub session_id: &'a str,
    pub token: &'a AuthToken,
}

/// One file to upload into a session.
#[derive(Debug)]
pub struct PdfUpload<'a> {
    pub session_id: &'a str,
    pub token: &'a AuthToken,
    pub file_name: &'a str,
    pub content: Vec<u8>,
}

/// A chat reply. Fields the backend left out are `None`; the full body is
/// kept in `data`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatReply {
    pub response: Option<String>,
    pub message: Option<String>,
    pub session_id: Option<String>,
    pub data: Value,
}

impl ChatReply {
    /// Pull the known fields out of an arbitrary JSON body. Shapes that are
    /// not objects simply yield no fields.
    pub fn from_value(data: Value) -> Self {
        let field = |key: &str| data.get(key).and_then(Value::as_str).map(String::from);
        Self {
            response: field("response"),
            message: field("message"),
            session_id: field("session_id").or_else(|| field("sessionId")),
            data,
        }
    }

    /// Text to show: `response`, else `message`, else the generic
    /// acknowledgment. Empty strings count as absent.
    pub fn text(&self) -> &str {
        non_empty(self.response.as_deref())
            .or_else(|| non_empty(self.message.as_deref()))
            .unwrap_or(FALLBACK_REPLY)
    }

    /// Session id issued by the backend, if a non-empty one was sent.
    pub fn session_id(&self) -> Option<&str> {
        non_empty(self.session_id.as_deref())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Operations the coordinators need from the backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one chat message and return the parsed reply.
    async fn send_message(&self, request: ChatRequest<'_>) -> Result<ChatReply, BackendError>;

    /// Upload one PDF into a session and return the backend's payload.
    async fn upload_pdf(&self, upload: PdfUpload<'_>) -> Result<Value, BackendError>;
}
