//! Shared fixtures for tests: a live HTTP backend and a scripted fake.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use serde_json::Value;

use crate::backend::{BackendError, ChatBackend, ChatReply, ChatRequest, PdfUpload};
use crate::chat::SessionState;
use crate::models::Message;

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A chat call as the fake backend saw it.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub text: String,
    pub session_id: String,
    pub token: String,
    /// Transcript at the moment the request was issued.
    pub transcript: Vec<Message>,
    pub sending: bool,
}

/// An upload call as the fake backend saw it.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub session_id: String,
    pub token: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Scripted in-memory backend. Unscripted calls succeed with an empty body.
#[derive(Default)]
pub struct FakeBackend {
    replies: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    upload_results: Mutex<VecDeque<Result<Value, BackendError>>>,
    observed: Option<SessionState>,
    pub sent: Mutex<Vec<SentMessage>>,
    pub uploads: Mutex<Vec<UploadedFile>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `state` whenever a chat request arrives.
    pub fn observing(state: &SessionState) -> Self {
        Self {
            observed: Some(state.clone()),
            ..Self::default()
        }
    }

    pub fn reply(self, reply: Result<ChatReply, BackendError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn upload_result(self, result: Result<Value, BackendError>) -> Self {
        self.upload_results.lock().unwrap().push_back(result);
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<UploadedFile> {
        self.uploads.lock().unwrap().clone()
    }
}

/// Shorthand for a non-success status error.
pub fn status_error(status: u16, body: &str) -> BackendError {
    BackendError::Status {
        status,
        body: body.to_string(),
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn send_message(&self, request: ChatRequest<'_>) -> Result<ChatReply, BackendError> {
        let (transcript, sending) = self
            .observed
            .as_ref()
            .map_or_else(|| (Vec::new(), false), |s| (s.messages(), s.is_sending()));
        self.sent.lock().unwrap().push(SentMessage {
            text: request.text.to_string(),
            session_id: request.session_id.to_string(),
            token: request.token.as_str().to_string(),
            transcript,
            sending,
        });
        tokio::task::yield_now().await;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ChatReply::default()))
    }

    async fn upload_pdf(&self, upload: PdfUpload<'_>) -> Result<Value, BackendError> {
        self.uploads.lock().unwrap().push(UploadedFile {
            session_id: upload.session_id.to_string(),
            token: upload.token.as_str().to_string(),
            file_name: upload.file_name.to_string(),
            content: upload.content,
        });
        tokio::task::yield_now().await;
        self.upload_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }
}
