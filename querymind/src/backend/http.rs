//! `reqwest` implementation of the chat backend.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::models::PDF_CONTENT_TYPE;

use super::{BackendError, ChatBackend, ChatReply, ChatRequest, PdfUpload};

/// Talks to the chat and upload endpoints over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    chat_url: String,
    upload_base_url: String,
}

impl HttpBackend {
    pub fn new(chat_url: impl Into<String>, upload_base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), chat_url, upload_base_url)
    }

    pub fn with_client(
        client: reqwest::Client,
        chat_url: impl Into<String>,
        upload_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            chat_url: chat_url.into(),
            upload_base_url: upload_base_url.into(),
        }
    }

    /// `<upload base>/<session id>/upload-pdf`
    pub fn upload_url(&self, session_id: &str) -> String {
        format!(
            "{}/{}/upload-pdf",
            self.upload_base_url.trim_end_matches('/'),
            urlencoding::encode(session_id)
        )
    }
}

/// Turn a non-success response into `BackendError::Status`.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Parse a success body as JSON, degrading to `Null` when it is not.
async fn json_or_null(resp: reqwest::Response) -> Result<Value, BackendError> {
    let body = resp.text().await?;
    Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
        warn!(error = %e, "backend returned a non-JSON body");
        Value::Null
    }))
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_message(&self, request: ChatRequest<'_>) -> Result<ChatReply, BackendError> {
        debug!(url = %self.chat_url, session_id = request.session_id, "sending chat message");

        let resp = self
            .client
            .post(&self.chat_url)
            .bearer_auth(request.token.as_str())
            .json(&json!({
                "user_input": request.text,
                "session_id": request.session_id,
            }))
            .send()
            .await?;
        debug!(status = resp.status().as_u16(), "chat response");

        let resp = check_status(resp).await?;
        Ok(ChatReply::from_value(json_or_null(resp).await?))
    }

    async fn upload_pdf(&self, upload: PdfUpload<'_>) -> Result<Value, BackendError> {
        let url = self.upload_url(upload.session_id);
        debug!(
            %url,
            file = upload.file_name,
            size = upload.content.len(),
            "uploading PDF"
        );

        let part = Part::bytes(upload.content)
            .file_name(upload.file_name.to_string())
            .mime_str(PDF_CONTENT_TYPE)?;
        let resp = self
            .client
            .post(&url)
            .bearer_auth(upload.token.as_str())
            .header(ACCEPT, "application/json")
            .multipart(Form::new().part("file", part))
            .send()
            .await?;
        debug!(status = resp.status().as_u16(), "upload response");

        let resp = check_status(resp).await?;
        json_or_null(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthToken;
    use crate::testing::spawn_backend;
    use axum::{
        extract::{Multipart, Path},
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };

    fn token() -> AuthToken {
        AuthToken::new("tok-1").unwrap()
    }

    fn bearer(headers: &HeaderMap) -> String {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn upload_url_joins_base_and_session() {
        let backend = HttpBackend::new("http://x/chat", "http://x/sessions/");
        assert_eq!(backend.upload_url("s1"), "http://x/sessions/s1/upload-pdf");
        assert_eq!(
            backend.upload_url("a b"),
            "http://x/sessions/a%20b/upload-pdf"
        );
    }

    #[tokio::test]
    async fn send_message_posts_json_with_bearer() {
        let app = Router::new().route(
            "/chat",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(bearer(&headers), "Bearer tok-1");
                assert_eq!(body["user_input"], "hello");
                assert_eq!(body["session_id"], "");
                Json(json!({ "response": "hi", "session_id": "s1", "sources": [] }))
            }),
        );
        let base = spawn_backend(app).await;
        let backend = HttpBackend::new(format!("{base}/chat"), format!("{base}/sessions"));

        let token = token();
        let reply = backend
            .send_message(ChatRequest {
                text: "hello",
                session_id: "",
                token: &token,
            })
            .await
            .unwrap();
        assert_eq!(reply.text(), "hi");
        assert_eq!(reply.session_id(), Some("s1"));
        assert_eq!(reply.data["sources"], json!([]));
    }

    #[tokio::test]
    async fn send_message_maps_error_status() {
        let app = Router::new().route(
            "/chat",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model offline") }),
        );
        let base = spawn_backend(app).await;
        let backend = HttpBackend::new(format!("{base}/chat"), format!("{base}/sessions"));

        let token = token();
        let err = backend
            .send_message(ChatRequest {
                text: "hello",
                session_id: "s1",
                token: &token,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "500 - model offline");
    }

    #[tokio::test]
    async fn send_message_tolerates_non_json_body() {
        let app = Router::new().route("/chat", post(|| async { "plain text" }));
        let base = spawn_backend(app).await;
        let backend = HttpBackend::new(format!("{base}/chat"), format!("{base}/sessions"));

        let token = token();
        let reply = backend
            .send_message(ChatRequest {
                text: "hello",
                session_id: "",
                token: &token,
            })
            .await
            .unwrap();
        assert_eq!(reply.text(), crate::backend::FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn upload_sends_multipart_file_to_session_path() {
        let app = Router::new().route(
            "/sessions/{session_id}/upload-pdf",
            post(
                |Path(session_id): Path<String>, headers: HeaderMap, mut form: Multipart| async move {
                    assert_eq!(session_id, "s1");
                    assert_eq!(bearer(&headers), "Bearer tok-1");
                    let field = form.next_field().await.unwrap().unwrap();
                    assert_eq!(field.name(), Some("file"));
                    assert_eq!(field.file_name(), Some("a.pdf"));
                    assert_eq!(field.content_type(), Some("application/pdf"));
                    let bytes = field.bytes().await.unwrap();
                    Json(json!({ "pages": bytes.len() }))
                },
            ),
        );
        let base = spawn_backend(app).await;
        let backend = HttpBackend::new(format!("{base}/chat"), format!("{base}/sessions"));

        let token = token();
        let data = backend
            .upload_pdf(PdfUpload {
                session_id: "s1",
                token: &token,
                file_name: "a.pdf",
                content: b"%PDF-1.4".to_vec(),
            })
            .await
            .unwrap();
        assert_eq!(data["pages"], 8);
    }

    #[tokio::test]
    async fn upload_error_carries_body_text() {
        let app = Router::new().route(
            "/sessions/{session_id}/upload-pdf",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "not a pdf") }),
        );
        let base = spawn_backend(app).await;
        let backend = HttpBackend::new(format!("{base}/chat"), format!("{base}/sessions"));

        let token = token();
        let err = backend
            .upload_pdf(PdfUpload {
                session_id: "s1",
                token: &token,
                file_name: "a.pdf",
                content: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 422, .. }));
        assert_eq!(err.to_string(), "422 - not a pdf");
    }
}
