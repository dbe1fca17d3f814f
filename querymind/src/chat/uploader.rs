//! Uploads every staged PDF into the current backend session, in order,
//! stopping at the first failure.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::auth::AuthToken;
use crate::backend::{BackendError, ChatBackend, PdfUpload};
use crate::models::{Message, PendingUpload};

use super::error::ChatError;
use super::state::{Activity, SessionState};

/// The file that stopped an upload run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub file: String,
    pub error: String,
}

/// Outcome of one upload run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Names of the files uploaded, in order.
    pub uploaded: Vec<String>,
    /// Set when the run stopped early.
    pub failure: Option<UploadFailure>,
}

impl UploadReport {
    pub const fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

pub struct UploadCoordinator<B> {
    state: SessionState,
    backend: Arc<B>,
}

impl<B: ChatBackend> UploadCoordinator<B> {
    pub const fn new(state: SessionState, backend: Arc<B>) -> Self {
        Self { state, backend }
    }

    /// Upload all staged files.
    ///
    /// Files go out one at a time in staging order. Each success appends a
    /// confirmation and removes that file from staging; the first failure
    /// appends an error and leaves it and every later file staged.
    pub async fn upload_all(&self, token: Option<&AuthToken>) -> Result<UploadReport, ChatError> {
        let staged = self.state.staged();
        if staged.is_empty() {
            return Err(ChatError::NothingStaged);
        }
        let token = token.ok_or(ChatError::MissingToken)?;
        let session_id = self.state.session_id().ok_or(ChatError::NoSession)?;
        let _busy = self.state.begin(Activity::Uploading)?;

        let mut report = UploadReport::default();
        let mut done = Vec::new();

        for file in &staged {
            match self.upload_one(file, &session_id, token).await {
                Ok(_) => {
                    info!(file = %file.name, %session_id, "PDF uploaded");
                    self.state.append_message(
                        Message::bot(format!("📄 PDF uploaded successfully: {}", file.name))
                            .with_attachments(vec![file.name.clone()]),
                    );
                    done.push(file.id.clone());
                    report.uploaded.push(file.name.clone());
                }
                Err(e) => {
                    warn!(file = %file.name, error = %e, "PDF upload failed");
                    self.state
                        .append_message(Message::bot(format!("❌ PDF upload failed: {e}")));
                    report.failure = Some(UploadFailure {
                        file: file.name.clone(),
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }

        self.state.remove_staged(&done);
        Ok(report)
    }

    async fn upload_one(
        &self,
        file: &PendingUpload,
        session_id: &str,
        token: &AuthToken,
    ) -> Result<Value, BackendError> {
        let content = tokio::fs::read(&file.path)
            .await
            .map_err(|source| BackendError::Read {
                name: file.name.clone(),
                source,
            })?;
        self.backend
            .upload_pdf(PdfUpload {
                session_id,
                token,
                file_name: &file.name,
                content,
            })
            .await
    }
}
