//! A file staged for upload but not yet sent.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content type accepted by the staging area.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A staged file reference awaiting upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpload {
    /// Identity of this staging entry (the same path may be staged twice).
    pub id: String,
    /// Display name, normally the file name.
    pub name: String,
    /// Location of the content on disk.
    pub path: PathBuf,
    /// Declared content type.
    pub content_type: String,
}

impl PendingUpload {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, content_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            path: path.into(),
            content_type: content_type.into(),
        }
    }

    /// Build a staging entry from a path, declaring its type from the extension.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
            .to_string();
        let content_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");
        Self::new(name, path, content_type)
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF_CONTENT_TYPE
    }
}
