//! Data models for the chat transcript and staged uploads.

mod message;
mod upload;

pub use message::{Message, Sender};
pub use upload::{PendingUpload, PDF_CONTENT_TYPE};
