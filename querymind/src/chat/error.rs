//! Precondition failures raised before any network call.

use thiserror::Error;

use super::state::Activity;

/// Why a send or upload was refused. Nothing was appended to the transcript
/// and no request was issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Please login first")]
    MissingToken,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("No PDF files selected")]
    NothingStaged,

    #[error("Please start a conversation first by sending a message")]
    NoSession,

    #[error("A {0} is already in progress")]
    Busy(Activity),
}
