//! Error types for the sync layer

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::zones::RejectionReason;

/// Result type for hub operations
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Submission failed admission; terminal for that submission
    #[error(transparent)]
    Rejected(#[from] RejectionReason),

    /// The hub actor has stopped
    #[error("Sync hub is not running")]
    HubUnavailable,

    /// Connection refused at capacity
    #[error("Connection limit reached ({0})")]
    TooManyConnections(usize),
}

impl<T> From<mpsc::error::SendError<T>> for SyncError {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        SyncError::HubUnavailable
    }
}

impl From<oneshot::error::RecvError> for SyncError {
    fn from(_: oneshot::error::RecvError) -> Self {
        SyncError::HubUnavailable
    }
}
