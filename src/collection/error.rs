//! Error types for the collection synchronizer.

use thiserror::Error;

use super::OpKind;
use crate::framework::FrameworkError;

/// Errors surfaced to callers of collection operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    /// The remote call failed. The same message is on the state.
    #[error("{0}")]
    Request(String),

    /// A newer request for the same slot was issued; this response was dropped.
    #[error("{op} response superseded by a newer request")]
    Superseded { op: OpKind },

    /// The dispatcher is gone.
    #[error("Collection store unavailable: {0}")]
    Dispatcher(#[from] FrameworkError),
}

impl SyncError {
    pub fn is_superseded(&self) -> bool {
        matches!(self, SyncError::Superseded { .. })
    }
}
