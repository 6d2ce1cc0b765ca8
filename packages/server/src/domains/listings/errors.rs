use thiserror::Error;

use crate::common::DeadlineExceeded;

/// Listing service failures. Each variant maps to exactly one HTTP status.
#[derive(Error, Debug)]
pub enum ListingError {
    /// Absent, or not visible to the requester. The two are deliberately
    /// indistinguishable.
    #[error("listing not found")]
    NotFound,

    /// The requester does not own the carbon credit being listed.
    #[error("unauthorized access")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("request timed out")]
    DeadlineExceeded,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DeadlineExceeded> for ListingError {
    fn from(_: DeadlineExceeded) -> Self {
        ListingError::DeadlineExceeded
    }
}
