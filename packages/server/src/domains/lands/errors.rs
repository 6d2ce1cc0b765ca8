use thiserror::Error;

#[derive(Error, Debug)]
pub enum LandError {
    /// Absent, or not owned by the requester's seller profile.
    #[error("land not found")]
    NotFound,

    /// The requester has no seller profile to own a land.
    #[error("unauthorized: seller profile not found")]
    SellerNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
