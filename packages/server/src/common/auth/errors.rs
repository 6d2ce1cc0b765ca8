use thiserror::Error;

/// Failures while establishing who is calling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("unauthorized: user ID not provided")]
    MissingUserId,

    #[error("invalid user ID format")]
    MalformedUserId,

    #[error("unauthorized: seller role required")]
    SellerRoleRequired,
}
