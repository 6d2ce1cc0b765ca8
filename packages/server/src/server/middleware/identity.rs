use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::common::auth::require_seller_role;
use crate::common::Requester;
use crate::server::error::ApiError;

/// Caller with the seller role and a well-formed user id.
#[derive(Debug, Clone, Copy)]
pub struct SellerIdentity(pub Requester);

/// Caller with the seller role; the user id is not required.
#[derive(Debug, Clone, Copy)]
pub struct SellerRole;

#[async_trait]
impl<S> FromRequestParts<S> for SellerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let requester = Requester::seller_from_headers(&parts.headers)?;
        tracing::debug!(user_id = %requester.user_id, "seller identified");
        Ok(SellerIdentity(requester))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SellerRole
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_seller_role(&parts.headers)?;
        Ok(SellerRole)
    }
}
