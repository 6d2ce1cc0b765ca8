//! Caller identity for the marketplace services.
//!
//! Authentication happens upstream: a gateway authorizer verifies the token
//! and forwards the caller as `X-User-ID` / `X-User-Role` headers. This module
//! turns those headers into an explicit [`Requester`] that is handed to the
//! service layer, so ownership checks never read HTTP state themselves.

mod errors;
mod identity;

pub use errors::AuthError;
pub use identity::{require_seller_role, Requester, Role, USER_ID_HEADER, USER_ROLE_HEADER};
