// Common types and utilities shared across both services

pub mod auth;
pub mod context;
pub mod entity_ids;
pub mod id;
pub mod pagination;

pub use auth::{AuthError, Requester, Role};
pub use context::{DeadlineExceeded, ExecContext};
pub use entity_ids::*;
pub use id::Id;
pub use pagination::{PageQuery, PageRequest};
