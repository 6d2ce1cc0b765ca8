// HTTP routes
pub mod health;
pub mod lands;
pub mod market;

pub use health::*;

use crate::common::Id;
use crate::server::error::ApiError;

/// Parse a UUID path segment, naming the entity in the 400 message.
pub(crate) fn parse_path_id<T>(raw: &str, entity: &str) -> Result<Id<T>, ApiError> {
    Id::parse(raw.trim()).map_err(|_| ApiError::bad_request(format!("invalid {} ID", entity)))
}
