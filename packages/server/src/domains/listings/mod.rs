//! Carbon credit listings: the marketplace query and mutation engine.

pub mod errors;
pub mod filter;
pub mod models;
pub mod query;
pub mod service;
pub mod store;
pub mod testing;

pub use errors::ListingError;
pub use filter::{FilterPredicate, FilterQuery};
pub use models::{CreditListing, ListingDetails, ListingStatus};
pub use query::ListingQueryPlan;
pub use service::{CreateListingRequest, ListingService, UpdateListingRequest};
pub use store::{ListingStore, PgListingStore};
pub use testing::MemoryListingStore;
