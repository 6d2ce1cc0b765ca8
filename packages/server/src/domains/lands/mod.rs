//! Land registry: sellers, their land parcels and the carbon credits issued
//! against them.

pub mod errors;
pub mod models;
pub mod service;
pub mod types;

pub use errors::LandError;
pub use models::{CarbonCredit, Land, Seller};
pub use service::LandService;
pub use types::LandRequest;
