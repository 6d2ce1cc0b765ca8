// Business domains
pub mod lands;
pub mod listings;
