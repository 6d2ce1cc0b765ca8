pub mod listing;

pub use listing::{
    CreditDetails, CreditListing, LandDetails, ListingChanges, ListingDetails, ListingStatus,
    NewListing,
};
