//! Typed ID definitions for the marketplace entities.
//!
//! Marker types live in their own module so they never collide with the
//! model structs of the same name.

pub use super::id::Id;

pub mod marker {
    /// Platform user (the identity carried in `X-User-ID`).
    pub struct User;

    /// Seller profile wrapping a user.
    pub struct Seller;

    /// Registered land parcel.
    pub struct Land;

    /// Carbon credit batch issued against a land parcel.
    pub struct CarbonCredit;

    /// Credit listing offered on the marketplace.
    pub struct CreditListing;
}

pub type UserId = Id<marker::User>;
pub type SellerId = Id<marker::Seller>;
pub type LandId = Id<marker::Land>;
pub type CarbonCreditId = Id<marker::CarbonCredit>;
pub type ListingId = Id<marker::CreditListing>;
