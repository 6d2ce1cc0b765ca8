use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::{CarbonCreditId, ListingId};
use crate::domains::lands::models::{CarbonCredit, Land, Seller};

/// Listing lifecycle. Only `Active` listings are publicly discoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Draft,
    Active,
    Closed,
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingStatus::Draft => write!(f, "draft"),
            ListingStatus::Active => write!(f, "active"),
            ListingStatus::Closed => write!(f, "closed"),
        }
    }
}

/// A slice of one carbon credit batch offered for sale.
///
/// There is no seller column: ownership is derived by walking
/// listing -> credit -> land -> seller -> user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CreditListing {
    pub id: ListingId,
    pub carbon_credits_id: CarbonCreditId,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_credit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub minimum_purchase: Decimal,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub maximum_purchase: Option<Decimal>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing with its credit, the credit's land and the land's seller loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetails {
    #[serde(flatten)]
    pub listing: CreditListing,
    pub carbon_credit: CreditDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditDetails {
    #[serde(flatten)]
    pub credit: CarbonCredit,
    pub land: LandDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandDetails {
    #[serde(flatten)]
    pub land: Land,
    pub seller: Seller,
}

/// Row to insert once ownership of the credit has been confirmed.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub id: ListingId,
    pub carbon_credits_id: CarbonCreditId,
    pub price_per_credit: Decimal,
    pub minimum_purchase: Decimal,
    pub maximum_purchase: Option<Decimal>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
}

/// Full overwrite of the mutable listing fields.
#[derive(Debug, Clone)]
pub struct ListingChanges {
    pub price_per_credit: Decimal,
    pub minimum_purchase: Decimal,
    pub maximum_purchase: Option<Decimal>,
    pub status: ListingStatus,
    pub updated_at: DateTime<Utc>,
}

impl ListingChanges {
    pub fn apply_to(&self, listing: &mut CreditListing) {
        listing.price_per_credit = self.price_per_credit;
        listing.minimum_purchase = self.minimum_purchase;
        listing.maximum_purchase = self.maximum_purchase;
        listing.status = self.status;
        listing.updated_at = self.updated_at;
    }
}
