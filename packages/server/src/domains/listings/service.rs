//! Listing service: the seller-private and public operations over credit
//! listings.
//!
//! Every store call runs under the caller's [`ExecContext`]. Ownership is never
//! read from the listing itself; it is resolved by walking
//! listing -> credit -> land -> seller -> user inside the store.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use super::errors::ListingError;
use super::filter::FilterPredicate;
use super::models::{CreditListing, ListingChanges, ListingDetails, ListingStatus, NewListing};
use super::query::ListingQueryPlan;
use super::store::ListingStore;
use crate::common::{CarbonCreditId, ExecContext, ListingId, PageRequest, Requester};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub carbon_credits_id: CarbonCreditId,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_credit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub minimum_purchase: Decimal,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub maximum_purchase: Option<Decimal>,
    #[serde(default)]
    pub status: ListingStatus,
}

/// Full replacement of the mutable fields. Omitted fields reset to zero,
/// `null` or `draft`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateListingRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_credit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub minimum_purchase: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub maximum_purchase: Option<Decimal>,
    pub status: ListingStatus,
}

impl CreateListingRequest {
    pub fn validate(&self) -> Result<(), ListingError> {
        validate_terms(self.price_per_credit, self.minimum_purchase, self.maximum_purchase)
    }
}

impl UpdateListingRequest {
    pub fn validate(&self) -> Result<(), ListingError> {
        validate_terms(self.price_per_credit, self.minimum_purchase, self.maximum_purchase)
    }
}

/// Upper bound (exclusive) and scale of the `NUMERIC(10, 2)` listing columns.
// 100_000_000 (`Decimal::new` is not const).
const MAX_AMOUNT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);
const MAX_SCALE: u32 = 2;

fn validate_terms(
    price_per_credit: Decimal,
    minimum_purchase: Decimal,
    maximum_purchase: Option<Decimal>,
) -> Result<(), ListingError> {
    check_amount("pricePerCredit", price_per_credit)?;
    check_amount("minimumPurchase", minimum_purchase)?;
    if let Some(max) = maximum_purchase {
        check_amount("maximumPurchase", max)?;
        if max < minimum_purchase {
            return Err(ListingError::Validation(
                "maximumPurchase must be at least minimumPurchase".into(),
            ));
        }
    }
    Ok(())
}

fn check_amount(field: &str, value: Decimal) -> Result<(), ListingError> {
    if value < Decimal::ZERO {
        return Err(ListingError::Validation(format!(
            "{} must not be negative",
            field
        )));
    }
    if value >= MAX_AMOUNT {
        return Err(ListingError::Validation(format!(
            "{} must be less than {}",
            field, MAX_AMOUNT
        )));
    }
    if value.normalize().scale() > MAX_SCALE {
        return Err(ListingError::Validation(format!(
            "{} must have at most {} decimal places",
            field, MAX_SCALE
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn ListingStore>,
}

impl ListingService {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    pub async fn list_seller_listings(
        &self,
        ctx: &ExecContext,
        requester: &Requester,
        page: PageRequest,
    ) -> Result<Vec<ListingDetails>, ListingError> {
        let plan = ListingQueryPlan::seller_listings(requester.user_id, page);
        Ok(ctx.run(self.store.fetch(&plan)).await??)
    }

    /// Absent and not-owned are the same `NotFound`.
    pub async fn get_seller_listing(
        &self,
        ctx: &ExecContext,
        requester: &Requester,
        id: ListingId,
    ) -> Result<ListingDetails, ListingError> {
        let plan = ListingQueryPlan::seller_listing(requester.user_id, id);
        ctx.run(self.store.fetch(&plan))
            .await??
            .into_iter()
            .next()
            .ok_or(ListingError::NotFound)
    }

    pub async fn list_active_listings(
        &self,
        ctx: &ExecContext,
        filter: &FilterPredicate,
        page: PageRequest,
    ) -> Result<Vec<ListingDetails>, ListingError> {
        let plan = ListingQueryPlan::active_listings(filter, page);
        debug!(
            page = page.page(),
            limit = page.limit(),
            filtered = !filter.is_empty(),
            "listing active listings"
        );
        Ok(ctx.run(self.store.fetch(&plan)).await??)
    }

    /// Public lookup. Listings that are not active are reported as missing.
    pub async fn get_active_listing(
        &self,
        ctx: &ExecContext,
        id: ListingId,
    ) -> Result<ListingDetails, ListingError> {
        let plan = ListingQueryPlan::active_listing(id);
        ctx.run(self.store.fetch(&plan))
            .await??
            .into_iter()
            .next()
            .ok_or(ListingError::NotFound)
    }

    /// Fails with `Unauthorized` when the credit does not chain to the
    /// requester; nothing is written in that case.
    pub async fn create_listing(
        &self,
        ctx: &ExecContext,
        requester: &Requester,
        request: CreateListingRequest,
    ) -> Result<CreditListing, ListingError> {
        request.validate()?;

        let listing = NewListing {
            id: ListingId::new(),
            carbon_credits_id: request.carbon_credits_id,
            price_per_credit: request.price_per_credit,
            minimum_purchase: request.minimum_purchase,
            maximum_purchase: request.maximum_purchase,
            status: request.status,
            created_at: Utc::now(),
        };

        let created = ctx
            .run(self.store.insert_if_owned(requester.user_id, listing))
            .await??
            .ok_or(ListingError::Unauthorized)?;

        info!(
            listing_id = %created.id,
            user_id = %requester.user_id,
            credit_id = %created.carbon_credits_id,
            "listing created"
        );
        Ok(created)
    }

    pub async fn update_listing(
        &self,
        ctx: &ExecContext,
        requester: &Requester,
        id: ListingId,
        request: UpdateListingRequest,
    ) -> Result<CreditListing, ListingError> {
        request.validate()?;

        let changes = ListingChanges {
            price_per_credit: request.price_per_credit,
            minimum_purchase: request.minimum_purchase,
            maximum_purchase: request.maximum_purchase,
            status: request.status,
            updated_at: Utc::now(),
        };

        let updated = ctx
            .run(self.store.update_if_owned(requester.user_id, id, changes))
            .await??
            .ok_or(ListingError::NotFound)?;

        info!(
            listing_id = %id,
            user_id = %requester.user_id,
            status = %updated.status,
            "listing updated"
        );
        Ok(updated)
    }

    pub async fn delete_listing(
        &self,
        ctx: &ExecContext,
        requester: &Requester,
        id: ListingId,
    ) -> Result<(), ListingError> {
        let deleted = ctx
            .run(self.store.delete_if_owned(requester.user_id, id))
            .await??;
        if deleted == 0 {
            return Err(ListingError::NotFound);
        }

        info!(listing_id = %id, user_id = %requester.user_id, "listing deleted");
        Ok(())
    }
}
