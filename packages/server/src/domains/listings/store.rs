//! Storage seam for the listing service.
//!
//! [`ListingStore`] is the relational query interface the service consumes.
//! Ownership-guarded mutations are single store calls so each implementation
//! can make the check and the write atomic.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use super::models::{
    CreditDetails, CreditListing, LandDetails, ListingChanges, ListingDetails, NewListing,
};
use super::query::ListingQueryPlan;
use crate::common::{CarbonCreditId, LandId, ListingId, SellerId, UserId};
use crate::domains::lands::models::{CarbonCredit, Land, Seller};

#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Runs a read plan and eagerly loads each listing's credit, land and
    /// seller. Result order follows the plan.
    async fn fetch(&self, plan: &ListingQueryPlan) -> Result<Vec<ListingDetails>>;

    /// Inserts `listing` only if its carbon credit chains to a seller owned
    /// by `owner`. `None` means the ownership check failed and nothing was
    /// written.
    async fn insert_if_owned(
        &self,
        owner: UserId,
        listing: NewListing,
    ) -> Result<Option<CreditListing>>;

    /// Overwrites a listing owned by `owner`. `None` when no listing matches
    /// both the id and the ownership chain.
    async fn update_if_owned(
        &self,
        owner: UserId,
        id: ListingId,
        changes: ListingChanges,
    ) -> Result<Option<CreditListing>>;

    /// Deletes a listing owned by `owner`, returning the rows removed.
    async fn delete_if_owned(&self, owner: UserId, id: ListingId) -> Result<u64>;
}

// =============================================================================
// Postgres
// =============================================================================

pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn fetch(&self, plan: &ListingQueryPlan) -> Result<Vec<ListingDetails>> {
        let mut tx = self.pool.begin().await?;

        // One snapshot for the page and its includes.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut query = plan.to_query();
        let listings = query
            .build_query_as::<CreditListing>()
            .fetch_all(&mut *tx)
            .await?;

        let details = load_details(&mut *tx, listings).await?;
        tx.commit().await?;
        Ok(details)
    }

    async fn insert_if_owned(
        &self,
        owner: UserId,
        listing: NewListing,
    ) -> Result<Option<CreditListing>> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query_scalar::<_, CarbonCreditId>(
            r#"
            SELECT cc.id
            FROM carbon_credits cc
            INNER JOIN lands l ON cc.land_id = l.id
            INNER JOIN sellers s ON l.owner_id = s.id
            WHERE cc.id = $1 AND s.user_id = $2
            FOR SHARE
            "#,
        )
        .bind(listing.carbon_credits_id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            debug!(
                credit_id = %listing.carbon_credits_id,
                user_id = %owner,
                "carbon credit does not chain to requester"
            );
            return Ok(None);
        }

        let created = sqlx::query_as::<_, CreditListing>(
            r#"
            INSERT INTO credit_listings (
                id, carbon_credits_id, price_per_credit, minimum_purchase,
                maximum_purchase, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(listing.id)
        .bind(listing.carbon_credits_id)
        .bind(listing.price_per_credit)
        .bind(listing.minimum_purchase)
        .bind(listing.maximum_purchase)
        .bind(listing.status)
        .bind(listing.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(created))
    }

    async fn update_if_owned(
        &self,
        owner: UserId,
        id: ListingId,
        changes: ListingChanges,
    ) -> Result<Option<CreditListing>> {
        let mut tx = self.pool.begin().await?;

        // Resolve through the chain and hold the row until commit.
        let mut query = ListingQueryPlan::seller_listing(owner, id)
            .for_update()
            .to_query();
        let current = query
            .build_query_as::<CreditListing>()
            .fetch_optional(&mut *tx)
            .await?;

        if current.is_none() {
            return Ok(None);
        }

        let updated = sqlx::query_as::<_, CreditListing>(
            r#"
            UPDATE credit_listings SET
                price_per_credit = $2,
                minimum_purchase = $3,
                maximum_purchase = $4,
                status = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.price_per_credit)
        .bind(changes.minimum_purchase)
        .bind(changes.maximum_purchase)
        .bind(changes.status)
        .bind(changes.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_if_owned(&self, owner: UserId, id: ListingId) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM credit_listings cl
            USING carbon_credits cc, lands l, sellers s
            WHERE cl.carbon_credits_id = cc.id
              AND cc.land_id = l.id
              AND l.owner_id = s.id
              AND cl.id = $1
              AND s.user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Batch-load the chain for a page of listings (one query per table).
async fn load_details(
    conn: &mut PgConnection,
    listings: Vec<CreditListing>,
) -> Result<Vec<ListingDetails>> {
    if listings.is_empty() {
        return Ok(Vec::new());
    }

    let credit_ids = unique(listings.iter().map(|l| l.carbon_credits_id));
    let credits = CarbonCredit::find_by_ids(&credit_ids, &mut *conn).await?;

    let land_ids = unique(credits.iter().map(|c| c.land_id));
    let lands = Land::find_by_ids(&land_ids, &mut *conn).await?;

    let seller_ids = unique(lands.iter().map(|l| l.owner_id));
    let sellers = Seller::find_by_ids(&seller_ids, &mut *conn).await?;

    assemble(listings, credits, lands, sellers)
}

fn unique<T: Copy + Eq + Hash>(ids: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

/// Stitch listings to their loaded chain rows, preserving listing order.
pub(crate) fn assemble(
    listings: Vec<CreditListing>,
    credits: Vec<CarbonCredit>,
    lands: Vec<Land>,
    sellers: Vec<Seller>,
) -> Result<Vec<ListingDetails>> {
    let credits: HashMap<CarbonCreditId, CarbonCredit> =
        credits.into_iter().map(|c| (c.id, c)).collect();
    let lands: HashMap<LandId, Land> = lands.into_iter().map(|l| (l.id, l)).collect();
    let sellers: HashMap<SellerId, Seller> = sellers.into_iter().map(|s| (s.id, s)).collect();

    listings
        .into_iter()
        .map(|listing| {
            let credit = credits
                .get(&listing.carbon_credits_id)
                .cloned()
                .ok_or_else(|| anyhow!("listing {} references a missing carbon credit", listing.id))?;
            let land = lands
                .get(&credit.land_id)
                .cloned()
                .ok_or_else(|| anyhow!("carbon credit {} references a missing land", credit.id))?;
            let seller = sellers
                .get(&land.owner_id)
                .cloned()
                .ok_or_else(|| anyhow!("land {} references a missing seller", land.id))?;

            Ok(ListingDetails {
                listing,
                carbon_credit: CreditDetails {
                    credit,
                    land: LandDetails { land, seller },
                },
            })
        })
        .collect()
}
