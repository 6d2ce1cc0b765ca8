//! In-memory [`ListingStore`] for service and router tests.
//!
//! Plans are evaluated with [`ListingQueryPlan::matches`] against each
//! listing's resolved chain, so the same plan value drives both this store and
//! the SQL rendering.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use super::models::{CreditListing, ListingChanges, ListingDetails, ListingStatus, NewListing};
use super::query::{ChainRow, ListingQueryPlan};
use super::store::{assemble, ListingStore};
use crate::common::{CarbonCreditId, LandId, ListingId, SellerId, UserId};
use crate::domains::lands::models::{CarbonCredit, Land, Seller, VerificationStatus};

#[derive(Default)]
struct Tables {
    sellers: HashMap<SellerId, Seller>,
    lands: HashMap<LandId, Land>,
    credits: HashMap<CarbonCreditId, CarbonCredit>,
    listings: Vec<CreditListing>,
}

impl Tables {
    fn chain(&self, listing: &CreditListing) -> Option<(&CarbonCredit, &Land, &Seller)> {
        let credit = self.credits.get(&listing.carbon_credits_id)?;
        let land = self.lands.get(&credit.land_id)?;
        let seller = self.sellers.get(&land.owner_id)?;
        Some((credit, land, seller))
    }

    /// Listings matching `plan`, ordered by (created_at, id), paginated.
    fn select(&self, plan: &ListingQueryPlan) -> Vec<CreditListing> {
        let mut matched: Vec<&CreditListing> = self
            .listings
            .iter()
            .filter(|listing| match self.chain(listing) {
                Some((credit, land, seller)) => plan.matches(&ChainRow {
                    listing,
                    credit,
                    land,
                    seller,
                }),
                None => false,
            })
            .collect();
        matched.sort_by_key(|l| (l.created_at, l.id));

        let (offset, limit) = match plan.page() {
            Some(page) => (page.offset() as usize, page.limit() as usize),
            None => (0, usize::MAX),
        };
        matched.into_iter().skip(offset).take(limit).cloned().collect()
    }
}

/// Mutex-guarded tables plus an optional artificial latency applied before
/// every call.
#[derive(Default)]
pub struct MemoryListingStore {
    tables: Mutex<Tables>,
    latency: Option<Duration>,
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every store call sleeps for `latency` first.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("memory listing store poisoned"))
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    pub fn add_seller(&self, user_id: UserId) -> Result<Seller> {
        let seller = Seller {
            id: SellerId::new(),
            user_id,
            verification_status: VerificationStatus::Verified,
            verification_date: Some(Utc::now()),
        };
        self.lock()?.sellers.insert(seller.id, seller.clone());
        Ok(seller)
    }

    pub fn add_land(&self, owner_id: SellerId, biome_type: &str, location: &str) -> Result<Land> {
        let now = Utc::now();
        let land = Land {
            id: LandId::new(),
            owner_id,
            title: format!("{} parcel", biome_type),
            description: None,
            size_square_meters: Decimal::new(10_000, 0),
            location: location.to_string(),
            latitude: -3.4653,
            longitude: -62.2159,
            biome_type: biome_type.to_string(),
            average_humidity: None,
            average_temperature: None,
            elevation_meters: None,
            forest_density_percentage: None,
            tree_species: Vec::new(),
            soil_type: None,
            certification_date: None,
            certification_authority: None,
            verification_status: VerificationStatus::Verified,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.lands.insert(land.id, land.clone());
        Ok(land)
    }

    pub fn add_credit(&self, land_id: LandId, credits_available: Decimal) -> Result<CarbonCredit> {
        let credit = CarbonCredit {
            id: CarbonCreditId::new(),
            land_id,
            verification_id: None,
            total_credits: credits_available,
            credits_available,
            credits_sold: Decimal::ZERO,
            vintage_year: Some(2024),
            expiration_date: None,
            verification_standard: Some("VCS".to_string()),
            created_at: Utc::now(),
        };
        self.lock()?.credits.insert(credit.id, credit.clone());
        Ok(credit)
    }

    /// Inserts a listing directly, bypassing ownership checks.
    pub fn add_listing(
        &self,
        credit_id: CarbonCreditId,
        price_per_credit: Decimal,
        status: ListingStatus,
    ) -> Result<CreditListing> {
        let now = Utc::now();
        let listing = CreditListing {
            id: ListingId::new(),
            carbon_credits_id: credit_id,
            price_per_credit,
            minimum_purchase: Decimal::ONE,
            maximum_purchase: None,
            status,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.listings.push(listing.clone());
        Ok(listing)
    }

    /// Snapshot of every stored listing, in insertion order.
    pub fn listings(&self) -> Result<Vec<CreditListing>> {
        Ok(self.lock()?.listings.clone())
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn fetch(&self, plan: &ListingQueryPlan) -> Result<Vec<ListingDetails>> {
        self.pause().await;

        let tables = self.lock()?;
        let listings = tables.select(plan);

        let mut credits = Vec::new();
        let mut lands = Vec::new();
        let mut sellers = Vec::new();
        for listing in &listings {
            if let Some((credit, land, seller)) = tables.chain(listing) {
                credits.push(credit.clone());
                lands.push(land.clone());
                sellers.push(seller.clone());
            }
        }

        assemble(listings, credits, lands, sellers)
    }

    async fn insert_if_owned(
        &self,
        owner: UserId,
        listing: NewListing,
    ) -> Result<Option<CreditListing>> {
        self.pause().await;

        let mut tables = self.lock()?;
        let owned = tables
            .credits
            .get(&listing.carbon_credits_id)
            .and_then(|credit| tables.lands.get(&credit.land_id))
            .and_then(|land| tables.sellers.get(&land.owner_id))
            .is_some_and(|seller| seller.user_id == owner);
        if !owned {
            return Ok(None);
        }

        let created = CreditListing {
            id: listing.id,
            carbon_credits_id: listing.carbon_credits_id,
            price_per_credit: listing.price_per_credit,
            minimum_purchase: listing.minimum_purchase,
            maximum_purchase: listing.maximum_purchase,
            status: listing.status,
            created_at: listing.created_at,
            updated_at: listing.created_at,
        };
        tables.listings.push(created.clone());
        Ok(Some(created))
    }

    async fn update_if_owned(
        &self,
        owner: UserId,
        id: ListingId,
        changes: ListingChanges,
    ) -> Result<Option<CreditListing>> {
        self.pause().await;

        let mut tables = self.lock()?;
        let plan = ListingQueryPlan::seller_listing(owner, id);
        if tables.select(&plan).is_empty() {
            return Ok(None);
        }

        let Some(listing) = tables.listings.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        changes.apply_to(listing);
        Ok(Some(listing.clone()))
    }

    async fn delete_if_owned(&self, owner: UserId, id: ListingId) -> Result<u64> {
        self.pause().await;

        let mut tables = self.lock()?;
        let plan = ListingQueryPlan::seller_listing(owner, id);
        if tables.select(&plan).is_empty() {
            return Ok(0);
        }

        let before = tables.listings.len();
        tables.listings.retain(|l| l.id != id);
        Ok((before - tables.listings.len()) as u64)
    }
}
