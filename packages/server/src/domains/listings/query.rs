//! Listing query plans.
//!
//! A plan is an ordered list of [`Clause`]s plus optional pagination and
//! locking. It is built without touching the database and rendered into a
//! single `QueryBuilder` by [`ListingQueryPlan::to_query`]. Joins along the
//! ownership chain (listing -> credit -> land -> seller) are added only as
//! deep as the clauses require, and clauses are always emitted in rank
//! order so the same inputs render the same SQL.

use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};

use super::filter::FilterPredicate;
use super::models::{CreditListing, ListingStatus};
use crate::common::{ListingId, PageRequest, UserId};
use crate::domains::lands::models::{CarbonCredit, Land, Seller};

/// How far along the ownership chain a plan has to join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JoinDepth {
    Listing,
    Credit,
    Land,
    Seller,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Status(ListingStatus),
    OwnedBy(UserId),
    Id(ListingId),
    MinPrice(Decimal),
    MaxPrice(Decimal),
    MinCredits(Decimal),
    MaxCredits(Decimal),
    BiomeType(String),
    Location(String),
}

impl Clause {
    fn rank(&self) -> u8 {
        match self {
            Clause::Status(_) => 0,
            Clause::OwnedBy(_) => 1,
            Clause::Id(_) => 2,
            Clause::MinPrice(_) => 3,
            Clause::MaxPrice(_) => 4,
            Clause::MinCredits(_) => 5,
            Clause::MaxCredits(_) => 6,
            Clause::BiomeType(_) => 7,
            Clause::Location(_) => 8,
        }
    }

    fn join_depth(&self) -> JoinDepth {
        match self {
            Clause::Status(_) | Clause::Id(_) | Clause::MinPrice(_) | Clause::MaxPrice(_) => {
                JoinDepth::Listing
            }
            Clause::MinCredits(_) | Clause::MaxCredits(_) => JoinDepth::Credit,
            Clause::BiomeType(_) | Clause::Location(_) => JoinDepth::Land,
            Clause::OwnedBy(_) => JoinDepth::Seller,
        }
    }

    fn push_sql(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        match self {
            Clause::Status(status) => qb.push("cl.status = ").push_bind(*status),
            Clause::OwnedBy(user_id) => qb.push("s.user_id = ").push_bind(*user_id),
            Clause::Id(id) => qb.push("cl.id = ").push_bind(*id),
            Clause::MinPrice(v) => qb.push("cl.price_per_credit >= ").push_bind(*v),
            Clause::MaxPrice(v) => qb.push("cl.price_per_credit <= ").push_bind(*v),
            Clause::MinCredits(v) => qb.push("cc.credits_available >= ").push_bind(*v),
            Clause::MaxCredits(v) => qb.push("cc.credits_available <= ").push_bind(*v),
            Clause::BiomeType(v) => qb.push("l.biome_type = ").push_bind(v.clone()),
            Clause::Location(v) => qb.push("l.location = ").push_bind(v.clone()),
        };
    }

    fn matches(&self, row: &ChainRow<'_>) -> bool {
        match self {
            Clause::Status(status) => row.listing.status == *status,
            Clause::OwnedBy(user_id) => row.seller.user_id == *user_id,
            Clause::Id(id) => row.listing.id == *id,
            Clause::MinPrice(v) => row.listing.price_per_credit >= *v,
            Clause::MaxPrice(v) => row.listing.price_per_credit <= *v,
            Clause::MinCredits(v) => row.credit.credits_available >= *v,
            Clause::MaxCredits(v) => row.credit.credits_available <= *v,
            Clause::BiomeType(v) => row.land.biome_type == *v,
            Clause::Location(v) => row.land.location == *v,
        }
    }
}

/// One listing together with the rows reached by walking its chain.
#[derive(Debug, Clone, Copy)]
pub struct ChainRow<'a> {
    pub listing: &'a CreditListing,
    pub credit: &'a CarbonCredit,
    pub land: &'a Land,
    pub seller: &'a Seller,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingQueryPlan {
    clauses: Vec<Clause>,
    page: Option<PageRequest>,
    lock_for_update: bool,
}

impl ListingQueryPlan {
    pub fn from_clauses(mut clauses: Vec<Clause>) -> Self {
        clauses.sort_by_key(Clause::rank);
        Self {
            clauses,
            page: None,
            lock_for_update: false,
        }
    }

    /// Listings whose chain resolves to a seller owned by `user_id`.
    pub fn seller_listings(user_id: UserId, page: PageRequest) -> Self {
        Self::from_clauses(vec![Clause::OwnedBy(user_id)]).paginate(page)
    }

    pub fn seller_listing(user_id: UserId, id: ListingId) -> Self {
        Self::from_clauses(vec![Clause::OwnedBy(user_id), Clause::Id(id)])
    }

    pub fn active_listings(filter: &FilterPredicate, page: PageRequest) -> Self {
        Self::from_clauses(vec![Clause::Status(ListingStatus::Active)])
            .with_filter(filter)
            .paginate(page)
    }

    pub fn active_listing(id: ListingId) -> Self {
        Self::from_clauses(vec![Clause::Status(ListingStatus::Active), Clause::Id(id)])
    }

    pub fn with_filter(self, filter: &FilterPredicate) -> Self {
        let mut clauses = self.clauses;
        clauses.extend(filter.min_price.map(Clause::MinPrice));
        clauses.extend(filter.max_price.map(Clause::MaxPrice));
        clauses.extend(filter.min_credits.map(Clause::MinCredits));
        clauses.extend(filter.max_credits.map(Clause::MaxCredits));
        clauses.extend(filter.biome_type.clone().map(Clause::BiomeType));
        clauses.extend(filter.location.clone().map(Clause::Location));

        Self {
            page: self.page,
            lock_for_update: self.lock_for_update,
            ..Self::from_clauses(clauses)
        }
    }

    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    /// Row-lock the matched listings for the rest of the transaction.
    pub fn for_update(mut self) -> Self {
        self.lock_for_update = true;
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn page(&self) -> Option<PageRequest> {
        self.page
    }

    pub fn join_depth(&self) -> JoinDepth {
        self.clauses
            .iter()
            .map(Clause::join_depth)
            .max()
            .unwrap_or(JoinDepth::Listing)
    }

    pub fn matches(&self, row: &ChainRow<'_>) -> bool {
        self.clauses.iter().all(|clause| clause.matches(row))
    }

    pub fn to_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT cl.* FROM credit_listings cl");

        let depth = self.join_depth();
        if depth >= JoinDepth::Credit {
            qb.push(" INNER JOIN carbon_credits cc ON cl.carbon_credits_id = cc.id");
        }
        if depth >= JoinDepth::Land {
            qb.push(" INNER JOIN lands l ON cc.land_id = l.id");
        }
        if depth >= JoinDepth::Seller {
            qb.push(" INNER JOIN sellers s ON l.owner_id = s.id");
        }

        for (i, clause) in self.clauses.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            clause.push_sql(&mut qb);
        }

        qb.push(" ORDER BY cl.created_at ASC, cl.id ASC");

        if let Some(page) = self.page {
            qb.push(" LIMIT ")
                .push_bind(page.limit())
                .push(" OFFSET ")
                .push_bind(page.offset());
        }

        if self.lock_for_update {
            qb.push(" FOR UPDATE OF cl");
        }

        qb
    }
}
