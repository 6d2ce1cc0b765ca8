//! Integration tests for the listing service over Postgres.
//!
//! Covers the ownership chain joins, eager includes, filters, pagination and
//! the transactional create/update paths against a real database.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use market_core::common::{ExecContext, ListingId, PageRequest, Requester, UserId};
use market_core::domains::listings::{
    CreateListingRequest, FilterPredicate, ListingError, ListingService, ListingStatus,
    PgListingStore, UpdateListingRequest,
};
use rust_decimal::Decimal;
use test_context::test_context;

use crate::common::{create_credit, create_land, create_owned_credit, unique_biome, TestHarness};

fn service(ctx: &TestHarness) -> ListingService {
    ListingService::new(Arc::new(PgListingStore::new(ctx.db_pool.clone())))
}

fn exec() -> ExecContext {
    ExecContext::with_timeout(Duration::from_secs(10))
}

fn listing_request(
    credit: market_core::common::CarbonCreditId,
    price_cents: i64,
    status: ListingStatus,
) -> CreateListingRequest {
    CreateListingRequest {
        carbon_credits_id: credit,
        price_per_credit: Decimal::new(price_cents, 2),
        minimum_purchase: Decimal::ONE,
        maximum_purchase: Some(Decimal::new(100, 0)),
        status,
    }
}

// =============================================================================
// Create / read back
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn create_and_read_back_with_includes(ctx: &TestHarness) {
    let owned = create_owned_credit(&ctx.db_pool, "tropical_forest", "Amazonas", 500)
        .await
        .unwrap();
    let owner = Requester::seller(owned.seller.user_id);
    let svc = service(ctx);

    let created = svc
        .create_listing(
            &exec(),
            &owner,
            listing_request(owned.credit.id, 1250, ListingStatus::Draft),
        )
        .await
        .unwrap();

    assert_eq!(created.price_per_credit, Decimal::new(1250, 2));
    assert_eq!(created.minimum_purchase, Decimal::ONE);
    assert_eq!(created.maximum_purchase, Some(Decimal::new(100, 0)));
    assert_eq!(created.status, ListingStatus::Draft);

    let details = svc
        .get_seller_listing(&exec(), &owner, created.id)
        .await
        .unwrap();
    assert_eq!(details.listing.id, created.id);
    assert_eq!(details.listing.price_per_credit, created.price_per_credit);
    assert_eq!(details.carbon_credit.credit.id, owned.credit.id);
    assert_eq!(details.carbon_credit.land.land.id, owned.land.id);
    assert_eq!(details.carbon_credit.land.seller.id, owned.seller.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn create_for_someone_elses_credit_persists_nothing(ctx: &TestHarness) {
    let owned = create_owned_credit(&ctx.db_pool, "savanna", "Goiás", 50)
        .await
        .unwrap();
    let stranger = Requester::seller(UserId::new());

    let err = service(ctx)
        .create_listing(
            &exec(),
            &stranger,
            listing_request(owned.credit.id, 900, ListingStatus::Active),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ListingError::Unauthorized));

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM credit_listings WHERE carbon_credits_id = $1")
            .bind(owned.credit.id)
            .fetch_one(&ctx.db_pool)
            .await
            .unwrap();
    assert_eq!(count, 0);
}

// =============================================================================
// Ownership-guarded mutations
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn foreign_update_and_delete_leave_the_row_untouched(ctx: &TestHarness) {
    let owned = create_owned_credit(&ctx.db_pool, "wetland", "Pantanal", 80)
        .await
        .unwrap();
    let owner = Requester::seller(owned.seller.user_id);
    let other = create_owned_credit(&ctx.db_pool, "wetland", "Pantanal", 80)
        .await
        .unwrap();
    let intruder = Requester::seller(other.seller.user_id);
    let svc = service(ctx);

    let created = svc
        .create_listing(
            &exec(),
            &owner,
            listing_request(owned.credit.id, 1000, ListingStatus::Active),
        )
        .await
        .unwrap();

    let err = svc
        .update_listing(
            &exec(),
            &intruder,
            created.id,
            UpdateListingRequest {
                price_per_credit: Decimal::ONE,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ListingError::NotFound));

    let err = svc
        .delete_listing(&exec(), &intruder, created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ListingError::NotFound));

    let still_there = svc
        .get_seller_listing(&exec(), &owner, created.id)
        .await
        .unwrap();
    assert_eq!(still_there.listing, created);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn owner_update_overwrites_and_delete_removes(ctx: &TestHarness) {
    let owned = create_owned_credit(&ctx.db_pool, "mangrove", "Bahia", 120)
        .await
        .unwrap();
    let owner = Requester::seller(owned.seller.user_id);
    let svc = service(ctx);

    let created = svc
        .create_listing(
            &exec(),
            &owner,
            listing_request(owned.credit.id, 1500, ListingStatus::Draft),
        )
        .await
        .unwrap();

    let updated = svc
        .update_listing(
            &exec(),
            &owner,
            created.id,
            UpdateListingRequest {
                price_per_credit: Decimal::new(1800, 2),
                minimum_purchase: Decimal::new(5, 0),
                maximum_purchase: None,
                status: ListingStatus::Active,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price_per_credit, Decimal::new(1800, 2));
    assert_eq!(updated.minimum_purchase, Decimal::new(5, 0));
    assert_eq!(updated.maximum_purchase, None);
    assert_eq!(updated.status, ListingStatus::Active);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    svc.delete_listing(&exec(), &owner, created.id).await.unwrap();
    let err = svc
        .get_seller_listing(&exec(), &owner, created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ListingError::NotFound));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_updates_serialize_on_the_row_lock(ctx: &TestHarness) {
    let owned = create_owned_credit(&ctx.db_pool, "boreal", "Acre", 300)
        .await
        .unwrap();
    let owner = Requester::seller(owned.seller.user_id);
    let svc = service(ctx);

    let created = svc
        .create_listing(
            &exec(),
            &owner,
            listing_request(owned.credit.id, 1000, ListingStatus::Draft),
        )
        .await
        .unwrap();

    let updates = (1..=8).map(|i| {
        let svc = svc.clone();
        tokio::spawn(async move {
            svc.update_listing(
                &exec(),
                &owner,
                created.id,
                UpdateListingRequest {
                    price_per_credit: Decimal::new(i, 0),
                    minimum_purchase: Decimal::new(i, 0),
                    maximum_purchase: Some(Decimal::new(i, 0)),
                    status: ListingStatus::Active,
                },
            )
            .await
        })
    });
    for handle in updates.collect::<Vec<_>>() {
        handle.await.unwrap().unwrap();
    }

    // Each write replaced the whole row; no mix of two requests survives.
    let final_row = svc
        .get_seller_listing(&exec(), &owner, created.id)
        .await
        .unwrap()
        .listing;
    assert_eq!(final_row.price_per_credit, final_row.minimum_purchase);
    assert_eq!(Some(final_row.price_per_credit), final_row.maximum_purchase);
}

// =============================================================================
// Public queries
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn active_filters_apply_through_the_chain(ctx: &TestHarness) {
    let biome = unique_biome("filter");
    let owned = create_owned_credit(&ctx.db_pool, &biome, "Pará", 5).await.unwrap();
    let big_credit = create_credit(&ctx.db_pool, &owned.land, 1000).await.unwrap();
    let other_land = create_land(&ctx.db_pool, &owned.seller, &biome, "Amapá")
        .await
        .unwrap();
    let other_credit = create_credit(&ctx.db_pool, &other_land, 1000).await.unwrap();
    let owner = Requester::seller(owned.seller.user_id);
    let svc = service(ctx);

    let mut expected = HashSet::new();
    for (credit, cents, status) in [
        (owned.credit.id, 1500, ListingStatus::Active),
        (big_credit.id, 1500, ListingStatus::Active),
        (big_credit.id, 500, ListingStatus::Active),
        (big_credit.id, 1500, ListingStatus::Draft),
        (other_credit.id, 1500, ListingStatus::Active),
    ] {
        let created = svc
            .create_listing(&exec(), &owner, listing_request(credit, cents, status))
            .await
            .unwrap();
        if credit == big_credit.id && cents == 1500 && status == ListingStatus::Active {
            expected.insert(created.id);
        }
    }

    let filter = FilterPredicate {
        min_price: Some(Decimal::new(10, 0)),
        max_price: Some(Decimal::new(20, 0)),
        min_credits: Some(Decimal::new(100, 0)),
        biome_type: Some(biome.clone()),
        location: Some("Pará".to_string()),
        ..Default::default()
    };
    let results = svc
        .list_active_listings(&exec(), &filter, PageRequest::default())
        .await
        .unwrap();

    let ids: HashSet<ListingId> = results.iter().map(|d| d.listing.id).collect();
    assert_eq!(ids, expected);
    for item in &results {
        assert_eq!(item.listing.status, ListingStatus::Active);
        assert_eq!(item.carbon_credit.land.land.biome_type, biome);
        assert_eq!(item.carbon_credit.land.land.location, "Pará");
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn active_pages_cover_the_set_exactly_once(ctx: &TestHarness) {
    let biome = unique_biome("pages");
    let owned = create_owned_credit(&ctx.db_pool, &biome, "Roraima", 900)
        .await
        .unwrap();
    let owner = Requester::seller(owned.seller.user_id);
    let svc = service(ctx);

    let mut created = Vec::new();
    for i in 0..11 {
        let listing = svc
            .create_listing(
                &exec(),
                &owner,
                listing_request(owned.credit.id, 100 + i, ListingStatus::Active),
            )
            .await
            .unwrap();
        created.push(listing.id);
    }

    let filter = FilterPredicate {
        biome_type: Some(biome),
        ..Default::default()
    };
    let mut paged = Vec::new();
    for page in 1..=3 {
        let chunk = svc
            .list_active_listings(&exec(), &filter, PageRequest::new(page, 4))
            .await
            .unwrap();
        assert!(chunk.len() <= 4);
        paged.extend(chunk.into_iter().map(|d| d.listing.id));
    }

    assert_eq!(paged.len(), created.len());
    assert_eq!(
        paged.iter().collect::<HashSet<_>>(),
        created.iter().collect::<HashSet<_>>()
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn public_lookup_only_sees_active(ctx: &TestHarness) {
    let owned = create_owned_credit(&ctx.db_pool, "steppe", "Rio Grande do Sul", 40)
        .await
        .unwrap();
    let owner = Requester::seller(owned.seller.user_id);
    let svc = service(ctx);

    let closed = svc
        .create_listing(
            &exec(),
            &owner,
            listing_request(owned.credit.id, 700, ListingStatus::Closed),
        )
        .await
        .unwrap();
    let err = svc.get_active_listing(&exec(), closed.id).await.unwrap_err();
    assert!(matches!(err, ListingError::NotFound));

    let active = svc
        .create_listing(
            &exec(),
            &owner,
            listing_request(owned.credit.id, 700, ListingStatus::Active),
        )
        .await
        .unwrap();
    let found = svc.get_active_listing(&exec(), active.id).await.unwrap();
    assert_eq!(found.carbon_credit.land.seller.user_id, owned.seller.user_id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn expired_context_never_reaches_the_database(ctx: &TestHarness) {
    let owned = create_owned_credit(&ctx.db_pool, "tundra", "Santa Catarina", 10)
        .await
        .unwrap();
    let owner = Requester::seller(owned.seller.user_id);
    let exec = exec();
    exec.cancel();

    let err = service(ctx)
        .create_listing(
            &exec,
            &owner,
            listing_request(owned.credit.id, 100, ListingStatus::Active),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ListingError::DeadlineExceeded));

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM credit_listings WHERE carbon_credits_id = $1")
            .bind(owned.credit.id)
            .fetch_one(&ctx.db_pool)
            .await
            .unwrap();
    assert_eq!(count, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn deadline_cancels_update_blocked_on_row_lock(ctx: &TestHarness) {
    let owned = create_owned_credit(&ctx.db_pool, "wetland", "Pará", 40)
        .await
        .unwrap();
    let owner = Requester::seller(owned.seller.user_id);
    let svc = service(ctx);
    let listing = svc
        .create_listing(
            &exec(),
            &owner,
            listing_request(owned.credit.id, 900, ListingStatus::Draft),
        )
        .await
        .unwrap();

    // Another transaction holds the listing row so the update's own lock waits.
    let mut blocker = ctx.db_pool.begin().await.unwrap();
    sqlx::query("SELECT id FROM credit_listings WHERE id = $1 FOR UPDATE")
        .bind(listing.id)
        .execute(&mut *blocker)
        .await
        .unwrap();

    let short = ExecContext::with_timeout(Duration::from_millis(300));
    let err = svc
        .update_listing(
            &short,
            &owner,
            listing.id,
            UpdateListingRequest {
                price_per_credit: Decimal::new(4200, 2),
                minimum_purchase: Decimal::ONE,
                maximum_purchase: None,
                status: ListingStatus::Active,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ListingError::DeadlineExceeded));

    blocker.rollback().await.unwrap();

    let after = svc
        .get_seller_listing(&exec(), &owner, listing.id)
        .await
        .unwrap();
    assert_eq!(after.listing, listing);
}
