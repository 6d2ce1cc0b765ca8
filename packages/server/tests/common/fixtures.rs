//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use anyhow::Result;
use market_core::common::UserId;
use market_core::domains::lands::models::{
    CarbonCredit, CreateCarbonCredit, Land, LandInput, Seller,
};
use market_core::domains::lands::LandRequest;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// A seller, one of their lands and one credit batch on it.
pub struct OwnedCredit {
    pub seller: Seller,
    pub land: Land,
    pub credit: CarbonCredit,
}

/// Biome name no other test uses, for isolating public queries.
pub fn unique_biome(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

pub async fn create_seller(pool: &PgPool) -> Result<Seller> {
    Seller::create(UserId::new(), pool).await
}

pub async fn create_land(
    pool: &PgPool,
    seller: &Seller,
    biome_type: &str,
    location: &str,
) -> Result<Land> {
    let input = LandInput {
        title: "Test parcel".to_string(),
        size_square_meters: Decimal::new(10_000, 0),
        location: location.to_string(),
        latitude: -3.4653,
        longitude: -62.2159,
        biome_type: biome_type.to_string(),
        tree_species: vec!["Hevea brasiliensis".to_string()],
        ..Default::default()
    };
    Land::create(seller.id, input, pool).await
}

pub async fn create_credit(pool: &PgPool, land: &Land, available: i64) -> Result<CarbonCredit> {
    CarbonCredit::create(
        CreateCarbonCredit {
            land_id: land.id,
            verification_id: Some("VCS-0001".to_string()),
            total_credits: Decimal::new(available, 0),
            credits_available: Decimal::new(available, 0),
            vintage_year: Some(2024),
            expiration_date: None,
            verification_standard: Some("VCS".to_string()),
        },
        pool,
    )
    .await
}

pub async fn create_owned_credit(
    pool: &PgPool,
    biome_type: &str,
    location: &str,
    available: i64,
) -> Result<OwnedCredit> {
    let seller = create_seller(pool).await?;
    let land = create_land(pool, &seller, biome_type, location).await?;
    let credit = create_credit(pool, &land, available).await?;
    Ok(OwnedCredit {
        seller,
        land,
        credit,
    })
}

/// Valid land body for service-level tests.
pub fn land_request(title: &str) -> LandRequest {
    LandRequest {
        title: title.to_string(),
        size_square_meters: 5_000.0,
        location: "Mato Grosso".to_string(),
        latitude: -12.64,
        longitude: -55.42,
        biome_type: "cerrado".to_string(),
        certification_date: Some("2023-11-02".to_string()),
        ..Default::default()
    }
}
