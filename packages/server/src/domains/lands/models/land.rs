use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use super::VerificationStatus;
use crate::common::{LandId, PageRequest, SellerId, UserId};

/// A registered land parcel. `owner_id` always points at a seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Land {
    pub id: LandId,
    pub owner_id: SellerId,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub size_square_meters: Decimal,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub biome_type: String,
    pub average_humidity: Option<f64>,
    pub average_temperature: Option<f64>,
    pub elevation_meters: Option<f64>,
    pub forest_density_percentage: Option<f64>,
    pub tree_species: Vec<String>,
    pub soil_type: Option<String>,
    pub certification_date: Option<NaiveDate>,
    pub certification_authority: Option<String>,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-writable land attributes, already validated.
#[derive(Debug, Clone, Default)]
pub struct LandInput {
    pub title: String,
    pub description: Option<String>,
    pub size_square_meters: Decimal,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub biome_type: String,
    pub average_humidity: Option<f64>,
    pub average_temperature: Option<f64>,
    pub elevation_meters: Option<f64>,
    pub forest_density_percentage: Option<f64>,
    pub tree_species: Vec<String>,
    pub soil_type: Option<String>,
    pub certification_date: Option<NaiveDate>,
    pub certification_authority: Option<String>,
}

impl Land {
    pub async fn find_by_id(id: LandId, pool: &PgPool) -> Result<Option<Self>> {
        let land = sqlx::query_as::<_, Self>("SELECT * FROM lands WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(land)
    }

    /// Batch-load lands (eager include for listings).
    pub async fn find_by_ids<'e, E>(ids: &[LandId], executor: E) -> Result<Vec<Self>>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>("SELECT * FROM lands WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await
            .map_err(Into::into)
    }

    /// Lands owned by the seller profile of `user_id`, oldest first.
    pub async fn find_for_user(
        user_id: UserId,
        page: PageRequest,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let lands = sqlx::query_as::<_, Self>(
            r#"
            SELECT l.*
            FROM lands l
            INNER JOIN sellers s ON l.owner_id = s.id
            WHERE s.user_id = $1
            ORDER BY l.created_at ASC, l.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;
        Ok(lands)
    }

    pub async fn create(owner_id: SellerId, input: LandInput, pool: &PgPool) -> Result<Self> {
        let land = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO lands (
                id, owner_id, title, description, size_square_meters, location,
                latitude, longitude, biome_type, average_humidity, average_temperature,
                elevation_meters, forest_density_percentage, tree_species, soil_type,
                certification_date, certification_authority
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(LandId::new())
        .bind(owner_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.size_square_meters)
        .bind(&input.location)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(&input.biome_type)
        .bind(input.average_humidity)
        .bind(input.average_temperature)
        .bind(input.elevation_meters)
        .bind(input.forest_density_percentage)
        .bind(&input.tree_species)
        .bind(&input.soil_type)
        .bind(input.certification_date)
        .bind(&input.certification_authority)
        .fetch_one(pool)
        .await?;
        Ok(land)
    }

    /// Overwrites every client-writable column of a land owned by `owner_id`.
    /// Returns `None` when no such land exists for that owner.
    pub async fn update_owned(
        id: LandId,
        owner_id: SellerId,
        input: LandInput,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let land = sqlx::query_as::<_, Self>(
            r#"
            UPDATE lands SET
                title = $3,
                description = $4,
                size_square_meters = $5,
                location = $6,
                latitude = $7,
                longitude = $8,
                biome_type = $9,
                average_humidity = $10,
                average_temperature = $11,
                elevation_meters = $12,
                forest_density_percentage = $13,
                tree_species = $14,
                soil_type = $15,
                certification_date = $16,
                certification_authority = $17,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.size_square_meters)
        .bind(&input.location)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(&input.biome_type)
        .bind(input.average_humidity)
        .bind(input.average_temperature)
        .bind(input.elevation_meters)
        .bind(input.forest_density_percentage)
        .bind(&input.tree_species)
        .bind(&input.soil_type)
        .bind(input.certification_date)
        .bind(&input.certification_authority)
        .fetch_optional(pool)
        .await?;
        Ok(land)
    }

    /// Returns the number of rows removed (0 or 1).
    pub async fn delete_owned(id: LandId, owner_id: SellerId, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM lands WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
