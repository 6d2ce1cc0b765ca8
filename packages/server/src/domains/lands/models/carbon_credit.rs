use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::{CarbonCreditId, LandId};

/// A batch of credits issued against one land parcel.
///
/// `credits_available <= total_credits` is enforced by the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CarbonCredit {
    pub id: CarbonCreditId,
    pub land_id: LandId,
    pub verification_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_credits: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub credits_available: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub credits_sold: Decimal,
    pub vintage_year: Option<i32>,
    pub expiration_date: Option<NaiveDate>,
    pub verification_standard: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCarbonCredit {
    pub land_id: LandId,
    pub verification_id: Option<String>,
    pub total_credits: Decimal,
    pub credits_available: Decimal,
    pub vintage_year: Option<i32>,
    pub expiration_date: Option<NaiveDate>,
    pub verification_standard: Option<String>,
}

impl CarbonCredit {
    /// Batch-load credits (eager include for listings).
    pub async fn find_by_ids<'e, E>(ids: &[CarbonCreditId], executor: E) -> Result<Vec<Self>>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>("SELECT * FROM carbon_credits WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await
            .map_err(Into::into)
    }

    pub async fn create(input: CreateCarbonCredit, pool: &PgPool) -> Result<Self> {
        let credit = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO carbon_credits (
                id, land_id, verification_id, total_credits, credits_available,
                vintage_year, expiration_date, verification_standard
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(CarbonCreditId::new())
        .bind(input.land_id)
        .bind(&input.verification_id)
        .bind(input.total_credits)
        .bind(input.credits_available)
        .bind(input.vintage_year)
        .bind(input.expiration_date)
        .bind(&input.verification_standard)
        .fetch_one(pool)
        .await?;
        Ok(credit)
    }
}
