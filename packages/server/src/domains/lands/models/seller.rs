use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::{SellerId, UserId};

/// Review state shared by sellers and lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

/// Platform identity row. Only the id is stored here; profile data belongs
/// to the users service.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: UserId,
}

impl User {
    /// Idempotently registers a user id.
    pub async fn ensure(user_id: UserId, pool: &PgPool) -> Result<Self> {
        sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(Self { user_id })
    }
}

/// Seller profile: the owner of lands, wrapping exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: SellerId,
    pub user_id: UserId,
    pub verification_status: VerificationStatus,
    pub verification_date: Option<DateTime<Utc>>,
}

impl Seller {
    pub async fn find_by_user_id(user_id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        let seller = sqlx::query_as::<_, Self>("SELECT * FROM sellers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(seller)
    }

    /// Batch-load sellers (eager include for listings).
    pub async fn find_by_ids<'e, E>(ids: &[SellerId], executor: E) -> Result<Vec<Self>>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>("SELECT * FROM sellers WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await
            .map_err(Into::into)
    }

    /// Registers a pending seller profile for `user_id`, creating the user
    /// row if needed.
    pub async fn create(user_id: UserId, pool: &PgPool) -> Result<Self> {
        User::ensure(user_id, pool).await?;

        let seller = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO sellers (id, user_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(SellerId::new())
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(seller)
    }
}
