use sqlx::PgPool;
use tracing::info;

use super::errors::LandError;
use super::models::{Land, Seller};
use super::types::LandRequest;
use crate::common::{LandId, PageRequest, Requester, UserId};

/// Land CRUD. Writes are scoped to the requester's seller profile.
#[derive(Clone)]
pub struct LandService {
    pool: PgPool,
}

impl LandService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn list_user_lands(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Vec<Land>, LandError> {
        Ok(Land::find_for_user(user_id, page, &self.pool).await?)
    }

    pub async fn get_land(&self, id: LandId) -> Result<Land, LandError> {
        Land::find_by_id(id, &self.pool)
            .await?
            .ok_or(LandError::NotFound)
    }

    pub async fn create_land(
        &self,
        requester: &Requester,
        request: LandRequest,
    ) -> Result<Land, LandError> {
        let input = request.into_input()?;
        let seller = self
            .seller_for(requester.user_id)
            .await?
            .ok_or(LandError::SellerNotFound)?;

        let land = Land::create(seller.id, input, &self.pool).await?;
        info!(land_id = %land.id, seller_id = %seller.id, "land created");
        Ok(land)
    }

    pub async fn update_land(
        &self,
        requester: &Requester,
        id: LandId,
        request: LandRequest,
    ) -> Result<Land, LandError> {
        let input = request.into_input()?;
        let Some(seller) = self.seller_for(requester.user_id).await? else {
            return Err(LandError::NotFound);
        };

        let land = Land::update_owned(id, seller.id, input, &self.pool)
            .await?
            .ok_or(LandError::NotFound)?;
        info!(land_id = %id, seller_id = %seller.id, "land updated");
        Ok(land)
    }

    pub async fn delete_land(&self, requester: &Requester, id: LandId) -> Result<(), LandError> {
        let Some(seller) = self.seller_for(requester.user_id).await? else {
            return Err(LandError::NotFound);
        };

        if Land::delete_owned(id, seller.id, &self.pool).await? == 0 {
            return Err(LandError::NotFound);
        }
        info!(land_id = %id, seller_id = %seller.id, "land deleted");
        Ok(())
    }

    async fn seller_for(&self, user_id: UserId) -> Result<Option<Seller>, LandError> {
        Ok(Seller::find_by_user_id(user_id, &self.pool).await?)
    }
}
