use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    Json,
};

use super::parse_path_id;
use crate::common::{LandId, PageQuery, UserId};
use crate::domains::lands::{Land, LandRequest};
use crate::server::app::LandsState;
use crate::server::error::ApiError;
use crate::server::middleware::{SellerIdentity, SellerRole};

pub async fn user_lands(
    Extension(state): Extension<LandsState>,
    _role: SellerRole,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<Land>>, ApiError> {
    let user_id: UserId = parse_path_id(&user_id, "user")?;
    let lands = state
        .lands
        .list_user_lands(user_id, page.into_page())
        .await?;
    Ok(Json(lands))
}

pub async fn get_land(
    Extension(state): Extension<LandsState>,
    Path(id): Path<String>,
) -> Result<Json<Land>, ApiError> {
    let id: LandId = parse_path_id(&id, "land")?;
    Ok(Json(state.lands.get_land(id).await?))
}

pub async fn create_land(
    Extension(state): Extension<LandsState>,
    SellerIdentity(requester): SellerIdentity,
    body: Result<Json<LandRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Land>), ApiError> {
    let Json(request) = body?;
    let land = state.lands.create_land(&requester, request).await?;
    Ok((StatusCode::CREATED, Json(land)))
}

pub async fn update_land(
    Extension(state): Extension<LandsState>,
    SellerIdentity(requester): SellerIdentity,
    Path(id): Path<String>,
    body: Result<Json<LandRequest>, JsonRejection>,
) -> Result<Json<Land>, ApiError> {
    let id: LandId = parse_path_id(&id, "land")?;
    let Json(request) = body?;
    Ok(Json(state.lands.update_land(&requester, id, request).await?))
}

pub async fn delete_land(
    Extension(state): Extension<LandsState>,
    SellerIdentity(requester): SellerIdentity,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: LandId = parse_path_id(&id, "land")?;
    state.lands.delete_land(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
