//! `/api/market` handlers. Public routes need no identity; `/private` routes
//! require the seller role and a user id.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    Json,
};

use super::parse_path_id;
use crate::common::{ListingId, PageQuery};
use crate::domains::listings::{
    CreateListingRequest, CreditListing, FilterQuery, ListingDetails, UpdateListingRequest,
};
use crate::server::app::MarketState;
use crate::server::error::ApiError;
use crate::server::middleware::SellerIdentity;

pub async fn active_listings(
    Extension(state): Extension<MarketState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<FilterQuery>,
) -> Result<Json<Vec<ListingDetails>>, ApiError> {
    let filter = filter.into_predicate()?;
    let listings = state
        .listings
        .list_active_listings(&state.context(), &filter, page.into_page())
        .await?;
    Ok(Json(listings))
}

pub async fn active_listing(
    Extension(state): Extension<MarketState>,
    Path(id): Path<String>,
) -> Result<Json<ListingDetails>, ApiError> {
    let id: ListingId = parse_path_id(&id, "listing")?;
    let listing = state
        .listings
        .get_active_listing(&state.context(), id)
        .await?;
    Ok(Json(listing))
}

pub async fn private_listings(
    Extension(state): Extension<MarketState>,
    SellerIdentity(requester): SellerIdentity,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ListingDetails>>, ApiError> {
    let listings = state
        .listings
        .list_seller_listings(&state.context(), &requester, page.into_page())
        .await?;
    Ok(Json(listings))
}

pub async fn private_listing(
    Extension(state): Extension<MarketState>,
    SellerIdentity(requester): SellerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ListingDetails>, ApiError> {
    let id: ListingId = parse_path_id(&id, "listing")?;
    let listing = state
        .listings
        .get_seller_listing(&state.context(), &requester, id)
        .await?;
    Ok(Json(listing))
}

pub async fn create_listing(
    Extension(state): Extension<MarketState>,
    SellerIdentity(requester): SellerIdentity,
    body: Result<Json<CreateListingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreditListing>), ApiError> {
    let Json(request) = body?;
    let listing = state
        .listings
        .create_listing(&state.context(), &requester, request)
        .await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn update_listing(
    Extension(state): Extension<MarketState>,
    SellerIdentity(requester): SellerIdentity,
    Path(id): Path<String>,
    body: Result<Json<UpdateListingRequest>, JsonRejection>,
) -> Result<Json<CreditListing>, ApiError> {
    let id: ListingId = parse_path_id(&id, "listing")?;
    let Json(request) = body?;
    let listing = state
        .listings
        .update_listing(&state.context(), &requester, id, request)
        .await?;
    Ok(Json(listing))
}

pub async fn delete_listing(
    Extension(state): Extension<MarketState>,
    SellerIdentity(requester): SellerIdentity,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: ListingId = parse_path_id(&id, "listing")?;
    state
        .listings
        .delete_listing(&state.context(), &requester, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
