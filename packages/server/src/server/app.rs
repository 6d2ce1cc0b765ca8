//! Router construction for the marketplace and lands services.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::common::ExecContext;
use crate::domains::lands::LandService;
use crate::domains::listings::{ListingService, ListingStore, PgListingStore};
use crate::server::routes::{health_handler, lands, market};

/// Shared state for the marketplace router.
#[derive(Clone)]
pub struct MarketState {
    pub listings: ListingService,
    pub request_timeout: Duration,
}

impl MarketState {
    pub fn new(store: Arc<dyn ListingStore>, request_timeout: Duration) -> Self {
        Self {
            listings: ListingService::new(store),
            request_timeout,
        }
    }

    pub fn postgres(pool: PgPool, request_timeout: Duration) -> Self {
        Self::new(Arc::new(PgListingStore::new(pool)), request_timeout)
    }

    /// Fresh per-request context bounded by the configured timeout.
    pub fn context(&self) -> ExecContext {
        ExecContext::with_timeout(self.request_timeout)
    }
}

/// Shared state for the lands router.
#[derive(Clone)]
pub struct LandsState {
    pub lands: LandService,
}

impl LandsState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            lands: LandService::new(pool),
        }
    }
}

/// Build the `/api/market` router. `pool` backs the health route.
pub fn build_market_app(state: MarketState, pool: PgPool) -> Router {
    Router::new()
        .route("/api/market/", get(health_handler))
        .route("/api/market/health", get(health_handler))
        .route("/api/market/active", get(market::active_listings))
        .route("/api/market/active/:id", get(market::active_listing))
        .route(
            "/api/market/private",
            get(market::private_listings).post(market::create_listing),
        )
        .route(
            "/api/market/private/:id",
            get(market::private_listing)
                .put(market::update_listing)
                .delete(market::delete_listing),
        )
        .layer(Extension(state))
        .layer(Extension(pool))
        .layer(TraceLayer::new_for_http())
}

/// Build the `/api/lands` router.
pub fn build_lands_app(state: LandsState) -> Router {
    let pool = state.lands.pool().clone();

    Router::new()
        .route("/api/lands/health", get(health_handler))
        .route("/api/lands", post(lands::create_land))
        .route("/api/lands/user/:id", get(lands::user_lands))
        .route(
            "/api/lands/:id",
            get(lands::get_land)
                .put(lands::update_land)
                .delete(lands::delete_land),
        )
        .layer(Extension(state))
        .layer(Extension(pool))
        .layer(TraceLayer::new_for_http())
}
