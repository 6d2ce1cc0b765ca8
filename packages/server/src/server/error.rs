//! HTTP error mapping. Every domain error kind maps to exactly one status.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::common::AuthError;
use crate::domains::lands::LandError;
use crate::domains::listings::ListingError;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error(transparent)]
    Land(#[from] LandError),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::MalformedUserId) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Listing(e) => match e {
                ListingError::NotFound => StatusCode::NOT_FOUND,
                ListingError::Unauthorized => StatusCode::UNAUTHORIZED,
                ListingError::Validation(_) => StatusCode::BAD_REQUEST,
                ListingError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
                ListingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Land(e) => match e {
                LandError::NotFound => StatusCode::NOT_FOUND,
                LandError::SellerNotFound => StatusCode::UNAUTHORIZED,
                LandError::Validation(_) => StatusCode::BAD_REQUEST,
                LandError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Data-access details stay in the logs.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = ?self, "request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
