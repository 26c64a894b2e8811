use axum::Json;
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::cache::store::CacheError;
use crate::database::StoreError;

#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed request parameter.
    InvalidInput(String),
    /// Missing, unknown, revoked or expired API key.
    Unauthorized(&'static str),
    /// Auth lookups for apps that do not exist or are already revoked.
    NotFound(&'static str),
    /// Fixed-window budget exhausted; carries the window so clients know
    /// when to retry.
    RateLimited { window_secs: u64 },
    /// An authoritative store could not be reached.
    Unavailable(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, retry_after, error) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, None, msg),
            AppError::Unauthorized(msg) => (StatusCode::FORBIDDEN, None, msg.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, None, msg.to_string()),
            AppError::RateLimited { window_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                Some(window_secs),
                "Rate limit exceeded. Try again later.".to_string(),
            ),
            AppError::Unavailable(msg) => {
                tracing::error!("request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    "Internal server error".to_string(),
                )
            }
        };

        let mut response = (status, Json(ErrorResponse { error })).into_response();
        if let Some(secs) = retry_after {
            if let Ok(value) = secs.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Unavailable(err.to_string())
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Unavailable(err.to_string())
    }
}
