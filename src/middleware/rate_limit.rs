use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::cache::operations::rate_limit::RateLimitCacheOperations;
use crate::cache::store::CacheStore;
use crate::error::AppError;
use crate::middleware::auth::API_KEY_HEADER;

/// Per-route budget. The write path gets a stricter quota than the read
/// paths, so each route group carries its own instance.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitQuota {
    pub limit: u32,
    pub window_secs: u64,
}

#[derive(Clone)]
pub struct RateLimiter {
    cache: Arc<dyn CacheStore>,
    quota: RateLimitQuota,
}

impl RateLimiter {
    pub fn new(cache: Arc<dyn CacheStore>, quota: RateLimitQuota) -> Self {
        Self { cache, quota }
    }

    /// Fixed-window admission check. Counts are per credential per window;
    /// a burst straddling a window boundary can reach ~2x the nominal
    /// limit, which is the accepted cost of fixed windows. On a cache
    /// outage the limiter fails open: it has no authoritative store to fall
    /// back to, and dropping legitimate traffic is the worse failure.
    pub async fn check(&self, api_key: &str) -> Result<(), AppError> {
        let count =
            match RateLimitCacheOperations::hit(&self.cache, api_key, self.quota.window_secs).await
            {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!("rate counter unavailable, admitting request: {}", e);
                    return Ok(());
                }
            };

        if count > self.quota.limit as i64 {
            return Err(AppError::RateLimited {
                window_secs: self.quota.window_secs,
            });
        }
        Ok(())
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Auth runs before this layer, so the header is normally present; the
    // fallback key only groups malformed traffic.
    let api_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .trim()
        .to_string();

    limiter.check(&api_key).await?;
    Ok(next.run(req).await)
}
