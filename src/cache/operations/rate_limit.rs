use std::sync::Arc;

use crate::cache::keys;
use crate::cache::store::{CacheError, CacheStore};

pub struct RateLimitCacheOperations;

impl RateLimitCacheOperations {
    /// Records one request against the caller's current window and returns
    /// the post-increment count. The first hit in a window creates the
    /// counter with the window TTL in the same atomic step.
    pub async fn hit(
        cache: &Arc<dyn CacheStore>,
        api_key: &str,
        window_secs: u64,
    ) -> Result<i64, CacheError> {
        cache
            .incr_with_expiry(&keys::rate_key(api_key), window_secs)
            .await
    }
}
