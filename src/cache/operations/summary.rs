use std::sync::Arc;

use crate::cache::store::CacheStore;
use crate::database::entities::event::EventSummary;

/// Cache-aside wrapper state for event-summary responses. Concurrent misses
/// for the same key each recompute and overwrite independently (last writer
/// wins); summaries are cheap enough that stampede coalescing is not worth
/// the coordination yet.
pub struct SummaryCacheOperations;

impl SummaryCacheOperations {
    pub async fn get(cache: &Arc<dyn CacheStore>, key: &str) -> Option<EventSummary> {
        let json = match cache.get(key).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("summary cache read failed, recomputing: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("dropping undecodable summary cache entry {}: {}", key, e);
                None
            }
        }
    }

    pub async fn put(
        cache: &Arc<dyn CacheStore>,
        key: &str,
        summary: &EventSummary,
        ttl_secs: u64,
    ) {
        let json = match serde_json::to_string(summary) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to serialize summary for cache: {}", e);
                return;
            }
        };
        if let Err(e) = cache.set_ex(key, &json, ttl_secs).await {
            tracing::warn!("failed to cache summary {}: {}", key, e);
        }
    }
}
