use std::sync::Arc;

use crate::cache::keys;
use crate::cache::store::CacheStore;

/// Cache operations for the credential/tenant mappings. All of them are
/// best-effort: a cache failure is logged and reported as a miss (or a
/// no-op for writes) so the caller falls back to the identity store.
pub struct ApiKeyCacheOperations;

impl ApiKeyCacheOperations {
    /// Resolver cache lookup: credential -> tenant id.
    pub async fn get_app_id(cache: &Arc<dyn CacheStore>, api_key: &str) -> Option<String> {
        match cache.get(&keys::api_key_key(api_key)).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!("api key cache read failed, falling back to store: {}", e);
                None
            }
        }
    }

    /// Lookup cache for the reverse direction: tenant id -> credential.
    pub async fn get_api_key(cache: &Arc<dyn CacheStore>, app_id: &str) -> Option<String> {
        match cache.get(&keys::app_id_key(app_id)).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!("app id cache read failed, falling back to store: {}", e);
                None
            }
        }
    }

    /// Populates the resolver direction only, used on the auth path.
    pub async fn put_app_id(
        cache: &Arc<dyn CacheStore>,
        api_key: &str,
        app_id: &str,
        ttl_secs: u64,
    ) {
        if let Err(e) = cache
            .set_ex(&keys::api_key_key(api_key), app_id, ttl_secs)
            .await
        {
            tracing::warn!("failed to cache api key mapping: {}", e);
        }
    }

    /// Populates both directions, used after registration and key lookups.
    pub async fn put_mapping(
        cache: &Arc<dyn CacheStore>,
        api_key: &str,
        app_id: &str,
        ttl_secs: u64,
    ) {
        Self::put_app_id(cache, api_key, app_id, ttl_secs).await;
        if let Err(e) = cache
            .set_ex(&keys::app_id_key(app_id), api_key, ttl_secs)
            .await
        {
            tracing::warn!("failed to cache app id mapping: {}", e);
        }
    }

    /// Drops both directions after a revoke. Failure leaves a stale entry
    /// that lapses with the resolver-cache TTL; it never fails the revoke.
    pub async fn evict_mapping(cache: &Arc<dyn CacheStore>, api_key: &str, app_id: &str) {
        if let Err(e) = cache.delete(&keys::api_key_key(api_key)).await {
            tracing::warn!("failed to evict api key mapping on revoke: {}", e);
        }
        if let Err(e) = cache.delete(&keys::app_id_key(app_id)).await {
            tracing::warn!("failed to evict app id mapping on revoke: {}", e);
        }
    }
}
