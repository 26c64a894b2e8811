use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use tokio::time::Instant;

/// Cache-store failure. Callers treat it as a degraded condition: log, then
/// fall back to the authoritative store. It is never surfaced to clients
/// directly.
#[derive(Debug)]
pub struct CacheError(String);

impl CacheError {
    pub fn new(msg: impl Into<String>) -> Self {
        CacheError(msg.into())
    }

    fn timed_out(key: &str) -> Self {
        CacheError(format!("cache operation timed out for key {}", key))
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache store error: {}", self.0)
    }
}

impl std::error::Error for CacheError {}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError(err.to_string())
    }
}

/// Shared key-value store with per-key expiry. Entries are advisory: any
/// entry may vanish at any time, and absence means "unknown", never
/// "invalid".
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Atomically increment `key` and, iff the increment created it, set its
    /// expiry to `window_secs`. Returns the post-increment count. The
    /// single-primitive contract rules out the unexpiring-counter race a
    /// separate INCR + EXPIRE pair would allow.
    async fn incr_with_expiry(&self, key: &str, window_secs: u64) -> Result<i64, CacheError>;
}

/// INCR and first-write EXPIRE as one server-side atomic step.
const INCR_WITH_EXPIRY_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
  redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
"#;

/// Production cache store. A multiplexed connection is obtained per
/// operation and every round trip runs under a bounded timeout so a slow
/// Redis cannot stall the request pipeline.
pub struct RedisCacheStore {
    client: Arc<RedisClient>,
    op_timeout: Duration,
    incr_script: redis::Script,
}

impl RedisCacheStore {
    pub fn new(client: Arc<RedisClient>, op_timeout: Duration) -> Self {
        Self {
            client,
            op_timeout,
            incr_script: redis::Script::new(INCR_WITH_EXPIRY_SCRIPT),
        }
    }

    async fn bounded<T>(
        &self,
        key: &str,
        fut: impl Future<Output = Result<T, redis::RedisError>> + Send,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| CacheError::timed_out(key))?
            .map_err(CacheError::from)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.bounded(key, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            conn.get(key).await
        })
        .await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        self.bounded(key, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            conn.set_ex(key, value, ttl_secs).await
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.bounded(key, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            conn.del(key).await
        })
        .await
    }

    async fn incr_with_expiry(&self, key: &str, window_secs: u64) -> Result<i64, CacheError> {
        self.bounded(key, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            self.incr_script
                .key(key)
                .arg(window_secs)
                .invoke_async(&mut conn)
                .await
        })
        .await
    }
}

struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Process-local cache store for running without Redis (local development)
/// and for tests. Uses the tokio clock so timing tests can pause and advance
/// it.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let entry = MemoryEntry {
            value: value.to_string(),
            expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs)),
        };
        self.entries.lock().unwrap().insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn incr_with_expiry(&self, key: &str, window_secs: u64) -> Result<i64, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                let count = entry.value.parse::<i64>().unwrap_or(0) + 1;
                entry.value = count.to_string();
                Ok(count)
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    MemoryEntry {
                        value: "1".to_string(),
                        expires_at: Some(now + Duration::from_secs(window_secs)),
                    },
                );
                Ok(1)
            }
        }
    }
}
