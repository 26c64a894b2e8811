use std::env;
use std::time::Duration;

use crate::middleware::rate_limit::RateLimitQuota;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    /// Lifetime of newly issued API keys, in days.
    pub api_key_expiry_days: i64,
    /// TTL for the credential-to-tenant resolver cache. This is also the
    /// bounded-staleness window after a revoke: a revoked key may keep
    /// resolving for at most this long if cache eviction failed.
    pub api_key_cache_ttl_secs: u64,
    /// TTL for cached event-summary responses.
    pub summary_cache_ttl_secs: u64,
    pub rate_limit_window_secs: u64,
    /// Budget for the write path (collect).
    pub collect_rate_limit: u32,
    /// Budget for the read paths (summaries and stats).
    pub read_rate_limit: u32,
    /// Upper bound on a single cache-store round trip.
    pub cache_op_timeout_ms: u64,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            server_host: env_or("SERVER_HOST", "::".to_string()),
            server_port: env_or("SERVER_PORT", 3000),
            api_base_uri: env_or("API_BASE_URI", "/api".to_string()),
            api_key_expiry_days: env_or("API_KEY_EXPIRY_DAYS", 30),
            api_key_cache_ttl_secs: env_or("API_KEY_CACHE_TTL", 3600),
            summary_cache_ttl_secs: env_or("SUMMARY_CACHE_TTL", 30),
            rate_limit_window_secs: env_or("RATE_LIMIT_WINDOW", 60),
            collect_rate_limit: env_or("RATE_LIMIT_COLLECT", 50),
            read_rate_limit: env_or("RATE_LIMIT_READ", 100),
            cache_op_timeout_ms: env_or("CACHE_OP_TIMEOUT_MS", 2000),
        })
    }

    pub fn collect_quota(&self) -> RateLimitQuota {
        RateLimitQuota {
            limit: self.collect_rate_limit,
            window_secs: self.rate_limit_window_secs,
        }
    }

    pub fn read_quota(&self) -> RateLimitQuota {
        RateLimitQuota {
            limit: self.read_rate_limit,
            window_secs: self.rate_limit_window_secs,
        }
    }

    pub fn cache_op_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_op_timeout_ms)
    }
}

impl Default for Config {
    /// Defaults used by tests; production always goes through `from_env`.
    fn default() -> Self {
        Config {
            database_url: String::new(),
            redis_url: String::new(),
            server_host: "::".to_string(),
            server_port: 3000,
            api_base_uri: "/api".to_string(),
            api_key_expiry_days: 30,
            api_key_cache_ttl_secs: 3600,
            summary_cache_ttl_secs: 30,
            rate_limit_window_secs: 60,
            collect_rate_limit: 50,
            read_rate_limit: 100,
            cache_op_timeout_ms: 2000,
        }
    }
}
