pub mod auth;
pub mod error_handler;
pub mod rate_limit;

pub use auth::{TenantId, api_key_auth};
pub use error_handler::log_errors;
pub use rate_limit::{RateLimitQuota, RateLimiter, rate_limit};
