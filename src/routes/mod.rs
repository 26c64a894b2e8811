pub mod analytics;
pub mod auth;
