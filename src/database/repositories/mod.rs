pub mod app;
pub mod event;

pub use app::PgIdentityStore;
pub use event::PgAnalyticsStore;
