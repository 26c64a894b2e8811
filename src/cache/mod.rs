pub mod keys;
pub mod operations;
pub mod store;
