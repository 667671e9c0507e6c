//! Data layer module
//!
//! Handles all data persistence and caching:
//! - SQLite database operations
//! - Page cache (volatile)

mod cache;
mod database;
mod models;

pub use cache::PageCache;
pub use database::Database;
pub use models::*;
