//! SQLite storage for the market data cache.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the store traits defined in `marketcache-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations for the `quotes` and `history_entries` tables
//! - A single writer actor that serializes every write transaction
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//! The caches in `core` are database-agnostic and work with traits.
//!
//! ```text
//!   core (QuoteCache, HistoryCache)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod history;
pub mod quotes;
pub mod schema;
pub mod store;
pub mod utils;

pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool};
pub use db::{spawn_writer, WriteHandle};
pub use errors::{IntoCore, StorageError};
pub use history::HistoryRepository;
pub use quotes::QuoteRepository;
pub use store::{open_cached_source, SqliteCacheStore};

// Re-export core error types for convenience
pub use marketcache_core::errors::{DatabaseError, Error, Result};
