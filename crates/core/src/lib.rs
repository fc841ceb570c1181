//! Market Cache Core - cache logic, store traits and configuration.
//!
//! This crate contains the caching behaviour that sits between a consumer
//! and a market data provider. It is database-agnostic and defines the store
//! traits that are implemented by the `storage-sqlite` crate.
//!
//! - [`quotes::QuoteCache`] serves point quotes with a time-to-live
//! - [`history::HistoryCache`] serves daily history based on stored coverage
//! - [`merge`] writes fetched data back with replace-not-duplicate semantics
//! - [`CachedSource`] combines both caches behind the provider trait

pub mod cached;
pub mod clock;
pub mod config;
pub mod constants;
pub mod errors;
pub mod history;
pub mod merge;
pub mod quotes;
pub mod store;

#[cfg(test)]
mod test_support;

pub use cached::CachedSource;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
