//! Daily history caching.
//!
//! [`HistoryCache`] decides per symbol from the stored coverage whether the
//! history can be served locally. Covered symbols are read from the store
//! while the remaining ones are fetched and merged concurrently.

mod cache;
mod freshness;

#[cfg(test)]
mod cache_tests;

pub use cache::HistoryCache;
pub use freshness::HistoryFreshness;
