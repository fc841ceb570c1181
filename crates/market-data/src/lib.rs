//! Market Data Crate
//!
//! Provider-agnostic market data types and fetching for the cache.
//!
//! # Overview
//!
//! - Models for point quotes, daily history and dividends
//! - [`MarketDataSource`]: the batch capability every provider and cache exposes
//! - [`FetchCoordinator`]: bounded concurrent fan-out with per-item outcomes
//! - [`FetchReport`]: per-symbol result of a batch call, distinguishing
//!   served data, "no data" and failures
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   Consumer       |
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! | MarketDataSource | <-- |  Cache (core)    |  (decorator)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |  FanOutSource    |  (one task per symbol, bounded)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  SymbolFetcher   |  (Yahoo, Bloomberg, etc.)
//! +------------------+
//! ```

pub mod errors;
pub mod fetch;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;
pub use fetch::{unique_symbols, FetchCoordinator};
pub use models::{
    DateRange, DividendEntry, DividendHist, FetchOutcome, FetchReport, Hist, HistoryEntry,
    PriceRange, Quote, SymbolResult,
};
pub use provider::{FanOutSource, MarketDataSource, RateLimit, SymbolFetcher};
