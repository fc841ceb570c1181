//! Market data provider abstractions.
//!
//! This module contains:
//! - The `MarketDataSource` batch trait used by consumers and caches
//! - The `SymbolFetcher` trait that concrete providers implement
//! - `FanOutSource`, which adapts the latter to the former
//!
//! Provider-specific scraping lives outside this workspace; only the
//! interfaces are defined here.

mod capabilities;
mod fan_out;
mod traits;

pub use capabilities::RateLimit;
pub use fan_out::FanOutSource;
pub use traits::{MarketDataSource, SymbolFetcher};
