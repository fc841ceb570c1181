//! Market data provider trait definitions.
//!
//! Two seams are defined here:
//! - [`MarketDataSource`]: batch capability used by consumers and caches
//! - [`SymbolFetcher`]: single-symbol capability implemented by concrete providers
//!
//! A `SymbolFetcher` becomes a `MarketDataSource` through
//! [`FanOutSource`](super::FanOutSource).

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{DateRange, DividendEntry, DividendHist, FetchReport, Hist, HistoryEntry, Quote};

use super::capabilities::RateLimit;

/// Batch market data capability.
///
/// Every method returns a [`FetchReport`] with one outcome per symbol the
/// call was responsible for. An `Err` means the call as a whole failed and
/// no per-symbol information is available.
///
/// Caches implement this trait too, so a cached source can be used wherever
/// a provider is expected.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use marketcache_market_data::provider::MarketDataSource;
///
/// async fn last_prices(source: Arc<dyn MarketDataSource>) {
///     let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];
///     let report = source.quotes(&symbols).await.unwrap();
///     for quote in report.values() {
///         println!("{} {:?}", quote.symbol, quote.last_trade_price);
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Unique identifier, e.g. "YAHOO" or "CACHE".
    fn id(&self) -> &'static str;

    /// Human readable description used in logs.
    fn description(&self) -> String {
        self.id().to_string()
    }

    /// Latest quote for each symbol.
    async fn quotes(&self, symbols: &[String]) -> Result<FetchReport<Quote>, MarketDataError>;

    /// Full available daily history for each symbol.
    async fn history(&self, symbols: &[String]) -> Result<FetchReport<Hist>, MarketDataError>;

    /// Daily history limited to `range`.
    async fn history_range(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> Result<FetchReport<Hist>, MarketDataError>;

    /// Full dividend history for each symbol.
    ///
    /// Default implementation returns `NotSupported`.
    async fn dividend_history(
        &self,
        symbols: &[String],
    ) -> Result<FetchReport<DividendHist>, MarketDataError> {
        let _ = symbols;
        Err(MarketDataError::not_supported("dividend_history", self.id()))
    }

    /// Dividend history limited to `range`.
    ///
    /// Default implementation returns `NotSupported`.
    async fn dividend_history_range(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> Result<FetchReport<DividendHist>, MarketDataError> {
        let _ = (symbols, range);
        Err(MarketDataError::not_supported(
            "dividend_history_range",
            self.id(),
        ))
    }
}

/// Single-symbol provider capability.
///
/// Implementations talk to one external service and handle one symbol per
/// call; fan-out, concurrency limits and per-symbol error collection are
/// handled by [`FanOutSource`](super::FanOutSource).
///
/// Returning `Ok(None)` means the provider answered but had no data for the symbol.
#[async_trait]
pub trait SymbolFetcher: Send + Sync {
    /// Unique identifier for this provider.
    fn id(&self) -> &'static str;

    /// Rate limiting configuration.
    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>, MarketDataError>;

    /// Daily entries for `symbol` within `range`, in any order.
    async fn fetch_history(
        &self,
        symbol: &str,
        range: DateRange,
    ) -> Result<Vec<HistoryEntry>, MarketDataError>;

    /// Default implementation returns `NotSupported`.
    async fn fetch_dividends(
        &self,
        symbol: &str,
        range: DateRange,
    ) -> Result<Vec<DividendEntry>, MarketDataError> {
        let _ = (symbol, range);
        Err(MarketDataError::not_supported("dividends", self.id()))
    }
}
