//! Provider decorator combining the quote and history caches.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use marketcache_market_data::{
    DateRange, DividendHist, FetchReport, Hist, MarketDataError, MarketDataSource, Quote,
};

use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::constants::CACHE_SOURCE_ID;
use crate::history::HistoryCache;
use crate::quotes::QuoteCache;
use crate::store::{HistoryStore, QuoteStore};

/// A [`MarketDataSource`] that caches quotes and full history and forwards
/// every other operation to the wrapped provider unchanged.
pub struct CachedSource {
    source: Arc<dyn MarketDataSource>,
    quotes: QuoteCache,
    history: HistoryCache,
}

impl CachedSource {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        quote_store: Arc<dyn QuoteStore>,
        history_store: Arc<dyn HistoryStore>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            quotes: QuoteCache::new(source.clone(), quote_store, config),
            history: HistoryCache::new(source.clone(), history_store, config),
            source,
        }
    }

    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self {
            quotes: self.quotes.with_clock(clock.clone()),
            history: self.history.with_clock(clock),
            source: self.source,
        }
    }

    /// See [`QuoteCache::set_expiry`].
    pub fn set_quote_expiry(&self, ttl: Duration) {
        self.quotes.set_expiry(ttl);
    }

    pub fn quote_expiry(&self) -> Duration {
        self.quotes.expiry()
    }

    pub fn quote_cache(&self) -> &QuoteCache {
        &self.quotes
    }

    pub fn history_cache(&self) -> &HistoryCache {
        &self.history
    }
}

#[async_trait]
impl MarketDataSource for CachedSource {
    fn id(&self) -> &'static str {
        CACHE_SOURCE_ID
    }

    fn description(&self) -> String {
        format!("cache backed by {}", self.source.description())
    }

    async fn quotes(&self, symbols: &[String]) -> Result<FetchReport<Quote>, MarketDataError> {
        self.quotes.get(symbols).await
    }

    async fn history(&self, symbols: &[String]) -> Result<FetchReport<Hist>, MarketDataError> {
        self.history.get(symbols).await
    }

    async fn history_range(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> Result<FetchReport<Hist>, MarketDataError> {
        self.source.history_range(symbols, range).await
    }

    async fn dividend_history(
        &self,
        symbols: &[String],
    ) -> Result<FetchReport<DividendHist>, MarketDataError> {
        self.source.dividend_history(symbols).await
    }

    async fn dividend_history_range(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> Result<FetchReport<DividendHist>, MarketDataError> {
        self.source.dividend_history_range(symbols, range).await
    }
}
