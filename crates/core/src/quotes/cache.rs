use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use marketcache_market_data::{
    unique_symbols, DateRange, DividendHist, FetchReport, Hist, MarketDataError,
    MarketDataSource, Quote, SymbolResult,
};

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::constants::CACHE_SOURCE_ID;
use crate::merge::merge_quotes;
use crate::store::QuoteStore;

/// Read-through quote cache with a time-to-live.
///
/// A stored quote is fresh while `now - updated_at < ttl`. Fetched quotes are
/// stamped with the cache clock when they are merged, so the TTL measures how
/// long a quote has been cached rather than exchange time.
///
/// Store failures never fail a request: a failed lookup sends the whole
/// request to the provider, and a failed write is logged.
pub struct QuoteCache {
    source: Arc<dyn MarketDataSource>,
    store: Arc<dyn QuoteStore>,
    clock: Arc<dyn Clock>,
    ttl_millis: AtomicU64,
}

impl QuoteCache {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        store: Arc<dyn QuoteStore>,
        config: &CacheConfig,
    ) -> Self {
        let cache = Self {
            source,
            store,
            clock: Arc::new(SystemClock),
            ttl_millis: AtomicU64::new(0),
        };
        cache.set_expiry(config.quote_ttl());
        cache
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the time-to-live used by subsequent lookups.
    ///
    /// Already stored quotes are judged against the new value on the next lookup;
    /// nothing is rewritten.
    pub fn set_expiry(&self, ttl: Duration) {
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self.ttl_millis
            .store(millis.min(i64::MAX as u64), Ordering::Relaxed);
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_millis(self.ttl_millis.load(Ordering::Relaxed))
    }

    fn is_fresh(&self, quote: &Quote, now: DateTime<Utc>) -> bool {
        let ttl = chrono::Duration::milliseconds(self.ttl_millis.load(Ordering::Relaxed) as i64);
        now.signed_duration_since(quote.updated_at) < ttl
    }

    /// Gets quotes for `symbols`, serving fresh ones from the store.
    ///
    /// The returned report has one entry per distinct symbol. Stale or unknown
    /// symbols are fetched with a single provider call; a symbol the provider
    /// does not answer for is reported as `NoData`, and a failed provider call
    /// is reported as `Failed` for every symbol it was responsible for while
    /// fresh quotes are still returned.
    pub async fn get(&self, symbols: &[String]) -> Result<FetchReport<Quote>, MarketDataError> {
        let symbols = unique_symbols(symbols);
        if symbols.is_empty() {
            return Ok(FetchReport::new());
        }

        let stored = match self.store.select_quotes(&symbols) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(
                    "Error while reading cached quotes, using {} directly: {}",
                    self.source.description(),
                    e
                );
                return self.source.quotes(&symbols).await;
            }
        };

        let now = self.clock.now();
        let mut fresh: HashMap<String, Quote> = stored
            .into_iter()
            .filter(|q| self.is_fresh(q, now))
            .map(|q| (q.symbol.clone(), q))
            .collect();

        let mut report = FetchReport::new();
        let mut to_fetch = Vec::new();
        for symbol in symbols {
            match fresh.remove(&symbol) {
                Some(quote) => {
                    debug!("{} was served from the quote cache", symbol);
                    report.push_value(symbol, quote);
                }
                None => {
                    debug!("{} is missing or stale in the quote cache", symbol);
                    to_fetch.push(symbol);
                }
            }
        }

        if to_fetch.is_empty() {
            return Ok(report);
        }

        let fetched = match self.source.quotes(&to_fetch).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Error while fetching quotes for {:?}: {}", to_fetch, e);
                report.extend(FetchReport::failed_all(&to_fetch, &e));
                return Ok(report);
            }
        };

        let fetched_at = self.clock.now();
        let fetched: FetchReport<Quote> = fetched
            .retain_symbols(&to_fetch)
            .into_iter()
            .map(|result| {
                let symbol = result.symbol;
                let outcome = result.outcome.map(|quote| Quote {
                    symbol: symbol.clone(),
                    updated_at: fetched_at,
                    ..quote
                });
                SymbolResult::new(symbol, outcome)
            })
            .collect::<FetchReport<Quote>>()
            .ensure_symbols(&to_fetch);

        let to_merge: Vec<Quote> = fetched.values().cloned().collect();
        if let Err(e) = merge_quotes(self.store.as_ref(), &to_merge).await {
            warn!("Could not merge quotes of {:?} into the cache: {}", to_fetch, e);
        }

        report.extend(fetched);
        Ok(report)
    }
}

#[async_trait]
impl MarketDataSource for QuoteCache {
    fn id(&self) -> &'static str {
        CACHE_SOURCE_ID
    }

    fn description(&self) -> String {
        format!(
            "quote cache ({}s) backed by {}",
            self.expiry().as_secs(),
            self.source.description()
        )
    }

    async fn quotes(&self, symbols: &[String]) -> Result<FetchReport<Quote>, MarketDataError> {
        self.get(symbols).await
    }

    async fn history(&self, symbols: &[String]) -> Result<FetchReport<Hist>, MarketDataError> {
        self.source.history(symbols).await
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
