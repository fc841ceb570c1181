use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use marketcache_market_data::{
    unique_symbols, DateRange, DividendHist, FetchCoordinator, FetchReport, Hist,
    MarketDataError, MarketDataSource, Quote, SymbolResult,
};

use super::freshness::HistoryFreshness;
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::constants::CACHE_SOURCE_ID;
use crate::merge::merge_history;
use crate::store::{Coverage, HistoryStore};

/// Read-through cache for full daily history.
///
/// A symbol is covered when the store holds rows for it and its latest stored
/// date passes the [`HistoryFreshness`] policy. Everything else is fetched
/// from the provider in one call on a spawned task, normalized and merged
/// back window by window, while covered symbols are read on the calling task.
///
/// Requests for an explicit range go straight to the provider and are not
/// stored: stored coverage only says how recent a series is, not where it starts.
pub struct HistoryCache {
    source: Arc<dyn MarketDataSource>,
    store: Arc<dyn HistoryStore>,
    coordinator: FetchCoordinator,
    freshness: HistoryFreshness,
    clock: Arc<dyn Clock>,
}

impl HistoryCache {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        store: Arc<dyn HistoryStore>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            source,
            store,
            coordinator: config.coordinator(),
            freshness: config.history_freshness,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn freshness(&self) -> HistoryFreshness {
        self.freshness
    }

    /// Gets the full history of `symbols`.
    ///
    /// The returned report has one entry per distinct symbol. If the coverage
    /// query fails the whole request is sent to the provider.
    pub async fn get(&self, symbols: &[String]) -> Result<FetchReport<Hist>, MarketDataError> {
        let symbols = unique_symbols(symbols);
        if symbols.is_empty() {
            return Ok(FetchReport::new());
        }

        let coverage = match self.store.coverage(&symbols) {
            Ok(coverage) => coverage,
            Err(e) => {
                warn!(
                    "Error while reading history coverage, using {} directly: {}",
                    self.source.description(),
                    e
                );
                return self.source.history(&symbols).await;
            }
        };

        let now = self.clock.now();
        let mut covered = Vec::new();
        let mut missing = Vec::new();
        for symbol in symbols {
            match coverage.get(&symbol) {
                Some(c) if self.freshness.is_fresh(c.max_date, now) => {
                    debug!("{} history was served from the cache", symbol);
                    covered.push(symbol);
                }
                Some(c) => {
                    debug!(
                        "{} history is not recent enough, last stored date was {}",
                        symbol, c.max_date
                    );
                    missing.push(symbol);
                }
                None => {
                    debug!("{} history is not in the cache", symbol);
                    missing.push(symbol);
                }
            }
        }

        let fetch_missing = if missing.is_empty() {
            None
        } else {
            let source = self.source.clone();
            let store = self.store.clone();
            let coordinator = self.coordinator.clone();
            let symbols = missing.clone();
            Some(tokio::spawn(async move {
                fetch_and_merge(source.as_ref(), store.as_ref(), &coordinator, &symbols).await
            }))
        };

        let (mut report, unreadable) = self.read_covered(&covered, &coverage);
        if !unreadable.is_empty() {
            let refetched = fetch_and_merge(
                self.source.as_ref(),
                self.store.as_ref(),
                &self.coordinator,
                &unreadable,
            )
            .await;
            report.extend(refetched);
        }

        if let Some(task) = fetch_missing {
            match task.await {
                Ok(fetched) => report.extend(fetched),
                Err(e) => {
                    warn!("History fetch task for {:?} did not complete: {}", missing, e);
                    let error = MarketDataError::provider(self.source.id(), e.to_string());
                    report.extend(FetchReport::failed_all(&missing, &error));
                }
            }
        }

        Ok(report)
    }

    /// Assembles stored history for covered symbols.
    ///
    /// Returns the served histories and the symbols that could not be read.
    fn read_covered(
        &self,
        covered: &[String],
        coverage: &HashMap<String, Coverage>,
    ) -> (FetchReport<Hist>, Vec<String>) {
        let mut report = FetchReport::new();
        if covered.is_empty() {
            return (report, Vec::new());
        }

        let mut grouped = match self.store.select_history(covered) {
            Ok(grouped) => grouped,
            Err(e) => {
                warn!(
                    "Error while reading cached history of {:?}, fetching instead: {}",
                    covered, e
                );
                return (report, covered.to_vec());
            }
        };

        let mut unreadable = Vec::new();
        for symbol in covered {
            match (grouped.remove(symbol), coverage.get(symbol)) {
                (Some(entries), Some(c)) if !entries.is_empty() => {
                    let hist = Hist {
                        symbol: symbol.clone(),
                        from: c.min_date,
                        to: c.max_date,
                        entries,
                    };
                    report.push(SymbolResult::value(symbol.clone(), hist));
                }
                // rows vanished between the two queries
                _ => unreadable.push(symbol.clone()),
            }
        }
        (report, unreadable)
    }
}

/// Fetches full history for `symbols` and merges whatever came back.
///
/// Symbols the provider does not answer for are reported as `NoData`.
/// Returned windows span the fetched entries, as for histories read from
/// the store.
async fn fetch_and_merge(
    source: &dyn MarketDataSource,
    store: &dyn HistoryStore,
    coordinator: &FetchCoordinator,
    symbols: &[String],
) -> FetchReport<Hist> {
    let fetched = match source.history(symbols).await {
        Ok(fetched) => fetched,
        Err(e) => {
            warn!("Error while fetching history for {:?}: {}", symbols, e);
            return FetchReport::failed_all(symbols, &e);
        }
    };

    let fetched: FetchReport<Hist> = fetched
        .retain_symbols(symbols)
        .into_iter()
        .map(|result| {
            let symbol = result.symbol;
            let outcome = result.outcome.map(|hist| {
                Hist {
                    symbol: symbol.clone(),
                    ..hist
                }
                .normalized()
            });
            SymbolResult::new(symbol, outcome)
        })
        .collect::<FetchReport<Hist>>()
        .ensure_symbols(symbols);

    let summary = merge_history(store, coordinator, fetched.values()).await;
    if !summary.is_complete() {
        warn!(
            "History of {} symbols could not be cached",
            summary.failed.len()
        );
    }
    // merged with the requested window, reported with the stored bounds
    fetched.map_values(Hist::narrowed)
}

#[async_trait]
impl MarketDataSource for HistoryCache {
    fn id(&self) -> &'static str {
        CACHE_SOURCE_ID
    }

    fn description(&self) -> String {
        format!("history cache backed by {}", self.source.description())
    }

    async fn quotes(&self, symbols: &[String]) -> Result<FetchReport<Quote>, MarketDataError> {
        self.source.quotes(symbols).await
    }

    async fn history(&self, symbols: &[String]) -> Result<FetchReport<Hist>, MarketDataError> {
        self.get(symbols).await
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
