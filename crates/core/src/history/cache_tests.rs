//! Tests for HistoryCache coverage decisions, concurrent paths and degradation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use marketcache_market_data::{
    DateRange, FetchOutcome, FetchReport, Hist, MarketDataError, MarketDataSource, Quote,
};
use rust_decimal_macros::dec;

use super::{HistoryCache, HistoryFreshness};
use crate::clock::ManualClock;
use crate::config::CacheConfig;
use crate::test_support::{date, symbols, MockHistoryStore, MockSource};

/// Wednesday 2024-03-06 noon; cutoff for trailing-day freshness is 2024-03-05.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap()
}

struct Fixture {
    source: Arc<MockSource>,
    store: MockHistoryStore,
    cache: HistoryCache,
}

fn fixture_with(source: MockSource, config: CacheConfig, at: DateTime<Utc>) -> Fixture {
    let source = Arc::new(source);
    let store = MockHistoryStore::new();
    let cache = HistoryCache::new(source.clone(), Arc::new(store.clone()), &config)
        .with_clock(Arc::new(ManualClock::new(at)));
    Fixture {
        source,
        store,
        cache,
    }
}

fn fixture(source: MockSource) -> Fixture {
    fixture_with(source, CacheConfig::default(), now())
}

#[tokio::test]
async fn test_covered_history_is_served_from_store() {
    let f = fixture(MockSource::new());
    f.store
        .add_entries("AAPL", &[date(2024, 3, 5), date(2024, 3, 1), date(2024, 3, 4)]);

    let report = f.cache.get(&symbols(&["AAPL"])).await.unwrap();

    assert!(f.source.history_calls().is_empty());
    let hist = report.get("AAPL").and_then(|o| o.value()).unwrap();
    assert_eq!(hist.from, date(2024, 3, 1));
    assert_eq!(hist.to, date(2024, 3, 5));
    let dates: Vec<_> = hist.entries.iter().map(|e| e.date).collect();
    assert_eq!(dates, vec![date(2024, 3, 1), date(2024, 3, 4), date(2024, 3, 5)]);
}

#[tokio::test]
async fn test_missing_history_is_fetched_then_cached() {
    let f = fixture(MockSource::new().with_history("MSFT", &[date(2024, 3, 4), date(2024, 3, 5)]));

    let report = f.cache.get(&symbols(&["MSFT"])).await.unwrap();
    assert_eq!(report.get("MSFT").and_then(|o| o.value()).unwrap().entries.len(), 2);
    assert_eq!(f.store.dates("MSFT"), vec![date(2024, 3, 4), date(2024, 3, 5)]);

    f.cache.get(&symbols(&["MSFT"])).await.unwrap();
    assert_eq!(f.source.history_calls().len(), 1);
}

#[tokio::test]
async fn test_stale_history_is_refetched_and_window_replaced() {
    let f = fixture(MockSource::new().with_history(
        "AAPL",
        &[date(2024, 3, 1), date(2024, 3, 4), date(2024, 3, 5)],
    ));
    f.store
        .add_entries("AAPL", &[date(2024, 2, 28), date(2024, 3, 1), date(2024, 3, 4)]);

    let report = f.cache.get(&symbols(&["AAPL"])).await.unwrap();

    assert_eq!(f.source.history_calls(), vec![symbols(&["AAPL"])]);
    assert!(report.get("AAPL").unwrap().is_value());
    // rows before the fetched window survive, rows inside it are replaced
    assert_eq!(
        f.store.dates("AAPL"),
        vec![date(2024, 2, 28), date(2024, 3, 1), date(2024, 3, 4), date(2024, 3, 5)]
    );
    assert_eq!(f.store.close_on("AAPL", date(2024, 2, 28)), Some(dec!(50)));
    assert_eq!(f.store.close_on("AAPL", date(2024, 3, 1)), Some(dec!(100)));
}

#[tokio::test]
async fn test_only_uncovered_symbols_reach_the_provider() {
    let f = fixture(MockSource::new().with_history("MSFT", &[date(2024, 3, 5)]));
    f.store.add_entries("AAPL", &[date(2024, 3, 5)]);

    let report = f.cache.get(&symbols(&["AAPL", "MSFT"])).await.unwrap();

    assert_eq!(f.source.history_calls(), vec![symbols(&["MSFT"])]);
    assert_eq!(report.len(), 2);
    assert_eq!(report.values().count(), 2);
}

#[tokio::test]
async fn test_coverage_failure_passes_through() {
    let f = fixture(
        MockSource::new()
            .with_history("AAPL", &[date(2024, 3, 5)])
            .with_history("MSFT", &[date(2024, 3, 5)]),
    );
    f.store.add_entries("AAPL", &[date(2024, 3, 5)]);
    f.store.set_fail_on_coverage(true);

    let report = f.cache.get(&symbols(&["AAPL", "MSFT"])).await.unwrap();

    assert_eq!(f.source.history_calls(), vec![symbols(&["AAPL", "MSFT"])]);
    assert_eq!(report.values().count(), 2);
    // pass-through does not write
    assert!(f.store.dates("MSFT").is_empty());
}

#[tokio::test]
async fn test_covered_read_failure_fetches_covered_symbols() {
    let f = fixture(MockSource::new().with_history("AAPL", &[date(2024, 3, 5)]));
    f.store.add_entries("AAPL", &[date(2024, 3, 5)]);
    f.store.set_fail_on_select(true);

    let report = f.cache.get(&symbols(&["AAPL"])).await.unwrap();

    assert_eq!(f.source.history_calls(), vec![symbols(&["AAPL"])]);
    assert!(report.get("AAPL").unwrap().is_value());
}

#[tokio::test]
async fn test_provider_failure_keeps_covered_history() {
    let f = fixture(MockSource::new());
    f.store.add_entries("AAPL", &[date(2024, 3, 5)]);
    f.source.set_unavailable(true);

    let report = f.cache.get(&symbols(&["AAPL", "MSFT"])).await.unwrap();

    assert!(report.get("AAPL").unwrap().is_value());
    assert!(matches!(
        report.get("MSFT"),
        Some(FetchOutcome::Failed(MarketDataError::ProviderError { .. }))
    ));
}

#[tokio::test]
async fn test_unanswered_and_failed_symbols_are_distinguished() {
    let f = fixture(MockSource::new().with_failing("BROKEN"));

    let report = f
        .cache
        .get(&symbols(&["UNKNOWN", "BROKEN"]))
        .await
        .unwrap();

    assert_eq!(report.get("UNKNOWN"), Some(&FetchOutcome::NoData));
    assert!(report.get("BROKEN").and_then(|o| o.error()).is_some());
    assert!(f.store.dates("UNKNOWN").is_empty());
}

#[tokio::test]
async fn test_merge_failure_still_returns_fetched_history() {
    let f = fixture(MockSource::new().with_history("AAPL", &[date(2024, 3, 5)]));
    f.store.fail_on_replace_for("AAPL");

    let report = f.cache.get(&symbols(&["AAPL"])).await.unwrap();

    assert!(report.get("AAPL").unwrap().is_value());
    assert!(f.store.dates("AAPL").is_empty());
}

#[tokio::test]
async fn test_skip_weekends_policy_serves_friday_on_monday() {
    let monday = Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap();
    let config = CacheConfig {
        history_freshness: HistoryFreshness::SkipWeekends,
        ..CacheConfig::default()
    };
    let f = fixture_with(MockSource::new(), config, monday);
    f.store.add_entries("AAPL", &[date(2024, 3, 8)]);

    f.cache.get(&symbols(&["AAPL"])).await.unwrap();

    assert_eq!(f.cache.freshness(), HistoryFreshness::SkipWeekends);
    assert!(f.source.history_calls().is_empty());
}

#[tokio::test]
async fn test_fetched_history_reports_entry_bounds() {
    let f = fixture(
        MockSource::new()
            .with_history("MSFT", &[date(2024, 3, 4), date(2024, 3, 5)])
            .with_history_window(DateRange::unbounded()),
    );
    // stale and outside the fetched entries, but inside the requested window
    f.store.add_entries("MSFT", &[date(2024, 1, 2)]);

    let fetched = f.cache.get(&symbols(&["MSFT"])).await.unwrap();
    let hist = fetched.get("MSFT").and_then(|o| o.value()).unwrap();
    assert_eq!(hist.range(), DateRange::new(date(2024, 3, 4), date(2024, 3, 5)));
    assert_eq!(f.store.dates("MSFT"), vec![date(2024, 3, 4), date(2024, 3, 5)]);

    let served = f.cache.get(&symbols(&["MSFT"])).await.unwrap();
    assert_eq!(f.source.history_calls().len(), 1);
    assert_eq!(served.get("MSFT").and_then(|o| o.value()), Some(hist));
}

/// Provider that answers history slowly and notes how many covered reads
/// the store had served by the time it answered.
struct SlowSource {
    inner: MockSource,
    store: MockHistoryStore,
    reads_when_answered: Mutex<Option<usize>>,
}

#[async_trait]
impl MarketDataSource for SlowSource {
    fn id(&self) -> &'static str {
        "SLOW"
    }

    async fn quotes(&self, symbols: &[String]) -> Result<FetchReport<Quote>, MarketDataError> {
        self.inner.quotes(symbols).await
    }

    async fn history(&self, symbols: &[String]) -> Result<FetchReport<Hist>, MarketDataError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        *self.reads_when_answered.lock().unwrap() = Some(self.store.select_calls());
        self.inner.history(symbols).await
    }

    async fn history_range(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> Result<FetchReport<Hist>, MarketDataError> {
        self.inner.history_range(symbols, range).await
    }
}

#[tokio::test]
async fn test_covered_read_completes_while_fetch_is_in_flight() {
    let store = MockHistoryStore::new();
    store.add_entries("AAPL", &[date(2024, 3, 5)]);
    let source = Arc::new(SlowSource {
        inner: MockSource::new().with_history("MSFT", &[date(2024, 3, 5)]),
        store: store.clone(),
        reads_when_answered: Mutex::new(None),
    });
    let cache = HistoryCache::new(source.clone(), Arc::new(store.clone()), &CacheConfig::default())
        .with_clock(Arc::new(ManualClock::new(now())));

    let report = cache.get(&symbols(&["AAPL", "MSFT"])).await.unwrap();

    assert_eq!(report.values().count(), 2);
    assert_eq!(*source.reads_when_answered.lock().unwrap(), Some(1));
    assert_eq!(store.select_calls(), 1);
}
