//! In-memory stores and a scripted provider for cache tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use marketcache_market_data::{
    DateRange, FetchReport, Hist, HistoryEntry, MarketDataError, MarketDataSource, Quote,
    SymbolResult,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::errors::{DatabaseError, Error, Result};
use crate::store::{Coverage, HistoryStore, QuoteStore};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn entry(date: NaiveDate, close: Decimal) -> HistoryEntry {
    HistoryEntry {
        date,
        open: close,
        high: close + dec!(1),
        low: close - dec!(1),
        close,
        adj_close: close,
        volume: 1_000,
    }
}

pub fn hist(symbol: &str, range: DateRange, dates: &[NaiveDate]) -> Hist {
    let entries = dates.iter().map(|d| entry(*d, dec!(100))).collect();
    Hist::new(symbol, range, entries)
}

// =========================================================================
// Mock QuoteStore
// =========================================================================

#[derive(Clone, Default)]
pub struct MockQuoteStore {
    quotes: Arc<Mutex<HashMap<String, Quote>>>,
    fail_on_select: Arc<AtomicBool>,
    fail_on_save: Arc<AtomicBool>,
}

impl MockQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_quote(&self, quote: Quote) {
        self.quotes
            .lock()
            .unwrap()
            .insert(quote.symbol.clone(), quote);
    }

    pub fn get(&self, symbol: &str) -> Option<Quote> {
        self.quotes.lock().unwrap().get(symbol).cloned()
    }

    pub fn get_all(&self) -> Vec<Quote> {
        self.quotes.lock().unwrap().values().cloned().collect()
    }

    pub fn set_fail_on_select(&self, fail: bool) {
        self.fail_on_select.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl QuoteStore for MockQuoteStore {
    fn select_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>> {
        if self.fail_on_select.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "no such table: quotes".into(),
            )));
        }
        let quotes = self.quotes.lock().unwrap();
        Ok(symbols
            .iter()
            .filter_map(|s| quotes.get(s).cloned())
            .collect())
    }

    async fn upsert_quotes(&self, quotes: &[Quote]) -> Result<usize> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(Error::Unexpected("Intentional save failure".into()));
        }
        let mut stored = self.quotes.lock().unwrap();
        for quote in quotes {
            stored.insert(quote.symbol.clone(), quote.clone());
        }
        Ok(quotes.len())
    }
}

// =========================================================================
// Mock HistoryStore
// =========================================================================

#[derive(Clone, Default)]
pub struct MockHistoryStore {
    rows: Arc<Mutex<HashMap<String, BTreeMap<NaiveDate, HistoryEntry>>>>,
    fail_on_coverage: Arc<AtomicBool>,
    fail_on_select: Arc<AtomicBool>,
    fail_on_replace: Arc<Mutex<HashSet<String>>>,
    select_calls: Arc<AtomicUsize>,
}

impl MockHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entries(&self, symbol: &str, dates: &[NaiveDate]) {
        let mut rows = self.rows.lock().unwrap();
        let series = rows.entry(symbol.to_string()).or_default();
        for d in dates {
            series.insert(*d, entry(*d, dec!(50)));
        }
    }

    pub fn dates(&self, symbol: &str) -> Vec<NaiveDate> {
        self.rows
            .lock()
            .unwrap()
            .get(symbol)
            .map(|series| series.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn close_on(&self, symbol: &str, date: NaiveDate) -> Option<Decimal> {
        self.rows
            .lock()
            .unwrap()
            .get(symbol)
            .and_then(|series| series.get(&date))
            .map(|e| e.close)
    }

    pub fn set_fail_on_coverage(&self, fail: bool) {
        self.fail_on_coverage.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_on_select(&self, fail: bool) {
        self.fail_on_select.store(fail, Ordering::SeqCst);
    }

    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    pub fn fail_on_replace_for(&self, symbol: &str) {
        self.fail_on_replace
            .lock()
            .unwrap()
            .insert(symbol.to_string());
    }
}

#[async_trait]
impl HistoryStore for MockHistoryStore {
    fn coverage(&self, symbols: &[String]) -> Result<HashMap<String, Coverage>> {
        if self.fail_on_coverage.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::ConnectionFailed(
                "database is locked".into(),
            )));
        }
        let rows = self.rows.lock().unwrap();
        Ok(symbols
            .iter()
            .filter_map(|s| {
                let series = rows.get(s)?;
                let (min_date, _) = series.first_key_value()?;
                let (max_date, _) = series.last_key_value()?;
                Some((
                    s.clone(),
                    Coverage {
                        count: series.len() as i64,
                        min_date: *min_date,
                        max_date: *max_date,
                    },
                ))
            })
            .collect())
    }

    fn select_history(&self, symbols: &[String]) -> Result<HashMap<String, Vec<HistoryEntry>>> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_select.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "disk I/O error".into(),
            )));
        }
        let rows = self.rows.lock().unwrap();
        Ok(symbols
            .iter()
            .filter_map(|s| {
                rows.get(s)
                    .map(|series| (s.clone(), series.values().cloned().collect()))
            })
            .collect())
    }

    async fn replace_range(&self, hist: &Hist) -> Result<usize> {
        if self.fail_on_replace.lock().unwrap().contains(&hist.symbol) {
            return Err(Error::Database(DatabaseError::TransactionFailed(
                "Intentional replace failure".into(),
            )));
        }
        let mut rows = self.rows.lock().unwrap();
        let mut series = rows.get(&hist.symbol).cloned().unwrap_or_default();
        series.retain(|d, _| *d < hist.from || *d > hist.to);
        for e in &hist.entries {
            if series.insert(e.date, e.clone()).is_some() {
                return Err(Error::Database(DatabaseError::UniqueViolation(format!(
                    "history_entries ({}, {})",
                    hist.symbol, e.date
                ))));
            }
        }
        rows.insert(hist.symbol.clone(), series);
        Ok(hist.entries.len())
    }
}

// =========================================================================
// Mock provider
// =========================================================================

/// Scripted provider that records every call it receives.
///
/// Symbols it knows nothing about are left out of its reports.
#[derive(Default)]
pub struct MockSource {
    quotes: HashMap<String, Quote>,
    history: HashMap<String, Vec<HistoryEntry>>,
    failing: HashSet<String>,
    history_window: Option<DateRange>,
    unavailable: AtomicBool,
    quote_calls: Mutex<Vec<Vec<String>>>,
    history_calls: Mutex<Vec<Vec<String>>>,
    history_range_calls: Mutex<usize>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, symbol: &str, price: Decimal) -> Self {
        self.quotes
            .insert(symbol.to_string(), Quote::new(symbol, price));
        self
    }

    pub fn with_history(mut self, symbol: &str, dates: &[NaiveDate]) -> Self {
        let entries = dates.iter().map(|d| entry(*d, dec!(100))).collect();
        self.history.insert(symbol.to_string(), entries);
        self
    }

    /// Report full-history answers with this window instead of the entry bounds.
    pub fn with_history_window(mut self, window: DateRange) -> Self {
        self.history_window = Some(window);
        self
    }

    pub fn with_failing(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn quote_calls(&self) -> Vec<Vec<String>> {
        self.quote_calls.lock().unwrap().clone()
    }

    pub fn history_calls(&self) -> Vec<Vec<String>> {
        self.history_calls.lock().unwrap().clone()
    }

    pub fn history_range_calls(&self) -> usize {
        *self.history_range_calls.lock().unwrap()
    }

    fn check_available(&self) -> std::result::Result<(), MarketDataError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MarketDataError::provider("MOCK", "service unavailable"));
        }
        Ok(())
    }

    fn history_report(&self, symbols: &[String], range: Option<DateRange>) -> FetchReport<Hist> {
        symbols
            .iter()
            .filter_map(|symbol| {
                if self.failing.contains(symbol) {
                    return Some(SymbolResult::failed(
                        symbol.clone(),
                        MarketDataError::Network("connection reset".into()),
                    ));
                }
                let entries: Vec<HistoryEntry> = self
                    .history
                    .get(symbol)?
                    .iter()
                    .filter(|e| range.map_or(true, |r| r.contains(e.date)))
                    .cloned()
                    .collect();
                let window = range.or(self.history_window).unwrap_or_else(|| {
                    let first = entries.first().map(|e| e.date).unwrap_or(date(2000, 1, 1));
                    let last = entries.last().map(|e| e.date).unwrap_or(first);
                    DateRange::new(first, last)
                });
                Some(SymbolResult::value(
                    symbol.clone(),
                    Hist::new(symbol.clone(), window, entries),
                ))
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataSource for MockSource {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    async fn quotes(
        &self,
        symbols: &[String],
    ) -> std::result::Result<FetchReport<Quote>, MarketDataError> {
        self.quote_calls.lock().unwrap().push(symbols.to_vec());
        self.check_available()?;
        Ok(symbols
            .iter()
            .filter_map(|symbol| {
                if self.failing.contains(symbol) {
                    return Some(SymbolResult::failed(
                        symbol.clone(),
                        MarketDataError::Network("connection reset".into()),
                    ));
                }
                self.quotes
                    .get(symbol)
                    .map(|q| SymbolResult::value(symbol.clone(), q.clone()))
            })
            .collect())
    }

    async fn history(
        &self,
        symbols: &[String],
    ) -> std::result::Result<FetchReport<Hist>, MarketDataError> {
        self.history_calls.lock().unwrap().push(symbols.to_vec());
        self.check_available()?;
        Ok(self.history_report(symbols, None))
    }

    async fn history_range(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> std::result::Result<FetchReport<Hist>, MarketDataError> {
        *self.history_range_calls.lock().unwrap() += 1;
        self.check_available()?;
        Ok(self.history_report(symbols, Some(range)))
    }
}
