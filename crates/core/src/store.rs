//! Cache storage traits.
//!
//! These traits abstract the persistence layer used by the caches. The
//! `storage-sqlite` crate implements both on top of a single SQLite file.
//!
//! # Design Notes
//!
//! - Reads are synchronous: they are short, pooled and run on the caller's task
//! - Writes are async: they go through a single background writer
//! - Every method touching several symbols takes them in one batch

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use marketcache_market_data::{Hist, HistoryEntry, Quote};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

// =============================================================================
// Quote Store
// =============================================================================

/// Storage interface for cached quotes, one row per symbol.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Gets the stored quotes for the given symbols.
    ///
    /// Symbols without a stored row are omitted. Staleness is not checked here.
    fn select_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>>;

    /// Inserts or replaces the stored row of every quote, keyed by symbol.
    ///
    /// All rows are written in one transaction. `updated_at` is stored as given.
    ///
    /// # Returns
    ///
    /// The number of rows inserted or updated
    async fn upsert_quotes(&self, quotes: &[Quote]) -> Result<usize>;
}

// =============================================================================
// History Store
// =============================================================================

/// Aggregate of the stored history rows of one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub count: i64,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

/// Storage interface for cached daily history, keyed by (symbol, date).
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Computes row count and date bounds per symbol in one aggregate query.
    ///
    /// Symbols without stored rows are omitted.
    fn coverage(&self, symbols: &[String]) -> Result<HashMap<String, Coverage>>;

    /// Gets every stored entry of the given symbols, grouped by symbol and
    /// ordered by date ascending.
    fn select_history(&self, symbols: &[String]) -> Result<HashMap<String, Vec<HistoryEntry>>>;

    /// Replaces the stored rows of `hist.symbol` whose date lies in
    /// `[hist.from, hist.to]` with `hist.entries`, in one transaction.
    ///
    /// Rows outside the window are untouched.
    ///
    /// # Returns
    ///
    /// The number of rows inserted
    async fn replace_range(&self, hist: &Hist) -> Result<usize>;
}
