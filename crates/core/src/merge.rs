//! Write-back of fetched data into the store.
//!
//! Quotes are upserted by symbol in one transaction. History is merged per
//! symbol by replacing the fetched window: rows dated inside `[from, to]` are
//! deleted and the fetched entries inserted, so re-merging the same window
//! never duplicates a (symbol, date) pair and leaves older rows alone.

use log::{debug, warn};
use marketcache_market_data::{FetchCoordinator, Hist, Quote};

use crate::errors::Result;
use crate::store::{HistoryStore, QuoteStore};

/// Upserts every quote into the store.
pub async fn merge_quotes(store: &dyn QuoteStore, quotes: &[Quote]) -> Result<usize> {
    if quotes.is_empty() {
        return Ok(0);
    }
    let merged = store.upsert_quotes(quotes).await?;
    debug!("Merged {} quotes into the cache", merged);
    Ok(merged)
}

/// Outcome of a history merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Symbols whose window was replaced, including windows cleared by an
    /// empty history
    pub merged: Vec<String>,
    /// Symbols whose transaction failed, with the error message
    pub failed: Vec<(String, String)>,
    /// Total rows inserted
    pub rows: usize,
}

impl MergeSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Replaces the stored window of each history, one transaction per symbol.
///
/// An empty history still clears its window. Entries are expected to be
/// normalized (see [`Hist::normalized`]): a repeated date, or an entry outside
/// the window that collides with a stored row, makes that symbol's
/// transaction fail and leaves its stored rows unchanged.
///
/// Merges run concurrently through `coordinator`. A failure affects only its
/// own symbol.
pub async fn merge_history<'a>(
    store: &dyn HistoryStore,
    coordinator: &FetchCoordinator,
    hists: impl IntoIterator<Item = &'a Hist>,
) -> MergeSummary {
    let mut summary = MergeSummary::default();
    let pending: Vec<&Hist> = hists.into_iter().collect();

    let results = coordinator
        .fan_out(pending, |hist| async move { store.replace_range(hist).await })
        .await;

    for (hist, result) in results {
        match result {
            Ok(rows) => {
                debug!(
                    "Merged {} history rows for {} ({} to {})",
                    rows, hist.symbol, hist.from, hist.to
                );
                summary.rows += rows;
                summary.merged.push(hist.symbol.clone());
            }
            Err(e) => {
                warn!("Could not merge history of {} into the cache: {}", hist.symbol, e);
                summary.failed.push((hist.symbol.clone(), e.to_string()));
            }
        }
    }

    summary
}
