//! Concurrent fan-out/fan-in of per-item work.
//!
//! [`FetchCoordinator`] starts one unit of work per item, keeps at most
//! `max_concurrency` of them in flight and returns once every unit has
//! produced an outcome. A failing unit never affects the others.
//!
//! There is no timeout, cancellation or retry here: a unit that never
//! completes blocks the call, and a failed unit is reported exactly once.

use std::collections::HashSet;
use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{FetchReport, SymbolResult};

/// Default number of in-flight requests.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchCoordinator {
    max_concurrency: usize,
}

impl Default for FetchCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY)
    }
}

impl FetchCoordinator {
    /// A zero limit is raised to 1.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Run `work` once per item and collect `(item, outcome)` pairs in
    /// completion order.
    ///
    /// The returned vector always has exactly `items.len()` elements.
    pub async fn fan_out<T, R, E, F, Fut>(&self, items: Vec<T>, work: F) -> Vec<(T, Result<R, E>)>
    where
        T: Clone,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }

        let work = &work;
        let results: Vec<(T, Result<R, E>)> = stream::iter(items)
            .map(|item| {
                let unit = work(item.clone());
                async move { (item, unit.await) }
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        debug!(
            "Fan-out finished: {} items, {} failed, concurrency {}",
            total, failed, self.max_concurrency
        );
        results
    }

    /// Fan `work` out over the distinct symbols and build a report.
    ///
    /// `Ok(None)` from `work` is reported as `NoData`; errors are attached to
    /// their symbol.
    pub async fn fetch_symbols<V, F, Fut>(&self, symbols: &[String], work: F) -> FetchReport<V>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<Option<V>, MarketDataError>>,
    {
        let symbols = unique_symbols(symbols);
        self.fan_out(symbols, work)
            .await
            .into_iter()
            .map(|(symbol, result)| {
                if let Err(e) = &result {
                    warn!("Fetch failed for {}: {}", symbol, e);
                }
                SymbolResult::new(symbol, result.into())
            })
            .collect()
    }
}

/// Distinct symbols in order of first occurrence.
pub fn unique_symbols(symbols: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(symbols.len());
    symbols
        .iter()
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}
