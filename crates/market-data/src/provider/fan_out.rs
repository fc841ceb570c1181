//! Batch adapter over a single-symbol provider.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::fetch::FetchCoordinator;
use crate::models::{DateRange, DividendHist, FetchReport, Hist, Quote};

use super::traits::{MarketDataSource, SymbolFetcher};

/// Turns a [`SymbolFetcher`] into a [`MarketDataSource`] by fanning every
/// batch call out per symbol through a [`FetchCoordinator`].
///
/// Requests without an explicit range use [`DateRange::unbounded`].
pub struct FanOutSource<F> {
    fetcher: F,
    coordinator: FetchCoordinator,
}

impl<F: SymbolFetcher> FanOutSource<F> {
    /// Concurrency follows the fetcher's rate limit.
    pub fn new(fetcher: F) -> Self {
        let coordinator = FetchCoordinator::new(fetcher.rate_limit().max_concurrency);
        Self {
            fetcher,
            coordinator,
        }
    }

    pub fn with_coordinator(fetcher: F, coordinator: FetchCoordinator) -> Self {
        Self {
            fetcher,
            coordinator,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    async fn fetch_history(&self, symbols: &[String], range: DateRange) -> FetchReport<Hist> {
        let fetcher = &self.fetcher;
        self.coordinator
            .fetch_symbols(symbols, |symbol| async move {
                let entries = fetcher.fetch_history(&symbol, range).await?;
                if entries.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Hist::new(symbol, range, entries).normalized()))
            })
            .await
    }

    async fn fetch_dividends(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> Result<FetchReport<DividendHist>, MarketDataError> {
        let fetcher = &self.fetcher;
        let report = self
            .coordinator
            .fetch_symbols(symbols, |symbol| async move {
                let mut dividends = fetcher.fetch_dividends(&symbol, range).await?;
                if dividends.is_empty() {
                    return Ok(None);
                }
                dividends.sort_by_key(|d| d.date);
                Ok(Some(DividendHist { symbol, dividends }))
            })
            .await;

        // An unsupported operation is a property of the provider, not of a symbol.
        let unsupported = report
            .failures()
            .filter(|(_, e)| matches!(e, MarketDataError::NotSupported { .. }))
            .count();
        if !report.is_empty() && unsupported == report.len() {
            return Err(MarketDataError::not_supported(
                "dividend_history",
                self.fetcher.id(),
            ));
        }
        Ok(report)
    }
}

#[async_trait]
impl<F: SymbolFetcher> MarketDataSource for FanOutSource<F> {
    fn id(&self) -> &'static str {
        self.fetcher.id()
    }

    fn description(&self) -> String {
        format!(
            "{} (max {} concurrent requests)",
            self.fetcher.id(),
            self.coordinator.max_concurrency()
        )
    }

    async fn quotes(&self, symbols: &[String]) -> Result<FetchReport<Quote>, MarketDataError> {
        let fetcher = &self.fetcher;
        Ok(self
            .coordinator
            .fetch_symbols(symbols, |symbol| async move {
                let quote = fetcher.fetch_quote(&symbol).await?;
                // Report under the requested symbol even if the provider normalized it.
                Ok(quote.map(|q| Quote { symbol, ..q }))
            })
            .await)
    }

    async fn history(&self, symbols: &[String]) -> Result<FetchReport<Hist>, MarketDataError> {
        Ok(self.fetch_history(symbols, DateRange::unbounded()).await)
    }

    async fn history_range(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> Result<FetchReport<Hist>, MarketDataError> {
        Ok(self.fetch_history(symbols, range).await)
    }

    async fn dividend_history(
        &self,
        symbols: &[String],
    ) -> Result<FetchReport<DividendHist>, MarketDataError> {
        self.fetch_dividends(symbols, DateRange::unbounded()).await
    }

    async fn dividend_history_range(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> Result<FetchReport<DividendHist>, MarketDataError> {
        self.fetch_dividends(symbols, range).await
    }
}
