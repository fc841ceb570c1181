//! Per-symbol outcomes of a batch fetch.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::errors::MarketDataError;

/// Outcome of fetching data for one symbol.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "camelCase")]
pub enum FetchOutcome<T> {
    /// Data was served, either from the cache or from the provider.
    Value(T),
    /// The request succeeded but the provider had nothing for the symbol.
    NoData,
    /// The fetch for this symbol failed.
    Failed(#[serde(serialize_with = "serialize_error")] MarketDataError),
}

fn serialize_error<S: serde::Serializer>(
    error: &MarketDataError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl<T> FetchOutcome<T> {
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&MarketDataError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            Self::Value(value) => FetchOutcome::Value(f(value)),
            Self::NoData => FetchOutcome::NoData,
            Self::Failed(error) => FetchOutcome::Failed(error),
        }
    }
}

impl<T> From<Result<Option<T>, MarketDataError>> for FetchOutcome<T> {
    fn from(result: Result<Option<T>, MarketDataError>) -> Self {
        match result {
            Ok(Some(value)) => Self::Value(value),
            Ok(None) | Err(MarketDataError::NoDataForRange) => Self::NoData,
            Err(error) => Self::Failed(error),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SymbolResult<T> {
    pub symbol: String,
    #[serde(flatten)]
    pub outcome: FetchOutcome<T>,
}

impl<T> SymbolResult<T> {
    pub fn new(symbol: impl Into<String>, outcome: FetchOutcome<T>) -> Self {
        Self {
            symbol: symbol.into(),
            outcome,
        }
    }

    pub fn value(symbol: impl Into<String>, value: T) -> Self {
        Self::new(symbol, FetchOutcome::Value(value))
    }

    pub fn no_data(symbol: impl Into<String>) -> Self {
        Self::new(symbol, FetchOutcome::NoData)
    }

    pub fn failed(symbol: impl Into<String>, error: MarketDataError) -> Self {
        Self::new(symbol, FetchOutcome::Failed(error))
    }
}

/// Result of a batch request: one entry per symbol the request was responsible for.
///
/// Ordering carries no meaning. Use [`FetchReport::get`] or
/// [`FetchReport::into_map`] to look symbols up.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FetchReport<T> {
    results: Vec<SymbolResult<T>>,
}

impl<T> Default for FetchReport<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

impl<T> FetchReport<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the same failure for every symbol.
    pub fn failed_all(symbols: &[String], error: &MarketDataError) -> Self {
        symbols
            .iter()
            .map(|symbol| SymbolResult::failed(symbol.clone(), error.clone()))
            .collect()
    }

    pub fn push(&mut self, result: SymbolResult<T>) {
        self.results.push(result);
    }

    pub fn push_value(&mut self, symbol: impl Into<String>, value: T) {
        self.push(SymbolResult::value(symbol, value));
    }

    pub fn extend(&mut self, other: FetchReport<T>) {
        self.results.extend(other.results);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolResult<T>> {
        self.results.iter()
    }

    pub fn get(&self, symbol: &str) -> Option<&FetchOutcome<T>> {
        self.results
            .iter()
            .find(|r| r.symbol == symbol)
            .map(|r| &r.outcome)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.results.iter().any(|r| r.symbol == symbol)
    }

    /// Successfully served values.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.results.iter().filter_map(|r| r.outcome.value())
    }

    pub fn into_values(self) -> Vec<T> {
        self.results
            .into_iter()
            .filter_map(|r| r.outcome.into_value())
            .collect()
    }

    /// Served values keyed by symbol.
    pub fn into_map(self) -> HashMap<String, T> {
        self.results
            .into_iter()
            .filter_map(|r| {
                let symbol = r.symbol;
                r.outcome.into_value().map(|v| (symbol, v))
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &MarketDataError)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.error().map(|e| (r.symbol.as_str(), e)))
    }

    pub fn symbols_with_values(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.outcome.is_value())
            .map(|r| r.symbol.as_str())
            .collect()
    }

    /// Add a `NoData` entry for every requested symbol the report does not mention.
    pub fn ensure_symbols(mut self, symbols: &[String]) -> Self {
        let seen: HashSet<String> = self.results.iter().map(|r| r.symbol.clone()).collect();
        for symbol in symbols {
            if !seen.contains(symbol) {
                self.results.push(SymbolResult::no_data(symbol.clone()));
            }
        }
        self
    }

    /// Drop entries for symbols outside `symbols`.
    pub fn retain_symbols(mut self, symbols: &[String]) -> Self {
        let wanted: HashSet<&str> = symbols.iter().map(String::as_str).collect();
        self.results.retain(|r| wanted.contains(r.symbol.as_str()));
        self
    }

    pub fn map_values<U>(self, mut f: impl FnMut(T) -> U) -> FetchReport<U> {
        self.results
            .into_iter()
            .map(|r| SymbolResult::new(r.symbol, r.outcome.map(&mut f)))
            .collect()
    }

    pub fn into_results(self) -> Vec<SymbolResult<T>> {
        self.results
    }
}

impl<T> FromIterator<SymbolResult<T>> for FetchReport<T> {
    fn from_iter<I: IntoIterator<Item = SymbolResult<T>>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for FetchReport<T> {
    type Item = SymbolResult<T>;
    type IntoIter = std::vec::IntoIter<SymbolResult<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
