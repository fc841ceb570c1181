//! Utility functions for SQLite storage operations.
//!
//! Helpers for chunked `IN (...)` queries and for the text encoding used for
//! dates and decimals in the cache tables.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::StorageError;

/// Maximum number of parameters for SQLite IN (...) queries.
///
/// SQLite has a compile-time limit on the number of parameters in a SQL statement,
/// typically around 999 (SQLITE_MAX_VARIABLE_NUMBER). Symbol lists are split into
/// chunks of this size.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Storage format of calendar dates. Sorts lexicographically in date order.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Chunk a slice into smaller slices for batch SQLite queries.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// `?, ?, ?` with `count` placeholders, for hand-written `IN (...)` clauses.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| StorageError::SerializationError(format!("date '{}': {}", value, e)))
}

pub fn parse_decimal(value: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value)
        .map_err(|e| StorageError::SerializationError(format!("decimal '{}': {}", value, e)))
}
