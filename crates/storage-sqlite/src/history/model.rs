//! Database model for cached daily history.

use diesel::prelude::*;
use marketcache_market_data::HistoryEntry;

use crate::errors::StorageError;
use crate::utils::{format_date, parse_date, parse_decimal};

/// One row per (symbol, date).
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::history_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HistoryEntryDB {
    pub symbol: String,
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub adj_close: String,
    pub volume: i64,
}

impl HistoryEntryDB {
    pub fn from_entry(symbol: &str, entry: &HistoryEntry) -> Self {
        HistoryEntryDB {
            symbol: symbol.to_string(),
            date: format_date(entry.date),
            open: entry.open.to_string(),
            high: entry.high.to_string(),
            low: entry.low.to_string(),
            close: entry.close.to_string(),
            adj_close: entry.adj_close.to_string(),
            volume: entry.volume,
        }
    }
}

impl TryFrom<HistoryEntryDB> for HistoryEntry {
    type Error = StorageError;

    fn try_from(db: HistoryEntryDB) -> Result<Self, Self::Error> {
        Ok(HistoryEntry {
            date: parse_date(&db.date)?,
            open: parse_decimal(&db.open)?,
            high: parse_decimal(&db.high)?,
            low: parse_decimal(&db.low)?,
            close: parse_decimal(&db.close)?,
            adj_close: parse_decimal(&db.adj_close)?,
            volume: db.volume,
        })
    }
}
