use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::sqlite::{Sqlite, SqliteConnection};
use log::{debug, warn};
use marketcache_core::store::{Coverage, HistoryStore};
use marketcache_core::Result;
use marketcache_market_data::{Hist, HistoryEntry};

use super::model::HistoryEntryDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::history_entries::dsl as history_dsl;
use crate::utils::{chunk_for_sqlite, format_date, parse_date, placeholders};

/// Rows per `INSERT` statement when replacing a window.
const HISTORY_WRITE_CHUNK: usize = 1_000;

#[derive(QueryableByName, Debug)]
struct CoverageRow {
    #[diesel(sql_type = Text)]
    symbol: String,
    #[diesel(sql_type = BigInt)]
    count: i64,
    #[diesel(sql_type = Nullable<Text>)]
    min_date: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    max_date: Option<String>,
}

pub struct HistoryRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl HistoryRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl HistoryStore for HistoryRepository {
    fn coverage(&self, symbols: &[String]) -> Result<HashMap<String, Coverage>> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let mut conn = get_connection(&self.pool)?;
        let mut result = HashMap::new();

        for chunk in chunk_for_sqlite(symbols) {
            let sql = format!(
                "SELECT symbol, COUNT(*) AS count, MIN(date) AS min_date, MAX(date) AS max_date \
                 FROM history_entries \
                 WHERE symbol IN ({}) \
                 GROUP BY symbol",
                placeholders(chunk.len())
            );

            let mut query_builder = Box::new(sql_query(sql)).into_boxed::<Sqlite>();
            for symbol in chunk {
                query_builder = query_builder.bind::<Text, _>(symbol);
            }

            let rows: Vec<CoverageRow> = query_builder.load::<CoverageRow>(&mut conn).into_core()?;

            for row in rows {
                let (Some(min_str), Some(max_str)) = (row.min_date, row.max_date) else {
                    continue;
                };
                match (parse_date(&min_str), parse_date(&max_str)) {
                    (Ok(min_date), Ok(max_date)) => {
                        result.insert(
                            row.symbol,
                            Coverage {
                                count: row.count,
                                min_date,
                                max_date,
                            },
                        );
                    }
                    // treated as not cached, so the series is fetched and rewritten
                    (Err(e), _) | (_, Err(e)) => {
                        warn!("Ignoring stored history bounds of {}: {}", row.symbol, e);
                    }
                }
            }
        }

        Ok(result)
    }

    fn select_history(&self, symbols: &[String]) -> Result<HashMap<String, Vec<HistoryEntry>>> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let mut conn = get_connection(&self.pool)?;
        let mut grouped: HashMap<String, Vec<HistoryEntry>> = HashMap::new();
        let mut corrupt: HashSet<String> = HashSet::new();

        for chunk in chunk_for_sqlite(symbols) {
            let rows = history_dsl::history_entries
                .filter(history_dsl::symbol.eq_any(chunk))
                .order((history_dsl::symbol.asc(), history_dsl::date.asc()))
                .select(HistoryEntryDB::as_select())
                .load::<HistoryEntryDB>(&mut conn)
                .into_core()?;

            for row in rows {
                let symbol = row.symbol.clone();
                match HistoryEntry::try_from(row) {
                    Ok(entry) => grouped.entry(symbol).or_default().push(entry),
                    Err(e) => {
                        warn!("Stored history of {} is unreadable: {}", symbol, e);
                        corrupt.insert(symbol);
                    }
                }
            }
        }

        // A partial series is never served.
        for symbol in &corrupt {
            grouped.remove(symbol);
        }

        Ok(grouped)
    }

    async fn replace_range(&self, hist: &Hist) -> Result<usize> {
        let symbol = hist.symbol.clone();
        let from = format_date(hist.from);
        let to = format_date(hist.to);
        let db_rows: Vec<HistoryEntryDB> = hist
            .entries
            .iter()
            .map(|entry| HistoryEntryDB::from_entry(&symbol, entry))
            .collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let deleted = diesel::delete(
                    history_dsl::history_entries
                        .filter(history_dsl::symbol.eq(&symbol))
                        .filter(history_dsl::date.ge(&from))
                        .filter(history_dsl::date.le(&to)),
                )
                .execute(conn)
                .map_err(StorageError::QueryFailed)?;

                let mut inserted = 0;
                for chunk in db_rows.chunks(HISTORY_WRITE_CHUNK) {
                    // a repeated date or a collision outside the window aborts the job
                    inserted += diesel::insert_into(history_dsl::history_entries)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::QueryFailed)?;
                }

                debug!(
                    "Replaced history of {} in [{}, {}]: {} removed, {} written",
                    symbol, from, to, deleted, inserted
                );
                Ok(inserted)
            })
            .await
    }
}
