use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use marketcache_core::store::QuoteStore;
use marketcache_core::Result;
use marketcache_market_data::Quote;

use super::model::QuoteDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::quotes::dsl as quotes_dsl;
use crate::utils::chunk_for_sqlite;

/// Rows per `REPLACE` statement.
const QUOTE_WRITE_CHUNK: usize = 1_000;

pub struct QuoteRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl QuoteRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl QuoteStore for QuoteRepository {
    fn select_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = get_connection(&self.pool)?;

        let mut quotes = Vec::with_capacity(symbols.len());
        for chunk in chunk_for_sqlite(symbols) {
            let rows = quotes_dsl::quotes
                .filter(quotes_dsl::symbol.eq_any(chunk))
                .select(QuoteDB::as_select())
                .load::<QuoteDB>(&mut conn)
                .into_core()?;
            quotes.extend(rows.into_iter().map(Quote::from));
        }
        Ok(quotes)
    }

    async fn upsert_quotes(&self, input_quotes: &[Quote]) -> Result<usize> {
        if input_quotes.is_empty() {
            return Ok(0);
        }

        let db_rows: Vec<QuoteDB> = input_quotes.iter().map(QuoteDB::from).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut total_upserted = 0;
                for chunk in db_rows.chunks(QUOTE_WRITE_CHUNK) {
                    total_upserted += diesel::replace_into(quotes_dsl::quotes)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::QueryFailed)?;
                }
                Ok(total_upserted)
            })
            .await
    }
}
