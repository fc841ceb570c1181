//! Opening the cache database and wiring it into a cached source.

use std::sync::Arc;

use diesel::connection::SimpleConnection;
use log::{info, warn};
use marketcache_core::store::{HistoryStore, QuoteStore};
use marketcache_core::{CacheConfig, CachedSource, Result};
use marketcache_market_data::MarketDataSource;

use crate::db::{self, DbPool};
use crate::errors::IntoCore;
use crate::history::HistoryRepository;
use crate::quotes::QuoteRepository;

/// Both cache tables behind one SQLite file.
///
/// Reads use the shared pool; writes go through a single writer actor that
/// lives as long as any repository handle does.
pub struct SqliteCacheStore {
    pool: Arc<DbPool>,
    quotes: Arc<QuoteRepository>,
    history: Arc<HistoryRepository>,
}

impl SqliteCacheStore {
    /// Opens (or creates) the database at `db_path` and applies migrations.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(db_path: &str) -> Result<Self> {
        let db_path = db::init(db_path)?;
        let pool = db::create_pool(&db_path)?;
        db::run_migrations(&pool)?;
        let writer = db::spawn_writer((*pool).clone());

        info!("Opened market data cache at {}", db_path);
        Ok(Self {
            quotes: Arc::new(QuoteRepository::new(pool.clone(), writer.clone())),
            history: Arc::new(HistoryRepository::new(pool.clone(), writer)),
            pool,
        })
    }

    pub fn quote_store(&self) -> Arc<dyn QuoteStore> {
        self.quotes.clone()
    }

    pub fn history_store(&self) -> Arc<dyn HistoryStore> {
        self.history.clone()
    }

    /// Wraps `provider` in caches backed by this store.
    pub fn cached_source(
        &self,
        provider: Arc<dyn MarketDataSource>,
        config: &CacheConfig,
    ) -> CachedSource {
        CachedSource::new(provider, self.quote_store(), self.history_store(), config)
    }

    /// Folds the write-ahead log back into the database file and releases
    /// this handle's connections.
    ///
    /// Caches created from this store keep their own repository handles and
    /// stay usable; the writer stops once the last of them is dropped.
    pub fn close(self) -> Result<()> {
        let mut conn = db::get_connection(&self.pool)?;
        conn.batch_execute("PRAGMA wal_checkpoint(TRUNCATE);")
            .into_core()?;
        Ok(())
    }
}

/// Opens the cache at `db_path` and wraps `provider` with it.
///
/// When the store cannot be opened the provider is returned unchanged, so
/// callers always get a working source.
///
/// Must be called from within a Tokio runtime.
pub fn open_cached_source(
    db_path: &str,
    provider: Arc<dyn MarketDataSource>,
    config: &CacheConfig,
) -> Arc<dyn MarketDataSource> {
    match SqliteCacheStore::open(db_path) {
        Ok(store) => Arc::new(store.cached_source(provider, config)),
        Err(e) => {
            warn!(
                "Market data cache at {} is unavailable, using {} directly: {}",
                db_path,
                provider.description(),
                e
            );
            provider
        }
    }
}
