/// Identifier reported by cache-backed sources
pub const CACHE_SOURCE_ID: &str = "CACHE";

/// Default quote time-to-live in seconds
pub const DEFAULT_QUOTE_TTL_SECS: u64 = 30;

/// Default number of concurrent provider requests and history merges
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Stored history whose last date is older than this is refetched
pub const HISTORY_STALENESS_HOURS: i64 = 24;
