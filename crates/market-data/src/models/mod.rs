//! Market data models
//!
//! - `quote` - Point-in-time snapshot (Quote, PriceRange)
//! - `history` - Daily series and dividends (Hist, HistoryEntry, DividendHist, DateRange)
//! - `report` - Per-symbol outcomes of a batch fetch (FetchReport, FetchOutcome)

mod history;
mod quote;
mod report;

pub use history::{DateRange, DividendEntry, DividendHist, Hist, HistoryEntry};
pub use quote::{PriceRange, Quote};
pub use report::{FetchOutcome, FetchReport, SymbolResult};
