//! Point quote caching.
//!
//! [`QuoteCache`] serves quotes from the store while they are younger than the
//! configured time-to-live and fetches everything else from the provider in a
//! single batch call, writing the fetched quotes back.

mod cache;


pub use cache::QuoteCache;
