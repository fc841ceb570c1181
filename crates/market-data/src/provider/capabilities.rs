//! Provider rate limiting configuration.

/// Rate limiting configuration for a provider.
///
/// Controls how many requests may be in flight against one provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum concurrent requests to this provider.
    pub max_concurrency: usize,
}

impl RateLimit {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self { max_concurrency: 5 }
    }
}
