//! Error types for the market data crate.
//!
//! [`MarketDataError`] is returned by providers, either for a whole call or
//! attached to a single symbol inside a [`FetchReport`](crate::models::FetchReport).

use thiserror::Error;

/// Errors that can occur while fetching market data.
///
/// The error is `Clone` so that a failure of a whole provider call can be
/// attached to every symbol that call was responsible for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// No data available for the requested date range.
    #[error("No data for date range")]
    NoDataForRange,

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider does not implement the requested operation.
    #[error("{provider} does not support '{operation}'")]
    NotSupported {
        /// The operation that was requested
        operation: String,
        /// The provider that rejected it
        provider: String,
    },

    /// The provider returned data that could not be interpreted.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(String),
}

impl MarketDataError {
    /// Shorthand for [`MarketDataError::ProviderError`].
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`MarketDataError::NotSupported`].
    pub fn not_supported(operation: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::NotSupported {
            operation: operation.into(),
            provider: provider.into(),
        }
    }

    /// Returns true if the failure is likely to go away on its own.
    ///
    /// Nothing in this workspace retries; the flag is informational for callers
    /// that inspect per-symbol failures.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout { .. } | Self::Network(_)
        )
    }
}
