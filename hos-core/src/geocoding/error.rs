use thiserror::Error;

use crate::Interrupted;

/// Errors from [`crate::geocoding::GeocodingProvider`] lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodingError {
    /// The query matched nothing.
    #[error("no match for {query:?}")]
    NotFound {
        /// Address or coordinate text that failed to resolve.
        query: String,
    },
    /// Network-level failure.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Error description.
        message: String,
    },
    /// The request exceeded its timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Timeout applied to the request.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse geocoding response: {message}")]
    Parse {
        /// Decoder message.
        message: String,
    },
    /// The call was abandoned before completing.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}
