use thiserror::Error;

use crate::Interrupted;

/// Errors from [`crate::routing::RoutingProvider::route_between`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The router found no route between the coordinates.
    #[error("no route found between the requested coordinates")]
    NoRoute,
    /// Network-level failure (connection refused, DNS resolution failed).
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
    /// The router answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The router answered with a non-`Ok` service code.
    #[error("routing service error {code}: {message}")]
    Service {
        /// Service status code, e.g. `"NoRoute"`.
        code: String,
        /// Service message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    Parse {
        /// Decoder message.
        message: String,
    },
    /// The call was abandoned before completing.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}
