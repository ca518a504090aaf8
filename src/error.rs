//! Error types for fetch operations.
//!
//! Every failure a fetch unit can hit maps onto one of these variants. The
//! orchestrator never branches on them: they are logged and recorded as a
//! failed outcome.

use thiserror::Error;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Why a fetch (or an interception rule registration) failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The target could not be parsed as a URL.
    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Connection, DNS, TLS or body-read failure.
    #[error("transport failure for {url}: {message}")]
    TransportFailure { url: String, message: String },

    /// The body did not match the declared payload shape.
    #[error("could not decode {expected} from {url}: {message}")]
    DecodeFailure {
        url: String,
        expected: &'static str,
        message: String,
    },

    /// An interception rule could not be built or registered.
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}

impl FetchError {
    /// Short machine-readable name of the variant, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidTarget { .. } => "invalid_target",
            FetchError::TransportFailure { .. } => "transport_failure",
            FetchError::DecodeFailure { .. } => "decode_failure",
            FetchError::ConfigurationError(_) => "configuration_error",
        }
    }

    pub(crate) fn transport(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        FetchError::TransportFailure {
            url: url.into(),
            message: err.to_string(),
        }
    }
}
