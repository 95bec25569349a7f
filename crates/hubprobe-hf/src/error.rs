//! Error types for Hub operations.
//!
//! Port calls map these to `SourcePortError` at the boundary; only client
//! construction returns them directly.

use thiserror::Error;

/// Result type alias for Hub operations.
pub type HfResult<T> = Result<T, HfError>;

/// Errors related to Hub API operations.
#[derive(Debug, Error)]
pub enum HfError {
    /// API request failed with an HTTP error status.
    #[error("HuggingFace request failed with status {status}: {url}")]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// API returned an invalid or unexpected response.
    #[error("Invalid response from HuggingFace: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// A raw file body exceeded the configured cap.
    #[error("Response body from {url} exceeds {limit} bytes")]
    BodyTooLarge {
        /// The URL that was requested
        url: String,
        /// The cap that was exceeded
        limit: u64,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl HfError {
    /// HTTP status of a failed request, if the server answered.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ApiRequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
