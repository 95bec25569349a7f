//! Error types for repository source operations.

use thiserror::Error;

/// Errors from repository source operations.
///
/// These are domain-level errors the analyzer can act on.
/// Implementation-specific errors (HTTP, JSON) are mapped to these.
#[derive(Debug, Error)]
pub enum SourcePortError {
    /// The repository, revision or path does not exist.
    #[error("Not found: {resource}")]
    NotFound {
        /// What was requested
        resource: String,
    },

    /// Authentication required or the token was rejected.
    #[error("Authentication required for repository: {repo}")]
    Unauthorized {
        /// The repository that requires auth
        repo: String,
    },

    /// Access is gated behind the repository's terms.
    #[error("Access to {repo} is restricted; accept the repository terms at {terms_url}")]
    Forbidden {
        /// The gated repository
        repo: String,
        /// Page where the terms can be accepted
        terms_url: String,
    },

    /// Any other non-success status, or a network failure.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the failure
        message: String,
    },

    /// A listing response was not valid JSON of the expected shape.
    #[error("Malformed response: {message}")]
    Decode {
        /// What could not be decoded
        message: String,
    },

    /// A raw document exceeded the byte cap.
    #[error("{path} exceeds the {limit} byte limit")]
    TooLarge {
        /// Repository path of the document
        path: String,
        /// The cap that was exceeded
        limit: u64,
    },
}

/// Result type alias for repository source operations.
pub type SourcePortResult<T> = Result<T, SourcePortError>;
