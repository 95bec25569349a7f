//! Errors surfaced by a repository analysis.
//!
//! Only tree-walk failures reach the caller. Metadata documents that fail
//! to fetch or parse are logged and left absent.

use thiserror::Error;

use crate::ports::SourcePortError;

/// Error type for [`RepoAnalyzer::analyze`](crate::services::RepoAnalyzer::analyze).
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The identifier is not of the form `owner/name`.
    #[error("Invalid repository id '{repo_id}': expected owner/name")]
    InvalidRepoId {
        /// The rejected identifier
        repo_id: String,
    },

    /// The repository, revision or directory does not exist.
    #[error("Not found: {repo} (listing '{path}')")]
    NotFound {
        /// Repository being analyzed
        repo: String,
        /// Directory being listed, empty for the root
        path: String,
    },

    /// The repository is private and no valid token was supplied.
    #[error("Authentication required for {repo}")]
    Unauthorized {
        /// Repository being analyzed
        repo: String,
    },

    /// The repository is gated.
    #[error("Access to {repo} is restricted; accept the repository terms at {terms_url}")]
    Forbidden {
        /// Repository being analyzed
        repo: String,
        /// Page where the terms can be accepted
        terms_url: String,
    },

    /// Any other failed request.
    #[error("Failed to list {repo} at '{path}': {message}")]
    Transport {
        /// Repository being analyzed
        repo: String,
        /// Directory being listed
        path: String,
        /// Underlying failure
        message: String,
    },

    /// A listing response could not be decoded.
    #[error("Malformed listing for {repo} at '{path}': {message}")]
    Decode {
        /// Repository being analyzed
        repo: String,
        /// Directory being listed
        path: String,
        /// What could not be decoded
        message: String,
    },

    /// The caller's cancellation token fired.
    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// Attach repository and path context to a port error from the tree walk.
    pub fn from_port(err: SourcePortError, repo: &str, path: &str) -> Self {
        match err {
            SourcePortError::NotFound { .. } => Self::NotFound {
                repo: repo.to_string(),
                path: path.to_string(),
            },
            SourcePortError::Unauthorized { .. } => Self::Unauthorized {
                repo: repo.to_string(),
            },
            SourcePortError::Forbidden { terms_url, .. } => Self::Forbidden {
                repo: repo.to_string(),
                terms_url,
            },
            SourcePortError::Decode { message } => Self::Decode {
                repo: repo.to_string(),
                path: path.to_string(),
                message,
            },
            other @ (SourcePortError::Transport { .. } | SourcePortError::TooLarge { .. }) => {
                Self::Transport {
                    repo: repo.to_string(),
                    path: path.to_string(),
                    message: other.to_string(),
                }
            }
        }
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_keeps_remediation_hint() {
        let err = AnalysisError::from_port(
            SourcePortError::Forbidden {
                repo: "org/gated".to_string(),
                terms_url: "https://huggingface.co/org/gated".to_string(),
            },
            "org/gated",
            "",
        );
        assert!(matches!(err, AnalysisError::Forbidden { .. }));
        assert!(err.to_string().contains("accept the repository terms at https://huggingface.co/org/gated"));
    }

    #[test]
    fn test_context_is_attached() {
        let err = AnalysisError::from_port(
            SourcePortError::Transport {
                message: "HTTP 502".to_string(),
            },
            "org/model",
            "unet",
        );
        let msg = err.to_string();
        assert!(msg.contains("org/model"));
        assert!(msg.contains("unet"));
        assert!(msg.contains("502"));

        let err = AnalysisError::from_port(
            SourcePortError::NotFound {
                resource: "x".to_string(),
            },
            "org/model",
            "",
        );
        assert!(matches!(err, AnalysisError::NotFound { ref repo, .. } if repo == "org/model"));
        assert!(!err.is_cancelled());
    }
}
