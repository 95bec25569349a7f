//! Internal API response types for the Hub.
//!
//! These types are internal to `hubprobe-hf` and are not exposed to consumers.
//! External consumers should use the port DTOs defined in `hubprobe-core`.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::config::HfClientConfig;
use crate::error::HfResult;

// ============================================================================
// Configuration (used internally, see config.rs for public config)
// ============================================================================

/// Internal configuration for the Hub client.
#[derive(Debug, Clone)]
pub struct HfConfig {
    /// Hub endpoint (default: <https://huggingface.co>)
    pub endpoint: Url,
    pub user_agent: String,
    pub timeout: Duration,
    /// Optional authentication token for private or gated repositories
    pub token: Option<String>,
    /// Maximum number of retry attempts for transient errors (default: 3)
    pub max_retries: u8,
    /// Base delay in milliseconds for exponential backoff (default: 500)
    pub retry_base_delay_ms: u64,
}

impl HfConfig {
    /// Validate and convert the public configuration.
    pub fn from_public(config: &HfClientConfig) -> HfResult<Self> {
        Ok(Self {
            endpoint: Url::parse(&config.endpoint)?,
            user_agent: config.user_agent.clone(),
            timeout: config.timeout,
            token: config.token.clone(),
            max_retries: config.max_retries,
            #[allow(clippy::cast_possible_truncation)] // Duration milliseconds won't exceed u64 in practice
            retry_base_delay_ms: config.retry_base_delay.as_millis() as u64,
        })
    }
}

// ============================================================================
// Repository Reference
// ============================================================================

/// Reference to a Hub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HfRepoRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
    pub is_dataset: bool,
}

impl HfRepoRef {
    /// Parse a repository reference from an `owner/name` string.
    pub fn parse(repo_id: &str, is_dataset: bool) -> Option<Self> {
        let (owner, name) = repo_id.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            is_dataset,
        })
    }

    /// Get the full repository ID (owner/name).
    pub fn id(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Collection segment used by the JSON API (`models` or `datasets`).
    pub const fn api_collection(&self) -> &'static str {
        if self.is_dataset { "datasets" } else { "models" }
    }
}

impl std::fmt::Display for HfRepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ============================================================================
// Tree Listing (API response)
// ============================================================================

/// Type of entry in a repository tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HfEntryType {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// LFS block of a tree entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HfLfsInfo {
    /// Object id, the SHA-256 of the content
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    /// Size of the real content
    pub size: u64,
}

/// Entry of `GET /api/{models|datasets}/{repo}/tree/{revision}/{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HfTreeEntry {
    #[serde(rename = "type")]
    pub entry_type: HfEntryType,
    /// Path relative to repository root
    pub path: String,
    /// Size in bytes (the pointer size for LFS files, 0 for directories)
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub lfs: Option<HfLfsInfo>,
}

// ============================================================================
// Refs (API response)
// ============================================================================

/// A branch or tag from the refs endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HfRefEntry {
    pub name: String,
    #[serde(default)]
    pub target_commit: Option<String>,
}

/// Body of `GET /api/{models|datasets}/{repo}/refs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HfRefs {
    #[serde(default)]
    pub branches: Vec<HfRefEntry>,
    #[serde(default)]
    pub tags: Vec<HfRefEntry>,
}
