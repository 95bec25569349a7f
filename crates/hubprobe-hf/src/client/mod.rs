//! Hub client for listing repository trees and fetching small files.
//!
//! This module provides the main client interface for interacting with
//! the Hub API.

mod tree;

use crate::config::HfClientConfig;
use crate::error::HfResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::HfConfig;

// ============================================================================
// Type Aliases
// ============================================================================

/// Default Hub client using the reqwest HTTP backend.
pub type DefaultHfClient = HfClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for interacting with the Hub API.
///
/// This client is generic over an HTTP backend, allowing for easy testing.
/// Use `DefaultHfClient` for production code. The generic parameter `B` is
/// an implementation detail - external code should not instantiate this
/// directly but use `DefaultHfClient::new()` and the `RepoSourcePort` trait.
pub struct HfClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) config: HfConfig,
    /// Hard cap on raw file bodies, whatever the caller asks for
    pub(crate) max_raw_bytes: u64,
}

impl DefaultHfClient {
    /// Create a new client with the given configuration.
    ///
    /// Fails when the endpoint is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(config: &HfClientConfig) -> HfResult<Self> {
        let internal_config = HfConfig::from_public(config)?;
        let backend = ReqwestBackend::new(&internal_config)?;
        Ok(Self {
            backend,
            config: internal_config,
            max_raw_bytes: config.max_raw_bytes,
        })
    }

    /// Create a new client from `HF_TOKEN`/`HF_ENDPOINT` and defaults.
    pub fn from_env() -> HfResult<Self> {
        Self::new(&HfClientConfig::from_env())
    }
}

impl<B: HttpBackend> HfClient<B> {
    /// Create a new client with a custom backend.
    ///
    /// Use this for testing with a fake backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(config: HfConfig, backend: B, max_raw_bytes: u64) -> Self {
        Self {
            backend,
            config,
            max_raw_bytes,
        }
    }
}
