#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

// =============================================================================
// Workspace Crate Re-exports
// =============================================================================

// Analysis pipeline, domain types and the fetch contract
pub use hubprobe_core::{
    AnalysisError, AnalysisRequest, AnalysisResult, AnalyzerOptions, CancellationToken,
    FileEntry, ItemCategory, MetadataMap, RefKind, RelatedDownload, RelatedKind, RepoAnalyzer,
    RepoDetails, RepoRef, RepoSnapshot, RepoSourcePort, RepoType, SelectableItem,
    SourcePortError, WeightFormat, estimate_ram, estimate_vram, files_for_selection,
    generate_cli_command, recommend_gguf, recommended_command, selected_size,
    to_selectable_items,
};

// Hub transport
pub use hubprobe_hf::{DEFAULT_ENDPOINT, DefaultHfClient, HfClientConfig, HfError};

/// Re-export of hubprobe-core for everything not lifted above.
pub mod core_types {
    pub use hubprobe_core::*;
}

// =============================================================================
// Composition
// =============================================================================

/// Errors from the one-call entry points.
#[derive(Debug, Error)]
pub enum HubprobeError {
    /// The Hub client could not be built from its configuration.
    #[error("Failed to build Hub client: {0}")]
    Client(#[from] HfError),

    /// The analysis itself failed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Build an analyzer backed by the Hub client described by `config`.
pub fn analyzer_from_config(
    config: &HfClientConfig,
    options: AnalyzerOptions,
) -> Result<RepoAnalyzer, HfError> {
    debug!(
        endpoint = %config.endpoint(),
        authenticated = config.has_token(),
        revision = %options.revision,
        "Building repository analyzer"
    );
    let client = DefaultHfClient::new(config)?;
    Ok(RepoAnalyzer::with_options(Arc::new(client), options))
}

/// Analyze one repository with a freshly built client.
///
/// Convenient for one-off lookups; callers analyzing many repositories
/// should keep the analyzer from [`analyzer_from_config`] instead.
pub async fn analyze_repo(
    config: &HfClientConfig,
    request: &AnalysisRequest,
    cancel: &CancellationToken,
) -> Result<RepoSnapshot, HubprobeError> {
    let analyzer = analyzer_from_config(config, AnalyzerOptions::default())?;
    Ok(analyzer.analyze(request, cancel).await?)
}

// Silence unused dev-dependency warnings
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tokio as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tracing_subscriber as _;
#[cfg(test)]
use wiremock as _;
