//! Repository analyzer - orchestrates walk, classification, fetch and extraction.
//!
//! # Pipeline
//!
//! 1. Walk the tree depth-first, one listing request per directory
//! 2. Classify from the file list alone
//! 3. Fetch the whitelisted configuration documents for that type
//! 4. Refine `transformers`/`generic` once, fetching any extra documents
//! 5. Run the type analyzer and build the snapshot
//! 6. Attach branches and tags, best-effort
//!
//! Requests are issued one at a time. The caller's cancellation token is
//! checked before each request and raced against it while in flight.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analysis::metadata::MAX_METADATA_BYTES;
use crate::analysis::{analyze, classify, paths_to_fetch, refine};
use crate::domain::{FileEntry, MetadataMap, RepoRef, RepoSnapshot};
use crate::error::{AnalysisError, AnalysisResult};
use crate::ports::{RepoLocator, RepoSourcePort, SourcePortError, TreeNode};
use crate::utils::format::human_size;

/// Revision analyzed when a request names none.
pub const DEFAULT_REVISION: &str = "main";

// ============================================================================
// Options
// ============================================================================

/// Tunables for [`RepoAnalyzer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Revision used when a request does not name one
    pub revision: String,
    /// Cap for a single configuration document
    pub max_metadata_bytes: u64,
    /// Whether to attach the branch/tag listing to snapshots
    pub fetch_refs: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            revision: DEFAULT_REVISION.to_string(),
            max_metadata_bytes: MAX_METADATA_BYTES,
            fetch_refs: true,
        }
    }
}

impl AnalyzerOptions {
    #[must_use]
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    #[must_use]
    pub const fn with_max_metadata_bytes(mut self, max: u64) -> Self {
        self.max_metadata_bytes = max;
        self
    }

    #[must_use]
    pub const fn with_fetch_refs(mut self, fetch_refs: bool) -> Self {
        self.fetch_refs = fetch_refs;
        self
    }
}

/// One repository to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// `owner/name`
    pub repo_id: String,
    pub is_dataset: bool,
    /// Overrides [`AnalyzerOptions::revision`]
    pub revision: Option<String>,
}

impl AnalysisRequest {
    pub fn model(repo_id: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            is_dataset: false,
            revision: None,
        }
    }

    pub fn dataset(repo_id: impl Into<String>) -> Self {
        Self {
            is_dataset: true,
            ..Self::model(repo_id)
        }
    }

    #[must_use]
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }
}

/// Check that an identifier has the `owner/name` shape.
pub fn validate_repo_id(repo_id: &str) -> AnalysisResult<()> {
    let valid = repo_id.split_once('/').is_some_and(|(owner, name)| {
        !owner.is_empty()
            && !name.is_empty()
            && !name.contains('/')
            && !repo_id.chars().any(char::is_whitespace)
    });
    if valid {
        Ok(())
    } else {
        Err(AnalysisError::InvalidRepoId {
            repo_id: repo_id.to_string(),
        })
    }
}

/// Start a request unless the token already fired, then race it against the token.
async fn cancellable<F, T>(cancel: &CancellationToken, start: impl FnOnce() -> F) -> AnalysisResult<T>
where
    F: Future<Output = T> + Send,
{
    if cancel.is_cancelled() {
        return Err(AnalysisError::Cancelled);
    }
    let fut = start();
    tokio::select! {
        biased;

        () = cancel.cancelled() => Err(AnalysisError::Cancelled),

        out = fut => Ok(out),
    }
}

// ============================================================================
// Analyzer
// ============================================================================

/// Produces a [`RepoSnapshot`] for a repository on a model hub.
pub struct RepoAnalyzer {
    source: Arc<dyn RepoSourcePort>,
    options: AnalyzerOptions,
}

impl RepoAnalyzer {
    /// Create an analyzer with default options.
    pub fn new(source: Arc<dyn RepoSourcePort>) -> Self {
        Self::with_options(source, AnalyzerOptions::default())
    }

    pub fn with_options(source: Arc<dyn RepoSourcePort>, options: AnalyzerOptions) -> Self {
        Self { source, options }
    }

    pub const fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Analyze one repository.
    ///
    /// # Errors
    ///
    /// Fails on an invalid identifier, on any tree-walk failure (no partial
    /// tree is returned), or with [`AnalysisError::Cancelled`]. Metadata and
    /// ref failures are logged and never fail the analysis.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> AnalysisResult<RepoSnapshot> {
        validate_repo_id(&request.repo_id)?;

        let revision = request
            .revision
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| self.options.revision.clone());
        let locator = RepoLocator::new(request.repo_id.clone(), request.is_dataset, revision);

        info!(
            repo = %locator.repo_id,
            revision = %locator.revision,
            dataset = locator.is_dataset,
            "Analyzing repository"
        );

        let files = self.list_files(&locator, cancel).await?;

        let initial = classify(&files, locator.is_dataset);
        debug!(repo = %locator.repo_id, repo_type = %initial, "Classified from file list");

        let mut metadata = MetadataMap::new();
        self.fetch_metadata(&locator, &files, &paths_to_fetch(initial, &files), &mut metadata, cancel)
            .await?;

        let refined = refine(initial, &files, &metadata);
        if refined != initial {
            info!(
                repo = %locator.repo_id,
                from = %initial,
                to = %refined,
                "Refined repository type"
            );
            self.fetch_metadata(&locator, &files, &paths_to_fetch(refined, &files), &mut metadata, cancel)
                .await?;
        }

        let details = analyze(refined, &files, &metadata);
        let mut snapshot = RepoSnapshot::new(
            locator.repo_id.clone(),
            locator.is_dataset,
            locator.revision.clone(),
            files,
            metadata,
            details,
        );

        if self.options.fetch_refs {
            let refs = self.fetch_refs(&locator, cancel).await?;
            snapshot = snapshot.with_refs(refs);
        }

        info!(
            repo = %snapshot.repo,
            repo_type = %snapshot.repo_type(),
            files = snapshot.file_count(),
            total_size = %snapshot.total_size_human(),
            "Analysis complete"
        );
        Ok(snapshot)
    }

    /// Walk the whole tree into a flat file list, in depth-first order.
    ///
    /// # Errors
    ///
    /// The first failed listing aborts the walk.
    pub async fn list_files(
        &self,
        locator: &RepoLocator,
        cancel: &CancellationToken,
    ) -> AnalysisResult<Vec<FileEntry>> {
        let root = self.list_directory(locator, "", cancel).await?;
        let mut stack = vec![root.into_iter()];
        let mut files = Vec::new();

        while let Some(level) = stack.last_mut() {
            let Some(node) = level.next() else {
                stack.pop();
                continue;
            };
            if node.is_directory() {
                let children = self.list_directory(locator, &node.path, cancel).await?;
                stack.push(children.into_iter());
            } else {
                files.push(node.into_file_entry());
            }
        }

        debug!(
            repo = %locator.repo_id,
            files = files.len(),
            total_size = %human_size(files.iter().map(|f| f.size).fold(0, u64::saturating_add)),
            "Tree walk complete"
        );
        Ok(files)
    }

    async fn list_directory(
        &self,
        locator: &RepoLocator,
        path: &str,
        cancel: &CancellationToken,
    ) -> AnalysisResult<Vec<TreeNode>> {
        debug!(repo = %locator.repo_id, path = %path, "Listing directory");
        cancellable(cancel, || self.source.list_directory(locator, path))
            .await?
            .map_err(|e| AnalysisError::from_port(e, &locator.repo_id, path))
    }

    /// Fetch and parse each path not already in `metadata`.
    ///
    /// Only cancellation is an error here.
    async fn fetch_metadata(
        &self,
        locator: &RepoLocator,
        files: &[FileEntry],
        paths: &[&str],
        metadata: &mut MetadataMap,
        cancel: &CancellationToken,
    ) -> AnalysisResult<()> {
        let limit = self.options.max_metadata_bytes;

        for &path in paths {
            if metadata.contains_key(path) {
                continue;
            }
            if let Some(file) = files.iter().find(|f| f.path == path) {
                if file.size > limit {
                    debug!(
                        repo = %locator.repo_id,
                        path = %path,
                        size = file.size,
                        "Skipping oversized metadata document"
                    );
                    continue;
                }
            } else {
                debug!(repo = %locator.repo_id, path = %path, "Metadata document not present");
                continue;
            }

            match cancellable(cancel, || self.source.fetch_raw(locator, path, limit)).await? {
                Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                    Ok(doc) => {
                        metadata.insert(path.to_string(), doc);
                    }
                    Err(e) => {
                        warn!(
                            repo = %locator.repo_id,
                            path = %path,
                            error = %e,
                            "Ignoring unparseable metadata document"
                        );
                    }
                },
                Err(SourcePortError::TooLarge { limit, .. }) => {
                    debug!(
                        repo = %locator.repo_id,
                        path = %path,
                        limit,
                        "Skipping oversized metadata document"
                    );
                }
                Err(e) => {
                    warn!(
                        repo = %locator.repo_id,
                        path = %path,
                        error = %e,
                        "Failed to fetch metadata document"
                    );
                }
            }
        }
        Ok(())
    }

    async fn fetch_refs(
        &self,
        locator: &RepoLocator,
        cancel: &CancellationToken,
    ) -> AnalysisResult<Vec<RepoRef>> {
        match cancellable(cancel, || {
            self.source.list_refs(&locator.repo_id, locator.is_dataset)
        })
        .await?
        {
            Ok(refs) => Ok(refs),
            Err(e) => {
                warn!(repo = %locator.repo_id, error = %e, "Failed to list refs");
                Ok(Vec::new())
            }
        }
    }
}
