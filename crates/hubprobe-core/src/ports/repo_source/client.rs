//! Repository source port trait.

use async_trait::async_trait;

use super::error::SourcePortResult;
use super::types::{RepoLocator, TreeNode};
use crate::domain::RepoRef;

/// Port trait for reading a repository from a model hub.
///
/// The tree walk and metadata fetch in the analyzer are written against
/// this trait. The HTTP implementation lives in `hubprobe-hf`.
///
/// # Design
///
/// - One call lists exactly one directory level; recursion is the caller's job
/// - Returns `SourcePortError` for all failures
/// - Has no retry policy of its own to expose; adapters may retry internally
/// - No implementation details leak through this interface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepoSourcePort: Send + Sync {
    /// List the immediate children of `path` (empty for the root).
    async fn list_directory(
        &self,
        locator: &RepoLocator,
        path: &str,
    ) -> SourcePortResult<Vec<TreeNode>>;

    /// Fetch the raw bytes of a file, failing with `TooLarge` past `max_bytes`.
    async fn fetch_raw(
        &self,
        locator: &RepoLocator,
        path: &str,
        max_bytes: u64,
    ) -> SourcePortResult<Vec<u8>>;

    /// List the branches and tags of a repository.
    async fn list_refs(&self, repo_id: &str, is_dataset: bool) -> SourcePortResult<Vec<RepoRef>>;
}
