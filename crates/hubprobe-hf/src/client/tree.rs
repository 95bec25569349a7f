//! Directory listings, raw file reads and refs.

use tracing::debug;

use crate::error::HfResult;
use crate::http::HttpBackend;
use crate::models::{HfRefs, HfRepoRef, HfTreeEntry};
use crate::parsing::{parse_refs, parse_tree_entries};
use crate::url::{build_raw_url, build_refs_url, build_tree_url};
use hubprobe_core::{RepoRef, TreeNode};

use super::HfClient;

impl<B: HttpBackend> HfClient<B> {
    /// List one directory level of a repository at `revision`.
    pub(crate) async fn list_tree(
        &self,
        repo: &HfRepoRef,
        revision: &str,
        path: &str,
    ) -> HfResult<Vec<TreeNode>> {
        let url = build_tree_url(&self.config, repo, revision, path);
        debug!(repo = %repo, path, "Listing tree");
        let entries: Vec<HfTreeEntry> = self.backend.get_json(&url).await?;
        Ok(parse_tree_entries(entries))
    }

    /// Read a file's raw content, capped by both the caller and the client.
    pub(crate) async fn read_raw(
        &self,
        repo: &HfRepoRef,
        revision: &str,
        path: &str,
        max_bytes: u64,
    ) -> HfResult<Vec<u8>> {
        let url = build_raw_url(&self.config, repo, revision, path);
        let limit = max_bytes.min(self.max_raw_bytes);
        debug!(repo = %repo, path, limit, "Fetching raw file");
        self.backend.get_bytes(&url, limit).await
    }

    /// List branches and tags.
    pub(crate) async fn fetch_refs(&self, repo: &HfRepoRef) -> HfResult<Vec<RepoRef>> {
        let url = build_refs_url(&self.config, repo);
        let refs: HfRefs = self.backend.get_json(&url).await?;
        Ok(parse_refs(refs))
    }
}
