//! Port trait implementation for `HfClient`.
//!
//! This module implements the core-owned `RepoSourcePort` trait for
//! `HfClient`, handling the conversion between internal Hub types and
//! core DTOs.

use async_trait::async_trait;
use hubprobe_core::{
    RepoLocator, RepoRef, RepoSourcePort, SourcePortError, SourcePortResult, TreeNode,
};

use crate::client::HfClient;
use crate::error::HfError;
use crate::http::HttpBackend;
use crate::models::{HfConfig, HfRepoRef};
use crate::url::build_repo_page_url;

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert internal `HfError` to core `SourcePortError`.
///
/// `resource` names what was being read, for `NotFound`.
fn map_error(err: HfError, repo: &HfRepoRef, config: &HfConfig, resource: &str) -> SourcePortError {
    match err {
        HfError::ApiRequestFailed { status, url } => match status {
            401 => SourcePortError::Unauthorized { repo: repo.id() },
            403 => SourcePortError::Forbidden {
                repo: repo.id(),
                terms_url: build_repo_page_url(config, repo).to_string(),
            },
            404 => SourcePortError::NotFound {
                resource: resource.to_string(),
            },
            _ => SourcePortError::Transport {
                message: format!("request failed with status {status}: {url}"),
            },
        },
        HfError::BodyTooLarge { limit, .. } => SourcePortError::TooLarge {
            path: resource.to_string(),
            limit,
        },
        HfError::InvalidResponse { message } => SourcePortError::Decode { message },
        HfError::JsonParse(e) => SourcePortError::Decode {
            message: e.to_string(),
        },
        HfError::Network(e) => SourcePortError::Transport {
            message: e.to_string(),
        },
        HfError::InvalidUrl(e) => SourcePortError::Transport {
            message: format!("invalid URL: {e}"),
        },
    }
}

/// Parse an `owner/name` id; anything else cannot exist on the hub.
fn parse_repo(repo_id: &str, is_dataset: bool) -> SourcePortResult<HfRepoRef> {
    HfRepoRef::parse(repo_id, is_dataset).ok_or_else(|| SourcePortError::NotFound {
        resource: repo_id.to_string(),
    })
}

fn describe(repo: &HfRepoRef, path: &str) -> String {
    if path.is_empty() {
        repo.id()
    } else {
        format!("{}/{path}", repo.id())
    }
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend> RepoSourcePort for HfClient<B> {
    async fn list_directory(
        &self,
        locator: &RepoLocator,
        path: &str,
    ) -> SourcePortResult<Vec<TreeNode>> {
        let repo = parse_repo(&locator.repo_id, locator.is_dataset)?;
        self.list_tree(&repo, &locator.revision, path)
            .await
            .map_err(|e| map_error(e, &repo, &self.config, &describe(&repo, path)))
    }

    async fn fetch_raw(
        &self,
        locator: &RepoLocator,
        path: &str,
        max_bytes: u64,
    ) -> SourcePortResult<Vec<u8>> {
        let repo = parse_repo(&locator.repo_id, locator.is_dataset)?;
        self.read_raw(&repo, &locator.revision, path, max_bytes)
            .await
            .map_err(|e| map_error(e, &repo, &self.config, path))
    }

    async fn list_refs(&self, repo_id: &str, is_dataset: bool) -> SourcePortResult<Vec<RepoRef>> {
        let repo = parse_repo(repo_id, is_dataset)?;
        self.fetch_refs(&repo)
            .await
            .map_err(|e| map_error(e, &repo, &self.config, &format!("{}/refs", repo.id())))
    }
}
