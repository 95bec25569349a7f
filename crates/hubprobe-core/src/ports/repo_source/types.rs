//! Core-owned DTOs for repository source operations.
//!
//! These types cross the boundary between `hubprobe-hf` and the analyzer.
//! They carry only what the tree walk needs, not hub API details.

use serde::{Deserialize, Serialize};

use crate::domain::FileEntry;

/// Which repository, and which revision of it, a request targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoLocator {
    /// `owner/name`
    pub repo_id: String,
    pub is_dataset: bool,
    /// Branch, tag or commit
    pub revision: String,
}

impl RepoLocator {
    pub fn new(repo_id: impl Into<String>, is_dataset: bool, revision: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            is_dataset,
            revision: revision.into(),
        }
    }
}

/// Whether a listing node is a file or a subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// Git LFS pointer metadata attached to a large file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LfsPointer {
    /// Size of the real content, not of the pointer file
    pub size: u64,
    pub sha256: Option<String>,
    /// Object id; on the hub this is the SHA-256 of the content
    pub oid: Option<String>,
}

impl LfsPointer {
    /// Content hash, preferring the explicit `sha256` over the object id.
    pub fn content_hash(&self) -> Option<&str> {
        self.sha256.as_deref().or(self.oid.as_deref())
    }
}

/// One entry of a single directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub kind: NodeKind,
    /// Path relative to the repository root
    pub path: String,
    /// Size in bytes as reported by the listing (the pointer size for LFS files)
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub lfs: Option<LfsPointer>,
}

impl TreeNode {
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self {
            kind: NodeKind::File,
            path: path.into(),
            size,
            lfs: None,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Directory,
            path: path.into(),
            size: 0,
            lfs: None,
        }
    }

    #[must_use]
    pub fn with_lfs(mut self, lfs: LfsPointer) -> Self {
        self.lfs = Some(lfs);
        self
    }

    pub const fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory)
    }

    /// Convert a file node into a [`FileEntry`], taking the true size and
    /// hash from the LFS pointer when there is one.
    pub fn into_file_entry(self) -> FileEntry {
        match self.lfs {
            Some(lfs) => {
                let hash = lfs.content_hash().map(ToString::to_string);
                FileEntry::lfs(self.path, lfs.size, hash)
            }
            None => FileEntry::new(self.path, self.size),
        }
    }
}
