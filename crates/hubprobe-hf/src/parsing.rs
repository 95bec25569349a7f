//! Conversion of Hub API responses into core DTOs.
//!
//! These functions are sync and infallible; decoding failures surface
//! earlier, when the body is deserialized into the `Hf*` response types.

use hubprobe_core::{LfsPointer, NodeKind, RefKind, RepoRef, TreeNode};

use crate::models::{HfEntryType, HfLfsInfo, HfRefEntry, HfRefs, HfTreeEntry};

// ============================================================================
// Tree Parsing
// ============================================================================

/// Convert one directory listing into tree nodes, preserving order.
pub fn parse_tree_entries(entries: Vec<HfTreeEntry>) -> Vec<TreeNode> {
    entries.into_iter().map(to_tree_node).collect()
}

fn to_tree_node(entry: HfTreeEntry) -> TreeNode {
    let kind = match entry.entry_type {
        HfEntryType::File => NodeKind::File,
        HfEntryType::Directory => NodeKind::Directory,
    };
    TreeNode {
        kind,
        path: entry.path,
        size: entry.size,
        lfs: entry.lfs.map(to_lfs_pointer),
    }
}

fn to_lfs_pointer(lfs: HfLfsInfo) -> LfsPointer {
    LfsPointer {
        size: lfs.size,
        sha256: lfs.sha256,
        oid: lfs.oid,
    }
}

// ============================================================================
// Refs Parsing
// ============================================================================

/// Flatten the refs response: branches first, then tags.
pub fn parse_refs(refs: HfRefs) -> Vec<RepoRef> {
    let branches = refs
        .branches
        .into_iter()
        .map(|entry| to_repo_ref(entry, RefKind::Branch));
    let tags = refs
        .tags
        .into_iter()
        .map(|entry| to_repo_ref(entry, RefKind::Tag));
    branches.chain(tags).collect()
}

fn to_repo_ref(entry: HfRefEntry, kind: RefKind) -> RepoRef {
    RepoRef {
        name: entry.name,
        kind,
        commit: entry.target_commit.filter(|sha| !sha.is_empty()),
    }
}
