//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No HTTP client types in any signature
//! - Adapters map their own errors onto the port error at the boundary
//! - Intent-based methods (list a directory, fetch a document), not URLs

pub mod repo_source;

pub use repo_source::{
    LfsPointer, NodeKind, RepoLocator, RepoSourcePort, SourcePortError, SourcePortResult,
    TreeNode,
};

#[cfg(test)]
pub use repo_source::MockRepoSourcePort;
