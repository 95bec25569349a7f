//! Repository source port definitions.
//!
//! This module defines the fetch contract the analyzer needs from a model
//! hub. The HTTP implementation lives in `hubprobe-hf`.

mod client;
mod error;
mod types;

pub use client::RepoSourcePort;
pub use error::{SourcePortError, SourcePortResult};
pub use types::{LfsPointer, NodeKind, RepoLocator, TreeNode};

#[cfg(test)]
pub use client::MockRepoSourcePort;
