//! Download command generation.
//!
//! The grammar is fixed:
//!
//! ```text
//! download <owner/name> [--dataset] [-b <branch>] [-F <f1>,<f2>,...]
//! ```

use std::collections::BTreeSet;

use crate::domain::RepoSnapshot;
use crate::projection::recommended_filters;

/// Branch that is implied when `-b` is omitted.
pub const DEFAULT_BRANCH: &str = "main";

/// Build the download invocation for a repository.
///
/// Filters are trimmed, empty ones dropped, and the rest sorted and
/// deduplicated so the same selection always yields the same command.
pub fn generate_cli_command<S: AsRef<str>>(
    repo: &str,
    is_dataset: bool,
    branch: &str,
    filters: &[S],
) -> String {
    let mut cmd = format!("download {repo}");

    if is_dataset {
        cmd.push_str(" --dataset");
    }

    let branch = branch.trim();
    if !branch.is_empty() && branch != DEFAULT_BRANCH {
        cmd.push_str(" -b ");
        cmd.push_str(branch);
    }

    let filters: BTreeSet<&str> = filters
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .collect();
    if !filters.is_empty() {
        cmd.push_str(" -F ");
        cmd.push_str(&filters.into_iter().collect::<Vec<_>>().join(","));
    }

    cmd
}

/// Command that downloads the recommended items of a snapshot.
pub fn recommended_command(snapshot: &RepoSnapshot) -> String {
    let items = snapshot.selectable_items();
    snapshot.cli_command(&recommended_filters(&items))
}
