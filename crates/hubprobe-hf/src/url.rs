//! URL construction helpers for the Hub API.
//!
//! This module provides pure functions for building Hub URLs, ensuring
//! consistent escaping across all calls. Every path segment, including the
//! revision, is percent-encoded on its own.

use url::Url;

use crate::models::{HfConfig, HfRepoRef};

/// Percent-encode each `/`-separated segment of a repository path.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Join `suffix` onto the endpoint's path.
fn join(config: &HfConfig, suffix: &str) -> Url {
    let mut url = config.endpoint.clone();
    let base_path = url.path().trim_end_matches('/');
    url.set_path(&format!("{base_path}/{suffix}"));
    url
}

/// `{endpoint}/api/{models|datasets}/{owner}/{name}/tree/{revision}[/{path}]`
pub fn build_tree_url(config: &HfConfig, repo: &HfRepoRef, revision: &str, path: &str) -> Url {
    let mut suffix = format!(
        "api/{}/{}/tree/{}",
        repo.api_collection(),
        encode_path(&repo.id()),
        urlencoding::encode(revision)
    );
    let path = path.trim_matches('/');
    if !path.is_empty() {
        suffix.push('/');
        suffix.push_str(&encode_path(path));
    }
    join(config, &suffix)
}

/// `{endpoint}[/datasets]/{owner}/{name}/raw/{revision}/{path}`
pub fn build_raw_url(config: &HfConfig, repo: &HfRepoRef, revision: &str, path: &str) -> Url {
    let suffix = format!(
        "{}/raw/{}/{}",
        repo_page_path(repo),
        urlencoding::encode(revision),
        encode_path(path.trim_start_matches('/'))
    );
    join(config, &suffix)
}

/// `{endpoint}/api/{models|datasets}/{owner}/{name}/refs`
pub fn build_refs_url(config: &HfConfig, repo: &HfRepoRef) -> Url {
    join(
        config,
        &format!("api/{}/{}/refs", repo.api_collection(), encode_path(&repo.id())),
    )
}

/// The repository's web page, where gated terms are accepted.
pub fn build_repo_page_url(config: &HfConfig, repo: &HfRepoRef) -> Url {
    join(config, &repo_page_path(repo))
}

fn repo_page_path(repo: &HfRepoRef) -> String {
    if repo.is_dataset {
        format!("datasets/{}", encode_path(&repo.id()))
    } else {
        encode_path(&repo.id())
    }
}
