//! Pull-request fetching and matching
//!
//! Decodes the code-host responses, generates the sharded search queries and
//! correlates fetched PRs with local branches.

use crate::connector::SharedConnector;
use crate::engine::first_line;
use crate::error::{Error, Result};
use crate::types::{Branch, PrState, PullRequest};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

/// GitHub caps search query length; count characters, not hashes.
/// <https://docs.github.com/en/rest/reference/search#limitations-on-query-length>
const MAX_QUERY_LENGTH: usize = 256;

// ---------------------------------------------------------------------------
// Repository metadata
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepoView {
    default_branch_ref: Option<NamedRef>,
    name: String,
    owner: Login,
    parent: Option<ParentRepo>,
}

#[derive(Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Deserialize)]
struct Login {
    login: String,
}

#[derive(Deserialize)]
struct ParentRepo {
    name: String,
    owner: Login,
}

/// Parse the repo-view response into `(repo names, default branch name)`.
///
/// A fork contributes its parent as a second repository so PRs opened
/// against the parent are found too.
pub(crate) fn parse_repo_view(json: &str) -> Result<(Vec<String>, String)> {
    let view: RepoView = serde_json::from_str(json).map_err(|source| Error::Decode {
        context: "repository view response".to_string(),
        payload: json.to_string(),
        source,
    })?;

    let mut repo_names = vec![format!("{}/{}", view.owner.login, view.name)];
    if let Some(parent) = view.parent {
        repo_names.push(format!("{}/{}", parent.owner.login, parent.name));
    }

    let default_branch = view.default_branch_ref.map(|r| r.name).unwrap_or_default();
    Ok((repo_names, default_branch))
}

// ---------------------------------------------------------------------------
// Pull-request search response
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SearchResponse {
    data: SearchData,
}

#[derive(Deserialize)]
struct SearchData {
    search: SearchResults,
}

#[derive(Deserialize)]
struct SearchResults {
    edges: Vec<SearchEdge>,
}

#[derive(Deserialize)]
struct SearchEdge {
    node: PrNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrNode {
    number: u64,
    head_ref_name: String,
    url: String,
    state: String,
    is_draft: bool,
    commits: PrCommits,
    #[serde(default)]
    author: Option<Login>,
}

#[derive(Deserialize)]
struct PrCommits {
    nodes: Vec<PrCommitNode>,
}

#[derive(Deserialize)]
struct PrCommitNode {
    commit: PrCommit,
}

#[derive(Deserialize)]
struct PrCommit {
    oid: String,
}

/// Decode one GraphQL search shard into pull requests.
///
/// An unrecognized state string is a contract violation and fails the run
/// rather than being skipped.
pub(crate) fn parse_pull_requests(json: &str) -> Result<Vec<PullRequest>> {
    let response: SearchResponse = serde_json::from_str(json).map_err(|source| Error::Decode {
        context: "pull request search response".to_string(),
        payload: json.to_string(),
        source,
    })?;

    let mut results = Vec::new();
    for edge in response.data.search.edges {
        let node = edge.node;
        let state = parse_pr_state(&node.state)?;
        let commits = node.commits.nodes.into_iter().map(|n| n.commit.oid).collect();

        results.push(PullRequest {
            name: node.head_ref_name,
            state,
            is_draft: node.is_draft,
            number: node.number,
            commits,
            url: node.url,
            author: node.author.map(|a| a.login).unwrap_or_default(),
        });
    }

    Ok(results)
}

fn parse_pr_state(state: &str) -> Result<PrState> {
    match state {
        "CLOSED" => Ok(PrState::Closed),
        "MERGED" => Ok(PrState::Merged),
        "OPEN" => Ok(PrState::Open),
        other => Err(Error::UnexpectedPrState(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Search query generation
// ---------------------------------------------------------------------------

/// `org:<owner>` scope terms for the search query
pub(crate) fn query_orgs(repo_names: &[String]) -> String {
    repo_names
        .iter()
        .filter_map(|name| name.split('/').next())
        .map(|owner| format!("org:{owner}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `repo:<owner>/<name>` scope terms for the search query
pub(crate) fn query_repos(repo_names: &[String]) -> String {
    repo_names
        .iter()
        .map(|name| format!("repo:{name}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build `hash:<oid>` search shards, one string per query.
///
/// Each branch contributes its remote head when known, otherwise the oldest
/// of its own commits. Shards are split whenever the next term would push a
/// query past [`MAX_QUERY_LENGTH`].
pub(crate) fn query_hashes(branches: &[Branch]) -> Vec<String> {
    let mut results = Vec::new();
    let mut hashes = String::new();

    for (i, branch) in branches.iter().enumerate() {
        let oid = match (&branch.remote_head_oid, branch.commits.last()) {
            (Some(oid), _) => oid,
            (None, Some(oldest)) => oldest,
            (None, None) => continue,
        };

        let separator = if i == branches.len() - 1 { "" } else { " " };
        let hash = format!("hash:{oid}{separator}");

        if hashes.len() + hash.len() > MAX_QUERY_LENGTH {
            results.push(std::mem::take(&mut hashes));
        }
        hashes.push_str(&hash);
    }

    if !hashes.is_empty() {
        results.push(hashes);
    }

    results
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Assign fetched PRs to branches.
///
/// A branch checked out from a PR records the PR number in its merge config
/// (`refs/pull/<N>`); that explicit linkage takes priority over head-branch
/// name matching whenever it exists for any branch, since a fork PR checked
/// out locally may carry a different name than the PR's head ref.
pub(crate) async fn apply_pull_requests(
    conn: &SharedConnector,
    branches: Vec<Branch>,
    prs: Vec<PullRequest>,
) -> Vec<Branch> {
    let mut claimed_numbers: HashMap<String, u64> = HashMap::new();
    for branch in &branches {
        if branch.is_detached() {
            continue;
        }
        let merge_config = conn
            .get_config(&format!("branch.{}.merge", branch.name))
            .await
            .unwrap_or_default();
        if let Some(number) = pr_number_from_merge_config(&merge_config) {
            claimed_numbers.insert(branch.name.clone(), number);
        }
    }

    branches
        .into_iter()
        .map(|mut branch| {
            let mut matched = find_matched_pull_requests(&branch.name, &prs, &claimed_numbers);
            matched.sort_by_key(|pr| pr.number);
            branch.pull_requests = matched;
            branch
        })
        .collect()
}

/// Extract the PR number from a `branch.<name>.merge` value like
/// `refs/pull/123/head`
fn pr_number_from_merge_config(merge_config: &str) -> Option<u64> {
    let pattern = Regex::new(r"^refs/pull/(\d+)").unwrap();
    let line = first_line(merge_config)?;
    pattern.captures(line)?.get(1)?.as_str().parse().ok()
}

/// PRs belonging to one branch, deduplicated by number.
///
/// A PR whose number is claimed by any branch's merge config only ever
/// attaches to that branch; unclaimed PRs match by head-branch name.
fn find_matched_pull_requests(
    branch_name: &str,
    prs: &[PullRequest],
    claimed_numbers: &HashMap<String, u64>,
) -> Vec<PullRequest> {
    let mut results: Vec<PullRequest> = Vec::new();

    for pr in prs {
        if results.iter().any(|r| r.number == pr.number) {
            continue;
        }

        if claimed_numbers.values().any(|&n| n == pr.number) {
            if claimed_numbers.get(branch_name) == Some(&pr.number) {
                results.push(pr.clone());
            }
        } else if pr.name == branch_name {
            results.push(pr.clone());
        }
    }

    results
}
