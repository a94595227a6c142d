//! Test data factories for canned command output
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use git_sweep::types::{Branch, BranchState, PrState, PullRequest};
use serde_json::json;

/// Stable fake commit ids for scripting scenarios
pub const OID_ISSUE1: &str = "356a192b7913b04c54574d18c28d46e6395428ab";
pub const OID_ISSUE1_BASE: &str = "da4b9237bacccdf19c0760cab7aec4a8359010b0";
pub const OID_MAIN: &str = "77de68daecd823babbb58edb1c8e14d7106e83bb";

/// Repo-view JSON for a plain (non-fork) repository
pub fn repo_view(owner: &str, repo: &str, default_branch: &str) -> String {
    json!({
        "defaultBranchRef": { "name": default_branch },
        "name": repo,
        "owner": { "login": owner },
        "parent": null,
    })
    .to_string()
}

/// Repo-view JSON for a fork, carrying its parent repository
pub fn forked_repo_view(
    owner: &str,
    repo: &str,
    parent_owner: &str,
    default_branch: &str,
) -> String {
    json!({
        "defaultBranchRef": { "name": default_branch },
        "name": repo,
        "owner": { "login": owner },
        "parent": { "name": repo, "owner": { "login": parent_owner } },
    })
    .to_string()
}

/// Branch listing in `<head>:<name>:<oid>` format
pub fn branch_listing(entries: &[(bool, &str, &str)]) -> String {
    entries
        .iter()
        .map(|(head, name, oid)| {
            let marker = if *head { "*" } else { " " };
            format!("{marker}:{name}:{oid}\n")
        })
        .collect()
}

/// One pull-request node for [`search_response`]
pub fn pr_node(
    number: u64,
    state: &str,
    head_ref: &str,
    commit_oids: &[&str],
) -> serde_json::Value {
    json!({
        "number": number,
        "url": format!("https://github.com/owner/repo/pull/{number}"),
        "state": state,
        "isDraft": false,
        "headRefName": head_ref,
        "commits": {
            "nodes": commit_oids
                .iter()
                .map(|oid| json!({ "commit": { "oid": oid } }))
                .collect::<Vec<_>>(),
        },
        "author": { "login": "octocat" },
    })
}

/// GraphQL search response JSON wrapping the given PR nodes
pub fn search_response(prs: &[serde_json::Value]) -> String {
    json!({
        "data": {
            "search": {
                "issueCount": prs.len(),
                "edges": prs.iter().map(|pr| json!({ "node": pr })).collect::<Vec<_>>(),
            }
        }
    })
    .to_string()
}

/// A classified branch record, for exercising the deletion path directly
pub fn make_branch(name: &str, state: BranchState) -> Branch {
    let mut branch = Branch::new(false, name);
    branch.state = state;
    branch
}

/// A merged pull request with the given head branch and commits
pub fn make_merged_pr(number: u64, head: &str, commit_oids: &[&str]) -> PullRequest {
    PullRequest {
        name: head.to_string(),
        state: PrState::Merged,
        is_draft: false,
        number,
        commits: commit_oids.iter().map(ToString::to_string).collect(),
        url: format!("https://github.com/owner/repo/pull/{number}"),
        author: "octocat".to_string(),
    }
}
