//! Branch listing pipeline
//!
//! Builds the full picture for every local branch in staged passes: listing,
//! default/merged/lock flags, per-branch commit trimming (fanned out), working
//! copy state, worktrees, pull requests (fanned out per query shard), and
//! finally classification.

use crate::connector::SharedConnector;
use crate::engine::{classify, lock, prs, trim};
use crate::error::{Error, Result};
use crate::types::{Branch, Remote, TargetState, UncommittedChange, Worktree};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// List all local branches with their deletability decided.
///
/// The result is sorted by branch name. In dry-run mode no working copy
/// mutation happens (the default-branch checkout is skipped).
pub async fn get_branches(
    conn: &SharedConnector,
    remote: &Remote,
    target_state: TargetState,
    dry_run: bool,
) -> Result<Vec<Branch>> {
    let repo_view = conn
        .get_repo_names(&remote.hostname, &remote.repo_name)
        .await?;
    let (repo_names, default_branch) = prs::parse_repo_view(&repo_view)?;
    debug!("repositories: {repo_names:?}, default branch: {default_branch}");

    conn.check_repos(&remote.hostname, &repo_names).await?;

    let output = conn.get_branch_names().await?;
    let mut branches = to_branches(&output);

    for branch in &mut branches {
        branch.is_default = branch.name == default_branch;
    }

    let merged = conn
        .get_merged_branch_names(&remote.name, &default_branch)
        .await?;
    let merged_names = extract_merged_branch_names(&merged);
    for branch in &mut branches {
        branch.is_merged = merged_names.iter().any(|name| name == &branch.name);
    }

    for branch in &mut branches {
        branch.is_locked = !branch.is_detached() && is_locked(conn, &branch.name).await;
    }

    let branches = apply_commits(conn, remote, branches, &default_branch).await?;
    let branches = apply_tracked_changes(conn, branches).await?;
    let branches = apply_worktrees(conn, branches).await;
    let branches = apply_pull_requests(conn, remote, &repo_names, branches).await?;

    let branches = classify::check_deletion(branches, target_state);
    let mut branches =
        classify::switch_to_default_if_deleted(conn, branches, &default_branch, dry_run).await?;

    branches.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(branches)
}

/// Parse `<head>:<name>:<oid>` branch listing lines
pub(crate) fn to_branches(output: &str) -> Vec<Branch> {
    crate::engine::split_lines(output)
        .filter_map(|line| {
            let mut fields = line.splitn(3, ':');
            let head = fields.next()? == "*";
            let name = fields.next()?;
            Some(Branch::new(head, name))
        })
        .collect()
}

pub(crate) fn branch_name_exists(branch_name: &str, branches: &[Branch]) -> bool {
    branches.iter().any(|b| b.name == branch_name)
}

/// Strip the `* ` / `+ ` / indent markers from `git branch --merged` lines
fn extract_merged_branch_names(output: &str) -> Vec<String> {
    crate::engine::split_lines(output)
        .map(|line| line.trim_start_matches(['*', '+', ' ']).to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// A branch counts as locked only when the config value is `true`; an unset
/// key or any other value leaves it unlocked.
async fn is_locked(conn: &SharedConnector, branch_name: &str) -> bool {
    for key in [
        lock::lock_key(branch_name),
        lock::deprecated_lock_key(branch_name),
    ] {
        if let Ok(value) = conn.get_config(&key).await {
            if crate::engine::first_line(&value) == Some("true") {
                return true;
            }
        }
    }
    false
}

/// Fan out one worker per branch to resolve remote heads and trim commit
/// ancestry. The default branch and a detached HEAD entry are passed through
/// with no commits of their own.
async fn apply_commits(
    conn: &SharedConnector,
    remote: &Remote,
    branches: Vec<Branch>,
    default_branch: &str,
) -> Result<Vec<Branch>> {
    let mut results = Vec::with_capacity(branches.len());
    let mut workers = JoinSet::new();

    for branch in branches {
        if branch.name == default_branch || branch.is_detached() {
            results.push(branch);
            continue;
        }

        let conn = Arc::clone(conn);
        let remote_name = remote.name.clone();
        let default_branch = default_branch.to_string();
        workers.spawn(async move {
            trim::fetch_own_commits(&conn, &remote_name, &default_branch, branch).await
        });
    }

    drain(workers, &mut results).await?;
    Ok(results)
}

/// Mark the checked-out branch when the working copy carries changes to
/// tracked files. Untracked files never block deletion.
async fn apply_tracked_changes(
    conn: &SharedConnector,
    mut branches: Vec<Branch>,
) -> Result<Vec<Branch>> {
    let output = conn.get_uncommitted_changes().await?;
    let has_tracked = parse_uncommitted_changes(&output)
        .iter()
        .any(|change| !change.is_untracked());

    if has_tracked {
        for branch in &mut branches {
            if branch.head {
                branch.has_tracked_changes = true;
            }
        }
    }

    Ok(branches)
}

/// Attach linked-worktree info. Worktree discovery is best effort: an old
/// git without porcelain worktree listing degrades to branch-only deletion.
async fn apply_worktrees(conn: &SharedConnector, mut branches: Vec<Branch>) -> Vec<Branch> {
    let worktrees = match conn.get_worktrees().await {
        Ok(output) => parse_worktrees(&output),
        Err(e) => {
            warn!("worktree listing failed: {e}");
            Vec::new()
        }
    };

    for branch in &mut branches {
        branch.worktree = worktrees.iter().find(|w| w.branch == branch.name).cloned();
    }

    branches
}

/// Parse `git worktree list --porcelain` output.
///
/// Entries start with a `worktree <path>` line; the first entry is the main
/// worktree. Bare and detached entries keep an empty branch name and never
/// match a listed branch.
pub(crate) fn parse_worktrees(output: &str) -> Vec<Worktree> {
    let mut results: Vec<Worktree> = Vec::new();
    let mut current: Option<Worktree> = None;

    for line in crate::engine::split_lines(output) {
        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(done) = current.take() {
                results.push(done);
            }
            current = Some(Worktree {
                path: path.to_string(),
                branch: String::new(),
                is_main: results.is_empty(),
                is_locked: false,
            });
        } else if let Some(worktree) = current.as_mut() {
            if let Some(name) = line.strip_prefix("branch refs/heads/") {
                worktree.branch = name.to_string();
            } else if line == "locked" || line.starts_with("locked ") {
                worktree.is_locked = true;
            }
        }
    }
    if let Some(done) = current {
        results.push(done);
    }

    results
}

/// Parse `git status --short` lines (`XY <path>`)
pub(crate) fn parse_uncommitted_changes(output: &str) -> Vec<UncommittedChange> {
    output
        .lines()
        .filter_map(|line| {
            let mut chars = line.chars();
            let x = chars.next()?;
            let y = chars.next()?;
            chars.next()?;
            let path: String = chars.collect();
            if path.is_empty() {
                return None;
            }
            Some(UncommittedChange { x, y, path })
        })
        .collect()
}

/// Fetch PRs for all branches, one search request per hash shard, and match
/// them onto branches.
async fn apply_pull_requests(
    conn: &SharedConnector,
    remote: &Remote,
    repo_names: &[String],
    branches: Vec<Branch>,
) -> Result<Vec<Branch>> {
    let shards = prs::query_hashes(&branches);
    if shards.is_empty() {
        return Ok(branches);
    }

    let orgs = prs::query_orgs(repo_names);
    let repos = prs::query_repos(repo_names);

    let mut workers = JoinSet::new();
    for shard in shards {
        let conn = Arc::clone(conn);
        let hostname = remote.hostname.clone();
        let orgs = orgs.clone();
        let repos = repos.clone();
        workers.spawn(async move {
            let json = conn.get_pull_requests(&hostname, &orgs, &repos, &shard).await?;
            prs::parse_pull_requests(&json)
        });
    }

    let mut shard_results: Vec<Vec<_>> = Vec::new();
    drain(workers, &mut shard_results).await?;
    let pull_requests: Vec<_> = shard_results.into_iter().flatten().collect();
    debug!("{} pull request(s) fetched", pull_requests.len());

    Ok(prs::apply_pull_requests(conn, branches, pull_requests).await)
}

/// Collect every worker's output, remembering the first failure.
///
/// All tasks are always joined so none outlive the call; the first error
/// (including a panic) is reported after the set drains.
async fn drain<T: 'static>(mut workers: JoinSet<Result<T>>, results: &mut Vec<T>) -> Result<()> {
    let mut first_error = None;

    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(value)) => results.push(value),
            Ok(Err(e)) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(Error::Internal(format!("worker task failed: {e}")));
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
