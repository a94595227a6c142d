//! Deletability classification and deletion
//!
//! State machine: `Unknown -> {NotDeletable, Deletable} -> Deleted`.
//! `Deleted` is only ever set after a delete attempt confirms the branch is
//! actually gone.

use crate::connector::SharedConnector;
use crate::engine::list;
use crate::error::Result;
use crate::types::{Branch, BranchState, PrState, PullRequest, TargetState};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Classify every branch
pub(crate) fn check_deletion(branches: Vec<Branch>, target: TargetState) -> Vec<Branch> {
    branches
        .into_iter()
        .map(|mut branch| {
            branch.state = delete_status(&branch, target);
            debug!("{}: {:?}", branch.name, branch.state);
            branch
        })
        .collect()
}

/// Per-branch decision, first match wins:
/// lock, uncommitted tracked changes, no PRs, any open PR, and finally the
/// fully-merged count.
fn delete_status(branch: &Branch, target: TargetState) -> BranchState {
    if branch.is_locked {
        return BranchState::NotDeletable;
    }

    if branch.has_tracked_changes {
        return BranchState::NotDeletable;
    }

    // A worktree we cannot remove pins its branch.
    if let Some(worktree) = &branch.worktree {
        if worktree.is_main || worktree.is_locked {
            return BranchState::NotDeletable;
        }
    }

    if branch.pull_requests.is_empty() {
        return BranchState::NotDeletable;
    }

    let mut fully_merged_count = 0;
    for pr in &branch.pull_requests {
        if pr.state == PrState::Open {
            return BranchState::NotDeletable;
        }
        if is_fully_merged(branch, pr, target) {
            fully_merged_count += 1;
        }
    }
    if fully_merged_count == 0 {
        return BranchState::NotDeletable;
    }

    BranchState::Deletable
}

/// A PR counts as fully merged when its state passes the target filter and
/// its commit list contains the branch's own head commit. Comparing against
/// the pre-squash head makes this squash-merge safe.
fn is_fully_merged(branch: &Branch, pr: &PullRequest, target: TargetState) -> bool {
    let Some(local_head) = branch.commits.first() else {
        return false;
    };

    let state_matches = match target {
        TargetState::Merged => pr.state == PrState::Merged,
        // The GitHub interface treats merged PRs as closed too, so the
        // closed filter accepts both.
        TargetState::Closed => matches!(pr.state, PrState::Closed | PrState::Merged),
    };
    if !state_matches {
        return false;
    }

    pr.commits.iter().any(|oid| oid == local_head)
}

/// Move HEAD off a deletable branch before it gets deleted.
///
/// When the checked-out branch is classified deletable, switch the working
/// copy to the default branch (skipped in dry-run), re-mark `head` and
/// synthesize a minimal record for the default branch when it was not listed.
pub(crate) async fn switch_to_default_if_deleted(
    conn: &SharedConnector,
    branches: Vec<Branch>,
    default_branch: &str,
    dry_run: bool,
) -> Result<Vec<Branch>> {
    let needs_checkout = branches
        .iter()
        .any(|b| b.head && b.state == BranchState::Deletable);
    if !needs_checkout {
        return Ok(branches);
    }

    if !dry_run {
        conn.checkout_branch(default_branch).await?;
    }

    let mut results = Vec::with_capacity(branches.len() + 1);

    if !list::branch_name_exists(default_branch, &branches) {
        let mut default = Branch::new(true, default_branch);
        default.state = BranchState::NotDeletable;
        results.push(default);
    }

    for mut branch in branches {
        branch.head = branch.name == default_branch;
        results.push(branch);
    }

    Ok(results)
}

/// Full deletion pass: linked worktrees first (a checked-out branch cannot
/// be deleted), then the branches, then stale remote-tracking refs. Remote
/// pruning is cleanup only; its failure is logged and never fails the pass.
pub async fn execute_deletion(
    conn: &SharedConnector,
    remote_name: &str,
    mut branches: Vec<Branch>,
) -> Result<Vec<Branch>> {
    let removed = delete_worktrees(conn, &branches).await?;
    for branch in &mut branches {
        if removed.get(&branch.name) == Some(&false) {
            branch.state = BranchState::NotDeletable;
        }
    }

    let branches = delete_branches(conn, branches).await?;

    if let Err(e) = conn.prune_remote_branches(remote_name).await {
        warn!("pruning remote-tracking refs failed: {e}");
    }
    Ok(branches)
}

/// Delete every branch classified `Deletable`, then re-list and mark only
/// the branches that are verifiably gone as `Deleted`. A failing delete
/// command does not abort: the re-list decides, so branches that survived
/// (e.g. a partial batch failure) stay `Deletable` and are surfaced.
pub async fn delete_branches(conn: &SharedConnector, branches: Vec<Branch>) -> Result<Vec<Branch>> {
    let deletable: Vec<String> = branches
        .iter()
        .filter(|b| b.state == BranchState::Deletable)
        .map(|b| b.name.clone())
        .collect();
    if deletable.is_empty() {
        return Ok(branches);
    }

    if let Err(e) = conn.delete_branches(&deletable).await {
        warn!("branch deletion reported an error: {e}");
    }

    let names_after = conn.get_branch_names().await?;
    let branches_after = list::to_branches(&names_after);

    Ok(branches
        .into_iter()
        .map(|mut branch| {
            if branch.state == BranchState::Deletable
                && !list::branch_name_exists(&branch.name, &branches_after)
            {
                branch.state = BranchState::Deleted;
            }
            branch
        })
        .collect())
}

/// Remove the linked worktrees of deletable branches.
///
/// Returns a per-branch success map. The main worktree is never removed;
/// individual removal failures are logged and reported as `false` entries
/// rather than aborting the run.
pub async fn delete_worktrees(
    conn: &SharedConnector,
    branches: &[Branch],
) -> Result<HashMap<String, bool>> {
    let mut deleted = HashMap::new();

    for branch in branches {
        if branch.state != BranchState::Deletable {
            continue;
        }
        let Some(worktree) = &branch.worktree else {
            continue;
        };
        if worktree.is_main {
            continue;
        }

        match conn.remove_worktree(&worktree.path).await {
            Ok(_) => {
                deleted.insert(branch.name.clone(), true);
            }
            Err(e) => {
                warn!("failed to remove worktree {}: {e}", worktree.path);
                deleted.insert(branch.name.clone(), false);
            }
        }
    }

    Ok(deleted)
}
