//! Connector seam for version-control and code-host access
//!
//! The engine never runs `git`/`gh` itself; it consumes this trait. Results
//! are raw command output (text or JSON) — parsing into typed values happens
//! in the engine, which keeps the trait trivial to fake in tests.

mod command;

pub use command::CommandConnector;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Shared connector handle, cloned into worker tasks
pub type SharedConnector = Arc<dyn Connector>;

/// Operations the engine needs from git and the code host
#[async_trait]
pub trait Connector: Send + Sync {
    /// Whether the current directory is inside a git work tree
    async fn is_local_repo(&self) -> Result<bool>;

    /// `git remote -v` output
    async fn get_remote_names(&self) -> Result<String>;

    /// Resolved ssh client configuration for a host (`ssh -T -G <name>`)
    async fn get_ssh_config(&self, name: &str) -> Result<String>;

    /// Repository metadata JSON (owner, name, fork parent, default branch)
    async fn get_repo_names(&self, hostname: &str, repo_name: &str) -> Result<String>;

    /// Verify each repository is reachable on the code host
    async fn check_repos(&self, hostname: &str, repo_names: &[String]) -> Result<()>;

    /// Local branch listing, one `<head>:<name>:<oid>` line per branch
    async fn get_branch_names(&self) -> Result<String>;

    /// Branches merged into `<remote>/<branch>` (`git branch --merged`)
    async fn get_merged_branch_names(&self, remote_name: &str, branch_name: &str)
    -> Result<String>;

    /// Commit id of the local remote-tracking ref `<remote>/<branch>`
    async fn get_remote_head_oid(&self, remote_name: &str, branch_name: &str) -> Result<String>;

    /// Commit id of a branch head queried live from a remote URL
    async fn get_ls_remote_head_oid(&self, url: &str, branch_name: &str) -> Result<String>;

    /// First-parent commit log of a branch, newest first, bounded depth
    async fn get_log(&self, branch_name: &str) -> Result<String>;

    /// Refs (local and remote-tracking) containing a commit
    async fn get_associated_ref_names(&self, oid: &str) -> Result<String>;

    /// GraphQL PR search response for a shard of head-commit hashes
    async fn get_pull_requests(
        &self,
        hostname: &str,
        orgs: &str,
        repos: &str,
        query_hashes: &str,
    ) -> Result<String>;

    /// `git status --short` output
    async fn get_uncommitted_changes(&self) -> Result<String>;

    /// Read a git config value (errors when unset)
    async fn get_config(&self, key: &str) -> Result<String>;

    /// Add a git config value
    async fn add_config(&self, key: &str, value: &str) -> Result<String>;

    /// Unset a git config value
    async fn remove_config(&self, key: &str) -> Result<String>;

    /// Check out a branch
    async fn checkout_branch(&self, branch_name: &str) -> Result<String>;

    /// Force-delete a set of branches in one call
    async fn delete_branches(&self, branch_names: &[String]) -> Result<String>;

    /// Prune stale remote-tracking refs for a remote
    async fn prune_remote_branches(&self, remote_name: &str) -> Result<String>;

    /// `git worktree list --porcelain` output
    async fn get_worktrees(&self) -> Result<String>;

    /// Remove a worktree by path
    async fn remove_worktree(&self, path: &str) -> Result<String>;
}
