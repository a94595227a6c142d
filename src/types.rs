//! Core types for git-sweep

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A git remote, reduced to what the engine needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remote {
    /// Remote name (e.g. "origin")
    pub name: String,
    /// Hostname after alias resolution (e.g. "github.com")
    pub hostname: String,
    /// Repository path on the host (e.g. "owner/repo")
    pub repo_name: String,
}

/// Lifecycle state of a local branch within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchState {
    /// Not yet classified
    Unknown,
    /// Must be kept
    NotDeletable,
    /// Safe to delete
    Deletable,
    /// Deleted and confirmed gone
    Deleted,
}

/// A local branch and everything learned about it during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Whether this is the checked-out (HEAD) branch
    pub head: bool,
    /// Branch name
    pub name: String,
    /// Whether this is the repository's default branch
    pub is_default: bool,
    /// Whether git reports it merged into `<remote>/<default>`
    pub is_merged: bool,
    /// Whether the user locked it against deletion
    pub is_locked: bool,
    /// Whether the working copy has tracked uncommitted changes
    /// (only ever set on the HEAD branch)
    pub has_tracked_changes: bool,
    /// Head commit of the remote-tracking branch, when one exists
    pub remote_head_oid: Option<String>,
    /// Commits owned by this branch alone, newest first
    pub commits: Vec<String>,
    /// Pull requests correlated to this branch, sorted by number
    pub pull_requests: Vec<PullRequest>,
    /// Classification result
    pub state: BranchState,
    /// Worktree the branch is checked out in, if any
    pub worktree: Option<Worktree>,
}

impl Branch {
    /// Create an unclassified branch record
    pub fn new(head: bool, name: impl Into<String>) -> Self {
        Self {
            head,
            name: name.into(),
            is_default: false,
            is_merged: false,
            is_locked: false,
            has_tracked_changes: false,
            remote_head_oid: None,
            commits: Vec::new(),
            pull_requests: Vec::new(),
            state: BranchState::Unknown,
            worktree: None,
        }
    }

    /// Whether the name is a detached-HEAD placeholder like
    /// `(HEAD detached at abc1234)` rather than a real branch name
    pub fn is_detached(&self) -> bool {
        self.name.starts_with('(') && self.name.ends_with(')')
    }
}

/// State of a pull request on the code host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// Closed without merging
    Closed,
    /// Merged
    Merged,
    /// Still open
    Open,
}

/// A pull request fetched from the code host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Head branch name the PR was opened from
    pub name: String,
    /// Current state
    pub state: PrState,
    /// Whether the PR is a draft
    pub is_draft: bool,
    /// PR number
    pub number: u64,
    /// The PR's own commit ids (up to the fetch limit)
    pub commits: Vec<String>,
    /// Web URL
    pub url: String,
    /// Author login
    pub author: String,
}

/// A git worktree, linked to a branch by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Worktree {
    /// Filesystem path of the worktree
    pub path: String,
    /// Branch checked out in it (empty when detached)
    pub branch: String,
    /// Whether this is the main worktree
    pub is_main: bool,
    /// Whether git reports the worktree locked
    pub is_locked: bool,
}

/// One line of `git status --short`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncommittedChange {
    /// Index status character
    pub x: char,
    /// Worktree status character
    pub y: char,
    /// File path
    pub path: String,
}

impl UncommittedChange {
    /// Whether the change is an untracked file (does not block deletion)
    pub const fn is_untracked(&self) -> bool {
        self.y == '?'
    }
}

/// Which PR states count toward deletability, selected with `--state`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetState {
    /// Only merged PRs count
    Merged,
    /// Closed PRs count too (closed includes merged, like the GitHub UI)
    Closed,
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merged => write!(f, "merged"),
            Self::Closed => write!(f, "closed"),
        }
    }
}
