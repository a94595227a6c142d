//! Branch-deletability decision engine
//!
//! Correlates local commit ancestry, remote-tracking state and pull-request
//! state to decide which local branches can be deleted safely. Everything
//! here is driven through the [`crate::connector::Connector`] seam.

mod classify;
mod list;
mod lock;
mod prs;
mod remote;
mod trim;

pub use classify::{delete_branches, delete_worktrees, execute_deletion};
pub use list::get_branches;
pub use lock::{lock_branches, unlock_branches};
pub use remote::get_remote;

/// Split command output into non-empty lines, tolerating CRLF
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
}

/// First non-empty line of command output, if any
pub(crate) fn first_line(text: &str) -> Option<&str> {
    split_lines(text).next()
}
