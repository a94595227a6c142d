//! git-sweep - prune local branches whose pull requests have landed
//!
//! The library half of the `git-sweep` binary. It classifies every local
//! branch as deletable or not by correlating three inputs:
//!
//! - the branch's own commit ancestry (trimmed to the commits unique to it),
//! - its remote-tracking state,
//! - the merge/close state of the pull requests opened from it.
//!
//! All version-control and code-host access goes through the [`connector`]
//! seam, so the decision engine itself is fully testable against a mock.

pub mod connector;
pub mod engine;
pub mod error;
pub mod types;
