//! CLI commands
//!
//! Command implementations for the `git-sweep` binary.

mod lock;
mod prune;
pub mod style;

pub use lock::{run_lock, run_unlock};
pub use prune::run_prune;
