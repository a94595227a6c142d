//! Lock and unlock commands - exempt branches from deletion

use crate::cli::style::{check, Stylize};
use anstream::println;
use git_sweep::connector::SharedConnector;
use git_sweep::engine;
use git_sweep::error::Result;

/// Run the lock command
pub async fn run_lock(conn: &SharedConnector, branch_names: &[String]) -> Result<()> {
    let locked = engine::lock_branches(conn, branch_names).await?;
    for name in &locked {
        println!("{} Locked {}", check(), name.emphasis());
    }
    Ok(())
}

/// Run the unlock command
pub async fn run_unlock(conn: &SharedConnector, branch_names: &[String]) -> Result<()> {
    let unlocked = engine::unlock_branches(conn, branch_names).await?;
    for name in &unlocked {
        println!("{} Unlocked {}", check(), name.emphasis());
    }
    Ok(())
}
