//! Branch locks
//!
//! A lock is a boolean marker in the repository's git config that exempts a
//! branch from deletion. Locks written by older releases used a different key
//! name; reads and unlocks honor both.

use crate::connector::SharedConnector;
use crate::engine::list;
use crate::error::Result;
use tracing::warn;

pub(crate) fn lock_key(branch_name: &str) -> String {
    format!("branch.{branch_name}.sweep-locked")
}

pub(crate) fn deprecated_lock_key(branch_name: &str) -> String {
    format!("branch.{branch_name}.sweep-protected")
}

/// Lock the named branches. Names that do not resolve to a local branch are
/// skipped with a warning. Returns the names actually locked.
pub async fn lock_branches(conn: &SharedConnector, branch_names: &[String]) -> Result<Vec<String>> {
    let names = known_branches(conn, branch_names).await?;
    for name in &names {
        conn.add_config(&lock_key(name), "true").await?;
    }
    Ok(names)
}

/// Unlock the named branches, removing locks under either key name.
/// Returns the names actually unlocked.
pub async fn unlock_branches(
    conn: &SharedConnector,
    branch_names: &[String],
) -> Result<Vec<String>> {
    let names = known_branches(conn, branch_names).await?;
    for name in &names {
        match conn.remove_config(&lock_key(name)).await {
            Ok(_) => {
                // A stale old-style lock may coexist with the current one.
                let _ = conn.remove_config(&deprecated_lock_key(name)).await;
            }
            Err(primary) => {
                if conn.remove_config(&deprecated_lock_key(name)).await.is_err() {
                    return Err(primary);
                }
            }
        }
    }
    Ok(names)
}

async fn known_branches(conn: &SharedConnector, requested: &[String]) -> Result<Vec<String>> {
    let output = conn.get_branch_names().await?;
    let existing = list::to_branches(&output);

    let mut results = Vec::new();
    for name in requested {
        if list::branch_name_exists(name, &existing) {
            results.push(name.clone());
        } else {
            warn!("branch not found: {name}");
        }
    }
    Ok(results)
}
