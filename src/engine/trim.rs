//! Ancestry trimming - find the commits owned by a branch alone
//!
//! Walks a branch's log newest-first and keeps the contiguous prefix that no
//! unrelated branch contains. The first element of the result is the head of
//! the branch's own unmerged work, which the classifier compares against PR
//! commit lists (this survives squash merges, where the merged commit never
//! appears in the default branch's log).

use crate::connector::SharedConnector;
use crate::engine::{first_line, split_lines};
use crate::error::Result;
use crate::types::Branch;
use regex::Regex;
use tracing::debug;

/// Resolve a branch's remote head and trim its log to its own commits.
///
/// Runs as one worker task per branch; the connector calls inside stay
/// sequential because each step depends on the previous one.
pub(crate) async fn fetch_own_commits(
    conn: &SharedConnector,
    remote_name: &str,
    default_branch: &str,
    mut branch: Branch,
) -> Result<Branch> {
    branch.remote_head_oid = resolve_remote_head(conn, remote_name, &branch.name).await;

    let log = conn.get_log(&branch.name).await?;
    let oids: Vec<String> = split_lines(&log).map(str::to_string).collect();

    branch.commits = trim_branch(
        conn,
        &oids,
        branch.remote_head_oid.is_some(),
        branch.is_merged,
        &branch.name,
        default_branch,
    )
    .await?;

    debug!(
        "{}: {} own commit(s) of {} logged",
        branch.name,
        branch.commits.len(),
        oids.len()
    );

    Ok(branch)
}

/// Head commit of the branch's remote-tracking ref.
///
/// Tries the local `<remote>/<branch>` ref first; when that is missing
/// (e.g. the branch tracks a fork), falls back to a live lookup against the
/// URL recorded in `branch.<name>.remote`. Either failure yields `None`.
async fn resolve_remote_head(
    conn: &SharedConnector,
    remote_name: &str,
    branch_name: &str,
) -> Option<String> {
    if let Ok(output) = conn.get_remote_head_oid(remote_name, branch_name).await {
        if let Some(oid) = first_line(&output) {
            return Some(oid.to_string());
        }
    }

    let config = conn
        .get_config(&format!("branch.{branch_name}.remote"))
        .await
        .ok()?;
    let remote_url = first_line(&config)?.to_string();
    let output = conn
        .get_ls_remote_head_oid(&remote_url, branch_name)
        .await
        .ok()?;
    output.split_whitespace().next().map(str::to_string)
}

/// Trim a newest-first commit list to the prefix owned by `branch_name`.
///
/// With a known remote head or a merged flag, one commit is enough for the
/// mergedness check and the walk is skipped. Otherwise refs sharing the
/// newest commit (other than the branch itself) are recorded as "children"
/// - names of PR-checkout shadows or forks riding the same head - and the
/// walk stops at the first commit also contained in any other ref.
async fn trim_branch(
    conn: &SharedConnector,
    oids: &[String],
    has_remote_head: bool,
    is_merged: bool,
    branch_name: &str,
    default_branch: &str,
) -> Result<Vec<String>> {
    let mut results = Vec::new();
    let mut child_names: Vec<String> = Vec::new();

    for (i, oid) in oids.iter().enumerate() {
        if has_remote_head || is_merged {
            results.push(oid.clone());
            break;
        }

        let ref_output = conn.get_associated_ref_names(oid).await?;
        let names = extract_branch_names(&ref_output);

        if i == 0 {
            for name in &names {
                if name == default_branch {
                    // Newest commit already reachable from default:
                    // nothing unique left on this branch.
                    return Ok(Vec::new());
                }
                if name != branch_name {
                    child_names.push(name.clone());
                }
            }
        }

        let shared_with_stranger = names
            .iter()
            .any(|name| name != branch_name && !child_names.contains(name));
        if shared_with_stranger {
            return Ok(results);
        }

        results.push(oid.clone());
    }

    Ok(results)
}

/// Strip `refs/heads/` and `refs/remotes/<remote>/` prefixes from ref names
fn extract_branch_names(ref_output: &str) -> Vec<String> {
    let prefix = Regex::new(r"^refs/(?:heads|remotes/.+?)/").unwrap();
    split_lines(ref_output)
        .map(|name| prefix.replace(name, "").into_owned())
        .collect()
}
