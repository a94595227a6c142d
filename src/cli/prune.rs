//! Prune command - delete branches whose pull requests have landed

use crate::cli::style::{check, cross, hyperlink_url, pr_number, spinner_style, Stream, Stylize};
use anstream::{eprintln, println};
use git_sweep::connector::SharedConnector;
use git_sweep::engine;
use git_sweep::error::Result;
use git_sweep::types::{Branch, BranchState, Remote, TargetState};
use indicatif::ProgressBar;
use std::time::Duration;

/// Run the prune command end to end: fetch, decide, delete, report.
pub async fn run_prune(
    conn: &SharedConnector,
    host: Option<&str>,
    state: TargetState,
    dry_run: bool,
    debug: bool,
) -> Result<()> {
    if dry_run {
        println!("{}", "Dry run - nothing will be deleted".emphasis());
    }

    let spinner = make_spinner("Fetching pull requests...", debug);
    let fetched = fetch(conn, host, state, dry_run).await;
    spinner.finish_and_clear();

    let (remote, branches) = match fetched {
        Ok(result) => {
            println!("{} Fetching pull requests...done", check());
            result
        }
        Err(e) => {
            eprintln!("{} Fetching pull requests...failed", cross());
            return Err(e);
        }
    };

    let branches = if dry_run {
        branches
    } else {
        engine::execute_deletion(conn, &remote.name, branches).await?
    };

    println!();
    println!("{}", "Deleted branches".emphasis());
    print_branches(&branches, |state| {
        if dry_run {
            state == BranchState::Deletable
        } else {
            state == BranchState::Deleted
        }
    });

    println!();
    println!("{}", "Branches not deleted".emphasis());
    print_branches(&branches, |state| {
        if dry_run {
            state == BranchState::NotDeletable
        } else {
            // A branch that survived the delete attempt stays listed here.
            matches!(state, BranchState::NotDeletable | BranchState::Deletable)
        }
    });

    Ok(())
}

async fn fetch(
    conn: &SharedConnector,
    host: Option<&str>,
    state: TargetState,
    dry_run: bool,
) -> Result<(Remote, Vec<Branch>)> {
    let remote = engine::get_remote(conn, host).await?;
    let branches = engine::get_branches(conn, &remote, state, dry_run).await?;
    Ok((remote, branches))
}

fn print_branches(branches: &[Branch], selected: impl Fn(BranchState) -> bool) {
    let shown: Vec<&Branch> = branches
        .iter()
        .filter(|b| !b.is_detached() && selected(b.state))
        .collect();
    if shown.is_empty() {
        println!("{}", "  (none)".muted());
        return;
    }

    for branch in shown {
        let mut reasons: Vec<&str> = Vec::new();
        if branch.is_locked {
            reasons.push("locked");
        }
        if branch.has_tracked_changes {
            reasons.push("uncommitted changes");
        }
        if let Some(worktree) = &branch.worktree {
            if worktree.is_main {
                reasons.push("main worktree");
            } else if worktree.is_locked {
                reasons.push("locked worktree");
            }
        }

        if reasons.is_empty() {
            println!("  {}", branch.name.accent());
        } else {
            let note = format!("({})", reasons.join(", "));
            println!("  {} {}", branch.name.accent(), note.muted());
        }

        let count = branch.pull_requests.len();
        for (i, pr) in branch.pull_requests.iter().enumerate() {
            let connector = if i == count - 1 { "└─" } else { "├─" };
            println!(
                "    {} {}  {}",
                connector.muted(),
                pr_number(pr.number, pr.state, pr.is_draft),
                hyperlink_url(Stream::Stdout, &pr.url)
            );
        }
    }
}

fn make_spinner(message: &'static str, debug: bool) -> ProgressBar {
    // Debug logging and a ticking spinner fight over the terminal.
    if debug {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner()
        .with_style(spinner_style())
        .with_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
