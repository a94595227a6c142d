//! git-sweep - delete local branches whose pull requests have landed

use anyhow::Result;
use clap::{Parser, Subcommand};
use git_sweep::connector::{CommandConnector, SharedConnector};
use git_sweep::types::TargetState;
use std::sync::Arc;

mod cli;

#[derive(Parser)]
#[command(name = "git-sweep")]
#[command(about = "Safely delete local branches whose pull requests have landed")]
#[command(version)]
struct Cli {
    /// Pull-request state that makes a branch deletable
    #[arg(long, value_enum, default_value_t = TargetState::Merged)]
    state: TargetState,

    /// Show what would be deleted without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging (disables the spinner)
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Lock branches so they are never deleted
    #[command(alias = "protect")]
    Lock {
        /// Branch names to lock
        #[arg(required = true)]
        branches: Vec<String>,
    },

    /// Remove deletion locks from branches
    #[command(alias = "unprotect")]
    Unlock {
        /// Branch names to unlock
        #[arg(required = true)]
        branches: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if args.debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "git_sweep=debug".into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let conn: SharedConnector = Arc::new(CommandConnector::new());

    if !conn.is_local_repo().await? {
        return Err(git_sweep::error::Error::NotAGitRepository.into());
    }

    // GH_HOST overrides the hostname parsed from the remote, same as gh
    let host = std::env::var("GH_HOST").ok();

    let run = async {
        match args.command {
            None => {
                cli::run_prune(&conn, host.as_deref(), args.state, args.dry_run, args.debug).await
            }
            Some(Commands::Lock { branches }) => cli::run_lock(&conn, &branches).await,
            Some(Commands::Unlock { branches }) => cli::run_unlock(&conn, &branches).await,
        }
    };

    // In-flight git/gh subprocesses are killed when their futures drop.
    tokio::select! {
        result = run => Ok(result?),
        _ = tokio::signal::ctrl_c() => {
            eprintln!("interrupted");
            std::process::exit(130);
        }
    }
}
