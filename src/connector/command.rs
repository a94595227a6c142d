//! Connector backed by the `git`, `gh` and `ssh` command-line tools

use crate::connector::Connector;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

/// Whether a command's output may be echoed to the debug log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebugMask {
    None,
    Output,
}

/// Production connector that shells out to `git`, `gh` and `ssh`
#[derive(Debug, Default)]
pub struct CommandConnector;

impl CommandConnector {
    /// Create a connector
    pub const fn new() -> Self {
        Self
    }

    async fn run(&self, program: &str, args: &[&str], mask: DebugMask) -> Result<String> {
        let command_line = format!("{program} {}", args.join(" "));

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if program == "gh" {
            command.env("CLICOLOR_FORCE", "0");
        }

        let start = Instant::now();
        let output = command.output().await.map_err(|source| Error::CommandSpawn {
            command: command_line.clone(),
            source,
        })?;
        let elapsed = start.elapsed();

        if !output.status.success() {
            return Err(Error::CommandStatus {
                command: command_line,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        match mask {
            DebugMask::None => debug!("[{elapsed:?}] run `{command_line}` -> {stdout:?}"),
            DebugMask::Output => debug!("[{elapsed:?}] run `{command_line}` -> *****"),
        }

        Ok(stdout)
    }
}

#[async_trait]
impl Connector for CommandConnector {
    async fn is_local_repo(&self) -> Result<bool> {
        match self
            .run(
                "git",
                &["rev-parse", "--is-inside-work-tree"],
                DebugMask::None,
            )
            .await
        {
            Ok(output) => Ok(output.trim() == "true"),
            Err(Error::CommandStatus { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get_remote_names(&self) -> Result<String> {
        self.run("git", &["remote", "-v"], DebugMask::None).await
    }

    async fn get_ssh_config(&self, name: &str) -> Result<String> {
        self.run("ssh", &["-T", "-G", name], DebugMask::Output).await
    }

    async fn get_repo_names(&self, hostname: &str, repo_name: &str) -> Result<String> {
        let spec = format!("{hostname}/{repo_name}");
        self.run(
            "gh",
            &[
                "repo",
                "view",
                &spec,
                "--json",
                "owner,name,parent,defaultBranchRef",
            ],
            DebugMask::None,
        )
        .await
    }

    async fn check_repos(&self, hostname: &str, repo_names: &[String]) -> Result<()> {
        for name in repo_names {
            let path = format!("repos/{name}");
            self.run(
                "gh",
                &["api", "--hostname", hostname, &path, "--silent"],
                DebugMask::None,
            )
            .await?;
        }
        Ok(())
    }

    async fn get_branch_names(&self) -> Result<String> {
        self.run(
            "git",
            &[
                "branch",
                "-v",
                "--no-abbrev",
                "--format=%(HEAD):%(refname:lstrip=2):%(objectname)",
            ],
            DebugMask::None,
        )
        .await
    }

    async fn get_merged_branch_names(
        &self,
        remote_name: &str,
        branch_name: &str,
    ) -> Result<String> {
        let target = format!("{remote_name}/{branch_name}");
        self.run("git", &["branch", "--merged", &target], DebugMask::None)
            .await
    }

    async fn get_remote_head_oid(&self, remote_name: &str, branch_name: &str) -> Result<String> {
        let target = format!("{remote_name}/{branch_name}");
        self.run("git", &["rev-parse", &target], DebugMask::None)
            .await
    }

    async fn get_ls_remote_head_oid(&self, url: &str, branch_name: &str) -> Result<String> {
        self.run("git", &["ls-remote", url, branch_name], DebugMask::None)
            .await
    }

    async fn get_log(&self, branch_name: &str) -> Result<String> {
        // 30 first-parent commits is enough for typical PR sizes; larger
        // branches degrade to "not analyzable" and stay NotDeletable.
        self.run(
            "git",
            &[
                "log",
                "--first-parent",
                "--max-count=30",
                "--format=%H",
                branch_name,
                "--",
            ],
            DebugMask::None,
        )
        .await
    }

    async fn get_associated_ref_names(&self, oid: &str) -> Result<String> {
        self.run(
            "git",
            &[
                "branch",
                "--all",
                "--format=%(refname)",
                "--contains",
                oid,
            ],
            DebugMask::None,
        )
        .await
    }

    // limitations:
    // - https://docs.github.com/en/search-github/searching-on-github/searching-issues-and-pull-requests#search-within-a-users-or-organizations-repositories
    // - https://docs.github.com/en/graphql/overview/resource-limitations
    async fn get_pull_requests(
        &self,
        hostname: &str,
        orgs: &str,
        repos: &str,
        query_hashes: &str,
    ) -> Result<String> {
        let query = format!(
            r#"query=query {{
  search(type: ISSUE, query: "is:pr {orgs} {repos} {query_hashes}", last: 100) {{
    issueCount
    edges {{
      node {{
        ... on PullRequest {{
          number
          url
          state
          isDraft
          headRefName
          commits(last: 100) {{
            nodes {{
              commit {{
                oid
              }}
            }}
          }}
          author {{ login }}
        }}
      }}
    }}
  }}
}}"#
        );
        self.run(
            "gh",
            &["api", "graphql", "--hostname", hostname, "-f", &query],
            DebugMask::None,
        )
        .await
    }

    async fn get_uncommitted_changes(&self) -> Result<String> {
        self.run("git", &["status", "--short"], DebugMask::None).await
    }

    async fn get_config(&self, key: &str) -> Result<String> {
        self.run("git", &["config", "--get", key], DebugMask::None)
            .await
    }

    async fn add_config(&self, key: &str, value: &str) -> Result<String> {
        self.run("git", &["config", "--add", key, value], DebugMask::None)
            .await
    }

    async fn remove_config(&self, key: &str) -> Result<String> {
        self.run("git", &["config", "--unset", key], DebugMask::None)
            .await
    }

    async fn checkout_branch(&self, branch_name: &str) -> Result<String> {
        self.run(
            "git",
            &["checkout", "--quiet", branch_name],
            DebugMask::None,
        )
        .await
    }

    async fn delete_branches(&self, branch_names: &[String]) -> Result<String> {
        let mut args = vec!["branch", "-D"];
        args.extend(branch_names.iter().map(String::as_str));
        self.run("git", &args, DebugMask::None).await
    }

    async fn prune_remote_branches(&self, remote_name: &str) -> Result<String> {
        self.run(
            "git",
            &["remote", "prune", remote_name],
            DebugMask::None,
        )
        .await
    }

    async fn get_worktrees(&self) -> Result<String> {
        self.run(
            "git",
            &["worktree", "list", "--porcelain"],
            DebugMask::None,
        )
        .await
    }

    async fn remove_worktree(&self, path: &str) -> Result<String> {
        self.run("git", &["worktree", "remove", path], DebugMask::None)
            .await
    }
}
