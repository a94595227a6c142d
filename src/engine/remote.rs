//! Remote resolution - pick the primary remote and normalize its hostname

use crate::connector::SharedConnector;
use crate::engine::split_lines;
use crate::error::{Error, Result};
use crate::types::Remote;
use regex::Regex;
use tracing::debug;

const GITHUB: &str = "github.com";
const LOCALHOST: &str = "github.localhost";

/// Resolve the primary remote of the working copy.
///
/// Prefers the remote named `origin`, falling back to the first one listed.
/// The hostname is then normalized: an explicit override (the CLI passes
/// `GH_HOST` here) wins outright; otherwise the ssh client configuration may
/// rewrite an aliased hostname like `github.com-work`. SSH lookup failure is
/// non-fatal and leaves the parsed hostname untouched.
pub async fn get_remote(conn: &SharedConnector, host_override: Option<&str>) -> Result<Remote> {
    let output = conn.get_remote_names().await?;
    let mut remote = primary_remote(parse_remotes(&output))?;

    if let Some(host) = host_override {
        remote.hostname = host.to_string();
    } else if let Ok(config) = conn.get_ssh_config(&remote.hostname).await {
        remote.hostname = normalize_hostname(find_hostname(&config, &remote.hostname));
    } else {
        debug!("ssh config lookup failed for {}, using as-is", remote.hostname);
    }

    Ok(remote)
}

/// Parse `git remote -v` output into remotes.
///
/// Accepted URL forms (see `git fetch` documentation):
///
///   ssh://[user@]host.xz[:port]/path/to/repo.git/
///   http[s]://host.xz[:port]/path/to/repo.git/
///   [user@]host.xz:path/to/repo.git/   (scp-like)
fn parse_remotes(output: &str) -> Vec<Remote> {
    let has_scheme = Regex::new("^[^:]+://").unwrap();
    let scp_like = Regex::new("^([^@]+@)?([^:]+):(/?.+)$").unwrap();

    let mut results = Vec::new();
    for line in split_lines(output) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            continue;
        }

        let mut reference = fields[1].to_string();
        if !has_scheme.is_match(&reference) {
            if let Some(caps) = scp_like.captures(&reference) {
                let user = caps.get(1).map_or("", |m| m.as_str());
                let host = &caps[2];
                let path = caps[3].trim_start_matches('/');
                reference = format!("ssh://{user}{host}/{path}");
            }
        }

        let Ok(parsed) = url::Url::parse(&reference) else {
            continue;
        };

        let repo = parsed
            .path()
            .trim_start_matches('/')
            .trim_end_matches('/')
            .trim_end_matches(".git")
            .to_string();

        results.push(Remote {
            name: fields[0].to_string(),
            hostname: parsed.host_str().unwrap_or_default().to_string(),
            repo_name: repo,
        });
    }

    results
}

fn primary_remote(remotes: Vec<Remote>) -> Result<Remote> {
    if remotes.is_empty() {
        return Err(Error::NoRemote);
    }
    let origin = remotes.iter().find(|r| r.name == "origin").cloned();
    Ok(origin.unwrap_or_else(|| remotes[0].clone()))
}

/// Extract the `hostname` value from resolved ssh client configuration
/// (`ssh -T -G <host>` output), falling back to the queried name.
fn find_hostname(config: &str, default_name: &str) -> String {
    for line in split_lines(config) {
        let mut kv = line.split(' ');
        if kv.next() == Some("hostname") {
            if let Some(value) = kv.next() {
                return value.to_string();
            }
        }
    }
    default_name.to_string()
}

/// Collapse known code-host subdomain suffixes, e.g. `ssh.github.com`
/// resolves to `github.com`.
fn normalize_hostname(host: String) -> String {
    let hostname = host.to_lowercase();
    if hostname.ends_with(&format!(".{GITHUB}")) {
        return GITHUB.to_string();
    }
    if hostname.ends_with(&format!(".{LOCALHOST}")) {
        return LOCALHOST.to_string();
    }
    hostname
}
