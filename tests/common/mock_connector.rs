//! Mock connector for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use git_sweep::connector::Connector;
use git_sweep::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Simple mock connector scripted with canned command output.
///
/// Responses and injected errors are keyed by call key: the method name, or
/// `method:argument` for methods whose output depends on an argument (e.g.
/// `get_log:issue1`). Lookup tries the argument-specific key first, then the
/// bare method name.
///
/// Features:
/// - Call tracking for verification
/// - Per-key responses
/// - Error injection for failure path testing
pub struct MockConnector {
    responses: Mutex<HashMap<String, String>>,
    errors: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            errors: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script the output for a call key
    pub fn respond(&self, key: &str, output: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_string(), output.to_string());
    }

    /// Make calls matching a key fail with the given stderr
    pub fn fail(&self, key: &str, stderr: &str) {
        self.errors
            .lock()
            .unwrap()
            .insert(key.to_string(), stderr.to_string());
    }

    /// All call keys recorded so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn assert_called(&self, key: &str) {
        let calls = self.calls();
        assert!(
            calls.iter().any(|c| c == key),
            "expected a {key} call but got: {calls:?}"
        );
    }

    pub fn assert_not_called(&self, key: &str) {
        let calls = self.calls();
        assert!(
            !calls.iter().any(|c| c == key),
            "expected no {key} call but got: {calls:?}"
        );
    }

    /// Record a call and resolve its scripted response, if any
    fn invoke(&self, method: &str, arg: Option<&str>) -> Result<Option<String>> {
        let key = arg.map_or_else(|| method.to_string(), |a| format!("{method}:{a}"));
        self.calls.lock().unwrap().push(key.clone());

        let errors = self.errors.lock().unwrap();
        if let Some(stderr) = errors.get(&key).or_else(|| errors.get(method)) {
            return Err(Error::CommandStatus {
                command: key,
                stderr: stderr.clone(),
            });
        }

        let responses = self.responses.lock().unwrap();
        Ok(responses.get(&key).or_else(|| responses.get(method)).cloned())
    }

    /// Like `invoke` but defaults to empty output when unscripted
    fn invoke_or_default(&self, method: &str, arg: Option<&str>) -> Result<String> {
        Ok(self.invoke(method, arg)?.unwrap_or_default())
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn is_local_repo(&self) -> Result<bool> {
        Ok(self.invoke("is_local_repo", None)?.as_deref() != Some("false"))
    }

    async fn get_remote_names(&self) -> Result<String> {
        self.invoke_or_default("get_remote_names", None)
    }

    async fn get_ssh_config(&self, name: &str) -> Result<String> {
        self.invoke_or_default("get_ssh_config", Some(name))
    }

    async fn get_repo_names(&self, _hostname: &str, repo_name: &str) -> Result<String> {
        self.invoke_or_default("get_repo_names", Some(repo_name))
    }

    async fn check_repos(&self, _hostname: &str, repo_names: &[String]) -> Result<()> {
        self.invoke("check_repos", Some(&repo_names.join(",")))?;
        Ok(())
    }

    async fn get_branch_names(&self) -> Result<String> {
        self.invoke_or_default("get_branch_names", None)
    }

    async fn get_merged_branch_names(
        &self,
        _remote_name: &str,
        branch_name: &str,
    ) -> Result<String> {
        self.invoke_or_default("get_merged_branch_names", Some(branch_name))
    }

    async fn get_remote_head_oid(&self, _remote_name: &str, branch_name: &str) -> Result<String> {
        self.invoke_or_default("get_remote_head_oid", Some(branch_name))
    }

    async fn get_ls_remote_head_oid(&self, _url: &str, branch_name: &str) -> Result<String> {
        self.invoke_or_default("get_ls_remote_head_oid", Some(branch_name))
    }

    async fn get_log(&self, branch_name: &str) -> Result<String> {
        self.invoke_or_default("get_log", Some(branch_name))
    }

    async fn get_associated_ref_names(&self, oid: &str) -> Result<String> {
        self.invoke_or_default("get_associated_ref_names", Some(oid))
    }

    async fn get_pull_requests(
        &self,
        _hostname: &str,
        _orgs: &str,
        _repos: &str,
        query_hashes: &str,
    ) -> Result<String> {
        // Unscripted searches decode as an empty result set
        Ok(self
            .invoke("get_pull_requests", Some(query_hashes))?
            .unwrap_or_else(|| r#"{"data":{"search":{"edges":[]}}}"#.to_string()))
    }

    async fn get_uncommitted_changes(&self) -> Result<String> {
        self.invoke_or_default("get_uncommitted_changes", None)
    }

    async fn get_config(&self, key: &str) -> Result<String> {
        // Unscripted keys behave as unset config (git exits non-zero)
        self.invoke("get_config", Some(key))?
            .ok_or_else(|| Error::CommandStatus {
                command: format!("get_config:{key}"),
                stderr: String::new(),
            })
    }

    async fn add_config(&self, key: &str, _value: &str) -> Result<String> {
        self.invoke_or_default("add_config", Some(key))
    }

    async fn remove_config(&self, key: &str) -> Result<String> {
        self.invoke_or_default("remove_config", Some(key))
    }

    async fn checkout_branch(&self, branch_name: &str) -> Result<String> {
        self.invoke_or_default("checkout_branch", Some(branch_name))
    }

    async fn delete_branches(&self, branch_names: &[String]) -> Result<String> {
        self.invoke_or_default("delete_branches", Some(&branch_names.join(",")))
    }

    async fn prune_remote_branches(&self, remote_name: &str) -> Result<String> {
        self.invoke_or_default("prune_remote_branches", Some(remote_name))
    }

    async fn get_worktrees(&self) -> Result<String> {
        self.invoke_or_default("get_worktrees", None)
    }

    async fn remove_worktree(&self, path: &str) -> Result<String> {
        self.invoke_or_default("remove_worktree", Some(path))
    }
}
