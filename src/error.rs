//! Error types for git-sweep

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// All errors surfaced by the engine and the connector
#[derive(Debug, Error)]
pub enum Error {
    /// No remote is configured in the working copy
    #[error("no git remote found")]
    NoRemote,

    /// The current directory is not inside a git repository
    #[error("must be run from inside a git repository")]
    NotAGitRepository,

    /// An external command could not be spawned
    #[error("failed to run `{command}`: {source}")]
    CommandSpawn {
        /// The command line that failed
        command: String,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// An external command exited with a non-zero status
    #[error("`{command}` failed: {stderr}")]
    CommandStatus {
        /// The command line that failed
        command: String,
        /// Captured stderr output, trimmed
        stderr: String,
    },

    /// A code-host JSON payload could not be decoded
    #[error("failed to decode {context}: {source}\npayload: {payload}")]
    Decode {
        /// What was being decoded (e.g. "pull request search response")
        context: String,
        /// The raw payload, kept for diagnosis
        payload: String,
        /// The underlying serde error
        source: serde_json::Error,
    },

    /// The code host returned a pull request state outside the known set
    #[error("unexpected pull request state: {0}")]
    UnexpectedPrState(String),

    /// Internal invariant failure (e.g. a panicked worker task)
    #[error("{0}")]
    Internal(String),
}
