//! Error types for copse

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for copse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for copse operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The path is not inside a git working tree
    #[error("Not a git repository: {}", .0.display())]
    NotAGitRepository(PathBuf),

    /// The repository has no remote configured (non-fatal for most callers)
    #[error("No remote repository configured")]
    NoRemoteConfigured,

    /// A git subprocess exceeded its timeout
    #[error("git {command} timed out after {timeout:?}")]
    SubprocessTimeout { command: String, timeout: Duration },

    /// A git subprocess could not be started
    #[error("Failed to run git {command}: {message}")]
    SubprocessFailure { command: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
