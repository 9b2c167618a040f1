//! Git subprocess execution
//!
//! Every git interaction in copse goes through [`GitRunner`]: a single place
//! that spawns the git binary, enforces a timeout, and captures output. The
//! runner is plain data and is passed into the components that need it rather
//! than living in a global.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::{Error, Result};

/// Default timeout for mutating or network-touching git calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shorter timeout for the per-commit read-only queries run during
/// branch attribution
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Captured result of one git invocation
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// True when the process exited with code 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs git commands as subprocesses with a timeout
#[derive(Debug, Clone)]
pub struct GitRunner {
    /// Path to the git executable (defaults to "git" in PATH)
    program: String,
    /// Timeout applied by [`GitRunner::run`]
    timeout: Duration,
}

impl Default for GitRunner {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GitRunner {
    /// Create a runner with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom path to the git executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the default timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run git with the given arguments in `cwd`, using the default timeout
    pub async fn run(&self, cwd: &Path, args: &[&str]) -> Result<GitOutput> {
        self.run_with_timeout(cwd, args, self.timeout).await
    }

    /// Run git with the given arguments in `cwd`, using the short query timeout
    pub async fn query(&self, cwd: &Path, args: &[&str]) -> Result<GitOutput> {
        self.run_with_timeout(cwd, args, QUERY_TIMEOUT).await
    }

    /// Run git with an explicit timeout
    pub async fn run_with_timeout(
        &self,
        cwd: &Path,
        args: &[&str],
        timeout: Duration,
    ) -> Result<GitOutput> {
        let command_name = args.first().copied().unwrap_or("").to_string();

        let child = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(Error::SubprocessFailure {
                    command: command_name,
                    message: e.to_string(),
                });
            }
            Err(_) => {
                return Err(Error::SubprocessTimeout {
                    command: command_name,
                    timeout,
                });
            }
        };

        Ok(GitOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
