//! Repository inspection
//!
//! Read-only queries about one repository path: remote presence, current
//! branch, HEAD commit, and working-tree cleanliness. Results are computed
//! fresh on every call and never cached, since they feed checkout decisions.

use std::path::Path;

use super::GitClient;
use crate::{Error, Result};

/// Snapshot of a repository's state
#[derive(Debug, Clone)]
pub struct RepositoryInfo {
    /// Whether any remote is configured
    pub has_remote: bool,
    /// Configured remote names/URLs, in `git remote` order
    pub remote_urls: Vec<String>,
    /// Current branch name; empty when HEAD is detached
    pub current_branch: String,
    /// Short (8-character) hash of HEAD
    pub current_commit: String,
    /// True when the working tree has no uncommitted changes
    pub is_clean: bool,
    /// Number of changed entries reported by `git status --porcelain`
    pub uncommitted_changes: usize,
}

impl GitClient {
    /// Report the installed git version, or an error if git is unavailable
    pub async fn git_version(&self) -> Result<String> {
        let out = self.runner().query(Path::new("."), &["--version"]).await?;
        if out.success() {
            Ok(out.stdout.trim().to_string())
        } else {
            Err(Error::Other(format!(
                "git is not available: {}",
                out.stderr.trim()
            )))
        }
    }

    /// Fail with [`Error::NotAGitRepository`] unless `path` is inside a git
    /// working tree
    pub(crate) async fn ensure_repository(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(Error::NotAGitRepository(path.to_path_buf()));
        }

        let out = self
            .runner()
            .query(path, &["rev-parse", "--git-dir"])
            .await?;

        if out.success() {
            Ok(())
        } else {
            Err(Error::NotAGitRepository(path.to_path_buf()))
        }
    }

    /// Get comprehensive information about the repository at `path`
    pub async fn repository_info(&self, path: &Path) -> Result<RepositoryInfo> {
        self.ensure_repository(path).await?;

        let remote_out = self.runner().query(path, &["remote"]).await?;
        let has_remote = remote_out.success() && !remote_out.stdout.trim().is_empty();
        let remote_urls = if has_remote {
            remote_out
                .stdout
                .trim()
                .lines()
                .map(|l| l.trim().to_string())
                .collect()
        } else {
            Vec::new()
        };

        // Empty output with exit 0 means detached HEAD, which is a valid state.
        let branch_out = self
            .runner()
            .query(path, &["branch", "--show-current"])
            .await?;
        let current_branch = if branch_out.success() {
            branch_out.stdout.trim().to_string()
        } else {
            String::new()
        };

        let head_out = self.runner().query(path, &["rev-parse", "HEAD"]).await?;
        let full_hash = if head_out.success() {
            head_out.stdout.trim().to_string()
        } else {
            String::new()
        };
        let current_commit: String = full_hash.chars().take(8).collect();

        let status_out = self
            .runner()
            .query(path, &["status", "--porcelain"])
            .await?;
        let uncommitted_changes = status_out
            .stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .count();
        let is_clean = status_out.success() && uncommitted_changes == 0;

        Ok(RepositoryInfo {
            has_remote,
            remote_urls,
            current_branch,
            current_commit,
            is_clean,
            uncommitted_changes,
        })
    }

    /// Fetch the latest commits from all remotes
    ///
    /// Returns [`Error::NoRemoteConfigured`] when the repository has no
    /// remote; callers treat that as informational rather than fatal.
    pub async fn fetch_latest(&self, path: &Path) -> Result<String> {
        let info = self.repository_info(path).await?;
        if !info.has_remote {
            return Err(Error::NoRemoteConfigured);
        }

        let out = self.runner().run(path, &["fetch", "--all"]).await?;
        if out.success() {
            Ok(format!("Fetched latest commits from {:?}", info.remote_urls))
        } else {
            Err(Error::Other(format!(
                "Fetch failed: {}",
                out.stderr.trim()
            )))
        }
    }
}
