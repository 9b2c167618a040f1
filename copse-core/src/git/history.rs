//! Commit history retrieval and log parsing
//!
//! Raw log lines use the fixed pretty format `%h|%P|%an|%ad|%s`: hash,
//! space-separated parent hashes, author, date, subject. Only the first four
//! pipes are separators; the subject may contain further pipes.

use std::path::Path;

use super::attribution::AttributionEngine;
use super::GitClient;
use crate::{Error, Result};

/// A single commit from the history, newest-first in the containing list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Short hash, unique within one history result
    pub hash: String,
    /// Parent hashes in log order; empty for a root commit
    pub parents: Vec<String>,
    pub author: String,
    /// Display-only date string, no arithmetic is ever performed on it
    pub date: String,
    pub subject: String,
    /// Branch the commit is attributed to; `None` means the main branch
    pub source_branch: Option<String>,
}

impl Commit {
    /// A merge commit has more than one parent
    pub fn is_merge_commit(&self) -> bool {
        self.parents.len() > 1
    }

    /// Render the commit for display
    ///
    /// Format: `<hash> - <date> - <author> [<branch>](merge): <subject>`,
    /// where the branch tag falls back to `[master]` for main-branch commits
    /// and `(merge)` appears only for merge commits.
    pub fn display(&self) -> String {
        let branch = self.source_branch.as_deref().unwrap_or("master");
        let tag = if self.is_merge_commit() {
            format!("[{}] (merge)", branch)
        } else {
            format!("[{}]", branch)
        };
        format!(
            "{} - {} - {} {}: {}",
            self.hash, self.date, self.author, tag, self.subject
        )
    }
}

/// Parse raw `git log` output into commits
///
/// Malformed lines (fewer than four pipe separators) are skipped rather than
/// treated as fatal. Empty input yields an empty list. Leading graph
/// decoration characters are stripped so `--graph`-style output still parses.
pub fn parse_log(raw: &str) -> Vec<Commit> {
    let mut commits = Vec::new();

    for line in raw.lines() {
        let mut rest = line;
        while let Some(first) = rest.chars().next() {
            if matches!(first, '*' | '|' | '\\' | '/' | '-' | ' ') {
                rest = &rest[first.len_utf8()..];
            } else {
                break;
            }
        }
        let rest = rest.trim();
        if rest.is_empty() {
            continue;
        }

        let parts: Vec<&str> = rest.splitn(5, '|').collect();
        if parts.len() < 5 {
            continue;
        }

        let parents: Vec<String> = parts[1]
            .split_whitespace()
            .map(|p| p.to_string())
            .collect();

        commits.push(Commit {
            hash: parts[0].trim().to_string(),
            parents,
            author: parts[2].trim().to_string(),
            date: parts[3].trim().to_string(),
            subject: parts[4].trim().to_string(),
            source_branch: None,
        });
    }

    commits
}

impl GitClient {
    /// Get the commit history of the repository at `path`, newest first,
    /// with source branches attributed
    ///
    /// `limit` caps the number of commits; `None` returns the full history.
    pub async fn commit_history(
        &self,
        path: &Path,
        limit: Option<usize>,
    ) -> Result<Vec<Commit>> {
        if let Some(0) = limit {
            return Err(Error::Config("Commit limit must be positive".to_string()));
        }

        self.ensure_repository(path).await?;

        let mut args = vec![
            "log".to_string(),
            "--oneline".to_string(),
            "--pretty=format:%h|%P|%an|%ad|%s".to_string(),
            "--date=short".to_string(),
            "--all".to_string(),
        ];
        if let Some(n) = limit {
            args.push(format!("-{}", n));
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        let out = self.runner().run(path, &arg_refs).await?;
        if !out.success() {
            return Err(Error::Other(format!(
                "Error getting git log: {}",
                out.stderr.trim()
            )));
        }

        let mut commits = parse_log(&out.stdout);

        // Attribution failures degrade per commit and never fail the fetch.
        AttributionEngine::new(self.runner(), path)
            .attribute(&mut commits)
            .await;

        Ok(commits)
    }
}
