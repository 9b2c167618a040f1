//! Branch attribution for commits
//!
//! Reconstructs per-commit branch provenance from raw history data instead of
//! trusting live branch refs, which may have been deleted or never merged.
//! The primary branch's first-parent chain (the "spine") is computed once;
//! commits outside it are attributed via containment and name-resolution
//! queries. Every failure here degrades to main-branch labeling; attribution
//! must never fail a history fetch.

use std::collections::HashSet;
use std::path::Path;

use super::history::Commit;
use crate::exec::GitRunner;

/// Primary branch candidates, remote-tracking refs preferred
const MAIN_BRANCH_REFS: [&str; 4] = ["origin/master", "origin/main", "master", "main"];

/// Git reference prefixes stripped from resolved branch names, repeatedly,
/// until none match
const REF_PREFIXES: [&str; 6] = [
    "refs/heads/",
    "refs/remotes/origin/",
    "refs/remotes/",
    "remotes/origin/",
    "origin/",
    "heads/",
];

/// Labels that mean "the main branch" and therefore never become a
/// source-branch tag
fn is_main_label(name: &str) -> bool {
    name.is_empty() || name == "master" || name == "main" || name.starts_with("HEAD")
}

/// Normalize a branch name from containment or name-rev output
///
/// Strips git-internal reference prefixes and any trailing revision suffix
/// (`~N`, `^N`). Slashes that remain after prefix stripping (e.g.
/// `feature/user-auth`) are part of the branch name and are preserved.
/// Returns an empty string for names that only identify HEAD.
pub(crate) fn clean_branch_name(raw: &str) -> String {
    let mut name = raw.trim();

    'strip: loop {
        for prefix in REF_PREFIXES {
            if let Some(rest) = name.strip_prefix(prefix) {
                name = rest;
                continue 'strip;
            }
        }
        break;
    }

    let mut cleaned = name;
    if let Some(idx) = cleaned.find('~') {
        cleaned = &cleaned[..idx];
    }
    if let Some(idx) = cleaned.find('^') {
        cleaned = &cleaned[..idx];
    }

    let cleaned = cleaned.trim();
    if cleaned.starts_with("HEAD") {
        String::new()
    } else {
        cleaned.to_string()
    }
}

/// Fills in `source_branch` for a list of commits from one repository
pub(crate) struct AttributionEngine<'a> {
    runner: &'a GitRunner,
    path: &'a Path,
}

impl<'a> AttributionEngine<'a> {
    pub(crate) fn new(runner: &'a GitRunner, path: &'a Path) -> Self {
        Self { runner, path }
    }

    /// Attribute a source branch to every commit outside the main-branch
    /// spine; spine commits keep `source_branch = None`
    pub(crate) async fn attribute(&self, commits: &mut [Commit]) {
        let spine = self.main_branch_commits().await;

        for commit in commits.iter_mut() {
            if spine.contains(&commit.hash) {
                continue;
            }
            commit.source_branch = self.resolve_source_branch(&commit.hash).await;
        }
    }

    /// Hashes reachable by first-parent traversal from the primary branch tip
    ///
    /// Tries remote-tracking refs before local ones; falls back to HEAD when
    /// no primary branch resolves, and to an empty set when even that fails
    /// (every commit then goes through the per-commit queries).
    async fn main_branch_commits(&self) -> HashSet<String> {
        for branch_ref in MAIN_BRANCH_REFS {
            let verify = format!("{}^{{commit}}", branch_ref);
            match self
                .runner
                .query(self.path, &["rev-parse", "--verify", &verify])
                .await
            {
                Ok(out) if out.success() => {
                    if let Some(spine) = self.first_parent_set(branch_ref).await {
                        tracing::debug!(
                            branch = branch_ref,
                            commits = spine.len(),
                            "resolved main branch spine"
                        );
                        return spine;
                    }
                }
                Ok(_) => continue,
                Err(e) => {
                    tracing::debug!("rev-parse --verify {} failed: {}", branch_ref, e);
                    continue;
                }
            }
        }

        tracing::warn!("no main branch reference found, falling back to HEAD");
        self.first_parent_set("HEAD").await.unwrap_or_default()
    }

    async fn first_parent_set(&self, tip: &str) -> Option<HashSet<String>> {
        let out = self
            .runner
            .query(
                self.path,
                &["rev-list", "--first-parent", "--pretty=format:%h", tip],
            )
            .await
            .ok()?;

        if !out.success() {
            return None;
        }

        // rev-list with a pretty format interleaves "commit <full-hash>"
        // header lines with the formatted short hashes.
        let set: HashSet<String> = out
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("commit"))
            .map(|l| l.to_string())
            .collect();

        Some(set)
    }

    /// Resolve the source branch of a single off-spine commit
    ///
    /// Containment comes first; when it yields only main-branch names, the
    /// name-rev fallback names the single containing branch most
    /// specifically. `None` means the commit is displayed as main-branch.
    async fn resolve_source_branch(&self, hash: &str) -> Option<String> {
        if let Some(branch) = self.branch_from_containment(hash).await {
            return Some(branch);
        }
        self.branch_from_name_rev(hash).await
    }

    async fn branch_from_containment(&self, hash: &str) -> Option<String> {
        let out = match self
            .runner
            .query(self.path, &["branch", "--contains", hash, "--all"])
            .await
        {
            Ok(out) if out.success() => out,
            Ok(_) => return None,
            Err(e) => {
                tracing::debug!("branch --contains failed for {}: {}", hash, e);
                return None;
            }
        };

        for line in out.stdout.lines() {
            let line = line.trim();
            // The current branch is marked "* name"; attribution wants the
            // originating branch, not wherever HEAD happens to be.
            if line.is_empty() || line.starts_with('*') {
                continue;
            }
            let cleaned = clean_branch_name(line);
            if !is_main_label(&cleaned) {
                return Some(cleaned);
            }
        }

        None
    }

    async fn branch_from_name_rev(&self, hash: &str) -> Option<String> {
        let out = match self
            .runner
            .query(self.path, &["name-rev", "--name-only", hash])
            .await
        {
            Ok(out) if out.success() => out,
            Ok(_) => return None,
            Err(e) => {
                tracing::debug!("name-rev failed for {}: {}", hash, e);
                return None;
            }
        };

        let name = out.stdout.trim();
        if name.is_empty() || name == "undefined" {
            return None;
        }

        let cleaned = clean_branch_name(name);
        if is_main_label(&cleaned) {
            None
        } else {
            Some(cleaned)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_refs_heads() {
        assert_eq!(clean_branch_name("refs/heads/feature-x"), "feature-x");
    }

    #[test]
    fn test_clean_strips_remote_tracking_prefixes() {
        assert_eq!(clean_branch_name("refs/remotes/origin/dev"), "dev");
        assert_eq!(clean_branch_name("remotes/origin/dev"), "dev");
        assert_eq!(clean_branch_name("origin/dev"), "dev");
    }

    #[test]
    fn test_clean_preserves_branch_slashes() {
        assert_eq!(
            clean_branch_name("refs/heads/feature/user-auth"),
            "feature/user-auth"
        );
        assert_eq!(clean_branch_name("origin/feature/user-auth"), "feature/user-auth");
    }

    #[test]
    fn test_clean_strips_revision_suffixes() {
        assert_eq!(clean_branch_name("feature-x~1"), "feature-x");
        assert_eq!(clean_branch_name("origin/dev~3"), "dev");
        assert_eq!(clean_branch_name("feature-x^2"), "feature-x");
    }

    #[test]
    fn test_clean_discards_head_names() {
        assert_eq!(clean_branch_name("HEAD"), "");
        assert_eq!(clean_branch_name("HEAD~2"), "");
    }

    #[test]
    fn test_clean_handles_whitespace() {
        assert_eq!(clean_branch_name("  feature-x  "), "feature-x");
        assert_eq!(clean_branch_name(""), "");
    }

    #[test]
    fn test_main_labels() {
        assert!(is_main_label("master"));
        assert!(is_main_label("main"));
        assert!(is_main_label(""));
        assert!(is_main_label("HEAD detached at abc123"));
        assert!(!is_main_label("feature-x"));
    }

    #[test]
    fn test_cleaned_names_never_keep_internal_prefixes() {
        for raw in [
            "refs/heads/a",
            "refs/remotes/origin/a",
            "remotes/origin/a",
            "heads/a",
            "origin/a",
        ] {
            let cleaned = clean_branch_name(raw);
            assert!(!cleaned.contains("refs/"), "{} -> {}", raw, cleaned);
            assert!(!cleaned.contains("remotes/"), "{} -> {}", raw, cleaned);
            assert!(!cleaned.contains("heads/"), "{} -> {}", raw, cleaned);
        }
    }
}
