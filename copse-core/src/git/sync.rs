//! Multi-copy checkout synchronization
//!
//! Drives fetch + checkout across an ordered list of working-tree copies of
//! the same project, strictly one at a time. Partial success is a first-class
//! result: the summary records a per-copy outcome instead of collapsing the
//! batch to pass/fail. A local-changes conflict suspends the run and asks the
//! injected [`ConflictDecider`] whether to force, skip, or cancel everything.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::checkout::CheckoutOutcome;
use super::GitClient;
use crate::{Error, Result};

/// One working-tree copy participating in a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCopy {
    /// Human-readable label (e.g. "pre-edit/myproject")
    pub label: String,
    /// Path to the working tree
    pub path: PathBuf,
}

impl RepoCopy {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// Caller's decision when a copy has uncommitted local changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Discard the local changes and force the checkout
    Force,
    /// Leave this copy untouched and continue with the next one
    Skip,
    /// Stop the whole run; remaining copies are not attempted
    CancelAll,
}

/// Supplies the force/skip/cancel decision for a conflicting copy
///
/// Implemented by the surrounding application (a UI dialog, a terminal
/// prompt, or a fixed policy in tests).
#[async_trait]
pub trait ConflictDecider: Send + Sync {
    async fn decide(&self, repo: &RepoCopy, conflict: &str) -> Decision;
}

/// Git operations the sync run needs per copy
///
/// [`GitClient`] is the production implementation; tests substitute a
/// scripted one so the orchestration logic runs without a git binary.
#[async_trait]
pub trait CheckoutBackend: Send + Sync {
    async fn fetch_latest(&self, path: &Path) -> Result<String>;
    async fn checkout_commit(&self, path: &Path, commit_hash: &str) -> Result<CheckoutOutcome>;
    async fn force_checkout_commit(
        &self,
        path: &Path,
        commit_hash: &str,
    ) -> Result<CheckoutOutcome>;
}

#[async_trait]
impl CheckoutBackend for GitClient {
    async fn fetch_latest(&self, path: &Path) -> Result<String> {
        GitClient::fetch_latest(self, path).await
    }

    async fn checkout_commit(&self, path: &Path, commit_hash: &str) -> Result<CheckoutOutcome> {
        GitClient::checkout_commit(self, path, commit_hash).await
    }

    async fn force_checkout_commit(
        &self,
        path: &Path,
        commit_hash: &str,
    ) -> Result<CheckoutOutcome> {
        GitClient::force_checkout_commit(self, path, commit_hash).await
    }
}

/// What happened to one copy during a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoAction {
    /// Plain checkout succeeded
    Succeeded,
    /// Checkout succeeded after discarding local changes
    Forced,
    /// Left untouched (commit not found, or local changes preserved)
    Skipped,
    /// Checkout failed
    Failed,
    /// Never attempted because the run was cancelled earlier
    CancelledRemainder,
}

/// Per-copy result recorded in the summary
#[derive(Debug, Clone)]
pub struct RepoOutcome {
    pub repo: RepoCopy,
    pub action: RepoAction,
    /// Success message, skip reason, or raw error text
    pub detail: String,
}

/// Overall batch result, tri-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every copy was checked out (plain or forced)
    Success,
    /// Some copies succeeded, others were skipped, failed, or cancelled
    Partial,
    /// No copy was checked out
    Failed,
}

/// Frozen result of one sync run
#[derive(Debug, Clone)]
pub struct CheckoutSummary {
    /// Commit every copy was asked to check out
    pub target_commit: String,
    /// Per-copy outcomes in input order
    pub outcomes: Vec<RepoOutcome>,
    /// True when the run was stopped early by a cancel decision
    pub cancelled: bool,
}

impl CheckoutSummary {
    pub fn succeeded(&self) -> usize {
        self.count(|a| matches!(a, RepoAction::Succeeded | RepoAction::Forced))
    }

    pub fn skipped(&self) -> usize {
        self.count(|a| a == RepoAction::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(|a| a == RepoAction::Failed)
    }

    pub fn cancelled_remainder(&self) -> usize {
        self.count(|a| a == RepoAction::CancelledRemainder)
    }

    fn count(&self, pred: impl Fn(RepoAction) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o.action)).count()
    }

    /// Collapse the per-copy outcomes into a tri-state batch status
    pub fn status(&self) -> BatchStatus {
        let succeeded = self.succeeded();
        if succeeded == self.outcomes.len() && !self.outcomes.is_empty() {
            BatchStatus::Success
        } else if succeeded > 0 {
            BatchStatus::Partial
        } else {
            BatchStatus::Failed
        }
    }
}

/// Orchestrates a checkout across an ordered list of copies
#[derive(Debug)]
pub struct MultiRepoSync<'a, B: CheckoutBackend> {
    backend: &'a B,
}

impl<'a, B: CheckoutBackend> MultiRepoSync<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Check out `target_commit` in every copy, in order
    ///
    /// Copies are processed strictly sequentially; checkout is destructive
    /// and each prompt must be attributable to exactly one copy. A fatal
    /// error in one copy is recorded and the run continues; only the
    /// decider's `CancelAll` stops it early.
    pub async fn run(
        &self,
        repos: &[RepoCopy],
        target_commit: &str,
        decider: &dyn ConflictDecider,
    ) -> CheckoutSummary {
        let mut summary = CheckoutSummary {
            target_commit: target_commit.to_string(),
            outcomes: Vec::with_capacity(repos.len()),
            cancelled: false,
        };

        for (index, repo) in repos.iter().enumerate() {
            tracing::info!(repo = %repo.label, "processing copy");

            self.fetch_best_effort(repo).await;

            let outcome = match self.backend.checkout_commit(&repo.path, target_commit).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Identity-level failure of one copy never aborts the batch.
                    tracing::error!(repo = %repo.label, "checkout failed: {}", e);
                    summary.outcomes.push(RepoOutcome {
                        repo: repo.clone(),
                        action: RepoAction::Failed,
                        detail: e.to_string(),
                    });
                    continue;
                }
            };

            match outcome {
                CheckoutOutcome::Success(message) => {
                    summary.outcomes.push(RepoOutcome {
                        repo: repo.clone(),
                        action: RepoAction::Succeeded,
                        detail: message,
                    });
                }
                CheckoutOutcome::CommitNotFound(hash) => {
                    tracing::warn!(repo = %repo.label, "commit {} not found", hash);
                    summary.outcomes.push(RepoOutcome {
                        repo: repo.clone(),
                        action: RepoAction::Skipped,
                        detail: "commit not found".to_string(),
                    });
                }
                CheckoutOutcome::LocalChangesConflict(raw) => {
                    match decider.decide(repo, &raw).await {
                        Decision::Force => {
                            let outcome = self.force(repo, target_commit).await;
                            summary.outcomes.push(outcome);
                        }
                        Decision::Skip => {
                            summary.outcomes.push(RepoOutcome {
                                repo: repo.clone(),
                                action: RepoAction::Skipped,
                                detail: "local changes preserved".to_string(),
                            });
                        }
                        Decision::CancelAll => {
                            tracing::info!("checkout run cancelled by caller");
                            summary.cancelled = true;
                            summary.outcomes.push(RepoOutcome {
                                repo: repo.clone(),
                                action: RepoAction::CancelledRemainder,
                                detail: "cancelled at local-changes conflict".to_string(),
                            });
                            for remaining in &repos[index + 1..] {
                                summary.outcomes.push(RepoOutcome {
                                    repo: remaining.clone(),
                                    action: RepoAction::CancelledRemainder,
                                    detail: "not attempted".to_string(),
                                });
                            }
                            break;
                        }
                    }
                }
                CheckoutOutcome::OtherFailure(raw) => {
                    summary.outcomes.push(RepoOutcome {
                        repo: repo.clone(),
                        action: RepoAction::Failed,
                        detail: raw,
                    });
                }
            }
        }

        summary
    }

    /// Fetch so the copy knows about the target commit; failures never stop
    /// the checkout, which may still succeed against existing local refs.
    async fn fetch_best_effort(&self, repo: &RepoCopy) {
        match self.backend.fetch_latest(&repo.path).await {
            Ok(message) => tracing::debug!(repo = %repo.label, "{}", message),
            Err(Error::NoRemoteConfigured) => {
                tracing::info!(repo = %repo.label, "no remote configured, using local refs");
            }
            Err(e) => {
                tracing::warn!(repo = %repo.label, "fetch failed: {}, trying existing refs", e);
            }
        }
    }

    async fn force(&self, repo: &RepoCopy, target_commit: &str) -> RepoOutcome {
        match self
            .backend
            .force_checkout_commit(&repo.path, target_commit)
            .await
        {
            Ok(CheckoutOutcome::Success(message)) => RepoOutcome {
                repo: repo.clone(),
                action: RepoAction::Forced,
                detail: message,
            },
            Ok(outcome) => RepoOutcome {
                repo: repo.clone(),
                action: RepoAction::Failed,
                detail: format!("force checkout failed: {}", outcome.message()),
            },
            Err(e) => RepoOutcome {
                repo: repo.clone(),
                action: RepoAction::Failed,
                detail: format!("force checkout failed: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted backend: maps a copy's path to the outcome of each call.
    #[derive(Default)]
    struct ScriptedBackend {
        checkout: HashMap<PathBuf, CheckoutOutcome>,
        force: HashMap<PathBuf, CheckoutOutcome>,
        no_remote: bool,
        fetch_fails: bool,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CheckoutBackend for ScriptedBackend {
        async fn fetch_latest(&self, path: &Path) -> Result<String> {
            self.record(format!("fetch {}", path.display()));
            if self.no_remote {
                Err(Error::NoRemoteConfigured)
            } else if self.fetch_fails {
                Err(Error::Other("network unreachable".to_string()))
            } else {
                Ok("fetched".to_string())
            }
        }

        async fn checkout_commit(&self, path: &Path, _hash: &str) -> Result<CheckoutOutcome> {
            self.record(format!("checkout {}", path.display()));
            Ok(self
                .checkout
                .get(path)
                .cloned()
                .unwrap_or(CheckoutOutcome::Success("ok".to_string())))
        }

        async fn force_checkout_commit(&self, path: &Path, _hash: &str) -> Result<CheckoutOutcome> {
            self.record(format!("force {}", path.display()));
            Ok(self
                .force
                .get(path)
                .cloned()
                .unwrap_or(CheckoutOutcome::Success("forced".to_string())))
        }
    }

    struct FixedDecider(Decision);

    #[async_trait]
    impl ConflictDecider for FixedDecider {
        async fn decide(&self, _repo: &RepoCopy, _conflict: &str) -> Decision {
            self.0
        }
    }

    fn three_repos() -> Vec<RepoCopy> {
        vec![
            RepoCopy::new("pre-edit", "/r/pre-edit"),
            RepoCopy::new("post-edit", "/r/post-edit"),
            RepoCopy::new("correct-edit", "/r/correct-edit"),
        ]
    }

    fn conflict() -> CheckoutOutcome {
        CheckoutOutcome::LocalChangesConflict(
            "error: Your local changes would be overwritten by checkout".to_string(),
        )
    }

    #[tokio::test]
    async fn test_all_copies_succeed() {
        let backend = ScriptedBackend::default();
        let summary = MultiRepoSync::new(&backend)
            .run(&three_repos(), "abc1234", &FixedDecider(Decision::Skip))
            .await;

        assert_eq!(summary.succeeded(), 3);
        assert_eq!(summary.status(), BatchStatus::Success);
        assert!(!summary.cancelled);
    }

    #[tokio::test]
    async fn test_conflict_skip_still_attempts_remaining() {
        let mut backend = ScriptedBackend::default();
        backend
            .checkout
            .insert(PathBuf::from("/r/post-edit"), conflict());

        let summary = MultiRepoSync::new(&backend)
            .run(&three_repos(), "abc1234", &FixedDecider(Decision::Skip))
            .await;

        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.outcomes[1].action, RepoAction::Skipped);
        assert_eq!(summary.outcomes[1].detail, "local changes preserved");
        // Third copy was still attempted, in order.
        assert!(backend
            .calls()
            .contains(&"checkout /r/correct-edit".to_string()));
        assert_eq!(summary.status(), BatchStatus::Partial);
    }

    #[tokio::test]
    async fn test_conflict_force_records_forced() {
        let mut backend = ScriptedBackend::default();
        backend
            .checkout
            .insert(PathBuf::from("/r/post-edit"), conflict());

        let summary = MultiRepoSync::new(&backend)
            .run(&three_repos(), "abc1234", &FixedDecider(Decision::Force))
            .await;

        assert_eq!(summary.succeeded(), 3);
        assert_eq!(summary.outcomes[1].action, RepoAction::Forced);
        assert!(backend.calls().contains(&"force /r/post-edit".to_string()));
    }

    #[tokio::test]
    async fn test_failed_force_is_recorded_as_failed() {
        let mut backend = ScriptedBackend::default();
        backend
            .checkout
            .insert(PathBuf::from("/r/post-edit"), conflict());
        backend.force.insert(
            PathBuf::from("/r/post-edit"),
            CheckoutOutcome::OtherFailure("reset failed".to_string()),
        );

        let summary = MultiRepoSync::new(&backend)
            .run(&three_repos(), "abc1234", &FixedDecider(Decision::Force))
            .await;

        assert_eq!(summary.outcomes[1].action, RepoAction::Failed);
        assert!(summary.outcomes[1].detail.contains("reset failed"));
        assert_eq!(summary.succeeded(), 2);
    }

    #[tokio::test]
    async fn test_cancel_all_marks_remainder() {
        let mut backend = ScriptedBackend::default();
        backend
            .checkout
            .insert(PathBuf::from("/r/post-edit"), conflict());

        let summary = MultiRepoSync::new(&backend)
            .run(&three_repos(), "abc1234", &FixedDecider(Decision::CancelAll))
            .await;

        assert!(summary.cancelled);
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.cancelled_remainder(), 2);
        assert_eq!(summary.outcomes[2].detail, "not attempted");
        // The third copy was never touched.
        assert!(!backend
            .calls()
            .contains(&"checkout /r/correct-edit".to_string()));
    }

    #[tokio::test]
    async fn test_commit_not_found_skips_and_advances() {
        let mut backend = ScriptedBackend::default();
        backend.checkout.insert(
            PathBuf::from("/r/pre-edit"),
            CheckoutOutcome::CommitNotFound("abc1234".to_string()),
        );

        let summary = MultiRepoSync::new(&backend)
            .run(&three_repos(), "abc1234", &FixedDecider(Decision::Skip))
            .await;

        assert_eq!(summary.outcomes[0].action, RepoAction::Skipped);
        assert_eq!(summary.outcomes[0].detail, "commit not found");
        assert_eq!(summary.succeeded(), 2);
    }

    #[tokio::test]
    async fn test_other_failure_does_not_abort_batch() {
        let mut backend = ScriptedBackend::default();
        backend.checkout.insert(
            PathBuf::from("/r/pre-edit"),
            CheckoutOutcome::OtherFailure("fatal: index locked".to_string()),
        );

        let summary = MultiRepoSync::new(&backend)
            .run(&three_repos(), "abc1234", &FixedDecider(Decision::Skip))
            .await;

        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.status(), BatchStatus::Partial);
    }

    #[tokio::test]
    async fn test_fetch_failure_still_attempts_checkout() {
        let backend = ScriptedBackend {
            fetch_fails: true,
            ..Default::default()
        };

        let summary = MultiRepoSync::new(&backend)
            .run(&three_repos(), "abc1234", &FixedDecider(Decision::Skip))
            .await;

        assert_eq!(summary.succeeded(), 3);
    }

    #[tokio::test]
    async fn test_no_remote_is_non_fatal() {
        let backend = ScriptedBackend {
            no_remote: true,
            ..Default::default()
        };

        let summary = MultiRepoSync::new(&backend)
            .run(&three_repos(), "abc1234", &FixedDecider(Decision::Skip))
            .await;

        assert_eq!(summary.status(), BatchStatus::Success);
    }

    #[tokio::test]
    async fn test_empty_batch_is_failed_status() {
        let backend = ScriptedBackend::default();
        let summary = MultiRepoSync::new(&backend)
            .run(&[], "abc1234", &FixedDecider(Decision::Skip))
            .await;

        assert!(summary.outcomes.is_empty());
        assert_eq!(summary.status(), BatchStatus::Failed);
    }
}
