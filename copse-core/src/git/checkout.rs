//! Checkout coordination for a single repository
//!
//! Checkout failures are classified from git's error text so callers can
//! branch on the outcome instead of parsing messages themselves.

use std::path::Path;

use super::GitClient;
use crate::{Error, Result};

/// Minimum accepted commit hash length
const MIN_HASH_LEN: usize = 6;

/// Error-text fragments that indicate uncommitted local changes
const LOCAL_CHANGE_INDICATORS: [&str; 3] = [
    "would be overwritten",
    "local changes",
    "uncommitted changes",
];

/// Result of one checkout attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The checkout succeeded
    Success(String),
    /// The target commit does not exist in this repository
    CommitNotFound(String),
    /// Uncommitted local changes block the checkout
    LocalChangesConflict(String),
    /// Any other failure, with git's raw error text
    OtherFailure(String),
}

impl CheckoutOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CheckoutOutcome::Success(_))
    }

    /// The message or raw error carried by this outcome
    pub fn message(&self) -> &str {
        match self {
            CheckoutOutcome::Success(m)
            | CheckoutOutcome::CommitNotFound(m)
            | CheckoutOutcome::LocalChangesConflict(m)
            | CheckoutOutcome::OtherFailure(m) => m,
        }
    }
}

/// Check whether git error text indicates local changes would be overwritten
///
/// Note: a literal "working tree clean" message is the opposite condition and
/// deliberately does not match.
pub fn has_local_changes(error_text: &str) -> bool {
    let lower = error_text.to_lowercase();
    LOCAL_CHANGE_INDICATORS
        .iter()
        .any(|indicator| lower.contains(indicator))
}

/// Classify a failed checkout from its error text
pub fn classify_checkout_failure(hash: &str, error_text: &str) -> CheckoutOutcome {
    let lower = error_text.to_lowercase();

    if lower.contains("pathspec") && lower.contains("did not match") {
        CheckoutOutcome::CommitNotFound(hash.to_string())
    } else if has_local_changes(error_text) {
        CheckoutOutcome::LocalChangesConflict(error_text.trim().to_string())
    } else {
        CheckoutOutcome::OtherFailure(error_text.trim().to_string())
    }
}

impl GitClient {
    fn validate_hash(commit_hash: &str) -> Result<()> {
        if commit_hash.len() < MIN_HASH_LEN {
            return Err(Error::Config(format!(
                "Commit hash must be at least {} characters: {:?}",
                MIN_HASH_LEN, commit_hash
            )));
        }
        Ok(())
    }

    /// Run one git step of a checkout sequence, folding subprocess timeouts
    /// into `OtherFailure` so the orchestrator can record them per repository.
    async fn checkout_step(
        &self,
        path: &Path,
        hash: &str,
        args: &[&str],
    ) -> Result<Option<CheckoutOutcome>> {
        match self.runner().run(path, args).await {
            Ok(out) if out.success() => Ok(None),
            Ok(out) => Ok(Some(classify_checkout_failure(hash, &out.stderr))),
            Err(e @ Error::SubprocessTimeout { .. }) => {
                Ok(Some(CheckoutOutcome::OtherFailure(e.to_string())))
            }
            Err(e) => Err(e),
        }
    }

    /// Checkout the repository at `path` to `commit_hash`
    ///
    /// Fails with an `Err` only for identity-level problems (not a
    /// repository, invalid hash); everything else is a [`CheckoutOutcome`].
    pub async fn checkout_commit(
        &self,
        path: &Path,
        commit_hash: &str,
    ) -> Result<CheckoutOutcome> {
        Self::validate_hash(commit_hash)?;
        self.ensure_repository(path).await?;

        match self
            .checkout_step(path, commit_hash, &["checkout", commit_hash])
            .await?
        {
            None => Ok(CheckoutOutcome::Success(format!(
                "Checked out commit {}",
                commit_hash
            ))),
            Some(outcome) => Ok(outcome),
        }
    }

    /// Force-checkout `commit_hash`, discarding uncommitted and untracked
    /// changes first
    ///
    /// Runs `reset --hard HEAD`, `clean -fd`, then `checkout --force` in
    /// strict sequence, stopping at the first failing step.
    pub async fn force_checkout_commit(
        &self,
        path: &Path,
        commit_hash: &str,
    ) -> Result<CheckoutOutcome> {
        Self::validate_hash(commit_hash)?;
        self.ensure_repository(path).await?;

        let steps: [&[&str]; 3] = [
            &["reset", "--hard", "HEAD"],
            &["clean", "-fd"],
            &["checkout", "--force", commit_hash],
        ];

        for args in steps {
            if let Some(outcome) = self.checkout_step(path, commit_hash, args).await? {
                tracing::warn!(
                    step = %args.join(" "),
                    "force checkout step failed: {}",
                    outcome.message()
                );
                return Ok(outcome);
            }
        }

        Ok(CheckoutOutcome::Success(format!(
            "Force checked out commit {} (local changes discarded)",
            commit_hash
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_changes_on_overwrite_error() {
        let text = "error: Your local changes to the following files would be \
                    overwritten by checkout";
        assert!(has_local_changes(text));
        assert!(matches!(
            classify_checkout_failure("abc123", text),
            CheckoutOutcome::LocalChangesConflict(_)
        ));
    }

    #[test]
    fn test_untracked_overwrite_variant() {
        let text = "error: The following untracked working tree files would be \
                    overwritten by checkout";
        assert!(has_local_changes(text));
    }

    #[test]
    fn test_uncommitted_changes_wording() {
        assert!(has_local_changes(
            "Please commit your changes or stash them: uncommitted changes in \
             your working directory"
        ));
    }

    #[test]
    fn test_clean_tree_message_is_not_a_conflict() {
        assert!(!has_local_changes("nothing to commit, working tree clean"));
    }

    #[test]
    fn test_not_a_repository_is_other_failure() {
        let text = "fatal: not a git repository";
        assert!(!has_local_changes(text));
        assert!(matches!(
            classify_checkout_failure("abc123", text),
            CheckoutOutcome::OtherFailure(_)
        ));
    }

    #[test]
    fn test_unknown_commit_classification() {
        let text = "error: pathspec 'abc123' did not match any file(s) known to git";
        let outcome = classify_checkout_failure("abc123", text);
        assert_eq!(outcome, CheckoutOutcome::CommitNotFound("abc123".to_string()));
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        let text = "error: Pathspec 'abc123' DID NOT MATCH any file(s)";
        assert!(matches!(
            classify_checkout_failure("abc123", text),
            CheckoutOutcome::CommitNotFound(_)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_checkout_timeout_surfaces_as_other_failure() {
        use std::os::unix::fs::PermissionsExt;

        use crate::exec::GitRunner;

        // Stand-in git binary: instant for the repository check, hangs on
        // checkout so the runner's timeout fires mid-sequence.
        let temp = tempfile::TempDir::new().unwrap();
        let stub = temp.path().join("slow-git");
        std::fs::write(
            &stub,
            "#!/bin/sh\nif [ \"$1\" = \"checkout\" ]; then sleep 5; fi\nexit 0\n",
        )
        .unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

        let runner = GitRunner::new()
            .with_program(stub.to_str().unwrap())
            .with_timeout(std::time::Duration::from_millis(50));
        let client = GitClient::with_runner(runner);

        let outcome = client
            .checkout_commit(temp.path(), "abc1234")
            .await
            .unwrap();

        match outcome {
            CheckoutOutcome::OtherFailure(message) => {
                assert!(message.contains("timed out"), "unexpected message: {}", message);
            }
            other => panic!("expected OtherFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_short_hash_is_rejected() {
        let client = GitClient::new();
        let err = client
            .checkout_commit(std::path::Path::new("."), "abc")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
