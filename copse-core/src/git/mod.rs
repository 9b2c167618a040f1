//! Git operations for copse
//!
//! This module provides repository inspection, commit history retrieval with
//! branch attribution, checkout coordination, and multi-copy synchronization.
//! All of it is built on top of the porcelain git binary via
//! [`GitRunner`](crate::exec::GitRunner).

mod attribution;
mod checkout;
mod history;
mod inspect;
mod sync;

pub use checkout::{classify_checkout_failure, has_local_changes, CheckoutOutcome};
pub use history::{parse_log, Commit};
pub use inspect::RepositoryInfo;
pub use sync::{
    BatchStatus, CheckoutBackend, CheckoutSummary, ConflictDecider, Decision, MultiRepoSync,
    RepoAction, RepoCopy, RepoOutcome,
};

use crate::exec::GitRunner;

/// Facade over all per-repository git operations
///
/// One client can serve any number of repository paths; it holds no
/// per-repository state. Working-tree mutations against a single path must
/// not be issued concurrently by the caller.
#[derive(Debug, Clone, Default)]
pub struct GitClient {
    runner: GitRunner,
}

impl GitClient {
    /// Create a client using `git` from PATH with default timeouts
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client around a configured runner
    pub fn with_runner(runner: GitRunner) -> Self {
        Self { runner }
    }

    pub(crate) fn runner(&self) -> &GitRunner {
        &self.runner
    }
}
