//! Copse Core - Core library for coordinating git state across several
//! working-tree copies of the same project
//!
//! This crate provides commit history retrieval with branch attribution,
//! repository inspection, and safe multi-copy checkout orchestration, all
//! driven through the porcelain git binary.

pub mod config;
pub mod error;
pub mod exec;
pub mod git;

pub use config::{Config, GitConfig, GroupConfig};
pub use error::{Error, Result};
pub use exec::{GitOutput, GitRunner};
pub use git::{
    has_local_changes, parse_log, BatchStatus, CheckoutOutcome, CheckoutSummary, Commit,
    ConflictDecider, Decision, GitClient, MultiRepoSync, RepoAction, RepoCopy, RepoOutcome,
    RepositoryInfo,
};
