//! Checkout-all command - put every copy in a group on the same commit
//!
//! Copies are processed one at a time. When one has uncommitted local
//! changes, the user is prompted to force, skip, or cancel the rest of the
//! run.

use std::path::PathBuf;

use async_trait::async_trait;
use clap::Args;
use copse_core::{
    BatchStatus, CheckoutSummary, Config, ConflictDecider, Decision, MultiRepoSync, RepoAction,
    RepoCopy,
};

/// Checkout every copy in a group to the same commit
#[derive(Args, Debug)]
pub struct CheckoutAllArgs {
    /// Target commit hash
    commit: String,

    /// Name of a configured repo group
    #[arg(short, long, conflicts_with = "paths")]
    group: Option<String>,

    /// Explicit working-tree paths, in processing order
    #[arg(short, long, num_args = 1..)]
    paths: Vec<PathBuf>,

    /// Answer every local-changes conflict without prompting
    #[arg(long, value_parser = parse_decision)]
    on_conflict: Option<Decision>,
}

fn parse_decision(s: &str) -> Result<Decision, String> {
    match s {
        "force" => Ok(Decision::Force),
        "skip" => Ok(Decision::Skip),
        "cancel" => Ok(Decision::CancelAll),
        other => Err(format!(
            "invalid conflict policy {:?} (expected force, skip, or cancel)",
            other
        )),
    }
}

impl CheckoutAllArgs {
    /// Execute the checkout-all command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let repos = self.resolve_copies(config)?;
        if repos.is_empty() {
            anyhow::bail!("No copies to process; pass --group or --paths");
        }

        println!("Target commit: {}", self.commit);
        println!("Copies to checkout: {}", repos.len());
        println!();

        let client = super::client_from_config(config);
        let sync = MultiRepoSync::new(&client);

        let summary = match self.on_conflict {
            Some(decision) => {
                sync.run(&repos, &self.commit, &FixedPolicy(decision)).await
            }
            None => sync.run(&repos, &self.commit, &TerminalPrompt).await,
        };

        print_summary(&summary);

        match summary.status() {
            BatchStatus::Success => Ok(()),
            BatchStatus::Partial => {
                anyhow::bail!("Completed partially; see summary above")
            }
            BatchStatus::Failed => anyhow::bail!("No copy was checked out"),
        }
    }

    fn resolve_copies(&self, config: &Config) -> anyhow::Result<Vec<RepoCopy>> {
        if let Some(name) = &self.group {
            let group = config
                .group(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown repo group: {}", name))?;
            return Ok(group
                .copies
                .iter()
                .map(|path| RepoCopy::new(label_for(path), path.clone()))
                .collect());
        }

        Ok(self
            .paths
            .iter()
            .map(|path| RepoCopy::new(label_for(path), path.clone()))
            .collect())
    }
}

/// Label a copy as "parent/name" so prompts identify it unambiguously
fn label_for(path: &std::path::Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match path.parent().and_then(|p| p.file_name()) {
        Some(parent) => format!("{}/{}", parent.to_string_lossy(), name),
        None => name,
    }
}

/// Non-interactive decider with a fixed answer
struct FixedPolicy(Decision);

#[async_trait]
impl ConflictDecider for FixedPolicy {
    async fn decide(&self, _repo: &RepoCopy, _conflict: &str) -> Decision {
        self.0
    }
}

/// Interactive decider backed by stdin
struct TerminalPrompt;

#[async_trait]
impl ConflictDecider for TerminalPrompt {
    async fn decide(&self, repo: &RepoCopy, conflict: &str) -> Decision {
        println!();
        println!("Local changes detected in {}:", repo.label);
        println!("{}", conflict.trim());
        println!();
        println!("  [f]orce  - discard changes and checkout this copy");
        println!("  [s]kip   - leave this copy untouched");
        println!("  [c]ancel - stop all remaining checkouts");

        loop {
            print!("force/skip/cancel> ");
            let line = match read_line().await {
                Ok(line) => line,
                // EOF on stdin means nobody can answer; the safe choice is
                // stopping the run rather than discarding anyone's changes.
                Err(_) => return Decision::CancelAll,
            };

            match line.trim().to_lowercase().as_str() {
                "f" | "force" => return Decision::Force,
                "s" | "skip" => return Decision::Skip,
                "c" | "cancel" => return Decision::CancelAll,
                other => println!("Unrecognized answer {:?}", other),
            }
        }
    }
}

/// Read one line from stdin without blocking the runtime
async fn read_line() -> anyhow::Result<String> {
    use std::io::Write;
    std::io::stdout().flush()?;

    let line = tokio::task::spawn_blocking(|| {
        let mut buf = String::new();
        let read = std::io::stdin().read_line(&mut buf)?;
        if read == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "stdin closed",
            ));
        }
        Ok(buf)
    })
    .await??;

    Ok(line)
}

fn print_summary(summary: &CheckoutSummary) {
    println!();
    println!("{}", "=".repeat(50));
    println!("CHECKOUT ALL SUMMARY");
    println!("Target commit: {}", summary.target_commit);
    println!("Copies processed: {}", summary.outcomes.len());
    println!("  succeeded: {}", summary.succeeded());
    println!("  skipped:   {}", summary.skipped());
    println!("  failed:    {}", summary.failed());
    if summary.cancelled {
        println!("  cancelled: {}", summary.cancelled_remainder());
    }
    println!();

    for outcome in &summary.outcomes {
        let marker = match outcome.action {
            RepoAction::Succeeded => "ok    ",
            RepoAction::Forced => "forced",
            RepoAction::Skipped => "skip  ",
            RepoAction::Failed => "FAIL  ",
            RepoAction::CancelledRemainder => "cancel",
        };
        println!("  [{}] {} - {}", marker, outcome.repo.label, outcome.detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decision_values() {
        assert_eq!(parse_decision("force").unwrap(), Decision::Force);
        assert_eq!(parse_decision("skip").unwrap(), Decision::Skip);
        assert_eq!(parse_decision("cancel").unwrap(), Decision::CancelAll);
        assert!(parse_decision("abort").is_err());
    }

    #[test]
    fn test_label_includes_parent() {
        let label = label_for(std::path::Path::new("/work/pre-edit/myproject"));
        assert_eq!(label, "pre-edit/myproject");
    }
}
