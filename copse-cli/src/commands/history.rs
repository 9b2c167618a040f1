//! History command - commit log with branch attribution

use std::path::PathBuf;

use clap::Args;
use copse_core::Config;

/// Show commit history with source-branch attribution
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Path to the working tree (defaults to the current directory)
    path: Option<PathBuf>,

    /// Maximum number of commits to show
    #[arg(short, long)]
    limit: Option<usize>,
}

impl HistoryArgs {
    /// Execute the history command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let path = match &self.path {
            Some(p) => p.clone(),
            None => std::env::current_dir()?,
        };
        let limit = self.limit.or(config.git.history_limit);

        let client = super::client_from_config(config);
        let commits = client.commit_history(&path, limit).await?;

        if commits.is_empty() {
            println!("No commits found.");
            return Ok(());
        }

        for commit in &commits {
            println!("{}", commit.display());
        }

        println!();
        match limit {
            Some(n) => println!("{} commit(s) (limited to {})", commits.len(), n),
            None => println!("{} commit(s)", commits.len()),
        }

        Ok(())
    }
}
