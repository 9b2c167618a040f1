//! Info command - show repository state for one copy

use std::path::PathBuf;

use clap::Args;
use copse_core::Config;

/// Show repository information for one working-tree copy
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the working tree (defaults to the current directory)
    path: Option<PathBuf>,
}

impl InfoArgs {
    /// Execute the info command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let path = match &self.path {
            Some(p) => p.clone(),
            None => std::env::current_dir()?,
        };

        let client = super::client_from_config(config);
        let info = client.repository_info(&path).await?;

        println!("Repository: {}", path.display());
        if info.current_branch.is_empty() {
            println!("  branch: (detached HEAD)");
        } else {
            println!("  branch: {}", info.current_branch);
        }
        println!("  commit: {}", info.current_commit);

        if info.has_remote {
            println!("  remotes: {}", info.remote_urls.join(", "));
        } else {
            println!("  remotes: (none)");
        }

        if info.is_clean {
            println!("  working tree: clean");
        } else {
            println!(
                "  working tree: {} uncommitted change(s)",
                info.uncommitted_changes
            );
        }

        Ok(())
    }
}
