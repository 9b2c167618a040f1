//! Fetch command - update one copy from its remotes

use std::path::PathBuf;

use clap::Args;
use copse_core::{Config, Error};

/// Fetch the latest commits for one working-tree copy
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Path to the working tree (defaults to the current directory)
    path: Option<PathBuf>,
}

impl FetchArgs {
    /// Execute the fetch command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let path = match &self.path {
            Some(p) => p.clone(),
            None => std::env::current_dir()?,
        };

        let client = super::client_from_config(config);
        match client.fetch_latest(&path).await {
            Ok(message) => {
                println!("{}", message);
                Ok(())
            }
            Err(Error::NoRemoteConfigured) => {
                // Informational, not a hard failure.
                println!("No remote configured for {}", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
