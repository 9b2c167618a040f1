//! Checkout command - move one copy to a commit

use std::path::PathBuf;

use clap::Args;
use copse_core::{CheckoutOutcome, Config};

/// Checkout one working-tree copy to a commit
#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// Path to the working tree
    path: PathBuf,

    /// Target commit hash
    commit: String,

    /// Discard uncommitted and untracked changes first
    #[arg(short, long)]
    force: bool,
}

impl CheckoutArgs {
    /// Execute the checkout command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = super::client_from_config(config);

        let outcome = if self.force {
            client.force_checkout_commit(&self.path, &self.commit).await?
        } else {
            client.checkout_commit(&self.path, &self.commit).await?
        };

        match outcome {
            CheckoutOutcome::Success(message) => {
                println!("{}", message);
                Ok(())
            }
            CheckoutOutcome::CommitNotFound(hash) => {
                anyhow::bail!("Commit {} not found in {}", hash, self.path.display())
            }
            CheckoutOutcome::LocalChangesConflict(raw) => {
                anyhow::bail!(
                    "Local changes would be overwritten (use --force to discard):\n{}",
                    raw
                )
            }
            CheckoutOutcome::OtherFailure(raw) => {
                anyhow::bail!("Checkout failed: {}", raw)
            }
        }
    }
}
