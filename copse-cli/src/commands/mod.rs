//! CLI command implementations

pub mod checkout;
pub mod checkout_all;
pub mod fetch;
pub mod history;
pub mod info;

pub use checkout::CheckoutArgs;
pub use checkout_all::CheckoutAllArgs;
pub use fetch::FetchArgs;
pub use history::HistoryArgs;
pub use info::InfoArgs;

use copse_core::{Config, GitClient, GitRunner};
use std::time::Duration;

/// Build a git client from the loaded configuration
pub fn client_from_config(config: &Config) -> GitClient {
    let runner = GitRunner::new()
        .with_program(config.git.binary.clone())
        .with_timeout(Duration::from_secs(config.git.timeout_secs));
    GitClient::with_runner(runner)
}

/// Print the loaded configuration and a git availability probe
pub async fn show_config(config: &Config) {
    println!("Copse Configuration");
    println!("===================");
    println!();
    println!("Git Settings:");
    println!("  binary: {}", config.git.binary);
    println!("  timeout_secs: {}", config.git.timeout_secs);
    println!(
        "  history_limit: {}",
        config
            .git
            .history_limit
            .map(|n| n.to_string())
            .unwrap_or_else(|| "(all commits)".to_string())
    );
    println!();

    match client_from_config(config).git_version().await {
        Ok(version) => println!("Git: {}", version),
        Err(e) => println!("Git: unavailable ({})", e),
    }
    println!();

    if config.groups.is_empty() {
        println!("No repo groups configured.");
    } else {
        println!("Repo Groups:");
        for group in &config.groups {
            println!("  {} ({} copies)", group.name, group.copies.len());
            for copy in &group.copies {
                println!("    {}", copy.display());
            }
        }
    }
    println!();

    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
