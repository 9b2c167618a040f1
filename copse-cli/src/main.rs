//! Copse CLI - Command line interface for copse
//!
//! Keeps several working-tree copies of the same project on the same commit.

mod commands;

use clap::{Parser, Subcommand};
use copse_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CheckoutAllArgs, CheckoutArgs, FetchArgs, HistoryArgs, InfoArgs};

/// Copse: git state coordination for multiple working-tree copies
#[derive(Parser, Debug)]
#[command(name = "copse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to git executable (overrides config and env)
    #[arg(long, global = true, env = "COPSE_GIT_PATH")]
    git_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show repository information for one copy
    Info(InfoArgs),

    /// Show commit history with branch attribution
    #[command(visible_alias = "log")]
    History(HistoryArgs),

    /// Fetch latest commits for one copy
    Fetch(FetchArgs),

    /// Checkout one copy to a commit
    Checkout(CheckoutArgs),

    /// Checkout every copy in a group to the same commit
    #[command(visible_alias = "ca")]
    CheckoutAll(CheckoutAllArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.git_path.clone())?;

    if cli.verbose {
        tracing::info!(
            git_binary = %config.git.binary,
            groups = config.groups.len(),
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Info(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::History(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Fetch(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Checkout(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::CheckoutAll(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => {
            commands::show_config(&config).await;
        }
        None => {
            println!("Copse - git state coordination for multiple working-tree copies");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
