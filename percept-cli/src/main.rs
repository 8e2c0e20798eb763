use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "percept", about = "Perception survey server and dataset tools")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or prune the dataset
    Catalog(commands::catalog::CatalogArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Show item exposure counts
    Ledger(commands::ledger::LedgerArgs),
    /// Summarize completed sessions
    Results(commands::results::ResultsArgs),
    /// Run the survey server
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Ledger(args) => commands::ledger::run(args).await,
        Commands::Results(args) => commands::results::run(args).await,
        Commands::Serve(args) => commands::serve::run(args).await,
    }
}
