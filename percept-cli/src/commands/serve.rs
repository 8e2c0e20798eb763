//! Serve command for running the survey server
//!
//! Loads the dataset catalog and exposure ledger, then serves the
//! participant page flow until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use percept_server::{AppState, PerceptServer, ServerConfig};
use tracing::info;

use crate::config::{ConfigLoader, PerceptConfig};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Dataset root directory (overrides config)
    #[arg(short, long)]
    pub dataset: Option<PathBuf>,

    /// Items shown per category (overrides config)
    #[arg(long)]
    pub items_per_category: Option<usize>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = apply_overrides(ConfigLoader::load()?, &args);
    let server_config = ServerConfig::new(config.server.host, config.server.port);

    info!("Loading dataset from {}", config.quiz.dataset_root.display());
    let state = AppState::load(config.quiz)
        .await
        .context("Failed to load survey state")?;

    println!(
        "Serving {} items across {} categories on http://{}",
        state.catalog.len(),
        state.catalog.categories().len(),
        server_config.addr()
    );

    let server = PerceptServer::new(server_config, Arc::new(state));
    server.run().await.map_err(Into::into)
}

/// CLI flags take precedence over both config layers
fn apply_overrides(mut config: PerceptConfig, args: &ServeArgs) -> PerceptConfig {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(dataset) = &args.dataset {
        config.quiz.dataset_root = dataset.clone();
    }
    if let Some(k) = args.items_per_category {
        config.quiz.items_per_category = k;
    }
    config
}
