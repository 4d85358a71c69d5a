//! Galena CLI - retrieval-augmented question answering over regulation PDFs

use anyhow::Result;
use clap::Parser as _;
use cli::{Cli, Commands};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, fmt, registry};

mod cli;
mod handlers;

#[tokio::main]
async fn main() -> Result<()> {
    registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "galena=info".into()))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { file } => handlers::handle_ingest(&file).await?,
        Commands::Ask { question, buffered } => handlers::handle_ask(&question, buffered).await?,
        Commands::Extract { file } => handlers::handle_extract(&file).await?,
        Commands::Status => handlers::handle_status().await?,
        Commands::Config => handlers::handle_config()?,
    }

    Ok(())
}
