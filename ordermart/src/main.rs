// ordermart/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug ordermart run ... pour voir les détails
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { project_dir } => commands::run::execute(project_dir).await,
        Commands::Validate { project_dir } => commands::validate::execute(project_dir).await,
        Commands::Clean { project_dir } => commands::clean::execute(project_dir),
        Commands::Inspect { path, limit } => commands::inspect::execute(path, limit).await,
    }
}
