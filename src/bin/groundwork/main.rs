mod commands;
mod manifest;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use manifest::Manifest;

#[derive(Parser)]
#[command(name = "groundwork")]
#[command(version)]
#[command(about = "Versioned migration runner for Redis-backed stores")]
#[command(
    long_about = "Applies each module's declared migration history exactly once, \
tracking progress in a per-module marker so repeated runs are safe. Modules, \
versions, and steps are declared in a TOML manifest; migration resources \
(scripts, change-logs, task specs) live in the manifest's resource directory."
)]
struct Cli {
    /// Redis connection URL
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1/", global = true)]
    redis_url: String,

    /// Path to the migration manifest
    #[arg(long, default_value = "groundwork.toml", global = true)]
    manifest: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending versions of every declared module
    Deploy,
    /// Show declared modules, recorded markers, and pending counts
    Status,
    /// Manually record a declared version as applied
    Resolve {
        /// Module id from the manifest
        module: String,
        /// Declared version id to record
        version: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let manifest = Manifest::load(&cli.manifest)?;

    match cli.command {
        Commands::Deploy => commands::deploy(&cli.redis_url, &manifest).await,
        Commands::Status => commands::status(&cli.redis_url, &manifest).await,
        Commands::Resolve { module, version } => {
            commands::resolve(&cli.redis_url, &manifest, &module, &version).await
        }
    }
}
