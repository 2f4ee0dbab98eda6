use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use coinc_config::CoincConfig;
use coinc_runtime::lifecycle::{wait_for_signal, Reactor};
use coinc_runtime::tracing_init::init_tracing;

#[derive(Parser)]
#[command(name = "coinc-server", about = "Supernova coincidence server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the coincidence server.
    Run {
        /// Path to a coinc.toml config file.
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let config_path = config
                .canonicalize()
                .map_err(|e| anyhow::anyhow!("config path '{}': {e}", config.display()))?;
            let coinc_config = CoincConfig::load(&config_path)?;
            let base_dir = config_path
                .parent()
                .expect("config path must have a parent directory")
                .to_path_buf();

            let _log_guard = init_tracing(&coinc_config.logging, &base_dir)?;

            let engine = Reactor::start(coinc_config).await?;
            tracing::info!("coincidence server listening on {}", engine.listen_addr());

            wait_for_signal(engine.cancel_token()).await;
            engine.shutdown();
            engine.wait().await?;
        }
    }

    Ok(())
}
