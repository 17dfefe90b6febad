//! Signal alerts CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use signal_config::{load_config, LoggingConfig};
use signal_monitor::setup_logging;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logging follows the config file when it loads; flags win
    let logging = load_config(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_else(|_| LoggingConfig::default());
    let level = cli
        .log_level
        .as_ref()
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| logging.level.clone());
    let _guard = setup_logging(
        &level,
        cli.json_logs || logging.is_json(),
        logging.file.as_deref().map(Path::new),
    );

    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, &cli.config).await,
        Commands::Replay(args) => cli::commands::replay::run(args, &cli.config).await,
        Commands::Policies => cli::commands::policies::run().await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
