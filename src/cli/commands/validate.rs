//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use signal_config::load_config;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Exchange: {} ({})", config.exchange.base_url, config.exchange.category);
    println!("Candles per request: {}", config.exchange.limit);
    println!(
        "Poll interval: {}s, pacing {}ms, concurrency {}",
        config.scanner.poll_interval_secs, config.scanner.pacing_ms, config.scanner.concurrency
    );
    println!();

    let keys = config.engine_configs()?;
    println!("Tracked keys: {}", keys.len());
    for (key, engine) in &keys {
        println!(
            "  {:<16} {:<26} min {} candles",
            key.to_string(),
            engine.policy.name,
            engine.min_candles()
        );
    }

    Ok(())
}
