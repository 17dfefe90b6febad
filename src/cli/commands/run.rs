//! Poll loop command.

use anyhow::{Context, Result};
use signal_config::{load_config, AppConfig};
use signal_data::{BybitConfig, BybitSource};
use signal_engine::SignalEngine;
use signal_notify::{
    destinations_from_env, LogNotifier, NotifierSet, TelegramConfig, TelegramNotifier,
};
use signal_scanner::{Scanner, ScannerConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cli::RunArgs;

pub async fn run(args: RunArgs, config_path: &Path) -> Result<()> {
    let config = load_config(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    config.validate().context("Invalid configuration")?;

    info!(
        app = %config.app.name,
        environment = %config.app.environment,
        dry_run = args.dry_run,
        "Starting scanner"
    );

    let engine = SignalEngine::new(config.engine_configs()?).context("Failed to build engine")?;
    let source = BybitSource::new(bybit_config(&config)).context("Failed to create Bybit client")?;
    let notifiers = notifiers(&config, args.dry_run)?;
    info!(destinations = ?notifiers.names(), "Notifiers ready");

    let scanner = Scanner::new(
        Arc::new(engine),
        Arc::new(source),
        notifiers,
        config.tracked_keys(),
        scanner_config(&config),
    )
    .context("Failed to create scanner")?;

    if args.once {
        let result = scanner.run_tick(1).await;
        result.report.log();
        println!("{}", result.report);
    } else {
        let ticks = scanner.run().await;
        info!(ticks, "Scanner shut down");
    }

    Ok(())
}

fn bybit_config(config: &AppConfig) -> BybitConfig {
    BybitConfig {
        base_url: config.exchange.base_url.clone(),
        category: config.exchange.category.clone(),
        timeout: Duration::from_secs(config.exchange.timeout_secs),
        retries: config.exchange.retries,
        retry_delay: Duration::from_millis(config.exchange.retry_delay_ms),
    }
}

fn scanner_config(config: &AppConfig) -> ScannerConfig {
    ScannerConfig {
        poll_interval: Duration::from_secs(config.scanner.poll_interval_secs),
        pacing: Duration::from_millis(config.scanner.pacing_ms),
        concurrency: config.scanner.concurrency,
        candle_limit: config.exchange.limit,
    }
}

fn notifiers(config: &AppConfig, dry_run: bool) -> Result<NotifierSet> {
    if dry_run {
        return Ok(NotifierSet::new().with(LogNotifier::new()));
    }

    let telegram = &config.telegram;
    let destinations = destinations_from_env(&telegram.bot_tokens_env, &telegram.chat_ids_env)
        .context("Telegram destinations unavailable, use --dry-run to log alerts instead")?;
    let notifiers = TelegramNotifier::for_destinations(
        destinations,
        TelegramConfig {
            api_url: telegram.api_url.clone(),
            parse_mode: telegram.parse_mode.clone(),
            timeout: Duration::from_secs(telegram.timeout_secs),
        },
    )?;
    Ok(notifiers.into_iter().collect())
}
