//! Replay command: slide the evaluation window over a CSV file.
//!
//! Every emission is printed as the alert that would have been sent. No
//! fills or P&L are simulated.

use anyhow::{bail, Context, Result};
use signal_config::load_config;
use signal_core::types::SeriesKey;
use signal_engine::{format_signal, EngineConfig, PolicyRegistry, SignalEngine};
use std::path::Path;
use tracing::{debug, info};

use crate::cli::ReplayArgs;

const DEFAULT_WINDOW: usize = 300;

pub async fn run(args: ReplayArgs, config_path: &Path) -> Result<()> {
    if !args.data.exists() {
        bail!(
            "Data path '{}' does not exist. Provide a CSV file with --data (e.g. --data ./data/BTCUSDT_1h.csv)",
            args.data.display()
        );
    }

    let key = SeriesKey::new(args.instrument.clone(), args.timeframe);
    let (mut engine_config, window) = resolve(&args, &key, config_path)?;
    engine_config.incremental = true;

    let candles = signal_data::load_csv(&args.data)
        .with_context(|| format!("Failed to load {}", args.data.display()))?;
    info!(
        key = %key,
        candles = candles.len(),
        window,
        policy = %engine_config.policy.name,
        "Starting replay"
    );
    if candles.len() < engine_config.min_candles() {
        bail!(
            "{} candles is not enough for policy {} (needs {})",
            candles.len(),
            engine_config.policy.name,
            engine_config.min_candles()
        );
    }

    let engine = SignalEngine::new([(key.clone(), engine_config)])?;
    let mut emitted = 0usize;
    let mut skipped = 0usize;

    for end in 1..=candles.len() {
        let start = end.saturating_sub(window);
        let evaluation = engine.evaluate(&key, &candles[start..end])?;
        if evaluation.is_skipped() {
            skipped += 1;
            continue;
        }
        let Some(signal) = evaluation.into_signal() else {
            continue;
        };

        emitted += 1;
        debug!(signal_id = %signal.id, side = %signal.side, "Replay emission");
        match args.output.as_str() {
            "json" => println!("{}", serde_json::to_string(&signal)?),
            _ => {
                let at = candles[end - 1]
                    .datetime()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| signal.candle_time.to_string());
                println!("── {} ──", at);
                println!("{}", format_signal(&signal));
                println!();
            }
        }
    }

    if args.output != "json" {
        println!(
            "{}: {} candles replayed, {} signals, {} windows skipped",
            key,
            candles.len(),
            emitted,
            skipped
        );
    }

    Ok(())
}

/// Engine config and window size from `--policy`, the config file, or defaults.
fn resolve(args: &ReplayArgs, key: &SeriesKey, config_path: &Path) -> Result<(EngineConfig, usize)> {
    let file = load_config(config_path).ok();
    let window = args
        .window
        .or_else(|| file.as_ref().map(|c| c.exchange.limit))
        .unwrap_or(DEFAULT_WINDOW);
    if window == 0 {
        bail!("Window must be greater than 0");
    }

    let engine_config = match (&args.policy, &file) {
        (Some(name), _) => PolicyRegistry::new().config(name)?,
        (None, Some(config)) => config.engine_config(key)?,
        (None, None) => EngineConfig::default(),
    };
    Ok((engine_config, window))
}
