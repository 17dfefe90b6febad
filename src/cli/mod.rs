//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use signal_core::types::Timeframe;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "signal-alerts")]
#[command(author, version, about = "Indicator crossover and range breakout alerts for crypto candles")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level, overrides the configured one
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll Bybit and send alerts
    Run(RunArgs),
    /// Replay a CSV file through a fresh engine
    Replay(ReplayArgs),
    /// List policy presets
    Policies,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Log alerts instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Run a single tick and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(clap::Args)]
pub struct ReplayArgs {
    /// Data file (CSV)
    #[arg(long)]
    pub data: PathBuf,

    /// Instrument the file holds
    #[arg(short, long)]
    pub instrument: String,

    /// Timeframe of the file's candles
    #[arg(short, long, default_value = "1h")]
    pub timeframe: Timeframe,

    /// Policy preset, replacing the configured engine
    #[arg(short, long)]
    pub policy: Option<String>,

    /// Candles per evaluation window, defaults to the exchange limit
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: String,
}
