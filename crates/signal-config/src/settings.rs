//! Configuration structures.

use serde::{Deserialize, Serialize};
use signal_core::error::SignalError;
use signal_core::types::{SeriesKey, Timeframe};
use signal_engine::{EngineConfig, PolicyRegistry};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub scanner: ScannerSettings,
    /// Engine configuration for keys without an override
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub overrides: Vec<KeyOverride>,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "signal-alerts".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Bybit market data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub category: String,
    /// Candles requested per key and tick
    pub limit: usize,
    pub timeout_secs: u64,
    /// Extra attempts after a transient failure
    pub retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bybit.com".to_string(),
            category: "spot".to_string(),
            limit: 300,
            timeout_secs: 10,
            retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

/// Telegram delivery settings.
///
/// Tokens and chat ids are read from the named environment variables as
/// comma-separated lists and paired by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_tokens_env: String,
    pub chat_ids_env: String,
    pub api_url: String,
    pub parse_mode: String,
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_tokens_env: "BOT_TOKENS".to_string(),
            chat_ids_env: "CHAT_IDS".to_string(),
            api_url: "https://api.telegram.org".to_string(),
            parse_mode: "Markdown".to_string(),
            timeout_secs: 10,
        }
    }
}

/// What to scan and how fast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    pub instruments: Vec<String>,
    pub timeframes: Vec<Timeframe>,
    pub poll_interval_secs: u64,
    /// Delay between the starts of consecutive key evaluations
    pub pacing_ms: u64,
    /// Keys evaluated at the same time
    pub concurrency: usize,
    /// Preset applied to keys without an override, replacing `[engine]`
    pub preset: Option<String>,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            instruments: [
                "BTCUSDT", "ETHUSDT", "SOLUSDT", "BNBUSDT", "UNIUSDT", "XRPUSDT", "LTCUSDT",
                "AAVEUSDT", "SUIUSDT", "ENAUSDT",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            timeframes: vec![
                Timeframe::Minute15,
                Timeframe::Minute30,
                Timeframe::Hour1,
                Timeframe::Hour2,
                Timeframe::Hour4,
                Timeframe::Daily,
            ],
            poll_interval_secs: 60,
            pacing_ms: 350,
            concurrency: 1,
            preset: None,
        }
    }
}

/// Engine configuration for one instrument, optionally one timeframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyOverride {
    pub instrument: String,
    /// All timeframes when absent
    #[serde(default)]
    pub timeframe: Option<Timeframe>,
    /// Preset name, used when `engine` is absent
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub engine: Option<EngineConfig>,
}

impl KeyOverride {
    fn matches(&self, key: &SeriesKey) -> bool {
        self.instrument == key.instrument && self.timeframe.map_or(true, |tf| tf == key.timeframe)
    }
}

fn config_error(message: impl Into<String>) -> SignalError {
    SignalError::Config(message.into())
}

impl AppConfig {
    /// Every (instrument, timeframe) pair, instrument-major.
    pub fn tracked_keys(&self) -> Vec<SeriesKey> {
        self.scanner
            .instruments
            .iter()
            .flat_map(|instrument| {
                self.scanner
                    .timeframes
                    .iter()
                    .map(move |&tf| SeriesKey::new(instrument.clone(), tf))
            })
            .collect()
    }

    /// Engine configuration for a key.
    ///
    /// A timeframe-specific override beats an instrument-wide one, which
    /// beats the scanner preset, which beats `[engine]`.
    pub fn engine_config(&self, key: &SeriesKey) -> Result<EngineConfig, SignalError> {
        let registry = PolicyRegistry::new();
        let preset = |name: &str| registry.config(name).map_err(SignalError::from);

        let specific = self
            .overrides
            .iter()
            .filter(|o| o.matches(key))
            .max_by_key(|o| o.timeframe.is_some());

        match specific {
            Some(KeyOverride {
                engine: Some(engine), ..
            }) => Ok(engine.clone()),
            Some(KeyOverride {
                preset: Some(name), ..
            }) => preset(name),
            Some(_) => Err(config_error(format!(
                "Override for {} sets neither preset nor engine",
                key
            ))),
            None => match &self.scanner.preset {
                Some(name) => preset(name),
                None => Ok(self.engine.clone()),
            },
        }
    }

    /// Engine configuration for every tracked key.
    pub fn engine_configs(&self) -> Result<Vec<(SeriesKey, EngineConfig)>, SignalError> {
        self.tracked_keys()
            .into_iter()
            .map(|key| {
                let config = self.engine_config(&key)?;
                Ok((key, config))
            })
            .collect()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), SignalError> {
        let scanner = &self.scanner;
        if scanner.instruments.is_empty() {
            return Err(config_error("At least one instrument is required"));
        }
        if scanner.instruments.iter().any(|s| s.trim().is_empty()) {
            return Err(config_error("Instrument names must not be empty"));
        }
        if scanner.timeframes.is_empty() {
            return Err(config_error("At least one timeframe is required"));
        }
        if scanner.concurrency == 0 {
            return Err(config_error("Scanner concurrency must be greater than 0"));
        }
        if scanner.poll_interval_secs == 0 {
            return Err(config_error("Poll interval must be greater than 0"));
        }

        if !["pretty", "json"].contains(&self.logging.format.to_ascii_lowercase().as_str()) {
            return Err(config_error(format!(
                "Unknown log format '{}', expected pretty or json",
                self.logging.format
            )));
        }

        let exchange = &self.exchange;
        if exchange.limit == 0 || exchange.limit > 1000 {
            return Err(config_error(format!(
                "Candle limit must be within [1, 1000], got {}",
                exchange.limit
            )));
        }
        if exchange.timeout_secs == 0 {
            return Err(config_error("Exchange timeout must be greater than 0"));
        }

        for o in &self.overrides {
            if !scanner.instruments.contains(&o.instrument) {
                return Err(config_error(format!(
                    "Override for untracked instrument {}",
                    o.instrument
                )));
            }
        }

        for (key, config) in self.engine_configs()? {
            config
                .validate()
                .map_err(|e| config_error(format!("{}: {}", key, e)))?;
            if config.min_candles() > exchange.limit {
                return Err(config_error(format!(
                    "{} needs {} candles but only {} are requested",
                    key,
                    config.min_candles(),
                    exchange.limit
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_engine::{PolicyKind, Trigger};

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tracked_keys().len(), 60);
    }

    #[test]
    fn test_tracked_keys_are_instrument_major() {
        let mut config = AppConfig::default();
        config.scanner.instruments = vec!["BTCUSDT".into(), "ETHUSDT".into()];
        config.scanner.timeframes = vec![Timeframe::Hour1, Timeframe::Hour4];

        let keys: Vec<String> = config.tracked_keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["BTCUSDT:1h", "BTCUSDT:4h", "ETHUSDT:1h", "ETHUSDT:4h"]);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.scanner.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.scanner.timeframes.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.engine.periods.ema_fast = 30;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_limit_must_cover_min_candles() {
        let mut config = AppConfig::default();
        config.exchange.limit = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_override_precedence() {
        let mut config = AppConfig::default();
        config.scanner.preset = Some("macd_crossover".into());
        config.overrides = vec![
            KeyOverride {
                instrument: "BTCUSDT".into(),
                timeframe: None,
                preset: Some("ema_adx".into()),
                engine: None,
            },
            KeyOverride {
                instrument: "BTCUSDT".into(),
                timeframe: Some(Timeframe::Hour4),
                preset: Some("macd_breakout".into()),
                engine: None,
            },
        ];

        let btc_4h = config
            .engine_config(&SeriesKey::new("BTCUSDT", Timeframe::Hour4))
            .unwrap();
        assert_eq!(btc_4h.policy.name, "macd_breakout");

        let btc_1h = config
            .engine_config(&SeriesKey::new("BTCUSDT", Timeframe::Hour1))
            .unwrap();
        assert_eq!(btc_1h.policy.min_adx, Some(25.0));

        let eth = config
            .engine_config(&SeriesKey::new("ETHUSDT", Timeframe::Hour1))
            .unwrap();
        assert_eq!(eth.policy.kind, PolicyKind::CrossoverOnly);
        assert_eq!(eth.policy.trigger, Trigger::Macd);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        let mut config = AppConfig::default();
        config.scanner.preset = Some("nope".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_override_for_untracked_instrument() {
        let mut config = AppConfig::default();
        config.overrides.push(KeyOverride {
            instrument: "BTCUSD".into(),
            timeframe: None,
            preset: Some("ema_adx".into()),
            engine: None,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [scanner]
            instruments = ["PEPEUSDT"]
            timeframes = ["5m", "15m"]
            concurrency = 4

            [engine.policy]
            name = "ema_bollinger_breakout"
            kind = "crossover_with_breakout"
            trigger = "ema_bollinger"

            [[overrides]]
            instrument = "PEPEUSDT"
            timeframe = "5m"

            [overrides.engine.policy]
            name = "ema_crossover"
            kind = "crossover_only"
            trigger = "ema_cross"
            "#,
        )
        .unwrap();

        assert_eq!(config.scanner.pacing_ms, 350);
        assert_eq!(config.exchange.limit, 300);
        assert_eq!(config.tracked_keys().len(), 2);

        let fast = config
            .engine_config(&SeriesKey::new("PEPEUSDT", Timeframe::Minute5))
            .unwrap();
        assert_eq!(fast.policy.kind, PolicyKind::CrossoverOnly);
        let slow = config
            .engine_config(&SeriesKey::new("PEPEUSDT", Timeframe::Minute15))
            .unwrap();
        assert_eq!(slow.policy.trigger, Trigger::EmaBollinger);
        assert!(config.validate().is_ok());
    }
}
