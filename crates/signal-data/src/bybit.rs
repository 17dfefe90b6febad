//! Bybit v5 market kline client.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use reqwest::Client;
use serde::Deserialize;
use signal_core::error::DataError;
use signal_core::traits::CandleSource;
use signal_core::types::{Candle, Timeframe};
use tracing::{debug, warn};

/// Production REST endpoint
pub const BYBIT_BASE_URL: &str = "https://api.bybit.com";

/// Most candles one kline request returns.
pub const MAX_LIMIT: usize = 1000;

const RET_CODE_TIMEOUT: i64 = 10000;
const RET_CODE_RATE_LIMIT: i64 = 10006;

/// Connection settings for [`BybitSource`].
#[derive(Debug, Clone)]
pub struct BybitConfig {
    pub base_url: String,
    /// Market category, `spot` or `linear`
    pub category: String,
    pub timeout: Duration,
    /// Extra attempts after a transient failure
    pub retries: usize,
    pub retry_delay: Duration,
}

impl Default for BybitConfig {
    fn default() -> Self {
        Self {
            base_url: BYBIT_BASE_URL.to_string(),
            category: "spot".to_string(),
            timeout: Duration::from_secs(10),
            retries: 2,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KlineResponse {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    #[serde(default)]
    result: KlineResult,
}

#[derive(Debug, Default, Deserialize)]
struct KlineResult {
    /// `[start, open, high, low, close, volume, turnover]`, newest first
    #[serde(default)]
    list: Vec<Vec<String>>,
}

/// Kline interval parameter for a timeframe.
pub fn interval(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::Minute1 => "1",
        Timeframe::Minute5 => "5",
        Timeframe::Minute15 => "15",
        Timeframe::Minute30 => "30",
        Timeframe::Hour1 => "60",
        Timeframe::Hour2 => "120",
        Timeframe::Hour4 => "240",
        Timeframe::Hour6 => "360",
        Timeframe::Hour12 => "720",
        Timeframe::Daily => "D",
        Timeframe::Weekly => "W",
        Timeframe::Monthly => "M",
    }
}

fn parse_field<T: std::str::FromStr>(row: &[String], index: usize, name: &str) -> Result<T, DataError> {
    row.get(index)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| DataError::ParseError(format!("Invalid kline {}: {:?}", name, row)))
}

/// Convert kline rows to candles, oldest first with unique times.
fn parse_rows(rows: &[Vec<String>]) -> Result<Vec<Candle>, DataError> {
    let mut candles = rows
        .iter()
        .rev()
        .map(|row| {
            Ok(Candle::new(
                parse_field(row, 0, "start")?,
                parse_field(row, 1, "open")?,
                parse_field(row, 2, "high")?,
                parse_field(row, 3, "low")?,
                parse_field(row, 4, "close")?,
                parse_field(row, 5, "volume")?,
            ))
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    candles.sort_by_key(|c| c.time);
    candles.dedup_by_key(|c| c.time);
    Ok(candles)
}

/// Candle source backed by the Bybit v5 REST API.
pub struct BybitSource {
    client: Client,
    config: BybitConfig,
}

impl BybitSource {
    pub fn new(config: BybitConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DataError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &BybitConfig {
        &self.config
    }

    fn timeout_ms(&self) -> u64 {
        self.config.timeout.as_millis() as u64
    }

    fn map_request_error(&self, e: reqwest::Error) -> DataError {
        if e.is_timeout() {
            DataError::Timeout(self.timeout_ms())
        } else if let Some(status) = e.status() {
            DataError::Http {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            DataError::ConnectionError(e.to_string())
        }
    }

    async fn fetch_once(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let url = format!("{}/v5/market/kline", self.config.base_url.trim_end_matches('/'));
        let limit = limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("category", self.config.category.as_str()),
                ("symbol", instrument),
                ("interval", interval(timeframe)),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_request_error(e))?;
        if !status.is_success() {
            return Err(DataError::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: KlineResponse = serde_json::from_str(&body)
            .map_err(|e| DataError::ParseError(format!("Invalid kline response: {}", e)))?;

        match parsed.ret_code {
            0 => parse_rows(&parsed.result.list),
            RET_CODE_RATE_LIMIT => Err(DataError::RateLimited),
            RET_CODE_TIMEOUT => Err(DataError::Timeout(self.timeout_ms())),
            code => Err(DataError::Api {
                code,
                message: parsed.ret_msg,
            }),
        }
    }
}

#[async_trait]
impl CandleSource for BybitSource {
    async fn fetch_candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let limit = limit.clamp(1, MAX_LIMIT);
        let backoff = ConstantBuilder::default()
            .with_delay(self.config.retry_delay)
            .with_max_times(self.config.retries);

        let candles = (|| self.fetch_once(instrument, timeframe, limit))
            .retry(backoff)
            .when(DataError::is_transient)
            .notify(|err: &DataError, delay: Duration| {
                warn!(instrument, %timeframe, error = %err, ?delay, "Kline request failed, retrying");
            })
            .await?;

        debug!(instrument, %timeframe, count = candles.len(), "Fetched klines");
        Ok(candles)
    }

    fn name(&self) -> &str {
        "bybit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: i64, close: f64) -> Vec<String> {
        vec![
            time.to_string(),
            "1.0".into(),
            "2.0".into(),
            "0.5".into(),
            close.to_string(),
            "10".into(),
            "15".into(),
        ]
    }

    #[test]
    fn test_interval_mapping() {
        assert_eq!(interval(Timeframe::Minute15), "15");
        assert_eq!(interval(Timeframe::Hour4), "240");
        assert_eq!(interval(Timeframe::Daily), "D");
        assert_eq!(interval(Timeframe::Monthly), "M");
    }

    #[test]
    fn test_rows_are_reversed_and_deduplicated() {
        let rows = vec![row(3000, 3.0), row(2000, 2.0), row(2000, 2.0), row(1000, 1.0)];
        let candles = parse_rows(&rows).unwrap();

        let times: Vec<i64> = candles.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![1000, 2000, 3000]);
        assert_eq!(candles[2].close, 3.0);
    }

    #[test]
    fn test_bad_row_is_a_parse_error() {
        let rows = vec![vec!["1000".to_string(), "x".to_string()]];
        assert!(matches!(parse_rows(&rows), Err(DataError::ParseError(_))));
    }
}
