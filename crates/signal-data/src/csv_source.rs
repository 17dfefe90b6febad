//! CSV candle source.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use signal_core::error::DataError;
use signal_core::traits::CandleSource;
use signal_core::types::{Candle, Timeframe};
use std::path::{Path, PathBuf};

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Date",
        alias = "date",
        alias = "timestamp",
        alias = "Timestamp",
        alias = "time",
        alias = "start"
    )]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Historical candles from one CSV file.
///
/// The file holds a single series; the instrument and timeframe passed to
/// [`CandleSource::fetch_candles`] are not checked against it.
pub struct CsvCandleSource {
    path: PathBuf,
}

impl CsvCandleSource {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Load every candle in the file, oldest first with unique times.
    pub fn load_all(&self) -> Result<Vec<Candle>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut candles = Vec::new();
        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
            candles.push(Candle::new(
                parse_timestamp(&record.date)?,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ));
        }

        candles.sort_by_key(|c| c.time);
        candles.dedup_by_key(|c| c.time);
        Ok(candles)
    }
}

/// Parse a date, date-time or Unix timestamp into Unix milliseconds.
fn parse_timestamp(value: &str) -> Result<i64, DataError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    for format in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(value, format) {
            return Ok(d.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }

    if let Ok(ts) = value.parse::<i64>() {
        // Milliseconds past 10 digits
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!("Could not parse date: {}", value)))
}

#[async_trait]
impl CandleSource for CsvCandleSource {
    async fn fetch_candles(
        &self,
        _instrument: &str,
        _timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let mut candles = self.load_all()?;
        let start = candles.len().saturating_sub(limit);
        Ok(candles.split_off(start))
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("1970-01-02").unwrap(), 86_400_000);
        assert_eq!(parse_timestamp("1970-01-01 00:01:00").unwrap(), 60_000);
        assert_eq!(parse_timestamp("1970-01-01T00:00:01Z").unwrap(), 1000);
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000);
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000);
        assert!(parse_timestamp("yesterday").is_err());
    }

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CsvCandleSource::new("no/such/file.csv"),
            Err(DataError::NoDataAvailable)
        ));
    }

    #[tokio::test]
    async fn test_header_only_file_is_empty_fetch() {
        let file = write_csv("timestamp,open,high,low,close,volume\n");
        let source = CsvCandleSource::new(file.path()).unwrap();

        let candles = source.fetch_candles("BTCUSDT", Timeframe::Hour1, 200).await.unwrap();
        assert!(candles.is_empty());
    }

    #[tokio::test]
    async fn test_trailing_limit_oldest_first() {
        let file = write_csv(
            "timestamp,open,high,low,close,volume\n\
             3000,3,3.5,2.5,3,10\n\
             1000,1,1.5,0.5,1,10\n\
             2000,2,2.5,1.5,2,10\n",
        );
        let source = CsvCandleSource::new(file.path()).unwrap();

        let all = source.load_all().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].time, 1_000_000);

        let tail = source.fetch_candles("BTCUSDT", Timeframe::Hour1, 2).await.unwrap();
        let closes: Vec<f64> = tail.iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![2.0, 3.0]);
    }

    #[test]
    fn test_capitalized_headers_without_volume() {
        let file = write_csv("Date,Open,High,Low,Close\n2024-01-15,1,2,0.5,1.5\n");
        let candles = CsvCandleSource::new(file.path()).unwrap().load_all().unwrap();
        assert_eq!(candles[0].volume, 0.0);
        assert_eq!(candles[0].close, 1.5);
    }
}
