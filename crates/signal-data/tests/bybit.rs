use std::time::Duration;

use serde_json::json;
use signal_core::error::DataError;
use signal_core::traits::CandleSource;
use signal_core::types::Timeframe;
use signal_data::{BybitConfig, BybitSource};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer) -> BybitSource {
    BybitSource::new(BybitConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(2),
        retries: 2,
        retry_delay: Duration::from_millis(10),
        ..BybitConfig::default()
    })
    .unwrap()
}

fn klines() -> serde_json::Value {
    json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": {
            "category": "spot",
            "symbol": "BTCUSDT",
            "list": [
                ["1700007200000", "102", "104", "101", "103", "12.5", "1280"],
                ["1700003600000", "101", "103", "100", "102", "10", "1020"],
                ["1700000000000", "100", "102", "99", "101", "8", "808"]
            ]
        },
        "time": 1700007260000i64
    })
}

#[tokio::test]
async fn fetches_oldest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/kline"))
        .and(query_param("category", "spot"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "60"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(klines()))
        .expect(1)
        .mount(&server)
        .await;

    let candles = source(&server)
        .fetch_candles("BTCUSDT", Timeframe::Hour1, 3)
        .await
        .unwrap();

    let times: Vec<i64> = candles.iter().map(|c| c.time).collect();
    assert_eq!(times, vec![1_700_000_000_000, 1_700_003_600_000, 1_700_007_200_000]);
    assert_eq!(candles[2].close, 103.0);
    assert_eq!(candles[2].volume, 12.5);
}

#[tokio::test]
async fn empty_list_is_an_empty_sequence() {
    let server = MockServer::start().await;
    Mock::given(path("/v5/market/kline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": { "list": [] }
        })))
        .mount(&server)
        .await;

    let candles = source(&server)
        .fetch_candles("NEWUSDT", Timeframe::Minute5, 300)
        .await
        .unwrap();
    assert!(candles.is_empty());
}

#[tokio::test]
async fn api_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(path("/v5/market/kline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retCode": 10001,
            "retMsg": "Not supported symbols",
            "result": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = source(&server)
        .fetch_candles("FOOUSDT", Timeframe::Hour1, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Api { code: 10001, .. }));
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(path("/v5/market/kline"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/v5/market/kline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(klines()))
        .expect(1)
        .mount(&server)
        .await;

    let candles = source(&server)
        .fetch_candles("BTCUSDT", Timeframe::Hour1, 3)
        .await
        .unwrap();
    assert_eq!(candles.len(), 3);
}

#[tokio::test]
async fn retries_are_bounded() {
    let server = MockServer::start().await;
    Mock::given(path("/v5/market/kline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retCode": 10006,
            "retMsg": "Too many visits!",
            "result": {}
        })))
        .expect(3)
        .mount(&server)
        .await;

    let err = source(&server)
        .fetch_candles("BTCUSDT", Timeframe::Hour1, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::RateLimited));
}

#[tokio::test]
async fn client_error_status() {
    let server = MockServer::start().await;
    Mock::given(path("/v5/market/kline"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    let err = source(&server)
        .fetch_candles("BTCUSDT", Timeframe::Hour1, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Http { status: 404, .. }));
}
