//! YahooClient wire behavior against a mocked chart and quote summary API.

use chrono::DateTime;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stock_analyzer::api::{HistoryQuery, MarketDataProvider, YahooClient};
use stock_analyzer::error::AnalysisError;
use stock_analyzer::models::Config;
use stock_analyzer::period::Interval;

use assert_matches::assert_matches;

fn client_for(server: &MockServer) -> YahooClient {
    let config = Config {
        yahoo_base_url: server.uri(),
        ..Config::default()
    };
    YahooClient::new(&config).unwrap()
}

#[test_log::test(tokio::test)]
async fn history_is_fetched_and_null_rows_are_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .and(query_param("range", "6mo"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": [{
                    "meta": {},
                    "timestamp": [1710163800, 1710250200, 1710336600],
                    "indicators": {
                        "quote": [{
                            "open":   [170.0, null, 171.0],
                            "high":   [171.0, 170.5, 171.5],
                            "low":    [169.5, 169.8, 170.2],
                            "close":  [170.5, 170.2, 171.2],
                            "volume": [1200, 1500, 900]
                        }]
                    }
                }],
                "error": null
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = HistoryQuery::Range {
        range: "6mo",
        interval: Interval::Day1,
    };
    let bars = client.fetch_history("AAPL", &query).await.unwrap();

    // The middle row has a null open and is dropped
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].timestamp, DateTime::from_timestamp(1710163800, 0).unwrap());
    assert_eq!(bars[0].close, 170.5);
    assert_eq!(bars[1].close, 171.2);
    assert_eq!(bars[1].volume, 900);
}

#[test_log::test(tokio::test)]
async fn span_queries_send_epoch_bounds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/MSFT"))
        .and(query_param("period1", "1710163800"))
        .and(query_param("period2", "1710250200"))
        .and(query_param("interval", "5m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": [{
                    "meta": {},
                    "timestamp": [1710163800],
                    "indicators": {
                        "quote": [{
                            "open": [400.0], "high": [401.0], "low": [399.0],
                            "close": [400.5], "volume": [100]
                        }]
                    }
                }],
                "error": null
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = HistoryQuery::Span {
        start: DateTime::from_timestamp(1710163800, 0).unwrap(),
        end: DateTime::from_timestamp(1710250200, 0).unwrap(),
        interval: Interval::Minute5,
    };
    let bars = client.fetch_history("MSFT", &query).await.unwrap();

    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0].close, 400.5);
}

#[test_log::test(tokio::test)]
async fn chart_error_object_skips_the_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ZZZZZT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": null,
                "error": {
                    "code": "Not Found",
                    "description": "No data found, symbol may be delisted"
                }
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = HistoryQuery::Range {
        range: "1mo",
        interval: Interval::Day1,
    };
    let err = client.fetch_history("ZZZZZT", &query).await.unwrap_err();

    assert_matches!(err, AnalysisError::DataUnavailable { symbol, reason } => {
        assert_eq!(symbol, "ZZZZZT");
        assert!(reason.contains("delisted"));
    });
}

#[test_log::test(tokio::test)]
async fn http_failure_is_an_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = HistoryQuery::Range {
        range: "1d",
        interval: Interval::Day1,
    };
    let err = client.fetch_history("AAPL", &query).await.unwrap_err();

    assert_matches!(err, AnalysisError::Upstream(msg) => {
        assert!(msg.contains("500"));
    });
}

#[test_log::test(tokio::test)]
async fn profile_is_flattened_from_the_quote_summary_modules() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/AAPL"))
        .and(query_param("modules", "price,summaryDetail,assetProfile,financialData"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quoteSummary": {
                "result": [{
                    "price": {
                        "longName": "Apple Inc.",
                        "regularMarketPrice": { "raw": 172.5, "fmt": "172.50" },
                        "marketCap": { "raw": 2.7e12, "fmt": "2.70T" }
                    },
                    "summaryDetail": {
                        "fiftyTwoWeekHigh": { "raw": 199.62 },
                        "fiftyTwoWeekLow": { "raw": 143.9 },
                        "volume": { "raw": 52000000.0 },
                        "averageVolume": { "raw": 58000000.0 },
                        "trailingPE": { "raw": 28.41 },
                        "dividendYield": { "raw": 0.0055 }
                    },
                    "assetProfile": {
                        "sector": "Technology",
                        "industry": "Consumer Electronics"
                    },
                    "financialData": {
                        "currentPrice": { "raw": 172.48 }
                    }
                }],
                "error": null
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let profile = client.fetch_profile("AAPL").await.unwrap();

    assert_eq!(profile.long_name.as_deref(), Some("Apple Inc."));
    assert_eq!(profile.sector.as_deref(), Some("Technology"));
    assert_eq!(profile.regular_market_price, Some(172.5));
    assert_eq!(profile.current_price, Some(172.48));
    assert_eq!(profile.market_cap, Some(2.7e12));
    assert_eq!(profile.volume, Some(52_000_000));
    assert_eq!(profile.trailing_pe, Some(28.41));
    assert!(profile.has_live_price());
}

#[test_log::test(tokio::test)]
async fn market_clock_is_derived_from_the_index_chart() {
    let server = MockServer::start().await;
    // The index symbol carries a caret, which may or may not arrive
    // percent-encoded depending on the HTTP stack
    Mock::given(method("GET"))
        .and(path_regex(r"/v8/finance/chart/.*GSPC"))
        .and(query_param("range", "1mo"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": [{
                    "meta": {
                        "currentTradingPeriod": {
                            "regular": { "start": 1710509400, "end": 1710532800 }
                        }
                    },
                    "timestamp": [1710163800, 1710250200, 1710336600],
                    "indicators": { "quote": [{}] }
                }],
                "error": null
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let clock = client.fetch_market_clock().await.unwrap();

    assert_eq!(clock.trading_days.len(), 3);
    assert_eq!(
        clock.trading_days.first().map(|d| d.to_string()),
        Some("2024-03-11".to_string())
    );
    assert_eq!(
        clock.trading_days.last().map(|d| d.to_string()),
        Some("2024-03-13".to_string())
    );
    assert_eq!(clock.session_start, DateTime::from_timestamp(1710509400, 0));
    assert_eq!(clock.session_end, DateTime::from_timestamp(1710532800, 0));
}
