//! Common test utilities and helpers

pub mod stubs;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use stock_analyzer::models::{MarketClock, PriceBar, TickerProfile};

/// Base timestamp for generated bars, a Friday inside the regular session
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap()
}

/// Daily bars with the given closes; the open tracks the close and every bar
/// carries a volume of 1,000
pub fn daily_bars(closes: &[f64]) -> Vec<PriceBar> {
    let volumes = vec![1_000u64; closes.len()];
    daily_bars_with_volumes(closes, &volumes)
}

/// Daily bars with explicit volumes
pub fn daily_bars_with_volumes(closes: &[f64], volumes: &[u64]) -> Vec<PriceBar> {
    assert_eq!(closes.len(), volumes.len());
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (close, volume))| PriceBar {
            timestamp: base_time() + Duration::days(i as i64),
            open: *close,
            high: close + 1.0,
            low: (close - 1.0).max(0.0),
            close: *close,
            volume: *volume,
        })
        .collect()
}

/// Profile carrying a live quote, which is what ticker validation requires
pub fn quoted_profile(name: &str) -> TickerProfile {
    TickerProfile {
        long_name: Some(name.to_string()),
        regular_market_price: Some(100.0),
        ..Default::default()
    }
}

/// Clock for the March 2024 trading week with Thursday the 14th missing,
/// as an exchange closure would leave it
pub fn gapped_march_clock() -> MarketClock {
    MarketClock {
        as_of: base_time(),
        trading_days: vec![
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        ],
        session_start: Some(Utc.with_ymd_and_hms(2024, 3, 15, 13, 30, 0).unwrap()),
        session_end: Some(Utc.with_ymd_and_hms(2024, 3, 15, 20, 0, 0).unwrap()),
    }
}
