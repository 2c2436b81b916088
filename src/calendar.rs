use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::America::New_York;
use tracing::warn;

use crate::api::MarketDataProvider;
use crate::error::{AnalysisError, Result};
use crate::models::MarketClock;

/// Major US market holidays for the local fallback rule.
/// A simplified set - a comprehensive calendar comes from the live clock.
const MARKET_HOLIDAYS: &[&str] = &[
    // New Year's Day
    "2020-01-01", "2021-01-01", "2022-01-03", "2023-01-02", "2024-01-01", "2025-01-01", "2026-01-01",
    // Martin Luther King Jr. Day (3rd Monday in January)
    "2020-01-20", "2021-01-18", "2022-01-17", "2023-01-16", "2024-01-15", "2025-01-20", "2026-01-19",
    // Presidents Day (3rd Monday in February)
    "2020-02-17", "2021-02-15", "2022-02-21", "2023-02-20", "2024-02-19", "2025-02-17", "2026-02-16",
    // Good Friday
    "2020-04-10", "2021-04-02", "2022-04-15", "2023-04-07", "2024-03-29", "2025-04-18", "2026-04-03",
    // Memorial Day (last Monday in May)
    "2020-05-25", "2021-05-31", "2022-05-30", "2023-05-29", "2024-05-27", "2025-05-26", "2026-05-25",
    // Juneteenth (June 19, started 2021)
    "2021-06-19", "2022-06-20", "2023-06-19", "2024-06-19", "2025-06-19", "2026-06-19",
    // Independence Day
    "2020-07-03", "2021-07-05", "2022-07-04", "2023-07-04", "2024-07-04", "2025-07-04", "2026-07-03",
    // Labor Day (1st Monday in September)
    "2020-09-07", "2021-09-06", "2022-09-05", "2023-09-04", "2024-09-02", "2025-09-01", "2026-09-07",
    // Thanksgiving (4th Thursday in November)
    "2020-11-26", "2021-11-25", "2022-11-24", "2023-11-23", "2024-11-28", "2025-11-27", "2026-11-26",
    // Christmas
    "2020-12-25", "2021-12-24", "2022-12-26", "2023-12-25", "2024-12-25", "2025-12-25", "2026-12-25",
];

/// Weekday-and-holiday rule used when no live clock data covers a date
fn is_default_trading_day(date: NaiveDate) -> bool {
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let date_str = date.format("%Y-%m-%d").to_string();
    !MARKET_HOLIDAYS.contains(&date_str.as_str())
}

/// Regular Eastern-time session check for when the live session bounds are
/// unavailable: weekdays 9:30 to 16:00
fn fallback_session_open(at: DateTime<Utc>) -> bool {
    let local = at.with_timezone(&New_York);
    if !is_default_trading_day(local.date_naive()) {
        return false;
    }
    let minutes = local.hour() * 60 + local.minute();
    (9 * 60 + 30..16 * 60).contains(&minutes)
}

/// Market calendar for trading-day and session queries.
///
/// Backed by a live clock snapshot when one could be fetched; otherwise every
/// query degrades to the weekday-and-holiday rule and Eastern session hours.
pub struct MarketCalendar {
    clock: Option<MarketClock>,
}

impl MarketCalendar {
    /// Fetch the live clock from the provider, degrading to local rules when
    /// the fetch fails
    pub async fn load(provider: &dyn MarketDataProvider) -> Self {
        match provider.fetch_market_clock().await {
            Ok(clock) => Self { clock: Some(clock) },
            Err(e) => {
                warn!("Market clock unavailable, falling back to local calendar rules: {}", e);
                Self { clock: None }
            }
        }
    }

    /// Calendar with no live data, local rules only
    pub fn offline() -> Self {
        Self { clock: None }
    }

    /// Calendar seeded from a known clock snapshot
    pub fn with_clock(clock: MarketClock) -> Self {
        Self { clock: Some(clock) }
    }

    /// Check whether the regular session is open right now
    pub fn is_market_open_now(&self) -> bool {
        self.is_market_open_at(Utc::now())
    }

    pub fn is_market_open_at(&self, at: DateTime<Utc>) -> bool {
        if let Some(clock) = &self.clock {
            if clock.session_start.is_some() && clock.session_end.is_some() {
                return clock.is_open_at(at);
            }
        }
        fallback_session_open(at)
    }

    /// Check if a date is a trading day. The live day list is authoritative
    /// for dates it covers; anything outside its span uses the local rule.
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        if let Some(clock) = &self.clock {
            if let (Some(first), Some(last)) =
                (clock.trading_days.first(), clock.trading_days.last())
            {
                if date >= *first && date <= *last {
                    return clock.trading_days.binary_search(&date).is_ok();
                }
            }
        }
        is_default_trading_day(date)
    }

    /// Get the most recent trading day on or before the given date
    pub fn last_trading_day(&self, date: NaiveDate) -> Result<NaiveDate> {
        let mut current_date = date;

        // Look back up to 10 days to find a trading day
        for _ in 0..10 {
            if self.is_trading_day(current_date) {
                return Ok(current_date);
            }
            current_date = current_date - Duration::days(1);
        }

        Err(AnalysisError::InvalidDateRange(format!(
            "could not find a trading day within 10 days of {}",
            date
        )))
    }
}
