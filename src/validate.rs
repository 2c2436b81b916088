use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::api::{MarketDataProvider, RetryPolicy};
use crate::calendar::MarketCalendar;
use crate::error::{AnalysisError, Result};
use crate::models::DateRange;

/// Outcome of date validation, carrying the end-date adjustment when one was
/// applied so the caller can surface it
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDates {
    pub range: DateRange,
    /// The end date the user asked for, when it had to move to a trading day
    pub adjusted_from: Option<NaiveDate>,
}

/// Check that a ticker symbol exists and is currently quoted, returning the
/// canonical uppercase form.
///
/// A symbol passes when any live-price field comes back on its profile.
/// Failed attempts are retried on the given policy; exhausting it means the
/// symbol is reported as invalid.
pub async fn validate_ticker(
    provider: &dyn MarketDataProvider,
    policy: &RetryPolicy,
    symbol: &str,
) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "ticker symbol cannot be empty".to_string(),
        ));
    }

    for attempt in 1..=policy.max_attempts {
        match provider.fetch_profile(&symbol).await {
            Ok(profile) if profile.has_live_price() => {
                debug!("Validated {} on attempt {}", symbol, attempt);
                return Ok(symbol);
            }
            Ok(_) => {
                debug!("{}: no live price fields on attempt {}", symbol, attempt);
            }
            Err(e) => {
                debug!("{}: profile fetch failed on attempt {}: {}", symbol, attempt, e);
            }
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay_for(attempt)).await;
        }
    }

    Err(AnalysisError::InvalidTicker(symbol))
}

/// Validate a custom date range against the market calendar
pub fn validate_dates(
    calendar: &MarketCalendar,
    start_input: &str,
    end_input: &str,
) -> Result<ValidatedDates> {
    validate_dates_at(calendar, start_input, end_input, Utc::now().date_naive())
}

/// Validation against an explicit "today", which keeps the rules testable.
///
/// Order matters: a future end date is rejected before the trading-day snap,
/// and the ordering check runs after the snap so a snap that collapses the
/// range is rejected rather than returned.
pub fn validate_dates_at(
    calendar: &MarketCalendar,
    start_input: &str,
    end_input: &str,
    today: NaiveDate,
) -> Result<ValidatedDates> {
    let start = parse_date(start_input)?;
    let end = parse_date(end_input)?;

    if end > today {
        return Err(AnalysisError::InvalidDateRange(
            "end date cannot be in the future".to_string(),
        ));
    }

    let (end, adjusted_from) = if calendar.is_trading_day(end) {
        (end, None)
    } else {
        (calendar.last_trading_day(end)?, Some(end))
    };

    if start >= end {
        return Err(AnalysisError::InvalidDateRange(
            "start date must be before end date".to_string(),
        ));
    }

    Ok(ValidatedDates {
        range: DateRange::new(start, end),
        adjusted_from,
    })
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        AnalysisError::InvalidInput(format!(
            "invalid date '{}', expected YYYY-MM-DD",
            input.trim()
        ))
    })
}
