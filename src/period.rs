use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::api::HistoryQuery;
use crate::error::AnalysisError;
use crate::models::DateRange;

/// Sampling granularity of fetched price bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Minute1,
    Minute5,
    Hour1,
    Day1,
    Week1,
    Month1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute5 => "5m",
            Interval::Hour1 => "1h",
            Interval::Day1 => "1d",
            Interval::Week1 => "1wk",
            Interval::Month1 => "1mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Preset lookback window selected from the time-period menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Minute1,
    Minute5,
    Minute15,
    Minute30,
    Hour1,
    Hour12,
    Day1,
    Day5,
    Month1,
    Month3,
    Month6,
    Year1,
    Year2,
    Year5,
    Year10,
    Ytd,
    Max,
}

/// Resolved fetch parameters for a preset period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub range: &'static str,
    pub interval: Interval,
}

impl Period {
    /// Every supported period, in menu order: intraday tokens first
    pub fn all() -> Vec<Period> {
        vec![
            Period::Minute1,
            Period::Minute5,
            Period::Minute15,
            Period::Minute30,
            Period::Hour1,
            Period::Hour12,
            Period::Day1,
            Period::Day5,
            Period::Month1,
            Period::Month3,
            Period::Month6,
            Period::Year1,
            Period::Year2,
            Period::Year5,
            Period::Year10,
            Period::Ytd,
            Period::Max,
        ]
    }

    pub fn token(&self) -> &'static str {
        match self {
            Period::Minute1 => "1m",
            Period::Minute5 => "5m",
            Period::Minute15 => "15m",
            Period::Minute30 => "30m",
            Period::Hour1 => "1h",
            Period::Hour12 => "12h",
            Period::Day1 => "1d",
            Period::Day5 => "5d",
            Period::Month1 => "1mo",
            Period::Month3 => "3mo",
            Period::Month6 => "6mo",
            Period::Year1 => "1y",
            Period::Year2 => "2y",
            Period::Year5 => "5y",
            Period::Year10 => "10y",
            Period::Ytd => "ytd",
            Period::Max => "max",
        }
    }

    /// Menu line shown next to the token
    pub fn description(&self) -> &'static str {
        match self {
            Period::Minute1 => "Last 1 minute of data",
            Period::Minute5 => "Last 5 minutes of data with 1 minute increments",
            Period::Minute15 => "Last 15 minutes of data with 1 minute increments",
            Period::Minute30 => "Last 30 minutes of data with 1 minute increments",
            Period::Hour1 => "Last 1 hour of data with 1 minute increments",
            Period::Hour12 => "Last 12 hours of data with 5 minute increments",
            Period::Day1 => "Last 1 day of data with 1 hour increments",
            Period::Day5 => "Last 5 days of data with 1 day increments",
            Period::Month1 => "Last 1 month of data with 1 day increments",
            Period::Month3 => "Last 3 months of data with 1 day increments",
            Period::Month6 => "Last 6 months of data with 1 day increments",
            Period::Year1 => "Last 1 year of data with 1 day increments",
            Period::Year2 => "Last 2 years of data with 1 day increments",
            Period::Year5 => "Last 5 years of data with 1 day increments",
            Period::Year10 => "Last 10 years of data with 1 day increments",
            Period::Ytd => "Year to date data with 1 day increments",
            Period::Max => "Maximum available data",
        }
    }

    /// Intraday periods need live session data and an explicit epoch span
    pub fn is_intraday(&self) -> bool {
        matches!(
            self,
            Period::Minute1
                | Period::Minute5
                | Period::Minute15
                | Period::Minute30
                | Period::Hour1
                | Period::Hour12
        )
    }

    /// Wall-clock lookback for intraday periods, `None` for regular ones
    pub fn lookback(&self) -> Option<Duration> {
        match self {
            Period::Minute1 => Some(Duration::minutes(1)),
            Period::Minute5 => Some(Duration::minutes(5)),
            Period::Minute15 => Some(Duration::minutes(15)),
            Period::Minute30 => Some(Duration::minutes(30)),
            Period::Hour1 => Some(Duration::hours(1)),
            Period::Hour12 => Some(Duration::hours(12)),
            _ => None,
        }
    }

    /// Sampling interval for this period. Every token maps to exactly one
    /// interval; the table is total so resolution can never fall through.
    pub fn interval(&self) -> Interval {
        match self {
            Period::Minute1
            | Period::Minute5
            | Period::Minute15
            | Period::Minute30
            | Period::Hour1 => Interval::Minute1,
            Period::Hour12 => Interval::Minute5,
            Period::Day1 => Interval::Minute1,
            Period::Day5 => Interval::Minute5,
            Period::Month1 => Interval::Hour1,
            Period::Month3 | Period::Month6 | Period::Year1 | Period::Ytd => Interval::Day1,
            Period::Year2 | Period::Year5 => Interval::Week1,
            Period::Year10 | Period::Max => Interval::Month1,
        }
    }

    /// Range token sent upstream. Intraday periods normalize to the one-day
    /// range; the narrower window comes from the epoch span instead.
    pub fn range_token(&self) -> &'static str {
        if self.is_intraday() {
            "1d"
        } else {
            self.token()
        }
    }

    /// Resolve the period into fetch parameters. Intraday periods are
    /// rejected outright while the market is closed instead of returning
    /// whatever stale slice the upstream would serve.
    pub fn resolve(&self, market_open: bool) -> Result<Resolution, AnalysisError> {
        if self.is_intraday() && !market_open {
            return Err(AnalysisError::MarketClosed(format!(
                "intraday period '{}' is only available during market hours",
                self.token()
            )));
        }
        Ok(Resolution {
            range: self.range_token(),
            interval: self.interval(),
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for Period {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        Period::all()
            .into_iter()
            .find(|p| p.token() == token)
            .ok_or_else(|| {
                let tokens: Vec<&str> = Period::all().iter().map(|p| p.token()).collect();
                AnalysisError::InvalidInput(format!(
                    "invalid period '{}'. Must be one of: {}",
                    s.trim(),
                    tokens.join(", ")
                ))
            })
    }
}

/// Custom-range bucket table. Thresholds are elapsed calendar days and must
/// stay strictly ascending so every row is reachable; the walk takes the
/// first bucket that fits and anything past the last threshold gets weekly
/// bars.
const RANGE_BUCKETS: [(i64, Interval); 5] = [
    (1, Interval::Minute1),
    (7, Interval::Minute5),
    (30, Interval::Hour1),
    (90, Interval::Day1),
    (365, Interval::Day1),
];

/// Pick the sampling interval for an explicit date range
pub fn interval_for_range(range: &DateRange) -> Interval {
    let days = range.elapsed_days();
    for (max_days, interval) in RANGE_BUCKETS {
        if days <= max_days {
            return interval;
        }
    }
    Interval::Week1
}

/// Window a scan ranks over: a preset token or an explicit date range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanWindow {
    Preset(Period),
    Custom(DateRange),
}

impl ScanWindow {
    /// Build the upstream fetch query for this window.
    ///
    /// Preset intraday windows become explicit epoch spans ending now;
    /// regular presets pass their range token through. Custom ranges span
    /// midnight of the start day to midnight after the end day so the end
    /// day's bars are included.
    pub fn to_query(
        &self,
        market_open: bool,
        now: DateTime<Utc>,
    ) -> Result<HistoryQuery, AnalysisError> {
        match self {
            ScanWindow::Preset(period) => {
                let resolution = period.resolve(market_open)?;
                match period.lookback() {
                    Some(lookback) => Ok(HistoryQuery::Span {
                        start: now - lookback,
                        end: now,
                        interval: resolution.interval,
                    }),
                    None => Ok(HistoryQuery::Range {
                        range: resolution.range,
                        interval: resolution.interval,
                    }),
                }
            }
            ScanWindow::Custom(range) => {
                let start = range.start.and_hms_opt(0, 0, 0).unwrap().and_utc();
                let end = (range.end + Duration::days(1))
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    .and_utc();
                Ok(HistoryQuery::Span {
                    start,
                    end,
                    interval: interval_for_range(range),
                })
            }
        }
    }

    /// Short label for log headers and progress output
    pub fn label(&self) -> String {
        match self {
            ScanWindow::Preset(period) => period.token().to_string(),
            ScanWindow::Custom(range) => format!("{} to {}", range.start, range.end),
        }
    }
}
