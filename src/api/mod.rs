use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{MarketClock, PriceBar, TickerProfile};
use crate::period::Interval;

pub mod yahoo_client;
pub use yahoo_client::YahooClient;

/// How a history fetch is phrased upstream
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistoryQuery {
    /// Preset range token understood by the chart endpoint ("1d", "6mo", ...)
    Range { range: &'static str, interval: Interval },
    /// Explicit epoch span, used for intraday lookbacks and custom dates
    Span {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    },
}

/// Retry schedule for validation requests, passed in explicitly instead of
/// hardcoding attempt counts at the call sites
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

/// Delay progression between retry attempts
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    Fixed(Duration),
    Exponential { base: Duration, cap: Duration },
}

impl RetryPolicy {
    /// Fixed delay between attempts, the schedule the interactive tool uses
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Backoff::Fixed(delay),
        }
    }

    /// Single attempt, no waiting
    pub fn immediate() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Delay to sleep after the given 1-based attempt number fails
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, cap } => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                base.saturating_mul(factor).min(cap)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(1))
    }
}

/// Common interface for market data sources
#[async_trait::async_trait]
pub trait MarketDataProvider {
    /// Fetch price bars for one symbol over the queried window
    async fn fetch_history(&self, symbol: &str, query: &HistoryQuery) -> Result<Vec<PriceBar>>;

    /// Fetch company and quote metadata for one symbol
    async fn fetch_profile(&self, symbol: &str) -> Result<TickerProfile>;

    /// Fetch the exchange calendar snapshot derived from the reference index
    async fn fetch_market_clock(&self) -> Result<MarketClock>;
}
