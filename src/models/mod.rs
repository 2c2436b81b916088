use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One price observation at the resolved sampling interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Per-symbol scan result used for gainers/losers ranking
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRecord {
    pub symbol: String,
    pub change_percent: f64,
    pub start_price: f64,
    pub end_price: f64,
    pub average_volume: u64,
}

/// Inclusive date range for custom-period analysis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Calendar days between start and end, exclusive of the start day
    pub fn elapsed_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Company and quote metadata for a single ticker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerProfile {
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub regular_market_price: Option<f64>,
    pub current_price: Option<f64>,
    pub ask: Option<f64>,
    pub bid: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub volume: Option<u64>,
    pub average_volume: Option<u64>,
    pub trailing_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
}

impl TickerProfile {
    /// True when at least one live-price field came back, the signal that a
    /// symbol is real and currently quoted
    pub fn has_live_price(&self) -> bool {
        self.regular_market_price.is_some()
            || self.current_price.is_some()
            || self.ask.is_some()
            || self.bid.is_some()
    }

    /// Best available price for display, in the same precedence order the
    /// validation check uses
    pub fn best_price(&self) -> Option<f64> {
        self.regular_market_price
            .or(self.current_price)
            .or(self.ask)
            .or(self.bid)
    }
}

/// Exchange calendar snapshot derived from the reference index
#[derive(Debug, Clone)]
pub struct MarketClock {
    pub as_of: DateTime<Utc>,
    /// Recent trading days in ascending order
    pub trading_days: Vec<NaiveDate>,
    pub session_start: Option<DateTime<Utc>>,
    pub session_end: Option<DateTime<Utc>>,
}

impl MarketClock {
    /// True when `at` falls inside the current regular trading session
    pub fn is_open_at(&self, at: DateTime<Utc>) -> bool {
        match (self.session_start, self.session_end) {
            (Some(start), Some(end)) => start <= at && at < end,
            _ => false,
        }
    }
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub yahoo_base_url: String,
    pub sp500_list_url: String,
    pub nasdaq_list_url: String,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub validate_max_attempts: u32,
    pub validate_retry_delay_ms: u64,
    pub universe_cache_ttl_secs: u64,
    pub universe_min_curated: usize,
    pub universe_min_broad: usize,
    pub failure_log_path: String,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            sp500_list_url:
                "https://raw.githubusercontent.com/datasets/s-and-p-500-companies/main/data/constituents.csv"
                    .to_string(),
            nasdaq_list_url: "https://www.nasdaqtrader.com/dynamic/symdir/nasdaqlisted.txt"
                .to_string(),
            batch_size: 50,
            batch_delay_ms: 200,
            validate_max_attempts: 3,
            validate_retry_delay_ms: 1000,
            universe_cache_ttl_secs: 3600,
            universe_min_curated: 100,
            universe_min_broad: 1000,
            failure_log_path: "failed_analysis.txt".to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Config::default();
        Config {
            yahoo_base_url: std::env::var("YAHOO_BASE_URL")
                .unwrap_or(defaults.yahoo_base_url),
            sp500_list_url: std::env::var("SP500_LIST_URL")
                .unwrap_or(defaults.sp500_list_url),
            nasdaq_list_url: std::env::var("NASDAQ_LIST_URL")
                .unwrap_or(defaults.nasdaq_list_url),
            batch_size: std::env::var("BATCH_SIZE")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .unwrap_or(defaults.batch_size),
            batch_delay_ms: std::env::var("BATCH_DELAY_MS")
                .unwrap_or_else(|_| "200".to_string())
                .parse()
                .unwrap_or(defaults.batch_delay_ms),
            validate_max_attempts: std::env::var("VALIDATE_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(defaults.validate_max_attempts),
            validate_retry_delay_ms: std::env::var("VALIDATE_RETRY_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(defaults.validate_retry_delay_ms),
            universe_cache_ttl_secs: std::env::var("UNIVERSE_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(defaults.universe_cache_ttl_secs),
            universe_min_curated: std::env::var("UNIVERSE_MIN_CURATED")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(defaults.universe_min_curated),
            universe_min_broad: std::env::var("UNIVERSE_MIN_BROAD")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(defaults.universe_min_broad),
            failure_log_path: std::env::var("FAILURE_LOG_PATH")
                .unwrap_or(defaults.failure_log_path),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(defaults.http_timeout_secs),
        }
    }
}
