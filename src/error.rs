use thiserror::Error as ThisError;

/// Failure taxonomy for the analysis pipeline.
///
/// `InvalidInput`, `InvalidTicker`, `InvalidDateRange` and `MarketClosed` are
/// user-correctable and reported back at the prompt. `DataUnavailable` is a
/// per-symbol condition that skips the symbol without ending a scan.
/// `Upstream` covers transport and remote-service failures.
#[derive(ThisError, Debug)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid ticker symbol: {0}")]
    InvalidTicker(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Market is closed: {0}")]
    MarketClosed(String),

    #[error("No usable data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::Upstream(err.to_string())
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        AnalysisError::Upstream(format!("CSV error: {}", err))
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Upstream(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::Upstream(format!("IO error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
