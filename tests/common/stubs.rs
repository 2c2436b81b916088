//! In-memory market data provider with scripted responses

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use stock_analyzer::api::{HistoryQuery, MarketDataProvider};
use stock_analyzer::error::{AnalysisError, Result};
use stock_analyzer::models::{MarketClock, PriceBar, TickerProfile};

/// Serves pre-seeded histories, profiles and an optional clock; anything not
/// scripted fails the way a dead symbol would. Fetched symbols are recorded
/// in call order.
pub struct ScriptedProvider {
    histories: HashMap<String, Vec<PriceBar>>,
    profiles: HashMap<String, TickerProfile>,
    clock: Option<MarketClock>,
    fetched: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            histories: HashMap::new(),
            profiles: HashMap::new(),
            clock: None,
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn with_history(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.histories.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_profile(mut self, symbol: &str, profile: TickerProfile) -> Self {
        self.profiles.insert(symbol.to_string(), profile);
        self
    }

    pub fn with_clock(mut self, clock: MarketClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Symbols whose history was requested, in request order
    pub fn fetch_order(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    async fn fetch_history(&self, symbol: &str, _query: &HistoryQuery) -> Result<Vec<PriceBar>> {
        self.fetched.lock().unwrap().push(symbol.to_string());
        self.histories
            .get(symbol)
            .cloned()
            .ok_or_else(|| AnalysisError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no scripted history".to_string(),
            })
    }

    async fn fetch_profile(&self, symbol: &str) -> Result<TickerProfile> {
        self.profiles
            .get(symbol)
            .cloned()
            .ok_or_else(|| AnalysisError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no scripted profile".to_string(),
            })
    }

    async fn fetch_market_clock(&self) -> Result<MarketClock> {
        self.clock
            .clone()
            .ok_or_else(|| AnalysisError::Upstream("no scripted clock".to_string()))
    }
}
