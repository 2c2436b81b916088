use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{AnalysisError, Result};
use crate::models::Config;

/// Large-cap fallback universe scanned when no remote listing can be fetched
pub const FALLBACK_UNIVERSE: [&str; 40] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "TSLA", "JPM", "V", "WMT",
    "PG", "XOM", "BAC", "MA", "DIS", "NFLX", "CSCO", "PFE", "INTC", "VZ",
    "KO", "PEP", "CMCSA", "ADBE", "CRM", "ABT", "TMO", "ACN", "NKE", "MCD",
    "AMD", "PYPL", "QCOM", "COST", "UNH", "CVX", "T", "ORCL", "LLY", "MRK",
];

fn scope_name(broad: bool) -> &'static str {
    if broad {
        "exchange"
    } else {
        "S&P 500"
    }
}

/// Normalize raw listing entries: uppercase, drop malformed symbols and
/// warrant/unit suffixes, dedup preserving first-seen order
pub fn clean_symbols(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();
    for entry in raw {
        let symbol = entry.trim().to_uppercase();
        if symbol.is_empty() {
            continue;
        }
        if !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            continue;
        }
        // Warrants and units are quoted but not rankable equities
        if symbol.ends_with(".WS") || symbol.ends_with(".W") || symbol.ends_with(".U") {
            continue;
        }
        if seen.insert(symbol.clone()) {
            cleaned.push(symbol);
        }
    }
    cleaned
}

/// Extract symbols from the constituents CSV (first column)
fn parse_constituents(csv_text: &str) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let mut symbols = Vec::new();

    for result in reader.records() {
        let record = result?;
        if let Some(symbol) = record.get(0) {
            symbols.push(symbol.trim().to_string());
        }
    }
    Ok(symbols)
}

/// Extract common-stock symbols from the pipe-delimited exchange listing,
/// skipping test issues, ETFs and the file-creation trailer row
fn parse_exchange_listing(text: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut symbols = Vec::new();

    for result in reader.records() {
        let record = result?;
        let Some(symbol) = record.get(0) else { continue };
        if symbol.starts_with("File Creation Time") {
            continue;
        }
        let test_issue = record.get(3).unwrap_or("").trim();
        let etf = record.get(6).unwrap_or("").trim();
        if test_issue == "Y" || etf == "Y" {
            continue;
        }
        // Preferreds, units and other special securities carry $ or . tags
        if symbol.contains('$') || symbol.contains('.') {
            continue;
        }
        symbols.push(symbol.trim().to_string());
    }
    Ok(symbols)
}

/// Fetches the symbol universe from remote listings.
///
/// The curated scope is the S&P 500 constituents CSV; the broad scope is the
/// exchange's listed-securities file. Either result must clear a plausibility
/// floor, otherwise the fetch is reported as failed.
pub struct UniverseProvider {
    client: reqwest::Client,
    sp500_url: String,
    nasdaq_url: String,
    min_curated: usize,
    min_broad: usize,
}

impl UniverseProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            sp500_url: config.sp500_list_url.clone(),
            nasdaq_url: config.nasdaq_list_url.clone(),
            min_curated: config.universe_min_curated,
            min_broad: config.universe_min_broad,
        })
    }

    /// Fetch and clean the listing for the requested scope
    pub async fn fetch_listing(&self, broad: bool) -> Result<Vec<String>> {
        if broad {
            self.fetch_broad().await
        } else {
            self.fetch_curated().await
        }
    }

    async fn fetch_curated(&self) -> Result<Vec<String>> {
        info!("🌐 Fetching S&P 500 constituents list...");
        let text = self.fetch_text(&self.sp500_url).await?;
        let cleaned = clean_symbols(parse_constituents(&text)?);

        if cleaned.len() < self.min_curated {
            return Err(AnalysisError::Upstream(format!(
                "S&P 500 list has only {} symbols, expected at least {}",
                cleaned.len(),
                self.min_curated
            )));
        }

        info!("✅ Loaded {} S&P 500 symbols", cleaned.len());
        Ok(cleaned)
    }

    async fn fetch_broad(&self) -> Result<Vec<String>> {
        info!("🌐 Fetching exchange listing...");
        let text = self.fetch_text(&self.nasdaq_url).await?;
        let cleaned = clean_symbols(parse_exchange_listing(&text)?);

        if cleaned.len() < self.min_broad {
            return Err(AnalysisError::Upstream(format!(
                "exchange listing has only {} symbols, expected at least {}",
                cleaned.len(),
                self.min_broad
            )));
        }

        info!("✅ Loaded {} listed symbols", cleaned.len());
        Ok(cleaned)
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AnalysisError::Upstream(format!(
                "listing request failed with status {}",
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}

struct CacheSlot {
    symbols: Vec<String>,
    fetched_at: Instant,
}

/// Explicit TTL cache over the universe provider.
///
/// Each scope is cached independently. Only successful fetches are cached;
/// when a fetch fails the built-in fallback list is returned uncached so the
/// next call retries the remote listing.
pub struct CachedUniverse {
    provider: UniverseProvider,
    ttl: Duration,
    curated: Option<CacheSlot>,
    broad: Option<CacheSlot>,
}

impl CachedUniverse {
    pub fn new(provider: UniverseProvider, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            curated: None,
            broad: None,
        }
    }

    /// Symbols for the requested scope, never empty and never failing
    pub async fn get_universe(&mut self, broad: bool) -> Vec<String> {
        let slot = if broad { &self.broad } else { &self.curated };
        if let Some(slot) = slot {
            if slot.fetched_at.elapsed() < self.ttl {
                debug!(
                    "Universe cache hit for {} scope ({} symbols)",
                    scope_name(broad),
                    slot.symbols.len()
                );
                return slot.symbols.clone();
            }
        }

        match self.provider.fetch_listing(broad).await {
            Ok(symbols) => {
                let fresh = CacheSlot {
                    symbols: symbols.clone(),
                    fetched_at: Instant::now(),
                };
                if broad {
                    self.broad = Some(fresh);
                } else {
                    self.curated = Some(fresh);
                }
                symbols
            }
            Err(e) => {
                warn!(
                    "⚠️  {} universe unavailable ({}), using the built-in fallback list",
                    scope_name(broad),
                    e
                );
                FALLBACK_UNIVERSE.iter().map(|s| s.to_string()).collect()
            }
        }
    }
}
