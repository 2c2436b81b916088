use std::cmp::Ordering;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use crate::api::{HistoryQuery, MarketDataProvider};
use crate::error::{AnalysisError, Result};
use crate::models::{Config, SymbolRecord};
use crate::period::ScanWindow;
use crate::utils::FailureLog;

/// Progress line cadence while a scan is running
const PROGRESS_EVERY: usize = 25;

/// Ranked output of one universe scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub gainers: Vec<SymbolRecord>,
    pub losers: Vec<SymbolRecord>,
    /// Symbols that produced a usable record; the effective list length is
    /// the smaller of this and the requested limit
    pub available_count: usize,
}

/// Ranks a symbol universe by percent change over a scan window.
///
/// Symbols are fetched strictly one at a time in fixed-size batches with a
/// fixed delay between batches; there is no concurrency anywhere in a scan.
pub struct Scanner<'a> {
    provider: &'a dyn MarketDataProvider,
    batch_size: usize,
    batch_delay: Duration,
}

impl<'a> Scanner<'a> {
    pub fn new(provider: &'a dyn MarketDataProvider, config: &Config) -> Self {
        Self {
            provider,
            batch_size: config.batch_size.max(1),
            batch_delay: Duration::from_millis(config.batch_delay_ms),
        }
    }

    /// Run a full scan and rank the results.
    ///
    /// Per-symbol failures (no data, too few points, bad prices) are logged
    /// and skipped, never ending the scan. Ties in percent change keep the
    /// universe iteration order in both directions since both rankings are
    /// independent stable sorts. Running the same scan twice over the same
    /// records yields the same output.
    pub async fn rank(
        &self,
        universe: &[String],
        window: &ScanWindow,
        limit: usize,
        market_open: bool,
        failures: &FailureLog,
    ) -> Result<ScanReport> {
        let query = window.to_query(market_open, Utc::now())?;

        let total = universe.len();
        let mut records: Vec<SymbolRecord> = Vec::new();
        let mut processed = 0usize;

        let batches: Vec<&[String]> = universe.chunks(self.batch_size).collect();
        let batch_count = batches.len();

        for (i, batch) in batches.into_iter().enumerate() {
            for symbol in batch {
                match self.analyze_symbol(symbol, &query).await {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        debug!("Skipping {}: {}", symbol, e);
                        failures.append(symbol, &e.to_string());
                    }
                }

                processed += 1;
                if processed % PROGRESS_EVERY == 0 {
                    info!(
                        "📊 Progress: {}/{} symbols analyzed, {} usable",
                        processed,
                        total,
                        records.len()
                    );
                }
            }

            // Brief pause between batches
            if i + 1 < batch_count {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        let available_count = records.len();
        let effective_limit = limit.min(available_count);

        let mut gainers = records.clone();
        gainers.sort_by(|a, b| {
            b.change_percent
                .partial_cmp(&a.change_percent)
                .unwrap_or(Ordering::Equal)
        });
        gainers.truncate(effective_limit);

        let mut losers = records;
        losers.sort_by(|a, b| {
            a.change_percent
                .partial_cmp(&b.change_percent)
                .unwrap_or(Ordering::Equal)
        });
        losers.truncate(effective_limit);

        info!(
            "✅ Scan complete: {}/{} symbols usable for window {}",
            available_count,
            total,
            window.label()
        );

        Ok(ScanReport {
            gainers,
            losers,
            available_count,
        })
    }

    /// Build the record for one symbol: percent change between the first and
    /// last close plus the mean volume over the window
    async fn analyze_symbol(&self, symbol: &str, query: &HistoryQuery) -> Result<SymbolRecord> {
        let bars = self.provider.fetch_history(symbol, query).await?;

        if bars.len() < 2 {
            return Err(AnalysisError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("insufficient history ({} bars)", bars.len()),
            });
        }

        let first = &bars[0];
        let last = &bars[bars.len() - 1];

        if first.close <= 0.0 || last.close <= 0.0 {
            return Err(AnalysisError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "non-positive close price".to_string(),
            });
        }

        let change_percent = (last.close - first.close) / first.close * 100.0;
        let total_volume: u64 = bars.iter().map(|b| b.volume).sum();
        let average_volume = total_volume / bars.len() as u64;

        Ok(SymbolRecord {
            symbol: symbol.to_string(),
            change_percent,
            start_price: first.close,
            end_price: last.close,
            average_volume,
        })
    }
}
