use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{AnalysisError, Result};
use crate::models::{Config, MarketClock, PriceBar, TickerProfile};
use crate::period::Interval;
use super::{HistoryQuery, MarketDataProvider};

/// Index symbol whose daily bars stand in for the exchange calendar
const CALENDAR_SYMBOL: &str = "^GSPC";

/// The quote endpoints reject obvious bot agents
const USER_AGENT: &str = "Mozilla/5.0";

/// Modules requested from the quote summary endpoint
const PROFILE_MODULES: &str = "price,summaryDetail,assetProfile,financialData";

/// Chart endpoint response structures
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "currentTradingPeriod")]
    current_trading_period: Option<TradingPeriods>,
}

#[derive(Debug, Deserialize)]
struct TradingPeriods {
    regular: Option<SessionWindow>,
}

#[derive(Debug, Deserialize)]
struct SessionWindow {
    start: Option<i64>,
    end: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Quote summary endpoint response structures. Numeric fields arrive as
/// `{"raw": 123.4, "fmt": "123.40"}` objects, hence the wrapper.
#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    result: Option<Vec<QuoteSummaryModules>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryModules {
    price: Option<PriceModule>,
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(rename = "assetProfile")]
    asset_profile: Option<AssetProfileModule>,
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceModule {
    #[serde(rename = "longName")]
    long_name: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<RawNum>,
    #[serde(rename = "marketCap")]
    market_cap: Option<RawNum>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryDetailModule {
    ask: Option<RawNum>,
    bid: Option<RawNum>,
    #[serde(rename = "fiftyTwoWeekHigh")]
    fifty_two_week_high: Option<RawNum>,
    #[serde(rename = "fiftyTwoWeekLow")]
    fifty_two_week_low: Option<RawNum>,
    volume: Option<RawNum>,
    #[serde(rename = "averageVolume")]
    average_volume: Option<RawNum>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawNum>,
    #[serde(rename = "dividendYield")]
    dividend_yield: Option<RawNum>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetProfileModule {
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "currentPrice")]
    current_price: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct RawNum {
    raw: Option<f64>,
}

fn num(field: &Option<RawNum>) -> Option<f64> {
    field.as_ref().and_then(|n| n.raw)
}

/// Yahoo Finance API client
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    /// Create a new Yahoo Finance client
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.yahoo_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str, query: &HistoryQuery) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/v8/finance/chart/{}", self.base_url, symbol))
            .map_err(|e| {
                AnalysisError::InvalidInput(format!("cannot build chart URL for '{}': {}", symbol, e))
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            match query {
                HistoryQuery::Range { range, interval } => {
                    pairs.append_pair("range", range);
                    pairs.append_pair("interval", interval.as_str());
                }
                HistoryQuery::Span { start, end, interval } => {
                    pairs.append_pair("period1", &start.timestamp().to_string());
                    pairs.append_pair("period2", &end.timestamp().to_string());
                    pairs.append_pair("interval", interval.as_str());
                }
            }
        }
        Ok(url)
    }

    fn profile_url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/v10/finance/quoteSummary/{}",
            self.base_url, symbol
        ))
        .map_err(|e| {
            AnalysisError::InvalidInput(format!(
                "cannot build profile URL for '{}': {}",
                symbol, e
            ))
        })?;
        url.query_pairs_mut().append_pair("modules", PROFILE_MODULES);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("Making request to: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(AnalysisError::Upstream(format!(
                "request failed with status {}: {}",
                status, error_text
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

/// Unwrap the chart envelope, surfacing upstream error objects and empty
/// results as per-symbol failures
fn take_chart_data(symbol: &str, response: ChartResponse) -> Result<ChartData> {
    if let Some(error) = response.chart.error {
        return Err(AnalysisError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: format!("{}: {}", error.code, error.description),
        });
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| AnalysisError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "empty chart result".to_string(),
        })?;

    if data.timestamp.is_none() {
        return Err(AnalysisError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "no timestamps in response".to_string(),
        });
    }

    Ok(data)
}

/// Assemble price bars from the parallel chart arrays. Rows with any missing
/// field are dropped rather than zero-filled.
fn bars_from_data(data: ChartData) -> Vec<PriceBar> {
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        if let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            quote.open.get(i).and_then(|v| *v),
            quote.high.get(i).and_then(|v| *v),
            quote.low.get(i).and_then(|v| *v),
            quote.close.get(i).and_then(|v| *v),
            quote.volume.get(i).and_then(|v| *v),
        ) {
            if let Some(timestamp) = DateTime::from_timestamp(*ts, 0) {
                bars.push(PriceBar {
                    timestamp,
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }
        }
    }
    bars
}

/// Derive the calendar snapshot from an index chart: bar timestamps give the
/// recent trading days, the meta block gives today's regular session bounds
fn clock_from_data(data: ChartData, as_of: DateTime<Utc>) -> MarketClock {
    let mut trading_days: Vec<NaiveDate> = data
        .timestamp
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|ts| DateTime::from_timestamp(*ts, 0))
        .map(|dt| dt.date_naive())
        .collect();
    trading_days.sort_unstable();
    trading_days.dedup();

    let session = data
        .meta
        .current_trading_period
        .and_then(|periods| periods.regular);
    let (session_start, session_end) = match session {
        Some(window) => (
            window.start.and_then(|s| DateTime::from_timestamp(s, 0)),
            window.end.and_then(|s| DateTime::from_timestamp(s, 0)),
        ),
        None => (None, None),
    };

    MarketClock {
        as_of,
        trading_days,
        session_start,
        session_end,
    }
}

fn flatten_profile(symbol: &str, response: QuoteSummaryResponse) -> Result<TickerProfile> {
    if let Some(error) = response.quote_summary.error {
        return Err(AnalysisError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: format!("{}: {}", error.code, error.description),
        });
    }

    let modules = response
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| AnalysisError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "empty quote summary".to_string(),
        })?;

    let price = modules.price.unwrap_or_default();
    let detail = modules.summary_detail.unwrap_or_default();
    let asset = modules.asset_profile.unwrap_or_default();
    let financial = modules.financial_data.unwrap_or_default();

    Ok(TickerProfile {
        long_name: price.long_name,
        sector: asset.sector,
        industry: asset.industry,
        market_cap: num(&price.market_cap),
        regular_market_price: num(&price.regular_market_price),
        current_price: num(&financial.current_price),
        ask: num(&detail.ask),
        bid: num(&detail.bid),
        fifty_two_week_high: num(&detail.fifty_two_week_high),
        fifty_two_week_low: num(&detail.fifty_two_week_low),
        volume: num(&detail.volume).map(|v| v as u64),
        average_volume: num(&detail.average_volume).map(|v| v as u64),
        trailing_pe: num(&detail.trailing_pe),
        dividend_yield: num(&detail.dividend_yield),
    })
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooClient {
    /// Get price bars for a symbol over the queried window
    async fn fetch_history(&self, symbol: &str, query: &HistoryQuery) -> Result<Vec<PriceBar>> {
        let url = self.chart_url(symbol, query)?;
        let response: ChartResponse = self.get_json(url).await?;
        let data = take_chart_data(symbol, response)?;
        let bars = bars_from_data(data);

        debug!("Retrieved {} bars for {}", bars.len(), symbol);
        Ok(bars)
    }

    /// Get company and quote metadata for a symbol
    async fn fetch_profile(&self, symbol: &str) -> Result<TickerProfile> {
        let url = self.profile_url(symbol)?;
        let response: QuoteSummaryResponse = self.get_json(url).await?;
        flatten_profile(symbol, response)
    }

    /// Get the exchange calendar snapshot from the reference index
    async fn fetch_market_clock(&self) -> Result<MarketClock> {
        let query = HistoryQuery::Range {
            range: "1mo",
            interval: Interval::Day1,
        };
        let url = self.chart_url(CALENDAR_SYMBOL, &query)?;
        let response: ChartResponse = self.get_json(url).await?;
        let data = take_chart_data(CALENDAR_SYMBOL, response)?;
        let clock = clock_from_data(data, Utc::now());

        debug!(
            "Market clock: {} trading days, session {:?} to {:?}",
            clock.trading_days.len(),
            clock.session_start,
            clock.session_end
        );
        Ok(clock)
    }
}
