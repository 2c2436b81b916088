use anyhow::Result;
use stock_analyzer::api::{HistoryQuery, MarketDataProvider, YahooClient};
use stock_analyzer::models::Config;
use stock_analyzer::period::Interval;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    info!("🧪 Testing Yahoo Finance API connectivity");

    // Load configuration
    let config = Config::from_env();
    info!("📋 Configuration loaded");

    // Initialize Yahoo client
    let client = YahooClient::new(&config)?;
    info!("🌐 Yahoo client initialized");

    // Test profile fetches for a few major stocks
    let symbols = ["AAPL", "MSFT", "GOOGL"];
    for symbol in symbols {
        match client.fetch_profile(symbol).await {
            Ok(profile) => {
                info!(
                    "📊 {}: {} price {:?} market cap {:?}",
                    symbol,
                    profile.long_name.as_deref().unwrap_or("?"),
                    profile.best_price(),
                    profile.market_cap
                );
            }
            Err(e) => {
                info!("❌ Failed to fetch profile for {}: {}", symbol, e);
                return Err(e.into());
            }
        }
    }

    // Test a historical fetch
    let query = HistoryQuery::Range {
        range: "5d",
        interval: Interval::Day1,
    };
    match client.fetch_history("AAPL", &query).await {
        Ok(bars) => {
            info!("✅ Successfully fetched {} daily bars for AAPL", bars.len());
            if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
                info!(
                    "📈 {} ${:.2} -> {} ${:.2}",
                    first.timestamp.date_naive(),
                    first.close,
                    last.timestamp.date_naive(),
                    last.close
                );
            }
        }
        Err(e) => {
            info!("❌ Failed to fetch history: {}", e);
            return Err(e.into());
        }
    }

    // Test the market clock
    match client.fetch_market_clock().await {
        Ok(clock) => {
            info!(
                "🕐 Market clock: {} recent trading days, session {:?} to {:?}",
                clock.trading_days.len(),
                clock.session_start,
                clock.session_end
            );
        }
        Err(e) => {
            info!("❌ Failed to fetch market clock: {}", e);
            return Err(e.into());
        }
    }

    info!("🎉 API connectivity test completed successfully!");
    Ok(())
}
