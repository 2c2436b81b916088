use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use stock_analyzer::api::{MarketDataProvider, RetryPolicy, YahooClient};
use stock_analyzer::calendar::MarketCalendar;
use stock_analyzer::chart;
use stock_analyzer::display;
use stock_analyzer::menu::{self, MenuChoice};
use stock_analyzer::models::Config;
use stock_analyzer::period::{Period, ScanWindow};
use stock_analyzer::scanner::{ScanReport, Scanner};
use stock_analyzer::universe::{CachedUniverse, UniverseProvider};
use stock_analyzer::utils::FailureLog;
use stock_analyzer::validate;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Default to warn so log lines do not interleave with menu I/O
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stock_analyzer=warn")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let config = Config::from_env();
    let client = YahooClient::new(&config)?;
    let listing_provider = UniverseProvider::new(&config)?;
    let mut universe = CachedUniverse::new(
        listing_provider,
        Duration::from_secs(config.universe_cache_ttl_secs),
    );
    let retry = RetryPolicy::fixed(
        config.validate_max_attempts,
        Duration::from_millis(config.validate_retry_delay_ms),
    );

    loop {
        let choice = menu::display_main_menu()?;
        if choice == MenuChoice::Exit {
            println!("Thank you for using the Stock Analysis Tool!");
            return Ok(());
        }

        if let Err(e) = run_action(choice, &client, &mut universe, &retry, &config).await {
            println!("\nAn error occurred: {}", e);
        }
        menu::pause()?;
    }
}

async fn run_action(
    choice: MenuChoice,
    client: &YahooClient,
    universe: &mut CachedUniverse,
    retry: &RetryPolicy,
    config: &Config,
) -> Result<()> {
    match choice {
        MenuChoice::GainersLosers => run_gainers_losers(client, universe, config).await,
        MenuChoice::CustomPeriod => run_custom_period(client, universe, config).await,
        MenuChoice::StockInfo => run_stock_info(client, retry, config).await,
        MenuChoice::Options => {
            println!("\nOptions trading features coming soon!");
            Ok(())
        }
        MenuChoice::Graph => run_graph(client, retry).await,
        MenuChoice::Exit => Ok(()),
        MenuChoice::Unknown(_) => {
            println!("Invalid option. Please try again.");
            Ok(())
        }
    }
}

async fn run_gainers_losers(
    client: &YahooClient,
    universe: &mut CachedUniverse,
    config: &Config,
) -> Result<()> {
    let calendar = MarketCalendar::load(client).await;
    let market_open = calendar.is_market_open_now();

    let period = match menu::display_time_periods(market_open)? {
        Some(period) => period,
        None => return Ok(()),
    };
    let limit = menu::get_limit()?;
    let sp500 = menu::get_analysis_scope()?;

    println!("\nFetching data... This might take a few minutes.");
    let symbols = universe.get_universe(!sp500).await;
    let window = ScanWindow::Preset(period);
    let failures = FailureLog::new(&config.failure_log_path, period.token());
    let scanner = Scanner::new(client, config);

    let started = Instant::now();
    match scanner
        .rank(&symbols, &window, limit, market_open, &failures)
        .await
    {
        Ok(report) => print_scan_report(&report, limit, started),
        Err(e) => {
            println!("\nError: {}", e);
            failures.append("Analysis", &e.to_string());
        }
    }
    Ok(())
}

async fn run_custom_period(
    client: &YahooClient,
    universe: &mut CachedUniverse,
    config: &Config,
) -> Result<()> {
    let calendar = MarketCalendar::load(client).await;
    let sp500 = menu::get_analysis_scope()?;

    let validated = loop {
        let start = menu::get_date("Enter start date (YYYY-MM-DD): ")?;
        let end = menu::get_date("Enter end date (YYYY-MM-DD): ")?;
        match validate::validate_dates(&calendar, &start, &end) {
            Ok(validated) => break validated,
            Err(e) => println!("Error: {}", e),
        }
    };
    if validated.adjusted_from.is_some() {
        println!(
            "\nNote: Adjusted end date to last trading day: {}",
            validated.range.end
        );
    }
    let limit = menu::get_limit()?;

    println!("\nFetching data... This might take a few minutes.");
    let symbols = universe.get_universe(!sp500).await;
    let window = ScanWindow::Custom(validated.range);
    let failures = FailureLog::new(&config.failure_log_path, window.label());
    let scanner = Scanner::new(client, config);

    let started = Instant::now();
    match scanner
        .rank(&symbols, &window, limit, calendar.is_market_open_now(), &failures)
        .await
    {
        Ok(report) => print_scan_report(&report, limit, started),
        Err(e) => {
            println!("\nError: {}", e);
            failures.append("Analysis", &e.to_string());
        }
    }
    Ok(())
}

fn print_scan_report(report: &ScanReport, limit: usize, started: Instant) {
    if report.gainers.is_empty() || report.losers.is_empty() {
        println!("\nNo data available for the selected period");
        return;
    }

    let shown = limit.min(report.available_count);
    if report.available_count < limit {
        println!(
            "\nNote: Only {} stocks available for analysis. Showing all available stocks.",
            report.available_count
        );
    }
    println!(
        "\nAnalysis completed in {:.2} seconds",
        started.elapsed().as_secs_f64()
    );
    display::print_records_table(&report.gainers, &format!("Top {} Gainers", shown));
    display::print_records_table(&report.losers, &format!("Top {} Losers", shown));
}

async fn run_stock_info(
    client: &YahooClient,
    retry: &RetryPolicy,
    config: &Config,
) -> Result<()> {
    let ticker = menu::get_ticker()?;
    let failures = FailureLog::new(&config.failure_log_path, "N/A");

    let symbol = match validate::validate_ticker(client, retry, &ticker).await {
        Ok(symbol) => symbol,
        Err(e) => {
            println!("Error: {}", e);
            failures.append(&ticker, &e.to_string());
            return Ok(());
        }
    };

    match client.fetch_profile(&symbol).await {
        Ok(profile) => display::print_profile(&symbol, &profile),
        Err(e) => {
            println!("Error fetching stock information: {}", e);
            failures.append(&symbol, &e.to_string());
        }
    }
    Ok(())
}

async fn run_graph(client: &YahooClient, retry: &RetryPolicy) -> Result<()> {
    let symbol = loop {
        let ticker = menu::get_ticker()?;
        match validate::validate_ticker(client, retry, &ticker).await {
            Ok(symbol) => break symbol,
            Err(e) => println!("Error: {}", e),
        }
    };

    let calendar = MarketCalendar::load(client).await;
    let market_open = calendar.is_market_open_now();
    let period = match menu::display_time_periods(market_open)? {
        Some(period) => period,
        None => return Ok(()),
    };

    if let Err(e) = fetch_and_plot(client, &symbol, period, market_open).await {
        println!("Error creating graph: {}", e);
    }
    Ok(())
}

async fn fetch_and_plot(
    client: &YahooClient,
    symbol: &str,
    period: Period,
    market_open: bool,
) -> Result<()> {
    let window = ScanWindow::Preset(period);
    let query = window.to_query(market_open, Utc::now())?;
    let bars = client.fetch_history(symbol, &query).await?;
    if bars.is_empty() {
        anyhow::bail!("No data available for {}", symbol);
    }

    match client.fetch_profile(symbol).await {
        Ok(profile) => display::print_quote_header(symbol, &profile),
        Err(e) => warn!("Could not fetch current info for {}: {}", symbol, e),
    }

    println!("\nHistorical Data ({}):", period.description());
    display::print_history_table(&bars, period.is_intraday());

    let chart_path = format!("{}_{}_chart.png", symbol.to_lowercase(), period.token());
    chart::render_price_chart(&bars, symbol, period.token(), period.is_intraday(), &chart_path)?;
    println!("\nChart saved to {}", chart_path);
    Ok(())
}
