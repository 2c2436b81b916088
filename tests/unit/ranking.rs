//! Scanner ranking behavior against scripted market data.

use std::time::Duration;

use stock_analyzer::models::Config;
use stock_analyzer::period::{Period, ScanWindow};
use stock_analyzer::scanner::Scanner;
use stock_analyzer::utils::FailureLog;

use crate::common::stubs::ScriptedProvider;
use crate::common::{daily_bars, daily_bars_with_volumes};

const TOLERANCE: f64 = 1e-9;

fn test_config() -> Config {
    Config {
        batch_size: 2,
        batch_delay_ms: 0,
        ..Config::default()
    }
}

fn universe(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}

fn failure_log(dir: &tempfile::TempDir) -> FailureLog {
    FailureLog::new(dir.path().join("failed_tickers.txt"), "1mo")
}

#[tokio::test]
async fn ranks_gainers_descending_and_losers_ascending() {
    let provider = ScriptedProvider::new()
        .with_history("A", daily_bars(&[100.0, 110.0]))
        .with_history("B", daily_bars(&[100.0, 95.0]))
        .with_history("C", daily_bars(&[100.0, 102.0]));
    let config = test_config();
    let scanner = Scanner::new(&provider, &config);
    let dir = tempfile::tempdir().unwrap();

    let report = scanner
        .rank(
            &universe(&["A", "B", "C"]),
            &ScanWindow::Preset(Period::Month1),
            2,
            false,
            &failure_log(&dir),
        )
        .await
        .unwrap();

    assert_eq!(report.available_count, 3);

    let gainer_symbols: Vec<&str> = report.gainers.iter().map(|r| r.symbol.as_str()).collect();
    let loser_symbols: Vec<&str> = report.losers.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(gainer_symbols, ["A", "C"]);
    assert_eq!(loser_symbols, ["B", "C"]);

    let top = &report.gainers[0];
    assert!((top.change_percent - 10.0).abs() < TOLERANCE);
    assert!((top.start_price - 100.0).abs() < TOLERANCE);
    assert!((top.end_price - 110.0).abs() < TOLERANCE);

    let bottom = &report.losers[0];
    assert!((bottom.change_percent - (-5.0)).abs() < TOLERANCE);
}

#[tokio::test]
async fn symbols_without_usable_history_are_excluded() {
    // C has an empty history and never shows up on either side.
    let provider = ScriptedProvider::new()
        .with_history("A", daily_bars(&[100.0, 110.0]))
        .with_history("B", daily_bars(&[50.0, 45.0]))
        .with_history("C", Vec::new());
    let config = test_config();
    let scanner = Scanner::new(&provider, &config);
    let dir = tempfile::tempdir().unwrap();

    let report = scanner
        .rank(
            &universe(&["A", "B", "C"]),
            &ScanWindow::Preset(Period::Month1),
            2,
            false,
            &failure_log(&dir),
        )
        .await
        .unwrap();

    assert_eq!(report.available_count, 2);
    let gainer_symbols: Vec<&str> = report.gainers.iter().map(|r| r.symbol.as_str()).collect();
    let loser_symbols: Vec<&str> = report.losers.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(gainer_symbols, ["A", "B"]);
    assert_eq!(loser_symbols, ["B", "A"]);
}

#[tokio::test]
async fn limit_caps_at_available_count() {
    let provider = ScriptedProvider::new()
        .with_history("A", daily_bars(&[100.0, 110.0]))
        .with_history("B", daily_bars(&[100.0, 95.0]))
        .with_history("C", daily_bars(&[100.0, 102.0]));
    let config = test_config();
    let scanner = Scanner::new(&provider, &config);
    let dir = tempfile::tempdir().unwrap();

    let report = scanner
        .rank(
            &universe(&["A", "B", "C"]),
            &ScanWindow::Preset(Period::Month1),
            20,
            false,
            &failure_log(&dir),
        )
        .await
        .unwrap();

    assert_eq!(report.available_count, 3);
    assert_eq!(report.gainers.len(), 3);
    assert_eq!(report.losers.len(), 3);
}

#[tokio::test]
async fn skipped_symbols_are_recorded_in_the_failure_log() {
    let provider = ScriptedProvider::new()
        .with_history("GOOD", daily_bars(&[100.0, 105.0]))
        .with_history("SHORT", daily_bars(&[100.0]))
        .with_history("EMPTY", Vec::new())
        .with_history("ZEROED", daily_bars(&[0.0, 10.0]));
    let config = test_config();
    let scanner = Scanner::new(&provider, &config);
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("failed_tickers.txt");
    let failures = FailureLog::new(&log_path, "1mo");

    // MISSING has no scripted history at all, so the fetch itself errors.
    let report = scanner
        .rank(
            &universe(&["GOOD", "SHORT", "EMPTY", "ZEROED", "MISSING"]),
            &ScanWindow::Preset(Period::Month1),
            5,
            false,
            &failures,
        )
        .await
        .unwrap();

    assert_eq!(report.available_count, 1);
    assert_eq!(report.gainers[0].symbol, "GOOD");

    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("Period: 1mo"));
    assert!(contents.contains("insufficient history (1 bars)"));
    assert!(contents.contains("insufficient history (0 bars)"));
    assert!(contents.contains("non-positive close price"));
    assert!(contents.contains("MISSING:"));
    assert!(!contents.contains("GOOD:"));
}

#[tokio::test]
async fn equal_changes_keep_universe_order() {
    // A, B and C all move +5%; the sort is stable so they stay in
    // universe order on both sides of the report.
    let provider = ScriptedProvider::new()
        .with_history("A", daily_bars(&[100.0, 105.0]))
        .with_history("B", daily_bars(&[200.0, 210.0]))
        .with_history("C", daily_bars(&[40.0, 42.0]))
        .with_history("D", daily_bars(&[100.0, 99.0]));
    let config = test_config();
    let scanner = Scanner::new(&provider, &config);
    let dir = tempfile::tempdir().unwrap();

    let report = scanner
        .rank(
            &universe(&["A", "B", "C", "D"]),
            &ScanWindow::Preset(Period::Month1),
            3,
            false,
            &failure_log(&dir),
        )
        .await
        .unwrap();

    let gainer_symbols: Vec<&str> = report.gainers.iter().map(|r| r.symbol.as_str()).collect();
    let loser_symbols: Vec<&str> = report.losers.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(gainer_symbols, ["A", "B", "C"]);
    assert_eq!(loser_symbols, ["D", "A", "B"]);
}

#[tokio::test]
async fn identical_inputs_produce_identical_reports() {
    let provider = ScriptedProvider::new()
        .with_history("A", daily_bars(&[100.0, 110.0]))
        .with_history("B", daily_bars(&[100.0, 95.0]))
        .with_history("C", daily_bars(&[100.0, 102.0]));
    let config = test_config();
    let scanner = Scanner::new(&provider, &config);
    let dir = tempfile::tempdir().unwrap();
    let symbols = universe(&["A", "B", "C"]);
    let window = ScanWindow::Preset(Period::Month1);

    let first = scanner
        .rank(&symbols, &window, 2, false, &failure_log(&dir))
        .await
        .unwrap();
    let second = scanner
        .rank(&symbols, &window, 2, false, &failure_log(&dir))
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn symbols_are_fetched_in_universe_order() {
    let provider = ScriptedProvider::new()
        .with_history("X", daily_bars(&[10.0, 11.0]))
        .with_history("Y", daily_bars(&[10.0, 12.0]))
        .with_history("Z", daily_bars(&[10.0, 9.0]));
    let config = test_config();
    let scanner = Scanner::new(&provider, &config);
    let dir = tempfile::tempdir().unwrap();

    scanner
        .rank(
            &universe(&["Z", "X", "Y"]),
            &ScanWindow::Preset(Period::Month1),
            3,
            false,
            &failure_log(&dir),
        )
        .await
        .unwrap();

    assert_eq!(provider.fetch_order(), ["Z", "X", "Y"]);
}

#[tokio::test]
async fn average_volume_is_the_integer_mean() {
    let provider = ScriptedProvider::new().with_history(
        "A",
        daily_bars_with_volumes(&[100.0, 101.0, 102.0], &[900, 1000, 1101]),
    );
    let config = test_config();
    let scanner = Scanner::new(&provider, &config);
    let dir = tempfile::tempdir().unwrap();

    let report = scanner
        .rank(
            &universe(&["A"]),
            &ScanWindow::Preset(Period::Month1),
            1,
            false,
            &failure_log(&dir),
        )
        .await
        .unwrap();

    assert_eq!(report.gainers[0].average_volume, 1000);
}
