use crate::models::{PriceBar, SymbolRecord, TickerProfile};

/// Horizontal rule used by every console table
pub const RULE: &str =
    "--------------------------------------------------------------------------------";

/// Print a ranked gainers/losers table with a title line
pub fn print_records_table(records: &[SymbolRecord], title: &str) {
    if records.is_empty() {
        println!("\nNo data available");
        return;
    }

    println!("\n{}", title);
    println!("{}", RULE);
    println!(
        "{:<10}{:>10}{:>14}{:>14}{:>18}",
        "Symbol", "Change%", "Start Price", "End Price", "Volume"
    );
    for record in records {
        println!(
            "{:<10}{:>10}{:>14}{:>14}{:>18}",
            record.symbol,
            format_percent(record.change_percent),
            format_price(record.start_price),
            format_price(record.end_price),
            format_volume(record.average_volume)
        );
    }
    println!("{}", RULE);
}

/// Print the full profile block for a validated ticker
pub fn print_profile(symbol: &str, profile: &TickerProfile) {
    println!("\nStock Information for {}", symbol);
    println!("{}", RULE);
    println!("Name: {}", opt_text(&profile.long_name));
    println!("Sector: {}", opt_text(&profile.sector));
    println!("Industry: {}", opt_text(&profile.industry));
    println!("Market Cap: {}", opt_grouped_price(profile.market_cap));
    println!("Current Price: {}", opt_price(profile.best_price()));
    println!("52 Week High: {}", opt_price(profile.fifty_two_week_high));
    println!("52 Week Low: {}", opt_price(profile.fifty_two_week_low));
    println!("Volume: {}", opt_volume(profile.volume));
    println!("Average Volume: {}", opt_volume(profile.average_volume));
    println!("P/E Ratio: {}", opt_plain(profile.trailing_pe));
    println!(
        "Dividend Yield: {}",
        profile
            .dividend_yield
            .map(|y| format!("{:.2}%", y * 100.0))
            .unwrap_or_else(|| "N/A".to_string())
    );
    println!("{}", RULE);
}

/// Print the compact current-quote header shown above historical data
pub fn print_quote_header(symbol: &str, profile: &TickerProfile) {
    println!("\nCurrent Information for {}", symbol);
    println!("{}", RULE);
    println!("Current Price: {}", opt_grouped_price(profile.best_price()));
    println!("Market Cap: {}", opt_grouped_price(profile.market_cap));
    match (profile.fifty_two_week_low, profile.fifty_two_week_high) {
        (Some(low), Some(high)) => {
            println!("52 Week Range: {} - {}", format_price(low), format_price(high))
        }
        _ => println!("52 Week Range: N/A"),
    }
    println!("P/E Ratio: {}", opt_plain(profile.trailing_pe));
    println!(
        "Dividend Yield: {}",
        profile
            .dividend_yield
            .map(|y| format!("{:.2}%", y * 100.0))
            .unwrap_or_else(|| "N/A".to_string())
    );
    println!("{}", RULE);
}

/// Print recent bars as an OHLCV table, truncated to the first and last five
/// rows when there are more than ten
pub fn print_history_table(bars: &[PriceBar], intraday: bool) {
    if bars.is_empty() {
        println!("\nNo data available");
        return;
    }

    println!("{}", RULE);
    println!(
        "{:<17}{:>10}{:>10}{:>10}{:>10}{:>14}{:>9}",
        "Date", "Open", "High", "Low", "Close", "Volume", "Change%"
    );
    if bars.len() <= 10 {
        for bar in bars {
            print_bar_row(bar, intraday);
        }
    } else {
        for bar in bars.iter().take(5) {
            print_bar_row(bar, intraday);
        }
        println!("...");
        for bar in bars.iter().skip(bars.len() - 5) {
            print_bar_row(bar, intraday);
        }
    }
    println!("{}", RULE);
}

fn print_bar_row(bar: &PriceBar, intraday: bool) {
    let label = if intraday {
        bar.timestamp.format("%Y-%m-%d %H:%M").to_string()
    } else {
        bar.timestamp.format("%Y-%m-%d").to_string()
    };
    println!(
        "{:<17}{:>10.2}{:>10.2}{:>10.2}{:>10.2}{:>14}{:>9}",
        label,
        bar.open,
        bar.high,
        bar.low,
        bar.close,
        format_volume(bar.volume),
        format_percent(bar_change(bar))
    );
}

/// Open-to-close change of a single bar, in percent
fn bar_change(bar: &PriceBar) -> f64 {
    if bar.open > 0.0 {
        (bar.close - bar.open) / bar.open * 100.0
    } else {
        0.0
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:+.2}%", value)
}

pub fn format_price(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    match fixed.split_once('.') {
        Some((whole, cents)) => format!("${}.{}", group_digits(whole), cents),
        None => format!("${}", group_digits(&fixed)),
    }
}

pub fn format_volume(value: u64) -> String {
    group_digits(&value.to_string())
}

/// Insert thousands separators into a decimal digit string, sign-aware
fn group_digits(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}

fn opt_price(value: Option<f64>) -> String {
    value
        .map(|v| format!("${:.2}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

fn opt_grouped_price(value: Option<f64>) -> String {
    value.map(format_price).unwrap_or_else(|| "N/A".to_string())
}

fn opt_volume(value: Option<u64>) -> String {
    value.map(format_volume).unwrap_or_else(|| "N/A".to_string())
}

fn opt_plain(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn opt_text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}
