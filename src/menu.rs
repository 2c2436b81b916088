use std::io::{self, Write};

use crate::period::Period;

/// Main-menu selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    GainersLosers,
    CustomPeriod,
    StockInfo,
    Options,
    Graph,
    Exit,
    Unknown(String),
}

pub fn display_main_menu() -> io::Result<MenuChoice> {
    println!("\nStock Data Analysis Tool");
    println!("1 --- Get gainers and losers for given time period");
    println!("2 --- Get stock data based on your own set time period");
    println!("3 --- Get general stock info");
    println!("4 --- Show options (Coming Soon)");
    println!("5 --- Display graph of set time period");
    println!("0 --- Exit");
    let choice = read_line("\nEnter your choice: ")?;
    Ok(parse_choice(&choice))
}

fn parse_choice(input: &str) -> MenuChoice {
    match input.trim() {
        "1" => MenuChoice::GainersLosers,
        "2" => MenuChoice::CustomPeriod,
        "3" => MenuChoice::StockInfo,
        "4" => MenuChoice::Options,
        "5" => MenuChoice::Graph,
        "0" => MenuChoice::Exit,
        other => MenuChoice::Unknown(other.to_string()),
    }
}

/// Period submenu. Intraday rows are hidden while the market is closed;
/// returns `None` when the user backs out with `0`.
pub fn display_time_periods(market_open: bool) -> io::Result<Option<Period>> {
    loop {
        println!("\nChoose one of the options below:");
        for period in Period::all() {
            if !market_open && period.is_intraday() {
                continue;
            }
            println!("{} --- {}", period.token(), period.description());
        }
        if !market_open {
            println!("\nNote: Intraday options are hidden because the market is currently closed.");
        }
        println!("0 --- Go back");

        let choice = read_line("\nEnter your choice: ")?;
        let choice = choice.trim();
        if choice == "0" {
            return Ok(None);
        }
        // A hidden intraday token still parses here; the resolver reports
        // the market-closed condition with a clearer message than the menu
        match choice.parse::<Period>() {
            Ok(period) => return Ok(Some(period)),
            Err(_) => println!("Invalid option. Please try again."),
        }
    }
}

/// True selects the curated S&P 500 universe, false the broad listing
pub fn get_analysis_scope() -> io::Result<bool> {
    loop {
        let choice = read_line("\nAnalyze all S&P 500 stocks for faster analysis? (y/n): ")?;
        match choice.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => println!("Please enter 'y' for S&P 500 stocks or 'n' for all stocks"),
        }
    }
}

pub fn get_limit() -> io::Result<usize> {
    loop {
        let entry =
            read_line("\nHow many top gainers/losers would you like to see? (min = 1, default = 20): ")?;
        let entry = entry.trim();
        if entry.is_empty() {
            return Ok(20);
        }
        match entry.parse::<usize>() {
            Ok(limit) if (1..=100).contains(&limit) => return Ok(limit),
            Ok(_) => println!("Please enter a number between 1 and 100"),
            Err(_) => println!("Please enter a valid number"),
        }
    }
}

pub fn get_ticker() -> io::Result<String> {
    let ticker = read_line("Enter the stock ticker symbol (ex. AAPL): ")?;
    Ok(ticker.trim().to_uppercase())
}

pub fn get_date(prompt: &str) -> io::Result<String> {
    let date = read_line(prompt)?;
    Ok(date.trim().to_string())
}

pub fn pause() -> io::Result<()> {
    read_line("\nPress Enter to continue...")?;
    Ok(())
}

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }
    Ok(line)
}
