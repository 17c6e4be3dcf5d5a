//! screen-cli: screen dividend stocks from the terminal.
//!
//! Usage:
//!   screen-cli JNJ                              # one summary
//!   screen-cli JNJ --periods 10 --json          # raw result as JSON
//!   screen-cli --watchlist tickers.txt          # screen, rank, print all
//!   screen-cli --industry-list dividend_ccc.txt --min-stars 6
//!   screen-cli JNJ --facts facts.json           # offline, from a JSON file

mod report;

use anyhow::{bail, Context, Result};
use market_data::{AlphaVantageClient, StaticFactsProvider};
use ratio_engine::RatioEngine;
use screener_core::{env_or, FactsProvider, ScreeningConfig, MAX_PERIODS};
use std::path::PathBuf;
use std::sync::Arc;
use watchlist::{
    group_by_industry, parse_industry_list, parse_watchlist, rank_results, WatchlistEntry,
    WatchlistScanner,
};

const DEFAULT_PERIODS: u32 = 5;
const DEFAULT_MIN_STARS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Single(String),
    Watchlist(PathBuf),
    IndustryList(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    mode: Mode,
    periods: Option<u32>,
    min_stars: usize,
    json: bool,
    facts: Option<PathBuf>,
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>> {
    match args.iter().position(|a| a == flag) {
        Some(i) => match args.get(i + 1) {
            Some(v) if !v.starts_with("--") => Ok(Some(v.as_str())),
            _ => bail!("{} needs a value", flag),
        },
        None => Ok(None),
    }
}

impl CliArgs {
    /// Parse arguments, excluding the program name.
    fn parse(args: &[String]) -> Result<Self> {
        let periods = flag_value(args, "--periods")?
            .map(|v| v.parse::<u32>().with_context(|| format!("invalid --periods {}", v)))
            .transpose()?;
        if let Some(p) = periods {
            check_periods(p).context("invalid --periods")?;
        }
        let min_stars = flag_value(args, "--min-stars")?
            .map(|v| v.parse::<usize>().with_context(|| format!("invalid --min-stars {}", v)))
            .transpose()?
            .unwrap_or(DEFAULT_MIN_STARS);
        let facts = flag_value(args, "--facts")?.map(PathBuf::from);
        let json = args.iter().any(|a| a == "--json");

        let mode = if let Some(path) = flag_value(args, "--watchlist")? {
            Mode::Watchlist(PathBuf::from(path))
        } else if let Some(path) = flag_value(args, "--industry-list")? {
            Mode::IndustryList(PathBuf::from(path))
        } else {
            let valued = ["--periods", "--min-stars", "--facts"];
            let ticker = args.iter().enumerate().find(|(i, a)| {
                !a.starts_with("--") && (*i == 0 || !valued.contains(&args[i - 1].as_str()))
            });
            match ticker {
                Some((_, t)) => Mode::Single(t.clone()),
                None => bail!("no ticker given"),
            }
        };

        Ok(Self {
            mode,
            periods,
            min_stars,
            json,
            facts,
        })
    }
}

fn check_periods(periods: u32) -> Result<u32> {
    if periods == 0 || periods > MAX_PERIODS {
        bail!("periods must be between 1 and {}, got {}", MAX_PERIODS, periods);
    }
    Ok(periods)
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  screen-cli TICKER [--periods N] [--json]     Screen one ticker");
    eprintln!("  screen-cli --watchlist FILE [--periods N]    Screen and rank a watch list");
    eprintln!("  screen-cli --industry-list FILE [--min-stars N]");
    eprintln!("                                               Group by industry, default 6 stars");
    eprintln!();
    eprintln!("  --facts FILE   read facts from a JSON file instead of Alpha Vantage");
    eprintln!("                 (also FACTS_FILE; Alpha Vantage needs ALPHA_VANTAGE_API_KEY)");
}

fn build_provider(facts: Option<PathBuf>) -> Result<Arc<dyn FactsProvider>> {
    let facts = facts.or_else(|| {
        std::env::var("FACTS_FILE")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    });
    match facts {
        Some(path) => Ok(Arc::new(
            StaticFactsProvider::from_path(&path)
                .with_context(|| format!("loading facts from {}", path.display()))?,
        )),
        None => Ok(Arc::new(
            AlphaVantageClient::from_env().context("set ALPHA_VANTAGE_API_KEY or pass --facts")?,
        )),
    }
}

fn read_list(path: &PathBuf) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screen_cli=info,watchlist=error".into()),
        )
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    if raw.is_empty() || raw.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        if raw.is_empty() {
            std::process::exit(2);
        }
        return Ok(());
    }
    let args = match CliArgs::parse(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {:#}", e);
            print_usage();
            std::process::exit(2);
        }
    };

    let config = ScreeningConfig::from_env().context("invalid screening configuration")?;
    let periods = match args.periods {
        Some(p) => p,
        None => check_periods(env_or("SCREEN_PERIODS", DEFAULT_PERIODS)?)
            .context("invalid SCREEN_PERIODS")?,
    };
    let provider = build_provider(args.facts.clone())?;
    let scanner = WatchlistScanner::new(provider, RatioEngine::with_config(config.clone()), periods);

    match &args.mode {
        Mode::Single(ticker) => {
            let entry = WatchlistEntry::new(ticker);
            match scanner.screen(&entry).await {
                Ok(result) if args.json => println!("{}", serde_json::to_string_pretty(&result)?),
                Ok(result) => print!("{}", report::render_summary(&result, &config)),
                Err(e) => {
                    tracing::debug!("{}: {}", entry.ticker, e);
                    eprintln!("Issue screening {}: {}", entry.ticker, e);
                }
            }
        }
        Mode::Watchlist(path) => {
            let entries = parse_watchlist(&read_list(path)?);
            tracing::info!("Screening {} tickers from {}", entries.len(), path.display());
            let scan = scanner.scan(&entries).await;
            for failure in &scan.failures {
                eprintln!("Issue screening {}", failure.ticker);
            }
            let ranked = rank_results(scan.results);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else {
                for result in &ranked {
                    print!("{}", report::render_summary(result, &config));
                }
                print!("{}", report::render_ranking(&ranked));
            }
        }
        Mode::IndustryList(path) => {
            let entries = parse_industry_list(&read_list(path)?);
            let scan = scanner.scan(&entries).await;
            for failure in &scan.failures {
                eprintln!("Issue screening {}", failure.ticker);
            }
            if let Some(avg) = scan.average_stars() {
                tracing::info!("Average rating across {} stocks: {:.1} stars", scan.results.len(), avg);
            }
            let groups = group_by_industry(&scan.results, args.min_stars);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else {
                print!("{}", report::render_industry_groups(&groups, &config));
            }
        }
    }

    Ok(())
}
