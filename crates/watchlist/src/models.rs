//! Watch List Data Models

use screener_core::{normalize_ticker, stats, ScreeningResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One line of a watch list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub ticker: String,
    /// Industry from an industry list; overrides whatever the provider reports
    pub industry: Option<String>,
}

impl WatchlistEntry {
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: normalize_ticker(ticker),
            industry: None,
        }
    }

    pub fn with_industry(ticker: &str, industry: &str) -> Self {
        Self {
            ticker: normalize_ticker(ticker),
            industry: Some(industry.trim().to_string()).filter(|i| !i.is_empty()),
        }
    }
}

/// A ticker that could not be screened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanFailure {
    pub ticker: String,
    pub error: String,
}

/// Outcome of screening a whole watch list.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Successful screenings, in watch-list order
    pub results: Vec<ScreeningResult>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    pub fn screened(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    pub fn average_stars(&self) -> Option<f64> {
        let stars: Vec<f64> = self.results.iter().map(|r| r.stars() as f64).collect();
        stats::mean(&stars)
    }
}

fn content(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Tickers separated by whitespace, any number per line. `#` starts a
/// comment. Duplicates are dropped, keeping the first occurrence.
pub fn parse_watchlist(text: &str) -> Vec<WatchlistEntry> {
    let mut seen = HashSet::new();
    text.lines()
        .flat_map(|line| content(line).split_whitespace())
        .map(WatchlistEntry::new)
        .filter(|entry| seen.insert(entry.ticker.clone()))
        .collect()
}

/// One `TICKER Industry Name` per line; the industry is everything after
/// the first whitespace run.
pub fn parse_industry_list(text: &str) -> Vec<WatchlistEntry> {
    let mut seen = HashSet::new();
    text.lines()
        .filter_map(|line| {
            let line = content(line).trim();
            if line.is_empty() {
                return None;
            }
            let (ticker, industry) = match line.split_once(char::is_whitespace) {
                Some((ticker, rest)) => (ticker, rest.trim()),
                None => (line, ""),
            };
            Some(WatchlistEntry::with_industry(ticker, industry))
        })
        .filter(|entry| seen.insert(entry.ticker.clone()))
        .collect()
}
