//! Watch List Scanner
//!
//! Screens watch-list entries one at a time against a facts provider.

use ratio_engine::RatioEngine;
use screener_core::{FactsProvider, ScreenerError, ScreeningResult};
use std::sync::Arc;

use crate::models::{ScanFailure, ScanReport, WatchlistEntry};

pub struct WatchlistScanner {
    provider: Arc<dyn FactsProvider>,
    engine: RatioEngine,
    periods: u32,
}

impl WatchlistScanner {
    pub fn new(provider: Arc<dyn FactsProvider>, engine: RatioEngine, periods: u32) -> Self {
        Self {
            provider,
            engine,
            periods,
        }
    }

    /// Fetch and evaluate a single entry.
    pub async fn screen(&self, entry: &WatchlistEntry) -> Result<ScreeningResult, ScreenerError> {
        let mut facts = self.provider.fetch_facts(&entry.ticker, self.periods).await?;
        if entry.industry.is_some() {
            facts.industry = entry.industry.clone();
        }
        self.engine.evaluate(&facts)
    }

    /// Screen every entry sequentially. A failing ticker is recorded and
    /// the scan moves on.
    pub async fn scan(&self, entries: &[WatchlistEntry]) -> ScanReport {
        let mut report = ScanReport::default();

        for entry in entries {
            match self.screen(entry).await {
                Ok(result) => {
                    tracing::debug!("{}: {} stars", entry.ticker, result.stars());
                    report.results.push(result);
                }
                Err(e) => {
                    tracing::warn!("Issue screening {}: {}", entry.ticker, e);
                    report.failures.push(ScanFailure {
                        ticker: entry.ticker.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Scanned {} tickers with {}: {} screened, {} failed",
            entries.len(),
            self.provider.name(),
            report.results.len(),
            report.failures.len()
        );
        report
    }
}
