use async_trait::async_trait;
use crate::{FinancialFacts, ScreenerError};

/// Source of [`FinancialFacts`], such as a market-data API or a JSON file.
#[async_trait]
pub trait FactsProvider: Send + Sync {
    /// Fetch facts for `ticker` with `periods` years of dividend history.
    async fn fetch_facts(&self, ticker: &str, periods: u32) -> Result<FinancialFacts, ScreenerError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
