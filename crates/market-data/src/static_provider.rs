use async_trait::async_trait;
use screener_core::{normalize_ticker, FactsProvider, FinancialFacts, ScreenerError, MAX_PERIODS};
use std::collections::HashMap;
use std::path::Path;

/// Serves facts from memory, keyed by ticker. Loaded from a JSON array of
/// [`FinancialFacts`] for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticFactsProvider {
    facts: HashMap<String, FinancialFacts>,
}

impl StaticFactsProvider {
    pub fn new(facts: Vec<FinancialFacts>) -> Self {
        let facts = facts
            .into_iter()
            .map(|mut f| {
                f.ticker = normalize_ticker(&f.ticker);
                (f.ticker.clone(), f)
            })
            .collect();
        Self { facts }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ScreenerError> {
        let facts: Vec<FinancialFacts> = serde_json::from_str(json)
            .map_err(|e| ScreenerError::Config(format!("Invalid facts JSON: {}", e)))?;
        Ok(Self::new(facts))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScreenerError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ScreenerError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let provider = Self::from_json_str(&json)?;
        tracing::info!("Loaded facts for {} tickers from {}", provider.len(), path.display());
        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

#[async_trait]
impl FactsProvider for StaticFactsProvider {
    /// Returns the stored record with its dividend history cut to the most
    /// recent `periods` years.
    async fn fetch_facts(&self, ticker: &str, periods: u32) -> Result<FinancialFacts, ScreenerError> {
        if periods == 0 || periods > MAX_PERIODS {
            return Err(ScreenerError::InvalidFacts(format!(
                "periods must be between 1 and {}, got {}",
                MAX_PERIODS, periods
            )));
        }
        let key = normalize_ticker(ticker);
        let mut facts = self
            .facts
            .get(&key)
            .cloned()
            .ok_or_else(|| ScreenerError::Provider(format!("No facts for ticker {}", key)))?;

        let keep = periods as usize;
        if facts.annualized_dividends.len() > keep {
            let skip = facts.annualized_dividends.len() - keep;
            facts.annualized_dividends.drain(..skip);
        }
        facts.periods = periods;
        Ok(facts)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
