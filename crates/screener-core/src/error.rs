use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScreenerError {
    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Missing fact: {0}")]
    MissingFact(MissingFact),

    #[error("Invalid facts: {0}")]
    InvalidFacts(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A fact that could not be supplied or derived for one screening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MissingFact {
    EarningsPerShare,
    BookValuePerShare,
    FairValue,
    Discount,
    DividendHistory,
    DividendYield,
    DividendCagr,
    MedianDividendCagr,
    PriceToEarnings,
    PayoutRatio,
    DebtToEquity,
}

impl MissingFact {
    pub fn field_name(&self) -> &'static str {
        match self {
            MissingFact::EarningsPerShare => "earnings_per_share",
            MissingFact::BookValuePerShare => "book_value_per_share",
            MissingFact::FairValue => "graham_number",
            MissingFact::Discount => "discount",
            MissingFact::DividendHistory => "annualized_dividends",
            MissingFact::DividendYield => "dividend_yield",
            MissingFact::DividendCagr => "dividend_cagr",
            MissingFact::MedianDividendCagr => "median_dividend_cagr",
            MissingFact::PriceToEarnings => "price_to_earnings_ratio",
            MissingFact::PayoutRatio => "dividend_payout_ratio",
            MissingFact::DebtToEquity => "debt_to_equity",
        }
    }
}

impl fmt::Display for MissingFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}
