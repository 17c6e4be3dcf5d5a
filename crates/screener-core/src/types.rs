use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CagrMethod, MissingFact, ScreenerError};

/// Longest dividend history, in years, a screening may ask for.
///
/// Annualizing allocates one value per requested year, so every entry point
/// that accepts `periods` rejects anything above this.
pub const MAX_PERIODS: u32 = 100;

/// Normalized financial facts for one ticker, as supplied by a provider.
///
/// Optional fields are `None` when the provider could not supply them;
/// there is no "N/A" sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FinancialFacts {
    pub ticker: String,
    pub price: f64,
    #[serde(default)]
    pub book_value_per_share: Option<f64>,
    #[serde(default)]
    pub earnings_per_share: Option<f64>,
    /// One value per year, oldest first.
    #[serde(default)]
    pub annualized_dividends: Vec<f64>,
    /// Yield reported by the provider. When absent it is derived from the
    /// latest annualized dividend.
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub price_to_earnings_ratio: Option<f64>,
    #[serde(default)]
    pub dividend_payout_ratio: Option<f64>,
    /// Fraction, not percent: 0.6 means 60%.
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    pub periods: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl FinancialFacts {
    /// Minimal record; every optional fact starts out unavailable.
    pub fn new(ticker: &str, price: f64, periods: u32) -> Self {
        Self {
            ticker: normalize_ticker(ticker),
            price,
            book_value_per_share: None,
            earnings_per_share: None,
            annualized_dividends: Vec::new(),
            dividend_yield: None,
            price_to_earnings_ratio: None,
            dividend_payout_ratio: None,
            debt_to_equity: None,
            periods,
            name: None,
            industry: None,
            description: None,
        }
    }

    pub fn validate(&self) -> Result<(), ScreenerError> {
        if self.ticker.is_empty() {
            return Err(ScreenerError::InvalidFacts("ticker is empty".to_string()));
        }
        if self.ticker != normalize_ticker(&self.ticker) {
            return Err(ScreenerError::InvalidFacts(format!(
                "ticker {:?} is not normalized",
                self.ticker
            )));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(ScreenerError::InvalidFacts(format!(
                "price for {} must be positive, got {}",
                self.ticker, self.price
            )));
        }
        if self.periods == 0 || self.periods > MAX_PERIODS {
            return Err(ScreenerError::InvalidFacts(format!(
                "periods for {} must be between 1 and {}, got {}",
                self.ticker, MAX_PERIODS, self.periods
            )));
        }
        Ok(())
    }

    /// Display name with listing noise removed (see [`clean_company_name`]),
    /// falling back to the ticker.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(clean_company_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.ticker.clone())
    }
}

/// Tidy an exchange listing name: `"Coca-Cola Company (The) Common Stock"`
/// becomes `"The Coca-Cola Company"`.
///
/// Everything from `(The)` or a standalone `Common` word onwards is dropped.
pub fn clean_company_name(raw: &str) -> String {
    let mut name = raw.trim();
    let article = match name.find("(The)") {
        Some(idx) => {
            name = name[..idx].trim_end();
            true
        }
        None => false,
    };

    let common = name.match_indices(" Common").find(|(idx, word)| {
        let rest = &name[idx + word.len()..];
        rest.is_empty() || rest.starts_with(' ')
    });
    if let Some((idx, _)) = common {
        name = name[..idx].trim_end();
    }

    if article && !name.is_empty() {
        format!("The {}", name)
    } else {
        name.to_string()
    }
}

/// Trim and uppercase a user-supplied ticker.
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A single dividend payment as reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendPayment {
    pub date: NaiveDate,
    pub amount: f64,
}

pub const RATING_CRITERIA: usize = 7;

/// The seven rating criteria, in rating order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingCriterion {
    ContinuousDividendIncrease,
    DividendYieldBand,
    DividendGrowth,
    PriceToEarnings,
    PayoutRatio,
    DebtToEquity,
    Discount,
}

impl RatingCriterion {
    pub const ALL: [RatingCriterion; RATING_CRITERIA] = [
        RatingCriterion::ContinuousDividendIncrease,
        RatingCriterion::DividendYieldBand,
        RatingCriterion::DividendGrowth,
        RatingCriterion::PriceToEarnings,
        RatingCriterion::PayoutRatio,
        RatingCriterion::DebtToEquity,
        RatingCriterion::Discount,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RatingCriterion::ContinuousDividendIncrease => "Consecutive years of dividend increases",
            RatingCriterion::DividendYieldBand => "Dividend yield within band",
            RatingCriterion::DividendGrowth => "Dividend compound annual growth",
            RatingCriterion::PriceToEarnings => "Price to earnings ratio",
            RatingCriterion::PayoutRatio => "Dividend payout ratio",
            RatingCriterion::DebtToEquity => "Debt to equity ratio",
            RatingCriterion::Discount => "Discount to fair value",
        }
    }
}

/// Ordered pass/fail flags, one per [`RatingCriterion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StarRating {
    flags: [bool; RATING_CRITERIA],
}

impl StarRating {
    pub const FILLED: char = '\u{2605}';
    pub const EMPTY: char = '\u{2606}';

    pub fn from_flags(flags: [bool; RATING_CRITERIA]) -> Self {
        Self { flags }
    }

    pub fn flags(&self) -> &[bool; RATING_CRITERIA] {
        &self.flags
    }

    pub fn passed(&self, criterion: RatingCriterion) -> bool {
        let idx = RatingCriterion::ALL
            .iter()
            .position(|c| *c == criterion)
            .unwrap_or(0);
        self.flags[idx]
    }

    pub fn count(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }

    /// Filled stars positionally where a criterion passed, empty elsewhere.
    pub fn positional(&self) -> String {
        self.flags
            .iter()
            .map(|f| if *f { Self::FILLED } else { Self::EMPTY })
            .collect()
    }
}

/// Filled stars first, then empty ones: "★★★★★☆☆".
impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = self.count();
        for _ in 0..filled {
            write!(f, "{}", Self::FILLED)?;
        }
        for _ in filled..RATING_CRITERIA {
            write!(f, "{}", Self::EMPTY)?;
        }
        Ok(())
    }
}

/// Ratios and rating derived from one [`FinancialFacts`] record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub facts: FinancialFacts,
    pub dividend_yield: Option<f64>,
    pub continuous_dividend_increase: bool,
    pub dividend_cagr: Option<f64>,
    pub median_dividend_cagr: Option<f64>,
    pub graham_constant: f64,
    pub graham_number: Option<f64>,
    pub discount: Option<f64>,
    pub star_rating: StarRating,
    pub missing_facts: Vec<MissingFact>,
}

impl ScreeningResult {
    pub fn ticker(&self) -> &str {
        &self.facts.ticker
    }

    pub fn stars(&self) -> usize {
        self.star_rating.count()
    }

    /// The dividend growth figure `method` selects for rating.
    pub fn cagr(&self, method: CagrMethod) -> Option<f64> {
        match method {
            CagrMethod::Endpoint => self.dividend_cagr,
            CagrMethod::Median => self.median_dividend_cagr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker("  jnj \n"), "JNJ");
        assert_eq!(normalize_ticker("brk.b"), "BRK.B");
    }

    #[test]
    fn test_validate_rejects_bad_facts() {
        let facts = FinancialFacts::new("", 10.0, 5);
        assert!(matches!(facts.validate(), Err(ScreenerError::InvalidFacts(_))));

        let facts = FinancialFacts::new("KO", 0.0, 5);
        assert!(facts.validate().is_err());

        let facts = FinancialFacts::new("KO", f64::NAN, 5);
        assert!(facts.validate().is_err());

        let facts = FinancialFacts::new("KO", 60.0, 0);
        assert!(facts.validate().is_err());

        let facts = FinancialFacts::new("KO", 60.0, MAX_PERIODS + 1);
        assert!(matches!(facts.validate(), Err(ScreenerError::InvalidFacts(_))));
        assert!(FinancialFacts::new("KO", 60.0, MAX_PERIODS).validate().is_ok());

        let mut facts = FinancialFacts::new("KO", 60.0, 5);
        facts.ticker = "ko".to_string();
        assert!(facts.validate().is_err());

        assert!(FinancialFacts::new("ko", 60.0, 5).validate().is_ok());
    }

    #[test]
    fn test_star_rating_rendering() {
        let rating = StarRating::from_flags([true, false, true, true, true, true, false]);
        assert_eq!(rating.count(), 5);
        assert_eq!(rating.to_string(), "★★★★★☆☆");
        assert_eq!(rating.positional(), "★☆★★★★☆");
        assert!(rating.passed(RatingCriterion::PayoutRatio));
        assert!(!rating.passed(RatingCriterion::Discount));

        assert_eq!(StarRating::default().to_string(), "☆☆☆☆☆☆☆");
    }

    #[test]
    fn test_display_name_falls_back_to_ticker() {
        let mut facts = FinancialFacts::new("pep", 170.0, 5);
        assert_eq!(facts.display_name(), "PEP");
        facts.name = Some("  PepsiCo, Inc. ".to_string());
        assert_eq!(facts.display_name(), "PepsiCo, Inc.");
        facts.name = Some("   ".to_string());
        assert_eq!(facts.display_name(), "PEP");
    }

    #[test]
    fn test_clean_company_name() {
        assert_eq!(
            clean_company_name("Coca-Cola Company (The) Common Stock"),
            "The Coca-Cola Company"
        );
        assert_eq!(clean_company_name("Southern Company (The)"), "The Southern Company");
        assert_eq!(clean_company_name("Johnson & Johnson Common Stock"), "Johnson & Johnson");
        assert_eq!(clean_company_name("Realty Income Corp Common"), "Realty Income Corp");
        assert_eq!(clean_company_name("Commonwealth Edison"), "Commonwealth Edison");
        assert_eq!(clean_company_name("Keppel Commonwealth Trust"), "Keppel Commonwealth Trust");
    }

    #[test]
    fn test_facts_deserialize_with_defaults() {
        let json = r#"{"ticker": "T", "price": 17.5, "periods": 5, "debt_to_equity": null}"#;
        let facts: FinancialFacts = serde_json::from_str(json).unwrap();
        assert_eq!(facts.ticker, "T");
        assert!(facts.annualized_dividends.is_empty());
        assert_eq!(facts.debt_to_equity, None);
    }
}
