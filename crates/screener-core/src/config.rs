use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::ScreenerError;

/// Multiplier inside the Graham number square root.
///
/// `Classic` is Graham's 15 × 1.5. `Defensive` caps the P/E at 16 instead
/// (16 × 1.5) and is what the star rating uses unless configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrahamConstant {
    Classic,
    Defensive,
    Custom(f64),
}

impl GrahamConstant {
    pub fn value(&self) -> f64 {
        match self {
            GrahamConstant::Classic => 22.5,
            GrahamConstant::Defensive => 24.0,
            GrahamConstant::Custom(c) => *c,
        }
    }
}

impl Default for GrahamConstant {
    fn default() -> Self {
        GrahamConstant::Defensive
    }
}

impl FromStr for GrahamConstant {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" => Ok(GrahamConstant::Classic),
            "defensive" => Ok(GrahamConstant::Defensive),
            other => {
                let c: f64 = other.parse().map_err(|_| {
                    ScreenerError::Config(format!("invalid Graham constant: {}", s))
                })?;
                if c.is_finite() && c > 0.0 {
                    Ok(GrahamConstant::Custom(c))
                } else {
                    Err(ScreenerError::Config(format!(
                        "Graham constant must be positive, got {}",
                        c
                    )))
                }
            }
        }
    }
}

/// Which dividend growth figure feeds the growth criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CagrMethod {
    /// First and last year of the window.
    #[default]
    Endpoint,
    /// Median of the growth rates from every earlier year to the latest.
    Median,
}

impl FromStr for CagrMethod {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "endpoint" => Ok(CagrMethod::Endpoint),
            "median" => Ok(CagrMethod::Median),
            _ => Err(ScreenerError::Config(format!("invalid CAGR method: {}", s))),
        }
    }
}

/// Rating thresholds. All ratios are fractions and all comparisons are
/// inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingThresholds {
    pub min_dividend_yield: f64,
    pub max_dividend_yield: f64,
    pub min_dividend_cagr: f64,
    pub max_price_to_earnings: f64,
    pub max_payout_ratio: f64,
    pub max_debt_to_equity: f64,
    pub min_discount: f64,
}

impl Default for RatingThresholds {
    fn default() -> Self {
        Self {
            min_dividend_yield: 0.02,
            max_dividend_yield: 0.08,
            min_dividend_cagr: 0.06,
            max_price_to_earnings: 16.0,
            max_payout_ratio: 0.60,
            max_debt_to_equity: 0.60,
            min_discount: 0.10,
        }
    }
}

/// Everything the ratio engine needs besides the facts themselves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreeningConfig {
    pub graham_constant: GrahamConstant,
    pub cagr_method: CagrMethod,
    pub thresholds: RatingThresholds,
}

impl ScreeningConfig {
    /// Read overrides from the environment; unset variables keep defaults.
    pub fn from_env() -> Result<Self, ScreenerError> {
        let defaults = RatingThresholds::default();
        let thresholds = RatingThresholds {
            min_dividend_yield: env_or("MIN_DIVIDEND_YIELD", defaults.min_dividend_yield)?,
            max_dividend_yield: env_or("MAX_DIVIDEND_YIELD", defaults.max_dividend_yield)?,
            min_dividend_cagr: env_or("MIN_DIVIDEND_CAGR", defaults.min_dividend_cagr)?,
            max_price_to_earnings: env_or("MAX_PE_RATIO", defaults.max_price_to_earnings)?,
            max_payout_ratio: env_or("MAX_PAYOUT_RATIO", defaults.max_payout_ratio)?,
            max_debt_to_equity: env_or("MAX_DEBT_TO_EQUITY", defaults.max_debt_to_equity)?,
            min_discount: env_or("MIN_DISCOUNT", defaults.min_discount)?,
        };

        if thresholds.min_dividend_yield > thresholds.max_dividend_yield {
            return Err(ScreenerError::Config(format!(
                "MIN_DIVIDEND_YIELD ({}) exceeds MAX_DIVIDEND_YIELD ({})",
                thresholds.min_dividend_yield, thresholds.max_dividend_yield
            )));
        }

        Ok(Self {
            graham_constant: env_or("GRAHAM_CONSTANT", GrahamConstant::default())?,
            cagr_method: env_or("CAGR_METHOD", CagrMethod::default())?,
            thresholds,
        })
    }
}

/// Parse `key` from the environment, or return `default` when unset or blank.
pub fn env_or<T>(key: &str, default: T) -> Result<T, ScreenerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| ScreenerError::Config(format!("{}={:?}: {}", key, raw, e))),
        _ => Ok(default),
    }
}
