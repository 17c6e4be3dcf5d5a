pub mod dividends;

pub use dividends::{
    annualize_payments, compute_dividend_cagr, is_continuously_increasing, median_dividend_cagr,
};

use screener_core::stats::round_to;
use screener_core::{
    CagrMethod, FinancialFacts, GrahamConstant, MissingFact, RatingThresholds, ScreenerError,
    ScreeningConfig, ScreeningResult, StarRating,
};

/// Graham number: `round(sqrt(C * eps * bvps), 2)`.
///
/// Both inputs must be positive; the square root of a negative product is
/// never attempted.
pub fn compute_graham_number(
    eps: f64,
    book_value_per_share: f64,
    constant: GrahamConstant,
) -> Result<f64, ScreenerError> {
    let c = constant.value();
    if !c.is_finite() || c <= 0.0 {
        return Err(ScreenerError::Domain(format!("Graham constant must be positive, got {}", c)));
    }
    if !eps.is_finite() || eps <= 0.0 {
        return Err(ScreenerError::Domain(format!("EPS must be positive, got {}", eps)));
    }
    if !book_value_per_share.is_finite() || book_value_per_share <= 0.0 {
        return Err(ScreenerError::Domain(format!(
            "book value per share must be positive, got {}",
            book_value_per_share
        )));
    }
    Ok(round_to((c * eps * book_value_per_share).sqrt(), 2))
}

/// Discount of `price` to `fair_value` as a fraction. Positive means the
/// stock trades below fair value.
pub fn compute_discount(fair_value: f64, price: f64) -> Result<f64, ScreenerError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ScreenerError::Domain(format!("price must be positive, got {}", price)));
    }
    if !fair_value.is_finite() {
        return Err(ScreenerError::Domain(format!("fair value must be finite, got {}", fair_value)));
    }
    Ok(fair_value / price - 1.0)
}

/// Evaluate the seven rating criteria for `facts`. Never fails: a criterion
/// whose inputs are unavailable does not pass.
pub fn compute_star_rating(facts: &FinancialFacts, config: &ScreeningConfig) -> StarRating {
    let metrics = DerivedMetrics::derive(facts, config);
    rate(facts, &metrics, &config.thresholds)
}

/// Values derived from the facts before rating. Each field is computed on
/// its own; a failure leaves only that field empty.
#[derive(Debug, Clone, PartialEq)]
struct DerivedMetrics {
    dividend_yield: Option<f64>,
    continuous_dividend_increase: bool,
    dividend_cagr: Option<f64>,
    median_dividend_cagr: Option<f64>,
    rated_cagr: Option<f64>,
    graham_number: Option<f64>,
    discount: Option<f64>,
    missing: Vec<MissingFact>,
}

impl DerivedMetrics {
    fn derive(facts: &FinancialFacts, config: &ScreeningConfig) -> Self {
        let mut missing = Vec::new();
        let dividends = &facts.annualized_dividends;

        if dividends.is_empty() {
            missing.push(MissingFact::DividendHistory);
        }

        let dividend_yield = facts
            .dividend_yield
            .filter(|y| y.is_finite())
            .or_else(|| derive_yield(dividends, facts.price));
        if dividend_yield.is_none() {
            missing.push(MissingFact::DividendYield);
        }

        let dividend_cagr = match compute_dividend_cagr(dividends, facts.periods) {
            Ok(cagr) => Some(cagr),
            Err(e) => {
                tracing::debug!("{}: dividend CAGR unavailable: {}", facts.ticker, e);
                None
            }
        };
        if dividend_cagr.is_none() {
            missing.push(MissingFact::DividendCagr);
        }
        let median_cagr = median_dividend_cagr(dividends);
        if median_cagr.is_none() {
            missing.push(MissingFact::MedianDividendCagr);
        }
        let rated_cagr = match config.cagr_method {
            CagrMethod::Endpoint => dividend_cagr,
            CagrMethod::Median => median_cagr,
        };

        let graham_number = match (facts.earnings_per_share, facts.book_value_per_share) {
            (Some(eps), Some(bvps)) => {
                match compute_graham_number(eps, bvps, config.graham_constant) {
                    Ok(g) => Some(g),
                    Err(e) => {
                        tracing::debug!("{}: no fair value: {}", facts.ticker, e);
                        missing.push(MissingFact::FairValue);
                        None
                    }
                }
            }
            (eps, bvps) => {
                if eps.is_none() {
                    missing.push(MissingFact::EarningsPerShare);
                }
                if bvps.is_none() {
                    missing.push(MissingFact::BookValuePerShare);
                }
                missing.push(MissingFact::FairValue);
                None
            }
        };

        let discount = graham_number.and_then(|g| compute_discount(g, facts.price).ok());
        if discount.is_none() {
            missing.push(MissingFact::Discount);
        }

        let supplied = [
            (facts.price_to_earnings_ratio, MissingFact::PriceToEarnings),
            (facts.dividend_payout_ratio, MissingFact::PayoutRatio),
            (facts.debt_to_equity, MissingFact::DebtToEquity),
        ];
        for (value, fact) in supplied {
            if let Err(ScreenerError::MissingFact(fact)) = require(value, fact) {
                missing.push(fact);
            }
        }

        Self {
            dividend_yield,
            continuous_dividend_increase: is_continuously_increasing(dividends),
            dividend_cagr,
            median_dividend_cagr: median_cagr,
            rated_cagr,
            graham_number,
            discount,
            missing,
        }
    }
}

fn derive_yield(dividends: &[f64], price: f64) -> Option<f64> {
    let latest = *dividends.last()?;
    if latest.is_finite() && price.is_finite() && price > 0.0 {
        Some(latest / price)
    } else {
        None
    }
}

/// A criterion input, or [`ScreenerError::MissingFact`] when it is absent
/// or not finite.
fn require(value: Option<f64>, fact: MissingFact) -> Result<f64, ScreenerError> {
    value
        .filter(|v| v.is_finite())
        .ok_or(ScreenerError::MissingFact(fact))
}

fn rate(facts: &FinancialFacts, m: &DerivedMetrics, t: &RatingThresholds) -> StarRating {
    // A single year makes no comparison, so it earns no continuity star.
    let continuous = facts.annualized_dividends.len() >= 2 && m.continuous_dividend_increase;
    let yield_in_band = require(m.dividend_yield, MissingFact::DividendYield)
        .map(|y| y >= t.min_dividend_yield && y <= t.max_dividend_yield)
        .unwrap_or(false);
    let growth = require(m.rated_cagr, MissingFact::DividendCagr)
        .map(|c| c >= t.min_dividend_cagr)
        .unwrap_or(false);
    let pe = require(facts.price_to_earnings_ratio, MissingFact::PriceToEarnings)
        .map(|pe| pe <= t.max_price_to_earnings)
        .unwrap_or(false);
    let payout = require(facts.dividend_payout_ratio, MissingFact::PayoutRatio)
        .map(|p| p > 0.0 && p <= t.max_payout_ratio)
        .unwrap_or(false);
    let debt = require(facts.debt_to_equity, MissingFact::DebtToEquity)
        .map(|d| d <= t.max_debt_to_equity)
        .unwrap_or(false);
    let discount = require(m.discount, MissingFact::Discount)
        .map(|d| d >= t.min_discount)
        .unwrap_or(false);

    StarRating::from_flags([continuous, yield_in_band, growth, pe, payout, debt, discount])
}

/// Turns [`FinancialFacts`] into a [`ScreeningResult`] under one
/// [`ScreeningConfig`].
#[derive(Debug, Clone, Default)]
pub struct RatioEngine {
    config: ScreeningConfig,
}

impl RatioEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScreeningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    /// Screen one ticker.
    ///
    /// Fails only when the facts themselves are unusable (see
    /// [`FinancialFacts::validate`]). Fields that cannot be derived are left
    /// empty and listed in `missing_facts`.
    pub fn evaluate(&self, facts: &FinancialFacts) -> Result<ScreeningResult, ScreenerError> {
        facts.validate()?;

        let metrics = DerivedMetrics::derive(facts, &self.config);
        let star_rating = rate(facts, &metrics, &self.config.thresholds);

        if !metrics.missing.is_empty() {
            tracing::debug!(
                "{}: {} of {} stars, unavailable: {:?}",
                facts.ticker,
                star_rating.count(),
                screener_core::RATING_CRITERIA,
                metrics.missing
            );
        }

        Ok(ScreeningResult {
            facts: facts.clone(),
            dividend_yield: metrics.dividend_yield,
            continuous_dividend_increase: metrics.continuous_dividend_increase,
            dividend_cagr: metrics.dividend_cagr,
            median_dividend_cagr: metrics.median_dividend_cagr,
            graham_constant: self.config.graham_constant.value(),
            graham_number: metrics.graham_number,
            discount: metrics.discount,
            star_rating,
            missing_facts: metrics.missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::RatingCriterion;

    fn sample_facts() -> FinancialFacts {
        let mut facts = FinancialFacts::new("TEST", 100.0, 5);
        facts.earnings_per_share = Some(5.76);
        facts.book_value_per_share = Some(5.29);
        facts.annualized_dividends = vec![1.0, 1.1, 1.2, 1.3, 1.5];
        facts.price_to_earnings_ratio = Some(15.0);
        facts.dividend_payout_ratio = Some(0.5);
        facts.debt_to_equity = Some(0.4);
        facts
    }

    /// Facts that sit exactly on every inclusive threshold of
    /// [`boundary_config`]: upper yield bound, 6% growth, P/E 16, payout and
    /// D/E of 0.6, and a 10% discount.
    fn boundary_facts() -> FinancialFacts {
        let mut facts = FinancialFacts::new("EDGE", 10.0, 1);
        // sqrt(121 * 1 * 1) = 11.0 against a price of 10.0.
        facts.earnings_per_share = Some(1.0);
        facts.book_value_per_share = Some(1.0);
        facts.annualized_dividends = vec![0.5, 0.53];
        facts.dividend_yield = Some(0.08);
        facts.price_to_earnings_ratio = Some(16.0);
        facts.dividend_payout_ratio = Some(0.6);
        facts.debt_to_equity = Some(0.6);
        facts
    }

    /// Default thresholds with a Graham constant that makes the boundary
    /// fair value exactly 11.0.
    fn boundary_config() -> ScreeningConfig {
        ScreeningConfig {
            graham_constant: GrahamConstant::Custom(121.0),
            ..ScreeningConfig::default()
        }
    }

    fn engine_with_constant(c: f64) -> RatioEngine {
        RatioEngine::with_config(ScreeningConfig {
            graham_constant: GrahamConstant::Custom(c),
            ..ScreeningConfig::default()
        })
    }

    #[test]
    fn test_graham_number_formula() {
        let g = compute_graham_number(5.76, 5.29, GrahamConstant::Defensive).unwrap();
        assert_eq!(g, 27.04);
        assert_eq!(g, round_to((24.0f64 * 5.76 * 5.29).sqrt(), 2));

        let classic = compute_graham_number(5.76, 5.29, GrahamConstant::Classic).unwrap();
        assert_eq!(classic, round_to((22.5f64 * 5.76 * 5.29).sqrt(), 2));
        assert!(classic < g);
    }

    #[test]
    fn test_graham_number_domain_errors() {
        assert!(matches!(
            compute_graham_number(-1.0, 5.0, GrahamConstant::Defensive),
            Err(ScreenerError::Domain(_))
        ));
        assert!(compute_graham_number(1.0, 0.0, GrahamConstant::Defensive).is_err());
        assert!(compute_graham_number(1.0, 1.0, GrahamConstant::Custom(-2.0)).is_err());
    }

    #[test]
    fn test_discount_sign() {
        assert!((compute_discount(120.0, 100.0).unwrap() - 0.20).abs() < 1e-12);
        assert!((compute_discount(80.0, 100.0).unwrap() + 0.20).abs() < 1e-12);
        assert!(compute_discount(80.0, 0.0).is_err());
    }

    #[test]
    fn test_end_to_end_rating() {
        let result = RatioEngine::new().evaluate(&sample_facts()).unwrap();

        assert_eq!(result.graham_constant, 24.0);
        assert_eq!(result.graham_number, Some(27.04));
        let discount = result.discount.unwrap();
        assert!(discount < 0.0);
        assert!((discount - (27.04 / 100.0 - 1.0)).abs() < 1e-12);

        // 1.5 / 100 is below the 2% floor, and the stock trades above fair value.
        assert!((result.dividend_yield.unwrap() - 0.015).abs() < 1e-12);
        assert!(result.continuous_dividend_increase);
        assert!((result.dividend_cagr.unwrap() - (1.5f64.powf(0.2) - 1.0)).abs() < 1e-12);

        assert_eq!(
            result.star_rating.flags(),
            &[true, false, true, true, true, true, false]
        );
        assert_eq!(result.stars(), 5);
        assert!(result.missing_facts.is_empty());
    }

    #[test]
    fn test_boundary_values_pass() {
        let result = RatioEngine::with_config(boundary_config())
            .evaluate(&boundary_facts())
            .unwrap();
        assert_eq!(result.graham_number, Some(11.0));
        assert!((result.discount.unwrap() - 0.10).abs() < 1e-12);
        assert_eq!(result.star_rating.flags(), &[true; 7]);
        assert_eq!(result.stars(), 7);

        // Lower edge of the yield band.
        let mut facts = boundary_facts();
        facts.dividend_yield = Some(0.02);
        let rating = compute_star_rating(&facts, &boundary_config());
        assert!(rating.passed(RatingCriterion::DividendYieldBand));
        assert_eq!(rating.count(), 7);
    }

    #[test]
    fn test_just_below_lower_thresholds_fail() {
        let mut facts = boundary_facts();
        facts.dividend_yield = Some(0.0199);
        // 11.0 / 10.01 - 1 is just under a 10% discount.
        facts.price = 10.01;
        let rating = compute_star_rating(&facts, &boundary_config());
        assert!(!rating.passed(RatingCriterion::DividendYieldBand));
        assert!(!rating.passed(RatingCriterion::Discount));
        assert!(rating.passed(RatingCriterion::DividendGrowth));
        assert_eq!(rating.count(), 5);
    }

    #[test]
    fn test_zero_payout_does_not_pass() {
        let mut facts = boundary_facts();
        facts.dividend_payout_ratio = Some(0.0);
        let rating = compute_star_rating(&facts, &boundary_config());
        assert!(!rating.passed(RatingCriterion::PayoutRatio));
        assert_eq!(rating.count(), 6);
    }

    #[test]
    fn test_just_outside_thresholds_fail() {
        let mut facts = boundary_facts();
        facts.dividend_yield = Some(0.0801);
        facts.price_to_earnings_ratio = Some(16.01);
        facts.dividend_payout_ratio = Some(0.61);
        facts.debt_to_equity = Some(0.61);
        let rating = compute_star_rating(&facts, &boundary_config());
        assert!(!rating.passed(RatingCriterion::DividendYieldBand));
        assert!(!rating.passed(RatingCriterion::PriceToEarnings));
        assert!(!rating.passed(RatingCriterion::PayoutRatio));
        assert!(!rating.passed(RatingCriterion::DebtToEquity));
        assert!(rating.passed(RatingCriterion::Discount));
    }

    #[test]
    fn test_missing_inputs_fail_their_criteria_only() {
        let mut facts = sample_facts();
        facts.debt_to_equity = None;
        facts.earnings_per_share = None;

        let result = RatioEngine::new().evaluate(&facts).unwrap();
        assert_eq!(result.graham_number, None);
        assert_eq!(result.discount, None);
        assert!(!result.star_rating.passed(RatingCriterion::DebtToEquity));
        assert!(!result.star_rating.passed(RatingCriterion::Discount));
        // Unrelated criteria are still rated.
        assert!(result.star_rating.passed(RatingCriterion::PriceToEarnings));
        assert!(result.dividend_cagr.is_some());

        assert!(result.missing_facts.contains(&MissingFact::DebtToEquity));
        assert!(result.missing_facts.contains(&MissingFact::EarningsPerShare));
        assert!(result.missing_facts.contains(&MissingFact::FairValue));
        assert!(result.missing_facts.contains(&MissingFact::Discount));
        assert!(!result.missing_facts.contains(&MissingFact::BookValuePerShare));
    }

    #[test]
    fn test_negative_eps_degrades_fair_value() {
        let mut facts = sample_facts();
        facts.earnings_per_share = Some(-2.0);

        let result = RatioEngine::new().evaluate(&facts).unwrap();
        assert_eq!(result.graham_number, None);
        assert_eq!(result.discount, None);
        assert!(result.missing_facts.contains(&MissingFact::FairValue));
    }

    #[test]
    fn test_no_dividends() {
        let mut facts = sample_facts();
        facts.annualized_dividends.clear();
        facts.dividend_payout_ratio = None;

        let result = RatioEngine::new().evaluate(&facts).unwrap();
        assert!(result.continuous_dividend_increase);
        assert!(!result.star_rating.passed(RatingCriterion::ContinuousDividendIncrease));
        assert!(!result.star_rating.passed(RatingCriterion::DividendYieldBand));
        assert!(!result.star_rating.passed(RatingCriterion::DividendGrowth));
        assert_eq!(result.dividend_yield, None);
        assert!(result.missing_facts.contains(&MissingFact::DividendHistory));
        assert!(result.missing_facts.contains(&MissingFact::DividendYield));
    }

    #[test]
    fn test_supplied_yield_wins_over_derived() {
        let mut facts = sample_facts();
        facts.dividend_yield = Some(0.03);
        let result = RatioEngine::new().evaluate(&facts).unwrap();
        assert_eq!(result.dividend_yield, Some(0.03));
        assert!(result.star_rating.passed(RatingCriterion::DividendYieldBand));
    }

    #[test]
    fn test_graham_constant_is_explicit() {
        let facts = boundary_facts();
        let defensive = engine_with_constant(24.0).evaluate(&facts).unwrap();
        let classic = RatioEngine::with_config(ScreeningConfig {
            graham_constant: GrahamConstant::Classic,
            ..ScreeningConfig::default()
        })
        .evaluate(&facts)
        .unwrap();

        assert_eq!(classic.graham_constant, 22.5);
        assert!(classic.graham_number.unwrap() < defensive.graham_number.unwrap());
    }

    #[test]
    fn test_median_cagr_method() {
        let mut facts = sample_facts();
        // Endpoint growth is 0% but the middle years grew fast.
        facts.annualized_dividends = vec![1.0, 0.5, 0.6, 0.8, 1.0];

        let endpoint = RatioEngine::new().evaluate(&facts).unwrap();
        assert!(!endpoint.star_rating.passed(RatingCriterion::DividendGrowth));

        let median = RatioEngine::with_config(ScreeningConfig {
            cagr_method: CagrMethod::Median,
            ..ScreeningConfig::default()
        })
        .evaluate(&facts)
        .unwrap();
        assert!(median.median_dividend_cagr.unwrap() > 0.06);
        assert!(median.star_rating.passed(RatingCriterion::DividendGrowth));
    }

    #[test]
    fn test_each_growth_figure_reports_its_own_absence() {
        let mut facts = sample_facts();
        // A negative year breaks the endpoint figure; the median skips it.
        facts.annualized_dividends = vec![-1.0, 1.0, 1.2];

        let result = RatioEngine::with_config(ScreeningConfig {
            cagr_method: CagrMethod::Median,
            ..ScreeningConfig::default()
        })
        .evaluate(&facts)
        .unwrap();
        assert_eq!(result.dividend_cagr, None);
        assert!(result.median_dividend_cagr.is_some());
        assert!(result.missing_facts.contains(&MissingFact::DividendCagr));
        assert!(!result.missing_facts.contains(&MissingFact::MedianDividendCagr));
        assert!(result.star_rating.passed(RatingCriterion::DividendGrowth));

        facts.annualized_dividends = vec![1.5];
        let result = RatioEngine::new().evaluate(&facts).unwrap();
        assert!(result.missing_facts.contains(&MissingFact::DividendCagr));
        assert!(result.missing_facts.contains(&MissingFact::MedianDividendCagr));
    }

    #[test]
    fn test_require_reports_missing_fact() {
        assert_eq!(require(Some(0.4), MissingFact::DebtToEquity), Ok(0.4));
        assert_eq!(
            require(None, MissingFact::DebtToEquity),
            Err(ScreenerError::MissingFact(MissingFact::DebtToEquity))
        );
        assert_eq!(
            require(Some(f64::INFINITY), MissingFact::PayoutRatio),
            Err(ScreenerError::MissingFact(MissingFact::PayoutRatio))
        );
    }

    #[test]
    fn test_invalid_facts_are_rejected() {
        let mut facts = sample_facts();
        facts.price = 0.0;
        assert!(matches!(
            RatioEngine::new().evaluate(&facts),
            Err(ScreenerError::InvalidFacts(_))
        ));
    }

    #[test]
    fn test_star_rating_never_panics_on_bad_facts() {
        let mut facts = sample_facts();
        facts.price = -5.0;
        facts.price_to_earnings_ratio = Some(f64::NAN);
        let rating = compute_star_rating(&facts, &ScreeningConfig::default());
        assert!(!rating.passed(RatingCriterion::PriceToEarnings));
        assert!(!rating.passed(RatingCriterion::Discount));
    }
}
