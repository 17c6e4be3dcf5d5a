//! Console rendering of screening results.

use screener_core::{RatingCriterion, ScreeningConfig, ScreeningResult};
use std::collections::BTreeMap;
use std::fmt::Write;

const WIDTH: usize = 100;
const NOT_AVAILABLE: &str = "n/a";

fn percent(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn decimal(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn dollars(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| format!("${:.2}", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn mark(result: &ScreeningResult, criterion: RatingCriterion) -> char {
    if result.star_rating.passed(criterion) {
        screener_core::StarRating::FILLED
    } else {
        screener_core::StarRating::EMPTY
    }
}

/// Boxed summary for one result: every criterion with its value, then fair
/// value, price, discount and the star string.
pub fn render_summary(result: &ScreeningResult, config: &ScreeningConfig) -> String {
    let facts = &result.facts;
    let t = &config.thresholds;
    let periods = facts.periods;

    let mut lines = vec![format!("{} ({})", facts.display_name(), facts.ticker)];
    if let Some(industry) = facts.industry.as_deref() {
        lines.push(format!("    Industry: {}", industry));
    }
    lines.push(String::new());

    lines.push(format!(
        "{} {} consecutive years of dividend increases: {}",
        mark(result, RatingCriterion::ContinuousDividendIncrease),
        periods,
        if result.continuous_dividend_increase { "yes" } else { "no" }
    ));
    lines.push(format!(
        "{} Dividend yield between {} and {}: {}",
        mark(result, RatingCriterion::DividendYieldBand),
        percent(Some(t.min_dividend_yield)),
        percent(Some(t.max_dividend_yield)),
        percent(result.dividend_yield)
    ));
    lines.push(format!(
        "{} Dividend {}-year compound annual growth at least {}: {}",
        mark(result, RatingCriterion::DividendGrowth),
        periods,
        percent(Some(t.min_dividend_cagr)),
        percent(result.cagr(config.cagr_method))
    ));
    lines.push(format!(
        "{} Price to earnings ratio at most {}: {}",
        mark(result, RatingCriterion::PriceToEarnings),
        t.max_price_to_earnings,
        decimal(facts.price_to_earnings_ratio)
    ));
    lines.push(format!(
        "{} Dividend payout ratio at most {}: {}",
        mark(result, RatingCriterion::PayoutRatio),
        percent(Some(t.max_payout_ratio)),
        percent(facts.dividend_payout_ratio)
    ));
    lines.push(format!(
        "{} Debt to equity ratio at most {:.2}: {}",
        mark(result, RatingCriterion::DebtToEquity),
        t.max_debt_to_equity,
        decimal(facts.debt_to_equity)
    ));
    lines.push(String::new());

    lines.push(format!("    Fair value: {}", dollars(result.graham_number)));
    lines.push(format!("    Price: {}", dollars(Some(facts.price))));
    lines.push(format!(
        "{} Discount to fair value at least {}: {}",
        mark(result, RatingCriterion::Discount),
        percent(Some(t.min_discount)),
        percent(result.discount)
    ));
    lines.push(String::new());
    lines.push(format!("    Star rating: {}", result.star_rating));

    if !result.missing_facts.is_empty() {
        let missing: Vec<&str> = result.missing_facts.iter().map(|m| m.field_name()).collect();
        lines.push(format!("    Unavailable: {}", missing.join(", ")));
    }

    let border = "%".repeat(WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{}", border);
    for line in lines {
        let _ = writeln!(out, "% {:<width$}%", line, width = WIDTH - 3);
    }
    let _ = writeln!(out, "{}", border);
    out
}

/// One line per result, in the order given.
pub fn render_ranking(results: &[ScreeningResult]) -> String {
    let mut out = String::new();
    for (rank, result) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:<8} {}  yield {:>7}  {}",
            rank + 1,
            result.ticker(),
            result.star_rating,
            percent(result.dividend_yield),
            result.facts.display_name()
        );
    }
    out
}

/// A `#` banner per industry followed by the full summary of each member.
pub fn render_industry_groups(
    groups: &BTreeMap<String, Vec<ScreeningResult>>,
    config: &ScreeningConfig,
) -> String {
    let border = "#".repeat(WIDTH);
    let mut out = String::new();
    for (industry, results) in groups {
        let _ = writeln!(out, "{}", border);
        let _ = writeln!(out, "# {}", industry);
        let _ = writeln!(out, "{}", border);
        for result in results {
            out.push_str(&render_summary(result, config));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratio_engine::RatioEngine;
    use screener_core::FinancialFacts;

    fn sample_result() -> ScreeningResult {
        let mut facts = FinancialFacts::new("TEST", 100.0, 5);
        facts.name = Some("Test Industries".to_string());
        facts.earnings_per_share = Some(5.76);
        facts.book_value_per_share = Some(5.29);
        facts.annualized_dividends = vec![1.0, 1.1, 1.2, 1.3, 1.5];
        facts.price_to_earnings_ratio = Some(15.0);
        facts.dividend_payout_ratio = Some(0.5);
        RatioEngine::new().evaluate(&facts).unwrap()
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(percent(Some(0.0845)), "8.45%");
        assert_eq!(percent(None), "n/a");
        assert_eq!(percent(Some(f64::NAN)), "n/a");
        assert_eq!(dollars(Some(27.04)), "$27.04");
        assert_eq!(decimal(Some(0.4)), "0.40");
    }

    #[test]
    fn test_summary_contents() {
        let summary = render_summary(&sample_result(), &ScreeningConfig::default());
        assert!(summary.contains("Test Industries (TEST)"));
        assert!(summary.contains("Fair value: $27.04"));
        assert!(summary.contains("Price: $100.00"));
        assert!(summary.contains("Dividend yield between 2.00% and 8.00%: 1.50%"));
        assert!(summary.contains("Debt to equity ratio at most 0.60: n/a"));
        assert!(summary.contains("Star rating: ★★★★☆☆☆"));
        assert!(summary.contains("Unavailable: debt_to_equity"));
        assert!(summary.lines().all(|l| l.starts_with('%')));
    }

    #[test]
    fn test_ranking_lines() {
        let out = render_ranking(&[sample_result()]);
        assert!(out.starts_with("  1. TEST"));
        assert!(out.contains("1.50%"));
        assert!(out.trim_end().ends_with("Test Industries"));
    }

    #[test]
    fn test_industry_banner() {
        let mut groups = BTreeMap::new();
        groups.insert("Testing".to_string(), vec![sample_result()]);
        let out = render_industry_groups(&groups, &ScreeningConfig::default());
        assert!(out.contains("# Testing\n"));
        assert!(out.contains("Test Industries (TEST)"));
    }
}
