//! Dividend history helpers: per-year totals and growth figures.

use chrono::Datelike;
use screener_core::stats::{median, round_to};
use screener_core::{DividendPayment, ScreenerError, MAX_PERIODS};
use std::collections::BTreeMap;

/// Sum individual payments into calendar-year totals.
///
/// The current year and anything after it are incomplete and dropped. The
/// result covers the `periods` years before `current_year`, oldest first;
/// a year without payments counts as 0.0. Totals are rounded to cents.
///
/// `periods` above [`MAX_PERIODS`] is a `Domain` error.
pub fn annualize_payments(
    payments: &[DividendPayment],
    periods: u32,
    current_year: i32,
) -> Result<Vec<f64>, ScreenerError> {
    if periods == 0 {
        return Ok(Vec::new());
    }
    if periods > MAX_PERIODS {
        return Err(ScreenerError::Domain(format!(
            "at most {} years of dividends can be annualized, got {}",
            MAX_PERIODS, periods
        )));
    }
    let first_year = i32::try_from(periods)
        .ok()
        .and_then(|p| current_year.checked_sub(p))
        .ok_or_else(|| {
            ScreenerError::Domain(format!("{} years before {} is out of range", periods, current_year))
        })?;

    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for payment in payments {
        let year = payment.date.year();
        if year < current_year && payment.amount.is_finite() {
            *totals.entry(year).or_insert(0.0) += payment.amount;
        }
    }

    Ok((first_year..current_year)
        .map(|year| round_to(totals.get(&year).copied().unwrap_or(0.0), 2))
        .collect())
}

/// Median of the growth rates from each earlier year to the latest year.
///
/// A value `i` years before the latest contributes
/// `(latest / value)^(1/i) - 1`. Zero or negative years are skipped.
pub fn median_dividend_cagr(annualized_dividends: &[f64]) -> Option<f64> {
    let (&latest, earlier) = annualized_dividends.split_last()?;
    if !latest.is_finite() || latest < 0.0 {
        return None;
    }

    let rates: Vec<f64> = earlier
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite() && **v > 0.0)
        .map(|(idx, old)| {
            let years = (earlier.len() - idx) as f64;
            (latest / old).powf(1.0 / years) - 1.0
        })
        .collect();

    median(&rates)
}

/// Endpoint compound annual growth rate across `periods` years.
///
/// A zero starting dividend yields 0.0 instead of dividing by zero.
pub fn compute_dividend_cagr(annualized_dividends: &[f64], periods: u32) -> Result<f64, ScreenerError> {
    if periods == 0 {
        return Err(ScreenerError::Domain("CAGR needs at least one period".to_string()));
    }
    if annualized_dividends.len() < 2 {
        return Err(ScreenerError::Domain(format!(
            "CAGR needs at least two years of dividends, got {}",
            annualized_dividends.len()
        )));
    }
    if annualized_dividends.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(ScreenerError::Domain(
            "dividend history contains negative or non-finite values".to_string(),
        ));
    }

    let first = annualized_dividends[0];
    let last = annualized_dividends[annualized_dividends.len() - 1];
    if first == 0.0 {
        return Ok(0.0);
    }

    Ok((last / first).powf(1.0 / periods as f64) - 1.0)
}

/// Strict year-over-year increase across the whole sequence.
///
/// Empty and single-year sequences make zero comparisons and count as
/// increasing.
pub fn is_continuously_increasing(annualized_dividends: &[f64]) -> bool {
    annualized_dividends.windows(2).all(|pair| pair[1] > pair[0])
}
