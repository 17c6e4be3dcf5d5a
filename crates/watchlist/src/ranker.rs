//! Result Ranking Module
//!
//! Orders screening results by star count and dividend yield.

use screener_core::ScreeningResult;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const UNCLASSIFIED: &str = "Unclassified";

/// Star count descending, then dividend yield descending. Results without
/// a yield come last among equal star counts. Ties keep their input order.
pub fn rank_results(mut results: Vec<ScreeningResult>) -> Vec<ScreeningResult> {
    results.sort_by(compare);
    results
}

fn compare(a: &ScreeningResult, b: &ScreeningResult) -> Ordering {
    b.stars().cmp(&a.stars()).then_with(|| {
        match (usable_yield(a), usable_yield(b)) {
            (Some(ya), Some(yb)) => yb.partial_cmp(&ya).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    })
}

fn usable_yield(result: &ScreeningResult) -> Option<f64> {
    result.dividend_yield.filter(|y| y.is_finite())
}

/// Results with at least `min_stars` stars, grouped by industry and ranked
/// within each group. Industries iterate in name order.
pub fn group_by_industry(
    results: &[ScreeningResult],
    min_stars: usize,
) -> BTreeMap<String, Vec<ScreeningResult>> {
    let mut groups: BTreeMap<String, Vec<ScreeningResult>> = BTreeMap::new();

    for result in results.iter().filter(|r| r.stars() >= min_stars) {
        let industry = result
            .facts
            .industry
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .unwrap_or(UNCLASSIFIED)
            .to_string();
        groups.entry(industry).or_default().push(result.clone());
    }

    groups
        .into_iter()
        .map(|(industry, members)| (industry, rank_results(members)))
        .collect()
}
