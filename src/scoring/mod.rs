//! Per-domain component scorers.
//!
//! Each domain turns the catalog into a 0–100 `ComponentTable` on its own,
//! with its own feature set and its own missing-data policy:
//!
//! | domain   | missing inputs                                         |
//! |----------|--------------------------------------------------------|
//! | content  | absent text contributes empty tokens / zero counts     |
//! | rating   | row dropped if any metric is missing                   |
//! | business | weights renormalized over present signals; none → row excluded |
//! | time     | unknown date = maximally old, missing runtime = 0      |
//!
//! Scorers share no state, so the pipeline may run them in parallel.

use crate::domain::{CatalogItem, ComponentTable, Domain, RankConfig};

pub mod business;
pub mod content;
pub mod rating;
pub mod time;

pub use business::BusinessScorer;
pub use content::ContentScorer;
pub use rating::RatingScorer;
pub use time::{TimeQuality, TimeScorer, time_data_quality};

/// A domain scorer. Implementations are configured at construction and
/// compute a table sorted by descending score (ties keep input order).
pub trait ComponentScorer: Send + Sync {
    fn domain(&self) -> Domain;

    fn compute(&self, catalog: &[CatalogItem]) -> ComponentTable;
}

/// One scorer per domain, in canonical order.
pub fn build_scorers(config: &RankConfig) -> Vec<Box<dyn ComponentScorer>> {
    vec![
        Box::new(ContentScorer::new(config)),
        Box::new(RatingScorer::new(config)),
        Box::new(BusinessScorer::new(config)),
        Box::new(TimeScorer::new(config)),
    ]
}

/// Scale fixed weights to sum to 1 (zero total stays zero).
pub(crate) fn unit_weights<const N: usize>(raw: [f64; N]) -> [f64; N] {
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return [0.0; N];
    }
    raw.map(|w| w / total)
}

/// Weighted sum of unit-interval signals, scaled to `[0, 100]`.
pub(crate) fn to_score(weights: &[f64], signals: &[f64]) -> f64 {
    let combined: f64 = weights.iter().zip(signals).map(|(w, s)| w * s).sum();
    (combined * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::domain::{CatalogItem, RankConfig};

    pub fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    pub fn config() -> RankConfig {
        RankConfig::new(as_of())
    }

    pub fn item(id: &str, title: &str) -> CatalogItem {
        CatalogItem {
            item_id: id.to_string(),
            title: title.to_string(),
            ..CatalogItem::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_scorer_per_domain_in_order() {
        let scorers = build_scorers(&fixtures::config());
        let domains: Vec<Domain> = scorers.iter().map(|s| s.domain()).collect();
        assert_eq!(domains, Domain::ALL);
    }

    #[test]
    fn unit_weights_sum_to_one() {
        let w = unit_weights([2.0, 1.0, 1.0]);
        assert_eq!(w, [0.5, 0.25, 0.25]);
        assert_eq!(unit_weights([0.0, 0.0]), [0.0, 0.0]);
    }
}
