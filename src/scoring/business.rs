//! Business viability: ROI, revenue, and major-studio backing.
//!
//! ```text
//! revenue_raw = ln(1 + max(revenue, 0))
//! roi_raw     = ln(1 + max(revenue / (budget + 1), 0))      budget <= 0 → missing
//! revenue, roi → winsorized min-max
//! studio      = 0 / 0.5 / 1 tier (missing only if the companies cell is absent)
//! ```
//!
//! Signals are combined per row as a weighted average over the signals that
//! are present for that row. A row with no present signal has no score and
//! is left out of the table.

use tracing::{debug, info};

use crate::domain::{
    BusinessWeights, CatalogItem, ComponentScore, ComponentTable, Domain, FeatureColumn, RankConfig, StudioSet,
    WinsorBounds,
};
use crate::math::{round_to, winsorized_minmax};
use crate::scoring::ComponentScorer;
use crate::text::studio_signal;

#[derive(Debug, Clone)]
pub struct BusinessScorer {
    weights: BusinessWeights,
    winsor: WinsorBounds,
    studios: StudioSet,
}

impl BusinessScorer {
    pub fn new(config: &RankConfig) -> Self {
        Self {
            weights: config.business_weights,
            winsor: config.winsor,
            studios: config.studios.clone(),
        }
    }
}

pub fn revenue_raw(revenue: Option<f64>) -> Option<f64> {
    revenue
        .filter(|r| r.is_finite())
        .map(|r| r.max(0.0).ln_1p())
}

pub fn roi_raw(revenue: Option<f64>, budget: Option<f64>) -> Option<f64> {
    let revenue = revenue.filter(|r| r.is_finite())?;
    let budget = budget.filter(|b| b.is_finite() && *b > 0.0)?;
    Some((revenue / (budget + 1.0)).max(0.0).ln_1p())
}

/// Weighted average over present signals, or `None` if nothing is present.
pub fn combine_present(signals: &[(Option<f64>, f64)]) -> Option<f64> {
    let (sum, total) = signals
        .iter()
        .filter_map(|(v, w)| v.map(|v| (v * w, *w)))
        .fold((0.0, 0.0), |(s, t), (vw, w)| (s + vw, t + w));
    if total > 0.0 { Some(sum / total) } else { None }
}

impl ComponentScorer for BusinessScorer {
    fn domain(&self) -> Domain {
        Domain::Business
    }

    fn compute(&self, catalog: &[CatalogItem]) -> ComponentTable {
        let rev_raw: Vec<Option<f64>> = catalog.iter().map(|i| revenue_raw(i.revenue)).collect();
        let roi_raw: Vec<Option<f64>> = catalog.iter().map(|i| roi_raw(i.revenue, i.budget)).collect();
        let studio: Vec<Option<f64>> = catalog
            .iter()
            .map(|i| studio_signal(i.production_companies.as_deref(), &self.studios))
            .collect();

        let rev = winsorized_minmax(&rev_raw, self.winsor.low, self.winsor.high);
        let roi = winsorized_minmax(&roi_raw, self.winsor.low, self.winsor.high);

        let mut rows = Vec::with_capacity(catalog.len());
        let mut kept = Vec::with_capacity(catalog.len());
        for (i, item) in catalog.iter().enumerate() {
            let combined = combine_present(&[
                (roi[i], self.weights.roi),
                (rev[i], self.weights.revenue),
                (studio[i], self.weights.studio),
            ]);
            let Some(c) = combined else {
                debug!(item_id = %item.item_id, "business: no usable signal; row excluded");
                continue;
            };
            rows.push(ComponentScore {
                item_id: item.item_id.clone(),
                title: item.title.clone(),
                score: round_to((100.0 * c).clamp(0.0, 100.0), 2),
            });
            kept.push(i);
        }

        info!(
            kept = rows.len(),
            excluded = catalog.len() - rows.len(),
            "business: rows with at least one signal"
        );

        let pick = |col: &[Option<f64>]| -> Vec<Option<f64>> { kept.iter().map(|&i| col[i]).collect() };
        let budget: Vec<Option<f64>> = catalog.iter().map(|i| i.budget).collect();
        let revenue: Vec<Option<f64>> = catalog.iter().map(|i| i.revenue).collect();
        let features = vec![
            FeatureColumn::new("budget", pick(&budget)),
            FeatureColumn::new("revenue", pick(&revenue)),
            FeatureColumn::new("rev_raw", pick(&rev_raw)),
            FeatureColumn::new("roi_raw", pick(&roi_raw)),
            FeatureColumn::new("rev", pick(&rev)),
            FeatureColumn::new("roi", pick(&roi)),
            FeatureColumn::new("studio", pick(&studio)),
        ];

        ComponentTable::from_unsorted(Domain::Business, rows, features)
    }
}
