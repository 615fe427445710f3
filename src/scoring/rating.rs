//! Audience reception: vote average, vote count, popularity.
//!
//! No missing-data tolerance: a row lacking any of the three metrics is
//! dropped before normalization, so it never appears in the rating table.

use tracing::info;

use crate::domain::{CatalogItem, ComponentScore, ComponentTable, Domain, FeatureColumn, RankConfig, RatingWeights};
use crate::math::minmax_dense;
use crate::scoring::{ComponentScorer, to_score, unit_weights};

#[derive(Debug, Clone)]
pub struct RatingScorer {
    weights: RatingWeights,
}

impl RatingScorer {
    pub fn new(config: &RankConfig) -> Self {
        Self {
            weights: config.rating_weights,
        }
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

impl ComponentScorer for RatingScorer {
    fn domain(&self) -> Domain {
        Domain::Rating
    }

    fn compute(&self, catalog: &[CatalogItem]) -> ComponentTable {
        let complete: Vec<(&CatalogItem, [f64; 3])> = catalog
            .iter()
            .filter_map(|item| {
                Some((
                    item,
                    [
                        finite(item.vote_average)?,
                        finite(item.vote_count)?,
                        finite(item.popularity)?,
                    ],
                ))
            })
            .collect();

        info!(
            kept = complete.len(),
            dropped = catalog.len() - complete.len(),
            "rating: rows with all metrics present"
        );

        let raw: [Vec<f64>; 3] = std::array::from_fn(|k| complete.iter().map(|(_, m)| m[k]).collect());
        let scaled: [Vec<f64>; 3] = std::array::from_fn(|k| minmax_dense(&raw[k]));
        let weights = unit_weights([
            self.weights.vote_average,
            self.weights.vote_count,
            self.weights.popularity,
        ]);

        let rows = complete
            .iter()
            .enumerate()
            .map(|(i, (item, _))| ComponentScore {
                item_id: item.item_id.clone(),
                title: item.title.clone(),
                score: to_score(&weights, &[scaled[0][i], scaled[1][i], scaled[2][i]]),
            })
            .collect();

        let names = ["vote_average", "vote_count", "popularity"];
        let mut features = Vec::with_capacity(6);
        for (name, col) in names.iter().zip(raw.iter()) {
            features.push(FeatureColumn::dense(*name, col));
        }
        for (name, col) in names.iter().zip(scaled.iter()) {
            features.push(FeatureColumn::dense(format!("{name}_norm"), col));
        }

        ComponentTable::from_unsorted(Domain::Rating, rows, features)
    }
}
