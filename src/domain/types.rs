//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during scoring and blending
//! - exported to CSV/JSON
//! - reloaded later for a standalone blend

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One scoring domain. The declaration order is the canonical order used for
/// joins, column layout, and tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Content,
    Rating,
    Business,
    Time,
}

impl Domain {
    pub const ALL: [Domain; 4] = [Domain::Content, Domain::Rating, Domain::Business, Domain::Time];

    /// Column/key prefix (`content`, `rating`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Domain::Content => "content",
            Domain::Rating => "rating",
            Domain::Business => "business",
            Domain::Time => "time",
        }
    }

    /// File stem of the exported component table.
    pub fn table_stem(self) -> &'static str {
        match self {
            Domain::Content => "01_content_scores",
            Domain::Rating => "02_rating_scores",
            Domain::Business => "03_business_scores",
            Domain::Time => "04_time_scores",
        }
    }

    /// One-line rationale recorded next to the effective weight in the run log.
    pub fn rationale(self) -> &'static str {
        match self {
            Domain::Content => "text and tag richness keeps recommendations on-topic",
            Domain::Rating => "audience votes and popularity measure reception",
            Domain::Business => "return on investment and major-studio backing",
            Domain::Time => "recency, language match, and runtime fit",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A catalog row as delivered by ingest. Read-only for the whole pipeline.
///
/// List-like fields (`genres`, `keywords`, ...) stay as raw cell text; each
/// consumer parses them with `text::cells`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogItem {
    pub item_id: String,
    pub title: String,
    pub overview: Option<String>,

    pub genres: Option<String>,
    pub keywords: Option<String>,
    pub production_companies: Option<String>,
    pub spoken_languages: Option<String>,
    pub original_language: Option<String>,

    pub budget: Option<f64>,
    pub revenue: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<f64>,
    pub popularity: Option<f64>,
    pub runtime: Option<f64>,

    pub release_date: Option<NaiveDate>,
}

/// A single domain's 0–100 score for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub item_id: String,
    pub title: String,
    pub score: f64,
}

/// A named diagnostic column aligned row-for-row with a component table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl FeatureColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn dense(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().copied().map(Some).collect())
    }
}

/// One domain's output: rows sorted by descending score (stable), plus
/// optional diagnostic columns in the same row order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentTable {
    pub domain: Domain,
    pub rows: Vec<ComponentScore>,
    pub features: Vec<FeatureColumn>,
}

impl ComponentTable {
    /// Build a table from rows in input order, sorting rows and feature
    /// columns together by descending score. Equal scores keep input order.
    pub fn from_unsorted(domain: Domain, rows: Vec<ComponentScore>, features: Vec<FeatureColumn>) -> Self {
        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by(|&a, &b| {
            rows[b]
                .score
                .partial_cmp(&rows[a].score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let sorted_rows = order.iter().map(|&i| rows[i].clone()).collect();
        let sorted_features = features
            .into_iter()
            .map(|col| FeatureColumn {
                values: order
                    .iter()
                    .map(|&i| col.values.get(i).copied().flatten())
                    .collect(),
                name: col.name,
            })
            .collect();

        Self {
            domain,
            rows: sorted_rows,
            features: sorted_features,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Top-level blend weights: `domain → weight`, weight ≥ 0, at least one > 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    weights: BTreeMap<Domain, f64>,
}

impl Default for BlendWeights {
    fn default() -> Self {
        let weights = BTreeMap::from([
            (Domain::Content, 0.40),
            (Domain::Rating, 0.25),
            (Domain::Business, 0.20),
            (Domain::Time, 0.15),
        ]);
        Self { weights }
    }
}

impl BlendWeights {
    pub fn from_map(weights: BTreeMap<Domain, f64>) -> Self {
        Self { weights }
    }

    pub fn get(&self, domain: Domain) -> f64 {
        self.weights.get(&domain).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, domain: Domain, weight: f64) {
        self.weights.insert(domain, weight);
    }

    /// Check the invariant without renormalizing.
    pub fn validate(&self) -> Result<(), AppError> {
        for (domain, w) in &self.weights {
            if !w.is_finite() || *w < 0.0 {
                return Err(AppError::weights(format!(
                    "Blend weight for `{domain}` must be finite and >= 0 (got {w})."
                )));
            }
        }
        let total: f64 = self.weights.values().sum();
        if total <= 0.0 {
            return Err(AppError::weights("Blend weights must sum to a positive value."));
        }
        Ok(())
    }

    /// Weights scaled to sum to 1 across every configured domain.
    pub fn normalized(&self) -> Result<BTreeMap<Domain, f64>, AppError> {
        self.validate()?;
        let total: f64 = self.weights.values().sum();
        Ok(self.weights.iter().map(|(d, w)| (*d, w / total)).collect())
    }
}

/// Per-domain columns of a final row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainContribution {
    /// Component score as produced by the domain (absent if the item was not scored there).
    pub raw: Option<f64>,
    /// Blend-time min-max of `raw`; `0.0` when absent.
    pub normalized: f64,
}

/// One row of the final ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalScore {
    pub rank: usize,
    pub item_id: String,
    pub title: String,
    pub per_domain: BTreeMap<Domain, DomainContribution>,
    pub final_score: f64,
}
