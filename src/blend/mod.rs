//! Blending of per-domain component tables into one ranked list.
//!
//! Contract:
//!
//! 1. Each present table's scores are min-max normalized again at blend time,
//!    independently of whatever happened inside the domain.
//! 2. Tables are outer-joined on `item_id`: an item in any table is ranked.
//! 3. A domain missing for an item (or missing entirely) contributes `0.0`.
//!    Top-level weights are renormalized once, over all configured domains,
//!    and are *not* redistributed per row. This differs on purpose from the
//!    business domain's per-row renormalization.
//! 4. `final = 100 * Σ w_d * normalized_d`, rounded to 2 decimals, sorted
//!    descending; equal scores keep first-appearance order (domains in
//!    canonical order, rows in table order). Ranks are `1..=n`.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{BlendWeights, ComponentTable, Domain, DomainContribution, FinalScore};
use crate::error::AppError;
use crate::math::{minmax, round_to};

const FINAL_DECIMALS: i32 = 2;

/// Output of a blend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalRanking {
    pub rows: Vec<FinalScore>,
    /// Effective (renormalized) weights.
    pub weights: BTreeMap<Domain, f64>,
    /// Domains that had a table at blend time.
    pub present: Vec<Domain>,
    /// Weighted domains without a table; they contribute 0 to every item.
    pub missing: Vec<Domain>,
}

impl FinalRanking {
    /// The first `min(n, len)` rows.
    pub fn top(&self, n: usize) -> &[FinalScore] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

struct Joined {
    item_id: String,
    title: String,
    per_domain: BTreeMap<Domain, DomainContribution>,
}

/// Blend whichever domain tables are present.
pub fn blend(tables: &BTreeMap<Domain, ComponentTable>, weights: &BlendWeights) -> Result<FinalRanking, AppError> {
    let effective = weights.normalized()?;
    if tables.is_empty() {
        return Err(AppError::missing_input("No component tables to blend."));
    }

    let present: Vec<Domain> = tables.keys().copied().collect();
    let missing: Vec<Domain> = effective
        .keys()
        .copied()
        .filter(|d| !tables.contains_key(d))
        .collect();
    for d in &missing {
        warn!(domain = %d, "blend: domain table absent; contributing 0 for every item");
    }

    // Every domain that gets a column: weighted ones plus any extra present table.
    let mut columns: Vec<Domain> = effective.keys().copied().collect();
    for d in &present {
        if !columns.contains(d) {
            columns.push(*d);
        }
    }
    columns.sort();

    let mut joined: Vec<Joined> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (domain, table) in tables {
        let raw: Vec<Option<f64>> = table.rows.iter().map(|r| Some(r.score)).collect();
        let normalized = minmax(&raw);

        for (row, norm) in table.rows.iter().zip(normalized) {
            let slot = *index.entry(row.item_id.clone()).or_insert_with(|| {
                joined.push(Joined {
                    item_id: row.item_id.clone(),
                    title: row.title.clone(),
                    per_domain: columns
                        .iter()
                        .map(|d| (*d, DomainContribution { raw: None, normalized: 0.0 }))
                        .collect(),
                });
                joined.len() - 1
            });

            let entry = joined[slot].per_domain.entry(*domain).or_insert(DomainContribution {
                raw: None,
                normalized: 0.0,
            });
            if entry.raw.is_some() {
                warn!(domain = %domain, item_id = %row.item_id, "blend: duplicate item in table; keeping first");
                continue;
            }
            *entry = DomainContribution {
                raw: Some(row.score),
                normalized: norm.unwrap_or(0.0),
            };
        }
    }

    let mut rows: Vec<FinalScore> = joined
        .into_iter()
        .map(|j| {
            let blended: f64 = effective
                .iter()
                .map(|(d, w)| w * j.per_domain.get(d).map_or(0.0, |c| c.normalized))
                .sum();
            FinalScore {
                rank: 0,
                item_id: j.item_id,
                title: j.title,
                per_domain: j.per_domain,
                final_score: round_to((blended * 100.0).clamp(0.0, 100.0), FINAL_DECIMALS),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (idx, row) in rows.iter_mut().enumerate() {
        row.rank = idx + 1;
    }

    info!(items = rows.len(), domains = present.len(), "blend: final ranking built");

    Ok(FinalRanking {
        rows,
        weights: effective,
        present,
        missing,
    })
}
