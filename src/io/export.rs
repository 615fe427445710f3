//! Export component tables, diagnostics, and the final ranking.
//!
//! Every table is plain CSV (via `csv::Writer`, so titles with commas or
//! quotes survive) and every score is written with 2 decimals, which keeps
//! reruns byte-identical.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::blend::FinalRanking;
use crate::domain::{ComponentTable, Domain, FinalScore};
use crate::error::AppError;
use crate::scoring::TimeQuality;

/// Number of rows in each business preview table.
pub const PREVIEW_ROWS: usize = 20;

pub const FINAL_TABLE: &str = "05_final_scores.csv";
pub const TOP_TABLE: &str = "05_top_recommendations.csv";
pub const RECOMMENDATIONS_JSON: &str = "recommendations.json";

pub fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create output directory '{}': {e}", dir.display())))
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::io(format!("Failed to create '{}': {e}", path.display())))
}

fn csv_err(e: csv::Error) -> AppError {
    AppError::io(format!("Failed to write CSV: {e}"))
}

fn fmt_score(v: f64) -> String {
    format!("{v:.2}")
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.6}")).unwrap_or_default()
}

/// `item_id,title,component_score`, in table order.
pub fn render_component_table<W: Write>(out: W, table: &ComponentTable) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record(["item_id", "title", "component_score"]).map_err(csv_err)?;
    for row in &table.rows {
        w.write_record([row.item_id.as_str(), row.title.as_str(), fmt_score(row.score).as_str()])
            .map_err(csv_err)?;
    }
    w.flush().map_err(|e| AppError::io(format!("Failed to flush CSV: {e}")))
}

/// Write `<NN>_<domain>_scores.csv` into `dir`.
pub fn write_component_table(dir: &Path, table: &ComponentTable) -> Result<PathBuf, AppError> {
    let path = dir.join(format!("{}.csv", table.domain.table_stem()));
    render_component_table(create(&path)?, table)?;
    Ok(path)
}

/// Scores plus every diagnostic feature column.
pub fn render_feature_table<W: Write>(out: W, table: &ComponentTable) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(out);
    let mut header = vec!["item_id".to_string(), "title".to_string(), "component_score".to_string()];
    header.extend(table.features.iter().map(|c| c.name.clone()));
    w.write_record(&header).map_err(csv_err)?;

    for (i, row) in table.rows.iter().enumerate() {
        let mut record = vec![row.item_id.clone(), row.title.clone(), fmt_score(row.score)];
        record.extend(
            table
                .features
                .iter()
                .map(|c| fmt_opt(c.values.get(i).copied().flatten())),
        );
        w.write_record(&record).map_err(csv_err)?;
    }
    w.flush().map_err(|e| AppError::io(format!("Failed to flush CSV: {e}")))
}

pub fn write_feature_table(dir: &Path, table: &ComponentTable) -> Result<PathBuf, AppError> {
    let path = dir.join(format!("{}_features.csv", table.domain.name()));
    render_feature_table(create(&path)?, table)?;
    Ok(path)
}

/// Highest and lowest scoring business rows. The bottom preview lists the
/// weakest row first.
pub fn write_business_previews(dir: &Path, table: &ComponentTable) -> Result<(PathBuf, PathBuf), AppError> {
    let n = PREVIEW_ROWS.min(table.len());
    let top = ComponentTable {
        domain: table.domain,
        rows: table.rows[..n].to_vec(),
        features: Vec::new(),
    };
    let bottom = ComponentTable {
        domain: table.domain,
        rows: table.rows[table.len() - n..].iter().rev().cloned().collect(),
        features: Vec::new(),
    };

    let top_path = dir.join("03_business_top20.csv");
    let bottom_path = dir.join("03_business_bottom20.csv");
    render_component_table(create(&top_path)?, &top)?;
    render_component_table(create(&bottom_path)?, &bottom)?;
    Ok((top_path, bottom_path))
}

/// `metric,value` summary of the time/locale inputs.
pub fn write_time_quality(dir: &Path, quality: &TimeQuality) -> Result<PathBuf, AppError> {
    let path = dir.join("04_time_data_quality.csv");
    let mut w = csv::Writer::from_writer(create(&path)?);
    w.write_record(["metric", "value"]).map_err(csv_err)?;

    let rows: [(&str, String); 9] = [
        ("n_rows", quality.n_rows.to_string()),
        ("runtime_mean", fmt_opt(quality.runtime_mean)),
        ("runtime_median", fmt_opt(quality.runtime_median)),
        ("runtime_90pct", fmt_opt(quality.runtime_90pct)),
        ("release_date_missing_pct", fmt_score(quality.release_date_missing_pct)),
        ("runtime_missing_pct", fmt_score(quality.runtime_missing_pct)),
        ("spoken_languages_missing_pct", fmt_score(quality.spoken_languages_missing_pct)),
        ("original_language_missing_pct", fmt_score(quality.original_language_missing_pct)),
        ("lang_match_pct", fmt_score(quality.lang_match_pct)),
    ];
    for (metric, value) in rows {
        w.write_record([metric, value.as_str()]).map_err(csv_err)?;
    }
    w.flush().map_err(|e| AppError::io(format!("Failed to flush CSV: {e}")))?;
    Ok(path)
}

/// Columns of the final table, given the domains the ranking carries.
fn final_header(domains: &[Domain]) -> Vec<String> {
    let mut header = vec!["rank".to_string(), "item_id".to_string(), "title".to_string()];
    header.extend(domains.iter().map(|d| format!("{}_score", d.name())));
    header.extend(domains.iter().map(|d| format!("{}_normalized", d.name())));
    header.push("final_score".to_string());
    header
}

/// `rank,item_id,title,<domain>_score...,<domain>_normalized...,final_score`.
///
/// A domain missing for an item leaves its raw column empty; the normalized
/// column shows the 0 it contributed.
pub fn render_final_table<W: Write>(out: W, rows: &[FinalScore], domains: &[Domain]) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record(final_header(domains)).map_err(csv_err)?;

    for row in rows {
        let mut record = vec![row.rank.to_string(), row.item_id.clone(), row.title.clone()];
        record.extend(domains.iter().map(|d| {
            row.per_domain
                .get(d)
                .and_then(|c| c.raw)
                .map(fmt_score)
                .unwrap_or_default()
        }));
        record.extend(domains.iter().map(|d| {
            let v = row.per_domain.get(d).map_or(0.0, |c| c.normalized);
            format!("{v:.4}")
        }));
        record.push(fmt_score(row.final_score));
        w.write_record(&record).map_err(csv_err)?;
    }
    w.flush().map_err(|e| AppError::io(format!("Failed to flush CSV: {e}")))
}

/// Domains that have a column in `ranking`'s rows, in canonical order.
pub fn ranking_domains(ranking: &FinalRanking) -> Vec<Domain> {
    let mut domains: Vec<Domain> = ranking.weights.keys().copied().collect();
    for d in &ranking.present {
        if !domains.contains(d) {
            domains.push(*d);
        }
    }
    domains.sort();
    domains
}

/// Write the full final table and its top-N slice.
pub fn write_final_tables(dir: &Path, ranking: &FinalRanking, top_n: usize) -> Result<(PathBuf, PathBuf), AppError> {
    let domains = ranking_domains(ranking);
    let full = dir.join(FINAL_TABLE);
    let top = dir.join(TOP_TABLE);
    render_final_table(create(&full)?, &ranking.rows, &domains)?;
    render_final_table(create(&top)?, ranking.top(top_n), &domains)?;
    Ok((full, top))
}

#[derive(Debug, Serialize)]
struct RecommendationSet<'a> {
    generated_for: String,
    weights: Vec<WeightEntry>,
    items: Vec<RecommendationItem<'a>>,
}

#[derive(Debug, Serialize)]
struct WeightEntry {
    domain: Domain,
    weight: f64,
    rationale: &'static str,
}

#[derive(Debug, Serialize)]
struct RecommendationItem<'a> {
    rank: usize,
    item_id: &'a str,
    title: &'a str,
    final_score: f64,
    scores: std::collections::BTreeMap<Domain, Option<f64>>,
}

/// Compact JSON of the top-N items plus effective weights, for a front end.
pub fn render_recommendations_json<W: Write>(
    out: W,
    ranking: &FinalRanking,
    top_n: usize,
    as_of: chrono::NaiveDate,
) -> Result<(), AppError> {
    let payload = RecommendationSet {
        generated_for: as_of.to_string(),
        weights: ranking
            .weights
            .iter()
            .map(|(d, w)| WeightEntry {
                domain: *d,
                weight: crate::math::round_to(*w, 4),
                rationale: d.rationale(),
            })
            .collect(),
        items: ranking
            .top(top_n)
            .iter()
            .map(|r| RecommendationItem {
                rank: r.rank,
                item_id: &r.item_id,
                title: &r.title,
                final_score: r.final_score,
                scores: r.per_domain.iter().map(|(d, c)| (*d, c.raw)).collect(),
            })
            .collect(),
    };
    serde_json::to_writer_pretty(out, &payload)
        .map_err(|e| AppError::io(format!("Failed to write recommendations JSON: {e}")))
}

pub fn write_recommendations_json(
    dir: &Path,
    ranking: &FinalRanking,
    top_n: usize,
    as_of: chrono::NaiveDate,
) -> Result<PathBuf, AppError> {
    let path = dir.join(RECOMMENDATIONS_JSON);
    render_recommendations_json(create(&path)?, ranking, top_n, as_of)?;
    Ok(path)
}
