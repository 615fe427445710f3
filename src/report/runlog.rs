//! Human-readable `run_log.txt`.
//!
//! The header carries the as-of date rather than the wall clock so that two
//! runs over the same inputs write the same bytes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::Domain;
use crate::error::AppError;
use crate::report::format::{format_weights, join_domains};

pub const RUN_LOG: &str = "run_log.txt";

/// Catalog-level row counts (absent for a standalone blend).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCounts {
    pub read: usize,
    pub used: usize,
}

/// Rows surviving each stage of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCounts {
    pub catalog: Option<CatalogCounts>,
    pub domain_rows: BTreeMap<Domain, usize>,
    pub final_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunLog {
    pub as_of: NaiveDate,
    pub command: String,
    pub top_n: usize,
    pub weights: BTreeMap<Domain, f64>,
    pub counts: StageCounts,
    pub skipped: Vec<Domain>,
}

impl RunLog {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("[{}] Blending executed.\n", self.as_of));
        out.push_str(&format!("Run command: {}\n", self.command));
        out.push_str(&format!("Top-N exported: {}\n", self.top_n));
        out.push_str("Weights (after normalization):\n");
        out.push_str(&format_weights(&self.weights));

        out.push_str("Row counts:\n");
        if let Some(c) = self.counts.catalog {
            out.push_str(&format!("  - catalog rows read: {}\n", c.read));
            out.push_str(&format!("  - catalog rows used: {}\n", c.used));
            out.push_str(&format!("  - catalog rows rejected: {}\n", c.read - c.used));
        }
        for (domain, rows) in &self.counts.domain_rows {
            out.push_str(&format!("  - {domain} rows: {rows}"));
            if let Some(c) = self.counts.catalog {
                let lost = c.used.saturating_sub(*rows);
                match domain {
                    Domain::Rating => out.push_str(&format!(" (dropped {lost} with missing metrics)")),
                    Domain::Business => out.push_str(&format!(" (excluded {lost} without any signal)")),
                    _ => {}
                }
            }
            out.push('\n');
        }
        out.push_str(&format!("  - final rows: {}\n", self.counts.final_rows));
        out.push_str(&format!("Skipped domains: {}\n", join_domains(&self.skipped)));
        out
    }

    pub fn write(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let path = dir.join(RUN_LOG);
        std::fs::write(&path, self.render())
            .map_err(|e| AppError::io(format!("Failed to write run log '{}': {e}", path.display())))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(catalog: Option<CatalogCounts>) -> RunLog {
        RunLog {
            as_of: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            command: "mrank score".to_string(),
            top_n: 20,
            weights: BTreeMap::from([
                (Domain::Content, 0.4),
                (Domain::Rating, 0.25),
                (Domain::Business, 0.2),
                (Domain::Time, 0.15),
            ]),
            counts: StageCounts {
                catalog,
                domain_rows: BTreeMap::from([(Domain::Content, 10), (Domain::Rating, 7), (Domain::Business, 9)]),
                final_rows: 10,
            },
            skipped: vec![Domain::Time],
        }
    }

    #[test]
    fn run_log_lists_weights_and_stage_counts() {
        let text = log(Some(CatalogCounts { read: 12, used: 10 })).render();
        assert!(text.starts_with("[2025-01-01] Blending executed.\n"));
        assert!(text.contains("  - content: 40.00% "));
        assert!(text.contains("  - catalog rows rejected: 2\n"));
        assert!(text.contains("  - rating rows: 7 (dropped 3 with missing metrics)\n"));
        assert!(text.contains("  - business rows: 9 (excluded 1 without any signal)\n"));
        assert!(text.contains("  - final rows: 10\n"));
        assert!(text.ends_with("Skipped domains: time\n"));
    }

    #[test]
    fn standalone_blend_omits_catalog_counts() {
        let text = log(None).render();
        assert!(!text.contains("catalog rows"));
        assert!(text.contains("  - rating rows: 7\n"));
    }
}
