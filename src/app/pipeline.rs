//! Shared scoring pipeline used by the `score`, `rank`, and `blend` commands.
//!
//! catalog -> domain scorers (in parallel) -> blend -> exports
//!
//! The commands differ only in what they print and write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::info;

use crate::blend::{FinalRanking, blend};
use crate::domain::{CatalogItem, ComponentTable, Domain, RankConfig};
use crate::error::AppError;
use crate::io::{self, IngestedCatalog};
use crate::report::{CatalogCounts, RunLog, StageCounts};
use crate::scoring::{ComponentScorer, TimeQuality, build_scorers, time_data_quality};

/// All computed outputs of a catalog run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub catalog: IngestedCatalog,
    pub tables: BTreeMap<Domain, ComponentTable>,
    pub ranking: FinalRanking,
    pub time_quality: TimeQuality,
}

impl RunOutput {
    pub fn stage_counts(&self) -> StageCounts {
        StageCounts {
            catalog: Some(CatalogCounts {
                read: self.catalog.rows_read,
                used: self.catalog.rows_used,
            }),
            domain_rows: self.tables.iter().map(|(d, t)| (*d, t.len())).collect(),
            final_rows: self.ranking.len(),
        }
    }
}

/// Run every domain scorer over the catalog. Scorers share nothing, so they
/// run on the rayon pool; the result is keyed by domain.
pub fn score_catalog(catalog: &[CatalogItem], config: &RankConfig) -> BTreeMap<Domain, ComponentTable> {
    let scorers = build_scorers(config);
    let tables: Vec<(Domain, ComponentTable)> = scorers
        .par_iter()
        .map(|scorer| {
            let table = scorer.compute(catalog);
            info!(domain = %scorer.domain(), rows = table.len(), "pipeline: domain scored");
            (scorer.domain(), table)
        })
        .collect();
    tables.into_iter().collect()
}

/// Score and blend an already ingested catalog.
pub fn run_pipeline(catalog: IngestedCatalog, config: &RankConfig) -> Result<RunOutput, AppError> {
    config.validate()?;
    let tables = score_catalog(&catalog.items, config);
    let ranking = blend(&tables, &config.weights)?;
    let time_quality = time_data_quality(&catalog.items, config);
    Ok(RunOutput {
        catalog,
        tables,
        ranking,
        time_quality,
    })
}

/// Load a catalog CSV, then score and blend it.
pub fn run_catalog(path: &Path, config: &RankConfig) -> Result<RunOutput, AppError> {
    let catalog = io::load_catalog(path)?;
    run_pipeline(catalog, config)
}

/// Write every table, diagnostic, and the run log for a catalog run.
pub fn write_run_outputs(
    out_dir: &Path,
    run: &RunOutput,
    config: &RankConfig,
    command: &str,
) -> Result<Vec<PathBuf>, AppError> {
    io::ensure_dir(out_dir)?;
    let mut written = Vec::new();

    for table in run.tables.values() {
        written.push(io::write_component_table(out_dir, table)?);
        written.push(io::write_feature_table(out_dir, table)?);
    }
    if let Some(business) = run.tables.get(&Domain::Business) {
        let (top, bottom) = io::write_business_previews(out_dir, business)?;
        written.extend([top, bottom]);
    }
    written.push(io::write_time_quality(out_dir, &run.time_quality)?);

    written.extend(write_ranking_outputs(out_dir, &run.ranking, config, command, run.stage_counts())?);
    info!(files = written.len(), dir = %out_dir.display(), "pipeline: outputs written");
    Ok(written)
}

/// Final tables, JSON, and run log. Shared by catalog runs and standalone blends.
pub fn write_ranking_outputs(
    out_dir: &Path,
    ranking: &FinalRanking,
    config: &RankConfig,
    command: &str,
    counts: StageCounts,
) -> Result<Vec<PathBuf>, AppError> {
    io::ensure_dir(out_dir)?;
    let (full, top) = io::write_final_tables(out_dir, ranking, config.top_n)?;
    let json = io::write_recommendations_json(out_dir, ranking, config.top_n, config.as_of)?;
    let log = RunLog {
        as_of: config.as_of,
        command: command.to_string(),
        top_n: config.top_n,
        weights: ranking.weights.clone(),
        counts,
        skipped: ranking.missing.clone(),
    }
    .write(out_dir)?;
    Ok(vec![full, top, json, log])
}

/// Blend component tables previously written to `tables_dir`.
pub fn run_blend(tables_dir: &Path, allow_missing: bool, config: &RankConfig) -> Result<FinalRanking, AppError> {
    config.validate()?;
    let tables = io::load_component_tables(tables_dir, allow_missing)?;
    blend(&tables, &config.weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    const CATALOG: &str = "\
id,title,overview,genres,keywords,production_companies,spoken_languages,original_language,budget,revenue,vote_average,vote_count,popularity,runtime,release_date
1,Space Saga,\"A crew travels through a wormhole, far from home.\",\"[{'name': 'Science Fiction'}, {'name': 'Adventure'}]\",\"[{'name': 'space'}, {'name': 'wormhole'}]\",\"[{'name': 'Walt Disney Pictures'}, {'name': 'Pixar'}]\",\"[{'iso_639_1': 'en', 'name': 'English'}]\",en,100000000,700000000,8.4,20000,120.5,125,2024-06-01
2,Quiet Drama,A family story.,Drama,family,Tiny Films,Français,fr,1000000,2000000,6.1,300,4.2,95,2011-09-14
3,Unknown Reel,,,,,,,,,,,,,
4,Space Saga II,\"The crew returns to space.\",\"Science Fiction, Adventure\",\"space, sequel\",Universal Pictures,English,en,0,50000000,7.2,8000,60.0,140,2023/03/10
5,,Missing title,,,,,,,,,,,,
";

    fn config() -> RankConfig {
        RankConfig::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    fn run() -> RunOutput {
        let catalog = io::read_catalog(CATALOG.as_bytes()).unwrap();
        run_pipeline(catalog, &config()).unwrap()
    }

    #[test]
    fn every_domain_is_scored_with_its_own_policy() {
        let out = run();
        assert_eq!(out.catalog.rows_used, 4);
        assert_eq!(out.tables.len(), 4);
        assert_eq!(out.tables[&Domain::Content].len(), 4);
        assert_eq!(out.tables[&Domain::Time].len(), 4);
        // Item 3 has no ratings.
        assert_eq!(out.tables[&Domain::Rating].len(), 3);
        // Item 3 has no revenue, budget, or companies cell.
        assert_eq!(out.tables[&Domain::Business].len(), 3);
        assert_eq!(out.ranking.len(), 4);
    }

    #[test]
    fn final_ranking_is_ordered_and_bounded() {
        let out = run();
        assert_eq!(out.ranking.rows[0].item_id, "1");
        for (i, row) in out.ranking.rows.iter().enumerate() {
            assert_eq!(row.rank, i + 1);
            assert!((0.0..=100.0).contains(&row.final_score));
        }
        assert!(
            out.ranking
                .rows
                .windows(2)
                .all(|w| w[0].final_score >= w[1].final_score)
        );
    }

    #[test]
    fn reruns_write_identical_bytes() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let files_a = write_run_outputs(a.path(), &run(), &config(), "mrank score").unwrap();
        let files_b = write_run_outputs(b.path(), &run(), &config(), "mrank score").unwrap();

        assert_eq!(files_a.len(), files_b.len());
        for (fa, fb) in files_a.iter().zip(&files_b) {
            assert_eq!(fa.file_name(), fb.file_name());
            assert_eq!(fs::read(fa).unwrap(), fs::read(fb).unwrap(), "{}", fa.display());
        }
    }

    #[test]
    fn written_tables_blend_back_to_the_same_ranking() {
        let dir = tempfile::tempdir().unwrap();
        let out = run();
        write_run_outputs(dir.path(), &out, &config(), "mrank score").unwrap();

        let reblended = run_blend(dir.path(), false, &config()).unwrap();
        let ids: Vec<&str> = reblended.rows.iter().map(|r| r.item_id.as_str()).collect();
        let expected: Vec<&str> = out.ranking.rows.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn blend_with_absent_table_needs_permission() {
        let dir = tempfile::tempdir().unwrap();
        write_run_outputs(dir.path(), &run(), &config(), "mrank score").unwrap();
        fs::remove_file(dir.path().join("03_business_scores.csv")).unwrap();

        let err = run_blend(dir.path(), false, &config()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MissingInput);

        let ranking = run_blend(dir.path(), true, &config()).unwrap();
        assert_eq!(ranking.len(), 4);
        assert_eq!(ranking.missing, vec![Domain::Business]);
    }
}
