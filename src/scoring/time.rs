//! Timeliness and locale: recency, language match, runtime fit.
//!
//! - recency: `exp(-age_days / time_constant)`, age clamped at 0; an unknown
//!   release date counts as `unknown_age_days` old
//! - language: 1.0 if the original language or any spoken language equals
//!   the target language, else 0.0
//! - runtime: `clamp(1 - |runtime - ideal| / max_dev, 0, 1)`, missing runtime = 0
//!
//! Every row is scored; nothing is excluded.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    CatalogItem, ComponentScore, ComponentTable, Domain, FeatureColumn, RankConfig, RecencyDecay, RuntimeFit,
    TimeWeights,
};
use crate::math::{mean, quantile, round_to};
use crate::scoring::{ComponentScorer, to_score, unit_weights};
use crate::text::{ListStyle, parse_list_cell};

#[derive(Debug, Clone)]
pub struct TimeScorer {
    as_of: NaiveDate,
    target_language: String,
    recency: RecencyDecay,
    runtime: RuntimeFit,
    weights: TimeWeights,
}

impl TimeScorer {
    pub fn new(config: &RankConfig) -> Self {
        Self {
            as_of: config.as_of,
            target_language: config.target_language.trim().to_lowercase(),
            recency: config.recency,
            runtime: config.runtime,
            weights: config.time_weights,
        }
    }

    pub fn age_days(&self, release: Option<NaiveDate>) -> f64 {
        match release {
            Some(d) => ((self.as_of - d).num_days() as f64).max(0.0),
            None => self.recency.unknown_age_days.max(0.0),
        }
    }

    pub fn recency(&self, release: Option<NaiveDate>) -> f64 {
        (-self.age_days(release) / self.recency.time_constant_days).exp()
    }

    pub fn language_match(&self, item: &CatalogItem) -> bool {
        language_matches(item, &self.target_language)
    }

    pub fn runtime_fit(&self, runtime: Option<f64>) -> f64 {
        let minutes = runtime.filter(|r| r.is_finite()).unwrap_or(0.0);
        let dev = (minutes - self.runtime.ideal_minutes).abs();
        (1.0 - dev / self.runtime.max_deviation_minutes).clamp(0.0, 1.0)
    }
}

fn language_matches(item: &CatalogItem, target: &str) -> bool {
    let original = item
        .original_language
        .as_deref()
        .map(|s| s.trim().to_lowercase());
    if original.as_deref() == Some(target) {
        return true;
    }
    parse_list_cell(item.spoken_languages.as_deref(), ListStyle::Languages)
        .iter()
        .any(|l| l == target)
}

impl ComponentScorer for TimeScorer {
    fn domain(&self) -> Domain {
        Domain::Time
    }

    fn compute(&self, catalog: &[CatalogItem]) -> ComponentTable {
        let weights = unit_weights([self.weights.recency, self.weights.language, self.weights.runtime]);

        let recency: Vec<f64> = catalog.iter().map(|i| self.recency(i.release_date)).collect();
        let language: Vec<f64> = catalog
            .iter()
            .map(|i| if self.language_match(i) { 1.0 } else { 0.0 })
            .collect();
        let runtime: Vec<f64> = catalog.iter().map(|i| self.runtime_fit(i.runtime)).collect();

        let rows = catalog
            .iter()
            .enumerate()
            .map(|(i, item)| ComponentScore {
                item_id: item.item_id.clone(),
                title: item.title.clone(),
                score: round_to(to_score(&weights, &[recency[i], language[i], runtime[i]]), 2),
            })
            .collect();

        let features = vec![
            FeatureColumn::dense("recency", &recency),
            FeatureColumn::dense("language_match", &language),
            FeatureColumn::dense("runtime_fit", &runtime),
        ];

        ComponentTable::from_unsorted(Domain::Time, rows, features)
    }
}

/// Data-quality summary of the time/locale inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeQuality {
    pub n_rows: usize,
    pub runtime_mean: Option<f64>,
    pub runtime_median: Option<f64>,
    pub runtime_90pct: Option<f64>,
    pub release_date_missing_pct: f64,
    pub runtime_missing_pct: f64,
    pub spoken_languages_missing_pct: f64,
    pub original_language_missing_pct: f64,
    pub lang_match_pct: f64,
}

pub fn time_data_quality(catalog: &[CatalogItem], config: &RankConfig) -> TimeQuality {
    let n = catalog.len();
    let pct = |count: usize| if n == 0 { 0.0 } else { 100.0 * count as f64 / n as f64 };

    let mut runtimes: Vec<f64> = catalog
        .iter()
        .filter_map(|i| i.runtime.filter(|r| r.is_finite()))
        .collect();
    runtimes.sort_by(f64::total_cmp);
    let (median, p90) = if runtimes.is_empty() {
        (None, None)
    } else {
        (Some(quantile(&runtimes, 0.5)), Some(quantile(&runtimes, 0.9)))
    };

    let target = config.target_language.trim().to_lowercase();
    let missing_spoken = catalog
        .iter()
        .filter(|i| parse_list_cell(i.spoken_languages.as_deref(), ListStyle::Languages).is_empty())
        .count();
    let missing_original = catalog
        .iter()
        .filter(|i| i.original_language.as_deref().is_none_or(|s| s.trim().is_empty()))
        .count();

    TimeQuality {
        n_rows: n,
        runtime_mean: mean(&runtimes),
        runtime_median: median,
        runtime_90pct: p90,
        release_date_missing_pct: pct(catalog.iter().filter(|i| i.release_date.is_none()).count()),
        runtime_missing_pct: pct(n - runtimes.len()),
        spoken_languages_missing_pct: pct(missing_spoken),
        original_language_missing_pct: pct(missing_original),
        lang_match_pct: pct(catalog.iter().filter(|i| language_matches(i, &target)).count()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::fixtures::{as_of, config, item};

    fn timed(id: &str, release: Option<NaiveDate>, lang: Option<&str>, runtime: Option<f64>) -> CatalogItem {
        CatalogItem {
            release_date: release,
            original_language: lang.map(str::to_string),
            runtime,
            ..item(id, id)
        }
    }

    #[test]
    fn recency_decays_with_age() {
        let scorer = TimeScorer::new(&config());
        assert!((scorer.recency(Some(as_of())) - 1.0).abs() < 1e-12);

        let two_years = as_of() - chrono::Duration::days(730);
        assert!((scorer.recency(Some(two_years)) - (-1.0f64).exp()).abs() < 1e-12);

        // Future releases are not boosted beyond 1.
        let future = as_of() + chrono::Duration::days(30);
        assert!((scorer.recency(Some(future)) - 1.0).abs() < 1e-12);

        // Unknown dates are maximally old, not dropped.
        assert!(scorer.recency(None) < 1e-20);
    }

    #[test]
    fn runtime_fit_is_triangular() {
        let scorer = TimeScorer::new(&config());
        assert!((scorer.runtime_fit(Some(110.0)) - 1.0).abs() < 1e-12);
        assert!((scorer.runtime_fit(Some(170.0)) - 0.5).abs() < 1e-12);
        assert_eq!(scorer.runtime_fit(Some(400.0)), 0.0);
        assert!((scorer.runtime_fit(None) - (1.0 - 110.0 / 120.0)).abs() < 1e-12);
    }

    #[test]
    fn language_matches_original_or_spoken() {
        let scorer = TimeScorer::new(&config());
        assert!(scorer.language_match(&timed("a", None, Some("EN"), None)));

        let spoken = CatalogItem {
            spoken_languages: Some(r#"[{"iso_639_1":"en","name":"English"}]"#.to_string()),
            ..timed("b", None, Some("fr"), None)
        };
        assert!(scorer.language_match(&spoken));
        assert!(!scorer.language_match(&timed("c", None, Some("fr"), None)));
    }

    #[test]
    fn every_row_is_scored_and_bounded() {
        let catalog = vec![
            timed("new", Some(as_of()), Some("en"), Some(110.0)),
            timed("unknown", None, None, None),
            timed("old", NaiveDate::from_ymd_opt(1990, 5, 1), Some("ja"), Some(95.0)),
        ];
        let table = TimeScorer::new(&config()).compute(&catalog);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0].item_id, "new");
        assert!((table.rows[0].score - 100.0).abs() < 1e-9);
        for r in &table.rows {
            assert!((0.0..=100.0).contains(&r.score));
        }
    }

    #[test]
    fn data_quality_reports_missingness() {
        let catalog = vec![
            timed("a", Some(as_of()), Some("en"), Some(100.0)),
            timed("b", None, None, Some(120.0)),
            timed("c", None, Some("de"), None),
            timed("d", Some(as_of()), Some("en"), Some(140.0)),
        ];
        let q = time_data_quality(&catalog, &config());
        assert_eq!(q.n_rows, 4);
        assert_eq!(q.runtime_median, Some(120.0));
        assert!((q.release_date_missing_pct - 50.0).abs() < 1e-12);
        assert!((q.runtime_missing_pct - 25.0).abs() < 1e-12);
        assert!((q.original_language_missing_pct - 25.0).abs() < 1e-12);
        assert!((q.spoken_languages_missing_pct - 100.0).abs() < 1e-12);
        assert!((q.lang_match_pct - 50.0).abs() < 1e-12);
    }
}
