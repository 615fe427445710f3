//! Run configuration.
//!
//! `RankConfig` is built once (defaults → JSON file → environment → CLI flags)
//! and then passed by reference into every component. Nothing reads process
//! state after that.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{BlendWeights, Domain};
use crate::error::AppError;

/// Quantile bounds used by winsorized min-max.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinsorBounds {
    pub low: f64,
    pub high: f64,
}

impl Default for WinsorBounds {
    fn default() -> Self {
        Self { low: 0.01, high: 0.99 }
    }
}

/// Triangular runtime fit: 1.0 at `ideal_minutes`, 0.0 at `± max_deviation_minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuntimeFit {
    pub ideal_minutes: f64,
    pub max_deviation_minutes: f64,
}

impl Default for RuntimeFit {
    fn default() -> Self {
        Self {
            ideal_minutes: 110.0,
            max_deviation_minutes: 120.0,
        }
    }
}

/// Exponential recency decay `exp(-age_days / time_constant_days)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecencyDecay {
    pub time_constant_days: f64,
    /// Age assigned to items with no parseable release date.
    pub unknown_age_days: f64,
}

impl Default for RecencyDecay {
    fn default() -> Self {
        Self {
            time_constant_days: 365.0 * 2.0,
            unknown_age_days: 36_500.0,
        }
    }
}

/// Per-document scaling applied after TF-IDF weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowNorm {
    None,
    L2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TfidfConfig {
    pub max_features: usize,
    /// Minimum number of documents a term must occur in.
    pub min_df: usize,
    pub norm: RowNorm,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            max_features: 8000,
            min_df: 2,
            norm: RowNorm::None,
        }
    }
}

/// Reference identifiers of major studios, matched as substrings of
/// normalized company names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioSet {
    pub keys: Vec<String>,
}

impl Default for StudioSet {
    fn default() -> Self {
        let keys = [
            "disney",
            "pixar",
            "warner",
            "wb",
            "universal",
            "paramount",
            "sony",
            "columbia",
            "fox",
            "20th century",
            "netflix",
            "amazon",
            "mgm",
            "lionsgate",
            "new line",
            "dreamworks",
            "illumination",
        ];
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Relative weights of the content sub-features (normalized at use time).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentWeights {
    pub richness: f64,
    pub keyword_count: f64,
    pub genre_count: f64,
    pub overview_word_count: f64,
    pub overview_char_length: f64,
    pub title_char_length: f64,
}

impl Default for ContentWeights {
    fn default() -> Self {
        Self {
            richness: 0.35,
            keyword_count: 0.18,
            genre_count: 0.12,
            overview_word_count: 0.18,
            overview_char_length: 0.10,
            title_char_length: 0.07,
        }
    }
}

impl ContentWeights {
    /// Weights in feature order, scaled to sum to 1.
    pub fn normalized(&self) -> [f64; 6] {
        let raw = [
            self.richness,
            self.keyword_count,
            self.genre_count,
            self.overview_word_count,
            self.overview_char_length,
            self.title_char_length,
        ];
        let total: f64 = raw.iter().sum();
        if total <= 0.0 {
            return [0.0; 6];
        }
        raw.map(|w| w / total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingWeights {
    pub vote_average: f64,
    pub vote_count: f64,
    pub popularity: f64,
}

impl Default for RatingWeights {
    fn default() -> Self {
        Self {
            vote_average: 0.5,
            vote_count: 0.3,
            popularity: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusinessWeights {
    pub roi: f64,
    pub revenue: f64,
    pub studio: f64,
}

impl Default for BusinessWeights {
    fn default() -> Self {
        Self {
            roi: 0.50,
            revenue: 0.35,
            studio: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWeights {
    pub recency: f64,
    pub language: f64,
    pub runtime: f64,
}

impl Default for TimeWeights {
    fn default() -> Self {
        Self {
            recency: 0.5,
            language: 0.3,
            runtime: 0.2,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RankConfig {
    /// "Today" for the recency signal. Injected so runs are reproducible.
    pub as_of: NaiveDate,
    pub target_language: String,
    pub top_n: usize,
    pub weights: BlendWeights,
    pub winsor: WinsorBounds,
    pub runtime: RuntimeFit,
    pub recency: RecencyDecay,
    pub tfidf: TfidfConfig,
    pub studios: StudioSet,
    pub content_weights: ContentWeights,
    pub rating_weights: RatingWeights,
    pub business_weights: BusinessWeights,
    pub time_weights: TimeWeights,
}

impl RankConfig {
    /// Built-in defaults with the given as-of date.
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            target_language: "en".to_string(),
            top_n: 20,
            weights: BlendWeights::default(),
            winsor: WinsorBounds::default(),
            runtime: RuntimeFit::default(),
            recency: RecencyDecay::default(),
            tfidf: TfidfConfig::default(),
            studios: StudioSet::default(),
            content_weights: ContentWeights::default(),
            rating_weights: RatingWeights::default(),
            business_weights: BusinessWeights::default(),
            time_weights: TimeWeights::default(),
        }
    }

    /// Overlay every field present in a config file.
    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(v) = file.target_language {
            self.target_language = v;
        }
        if let Some(v) = file.top_n {
            self.top_n = v;
        }
        if let Some(w) = file.weights {
            for (domain, value) in [
                (Domain::Content, w.content),
                (Domain::Rating, w.rating),
                (Domain::Business, w.business),
                (Domain::Time, w.time),
            ] {
                if let Some(value) = value {
                    self.weights.set(domain, value);
                }
            }
        }
        if let Some(v) = file.winsor {
            self.winsor = v;
        }
        if let Some(v) = file.runtime {
            self.runtime = v;
        }
        if let Some(v) = file.recency {
            self.recency = v;
        }
        if let Some(v) = file.tfidf {
            self.tfidf = v;
        }
        if let Some(v) = file.studios {
            self.studios = StudioSet { keys: v };
        }
        if let Some(v) = file.content_weights {
            self.content_weights = v;
        }
        if let Some(v) = file.rating_weights {
            self.rating_weights = v;
        }
        if let Some(v) = file.business_weights {
            self.business_weights = v;
        }
        if let Some(v) = file.time_weights {
            self.time_weights = v;
        }
    }

    /// Reject configurations the scorers cannot work with.
    pub fn validate(&self) -> Result<(), AppError> {
        self.weights.validate()?;

        let c = &self.content_weights;
        check_feature_weights(
            "content_weights",
            &[
                c.richness,
                c.keyword_count,
                c.genre_count,
                c.overview_word_count,
                c.overview_char_length,
                c.title_char_length,
            ],
        )?;
        let r = &self.rating_weights;
        check_feature_weights("rating_weights", &[r.vote_average, r.vote_count, r.popularity])?;
        let b = &self.business_weights;
        check_feature_weights("business_weights", &[b.roi, b.revenue, b.studio])?;
        let t = &self.time_weights;
        check_feature_weights("time_weights", &[t.recency, t.language, t.runtime])?;

        let WinsorBounds { low, high } = self.winsor;
        if !(low.is_finite() && high.is_finite() && 0.0 <= low && low < high && high <= 1.0) {
            return Err(AppError::config(format!(
                "Winsorization bounds must satisfy 0 <= low < high <= 1 (got {low}, {high})."
            )));
        }
        if !(self.runtime.max_deviation_minutes.is_finite() && self.runtime.max_deviation_minutes > 0.0) {
            return Err(AppError::config("Runtime max deviation must be > 0 minutes."));
        }
        if !self.runtime.ideal_minutes.is_finite() {
            return Err(AppError::config("Ideal runtime must be finite."));
        }
        if !(self.recency.time_constant_days.is_finite() && self.recency.time_constant_days > 0.0) {
            return Err(AppError::config("Recency time constant must be > 0 days."));
        }
        if self.tfidf.min_df == 0 || self.tfidf.max_features == 0 {
            return Err(AppError::config("TF-IDF min_df and max_features must be >= 1."));
        }
        if self.target_language.trim().is_empty() {
            return Err(AppError::config("Target language must not be empty."));
        }
        Ok(())
    }
}

fn check_feature_weights(table: &str, weights: &[f64]) -> Result<(), AppError> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(AppError::config(format!(
            "{table} must be finite and >= 0 (got {weights:?})."
        )));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(AppError::config(format!("{table} must not all be zero.")));
    }
    Ok(())
}

/// Optional overrides loaded from `--config <file.json>`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub target_language: Option<String>,
    pub top_n: Option<usize>,
    pub weights: Option<WeightOverrides>,
    pub winsor: Option<WinsorBounds>,
    pub runtime: Option<RuntimeFit>,
    pub recency: Option<RecencyDecay>,
    pub tfidf: Option<TfidfConfig>,
    pub studios: Option<Vec<String>>,
    pub content_weights: Option<ContentWeights>,
    pub rating_weights: Option<RatingWeights>,
    pub business_weights: Option<BusinessWeights>,
    pub time_weights: Option<TimeWeights>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightOverrides {
    pub content: Option<f64>,
    pub rating: Option<f64>,
    pub business: Option<f64>,
    pub time: Option<f64>,
}

impl ConfigFile {
    pub fn read(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::missing_input(format!("Failed to open config '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(file)
            .map_err(|e| AppError::config(format!("Invalid config JSON '{}': {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn defaults_validate() {
        RankConfig::new(as_of()).validate().unwrap();
    }

    #[test]
    fn file_overlay_replaces_only_present_fields() {
        let file: ConfigFile = serde_json::from_str(
            r#"{"target_language":"fr","weights":{"time":0.5},"winsor":{"low":0.05,"high":0.95}}"#,
        )
        .unwrap();
        let mut config = RankConfig::new(as_of());
        config.apply_file(file);

        assert_eq!(config.target_language, "fr");
        assert_eq!(config.top_n, 20);
        assert!((config.weights.get(Domain::Time) - 0.5).abs() < 1e-12);
        assert!((config.weights.get(Domain::Content) - 0.40).abs() < 1e-12);
        assert!((config.winsor.low - 0.05).abs() < 1e-12);
    }

    #[test]
    fn inverted_winsor_bounds_are_rejected() {
        let mut config = RankConfig::new(as_of());
        config.winsor = WinsorBounds { low: 0.9, high: 0.1 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_feature_weights_are_rejected() {
        let mut config = RankConfig::new(as_of());
        config.business_weights.revenue = -0.35;
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidConfig);

        let mut config = RankConfig::new(as_of());
        config.content_weights.richness = f64::NAN;
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidConfig);

        let file: ConfigFile = serde_json::from_str(
            r#"{"time_weights": {"recency": 0.0, "language": 0.0, "runtime": 0.0}}"#,
        )
        .unwrap();
        let mut config = RankConfig::new(as_of());
        config.apply_file(file);
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidConfig);

        // A single zero entry is fine.
        let mut config = RankConfig::new(as_of());
        config.rating_weights.popularity = 0.0;
        config.validate().unwrap();
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let parsed: Result<ConfigFile, _> = serde_json::from_str(r#"{"top":5}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn content_weights_normalize() {
        let w = ContentWeights::default().normalized();
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
}
