//! Content relevance: TF-IDF richness plus text count/length features.

use tracing::info;

use crate::domain::{CatalogItem, ComponentScore, ComponentTable, ContentWeights, Domain, FeatureColumn, RankConfig, TfidfConfig};
use crate::math::minmax_dense;
use crate::scoring::{ComponentScorer, to_score};
use crate::text::{TextFields, document_norms};

/// Feature names in weight order.
const FEATURES: [&str; 6] = [
    "tfidf_norm",
    "keyword_count",
    "genre_count",
    "overview_word_count",
    "overview_char_length",
    "title_char_length",
];

#[derive(Debug, Clone)]
pub struct ContentScorer {
    tfidf: TfidfConfig,
    weights: ContentWeights,
}

impl ContentScorer {
    pub fn new(config: &RankConfig) -> Self {
        Self {
            tfidf: config.tfidf,
            weights: config.content_weights,
        }
    }

    /// Raw engineered features per item, in `FEATURES` order. Counts and
    /// lengths are `log1p`-compressed; the richness norm is left as is.
    fn raw_features(&self, catalog: &[CatalogItem]) -> [Vec<f64>; 6] {
        let fields: Vec<TextFields> = catalog.iter().map(TextFields::from_item).collect();
        let docs: Vec<Vec<String>> = fields.iter().map(TextFields::document).collect();
        let (model, norms) = document_norms(&docs, &self.tfidf);
        info!(vocabulary = model.vocabulary_len(), docs = docs.len(), "content: tf-idf fitted");

        let counts: Vec<_> = fields.iter().map(TextFields::counts).collect();
        let log = |f: fn(&crate::text::TextCounts) -> usize| -> Vec<f64> {
            counts.iter().map(|c| (f(c) as f64).ln_1p()).collect()
        };

        [
            norms,
            log(|c| c.keyword_count),
            log(|c| c.genre_count),
            log(|c| c.overview_word_count),
            log(|c| c.overview_char_length),
            log(|c| c.title_char_length),
        ]
    }
}

impl ComponentScorer for ContentScorer {
    fn domain(&self) -> Domain {
        Domain::Content
    }

    fn compute(&self, catalog: &[CatalogItem]) -> ComponentTable {
        let raw = self.raw_features(catalog);
        let scaled: Vec<Vec<f64>> = raw.iter().map(|col| minmax_dense(col)).collect();
        let weights = self.weights.normalized();

        let rows = catalog
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let signals: Vec<f64> = scaled.iter().map(|col| col[i]).collect();
                ComponentScore {
                    item_id: item.item_id.clone(),
                    title: item.title.clone(),
                    score: to_score(&weights, &signals),
                }
            })
            .collect();

        let mut features = Vec::with_capacity(FEATURES.len() * 2);
        for (name, col) in FEATURES.iter().zip(raw.iter()) {
            features.push(FeatureColumn::dense(*name, col));
        }
        for (name, col) in FEATURES.iter().zip(scaled.iter()) {
            features.push(FeatureColumn::dense(format!("scaled_{name}"), col));
        }

        ComponentTable::from_unsorted(Domain::Content, rows, features)
    }
}
