//! Corpus-level TF-IDF weighting.
//!
//! The content domain only needs one scalar per document, the Euclidean norm
//! of its weighted vector, but the model is kept general so the vocabulary
//! and weights can be inspected.
//!
//! Weighting:
//!
//! ```text
//! tf(t, d)  = raw count of t in d
//! idf(t)    = ln((1 + n) / (1 + df(t))) + 1
//! w(t, d)   = tf(t, d) * idf(t)
//! ```
//!
//! Vocabulary: terms of at least two characters occurring in `min_df` or more
//! documents, capped at the `max_features` most frequent terms in the corpus
//! (ties broken alphabetically).

use std::collections::{BTreeMap, HashMap};

use crate::domain::{RowNorm, TfidfConfig};

const MIN_TERM_CHARS: usize = 2;

/// A sparse document vector: `(term index, weight)` sorted by term index.
pub type SparseVector = Vec<(usize, f64)>;

#[derive(Debug, Clone)]
pub struct TfidfModel {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    norm: RowNorm,
}

impl TfidfModel {
    pub fn fit(docs: &[Vec<String>], config: &TfidfConfig) -> Self {
        let mut df: HashMap<&str, usize> = HashMap::new();
        let mut total: HashMap<&str, usize> = HashMap::new();

        for doc in docs {
            let mut seen: Vec<&str> = Vec::new();
            for token in doc.iter().filter(|t| t.chars().count() >= MIN_TERM_CHARS) {
                *total.entry(token.as_str()).or_default() += 1;
                if !seen.contains(&token.as_str()) {
                    seen.push(token.as_str());
                }
            }
            for term in seen {
                *df.entry(term).or_default() += 1;
            }
        }

        let mut kept: Vec<(&str, usize)> = total
            .into_iter()
            .filter(|(term, _)| df.get(term).copied().unwrap_or(0) >= config.min_df)
            .collect();
        kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        kept.truncate(config.max_features);

        let mut terms: Vec<&str> = kept.into_iter().map(|(t, _)| t).collect();
        terms.sort_unstable();

        let n = docs.len() as f64;
        let idf = terms
            .iter()
            .map(|t| {
                let d = df.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + d)).ln() + 1.0
            })
            .collect();
        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(idx, t)| (t.to_string(), idx))
            .collect();

        Self {
            vocabulary,
            idf,
            norm: config.norm,
        }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.term_index(term).map(|i| self.idf[i])
    }

    pub fn transform(&self, doc: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in doc {
            if let Some(idx) = self.vocabulary.get(token) {
                *counts.entry(*idx).or_default() += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();

        if self.norm == RowNorm::L2 {
            let n = euclidean_norm(&vector);
            if n > 0.0 {
                for (_, w) in vector.iter_mut() {
                    *w /= n;
                }
            }
        }
        vector
    }
}

pub fn euclidean_norm(vector: &SparseVector) -> f64 {
    vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
}

/// Fit on `docs` and return each document's weighted-vector norm.
pub fn document_norms(docs: &[Vec<String>], config: &TfidfConfig) -> (TfidfModel, Vec<f64>) {
    let model = TfidfModel::fit(docs, config);
    let norms = docs.iter().map(|d| euclidean_norm(&model.transform(d))).collect();
    (model, norms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn config() -> TfidfConfig {
        TfidfConfig::default()
    }

    #[test]
    fn terms_below_min_df_are_dropped() {
        let docs = vec![doc("space war alien"), doc("space love"), doc("war typo")];
        let model = TfidfModel::fit(&docs, &config());

        assert!(model.term_index("space").is_some());
        assert!(model.term_index("war").is_some());
        assert!(model.term_index("alien").is_none());
        assert!(model.term_index("typo").is_none());
        assert_eq!(model.vocabulary_len(), 2);
    }

    #[test]
    fn single_character_tokens_are_ignored() {
        let docs = vec![doc("a b space"), doc("a b space")];
        let model = TfidfModel::fit(&docs, &config());
        assert_eq!(model.vocabulary_len(), 1);
    }

    #[test]
    fn smoothed_idf_matches_formula() {
        let docs = vec![doc("space war"), doc("space war"), doc("space")];
        let model = TfidfModel::fit(&docs, &config());
        // space: df=3 -> ln(4/4)+1 = 1; war: df=2 -> ln(4/3)+1.
        assert!((model.idf("space").unwrap() - 1.0).abs() < 1e-12);
        assert!((model.idf("war").unwrap() - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn max_features_keeps_most_frequent_terms() {
        let docs = vec![doc("alpha alpha beta gamma"), doc("alpha beta gamma gamma gamma")];
        let cfg = TfidfConfig {
            max_features: 2,
            ..config()
        };
        let model = TfidfModel::fit(&docs, &cfg);
        assert!(model.term_index("gamma").is_some());
        assert!(model.term_index("alpha").is_some());
        assert!(model.term_index("beta").is_none());
    }

    #[test]
    fn richer_documents_have_larger_norms() {
        let docs = vec![
            doc("space war space war hero"),
            doc("space war hero"),
            doc("nothing shared"),
        ];
        let (_, norms) = document_norms(&docs, &config());
        assert!(norms[0] > norms[1]);
        assert_eq!(norms[2], 0.0);
    }

    #[test]
    fn l2_rows_have_unit_norm() {
        let docs = vec![doc("space war war"), doc("space war")];
        let cfg = TfidfConfig {
            norm: RowNorm::L2,
            ..config()
        };
        let (_, norms) = document_norms(&docs, &cfg);
        for n in norms {
            assert!((n - 1.0).abs() < 1e-12);
        }
    }
}
