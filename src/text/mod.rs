//! Text handling: list-cell parsing, token documents, TF-IDF, and studio matching.

pub mod cells;
pub mod companies;
pub mod document;
pub mod tfidf;

pub use cells::*;
pub use companies::*;
pub use document::*;
pub use tfidf::*;
