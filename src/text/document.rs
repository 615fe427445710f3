//! Token documents and count/length features for the content domain.

use crate::domain::CatalogItem;
use crate::text::cells::{ListStyle, parse_list_cell};

/// Lower-case, spell out `&`, and collapse non-alphanumeric runs to one space.
pub fn normalise_token(text: &str) -> String {
    let lowered = text.trim().to_lowercase().replace('&', " and ");
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for c in lowered.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Alphanumeric runs of `text`, lower-cased.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

/// Parsed text fields of one item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFields {
    pub title: String,
    pub overview: String,
    pub genres: Vec<String>,
    pub keywords: Vec<String>,
}

impl TextFields {
    pub fn from_item(item: &CatalogItem) -> Self {
        Self {
            title: item.title.clone(),
            overview: item.overview.clone().unwrap_or_default(),
            genres: parse_list_cell(item.genres.as_deref(), ListStyle::Names),
            keywords: parse_list_cell(item.keywords.as_deref(), ListStyle::Names),
        }
    }

    /// Token document: genres, keywords, title, overview, in that order.
    pub fn document(&self) -> Vec<String> {
        let chunks = self
            .genres
            .iter()
            .chain(self.keywords.iter())
            .chain(std::iter::once(&self.title))
            .chain(std::iter::once(&self.overview))
            .map(|s| normalise_token(s));

        let mut tokens = Vec::new();
        for chunk in chunks {
            tokens.extend(tokenize(&chunk));
        }
        tokens
    }

    pub fn counts(&self) -> TextCounts {
        TextCounts {
            keyword_count: self.keywords.len(),
            genre_count: self.genres.len(),
            overview_word_count: self.overview.split_whitespace().count(),
            overview_char_length: self.overview.chars().count(),
            title_char_length: self.title.chars().count(),
        }
    }
}

/// Raw engineered counts (before `log1p`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCounts {
    pub keyword_count: usize,
    pub genre_count: usize,
    pub overview_word_count: usize,
    pub overview_char_length: usize,
    pub title_char_length: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalise_collapses_punctuation() {
        assert_eq!(normalise_token("  Science-Fiction & Fantasy!! "), "science fiction and fantasy");
        assert_eq!(normalise_token("---"), "");
    }

    #[test]
    fn document_puts_tags_first() {
        let fields = TextFields {
            title: "The Matrix".to_string(),
            overview: "A hacker learns the truth.".to_string(),
            genres: vec!["Sci-Fi".to_string()],
            keywords: vec!["virtual reality".to_string()],
        };
        assert_eq!(
            fields.document(),
            ["sci", "fi", "virtual", "reality", "the", "matrix", "a", "hacker", "learns", "the", "truth"]
        );
    }

    #[test]
    fn counts_from_item_tolerate_missing_fields() {
        let item = CatalogItem {
            item_id: "1".to_string(),
            title: "Up".to_string(),
            genres: Some(r#"[{"name":"Animation"},{"name":"Family"}]"#.to_string()),
            ..CatalogItem::default()
        };
        let counts = TextFields::from_item(&item).counts();
        assert_eq!(
            counts,
            TextCounts {
                keyword_count: 0,
                genre_count: 2,
                overview_word_count: 0,
                overview_char_length: 0,
                title_char_length: 2,
            }
        );
    }
}
