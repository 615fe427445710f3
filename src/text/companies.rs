//! Production-company matching against the major-studio reference set.

use crate::domain::StudioSet;
use crate::text::cells::{ListStyle, parse_list_cell};

const STRIPPED: &[char] = &[
    '(', ')', '-', '—', '–', '·', '.', ',', '&', '!', '?', ':', ';', '"', '\'', '`',
];

/// Lower-case, replace punctuation with spaces, and collapse whitespace.
pub fn normalize_company_name(name: &str) -> String {
    let replaced: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if STRIPPED.contains(&c) { ' ' } else { c })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of reference keys found as a substring of any company name.
///
/// Each key counts at most once, however many companies contain it.
pub fn count_studio_hits(companies: &[String], studios: &StudioSet) -> usize {
    let names: Vec<String> = companies
        .iter()
        .filter(|c| !c.trim().is_empty())
        .map(|c| normalize_company_name(c))
        .collect();

    studios
        .keys
        .iter()
        .filter(|key| names.iter().any(|n| n.contains(key.as_str())))
        .count()
}

/// Discrete studio bonus: two or more hits → 1.0, one → 0.5, none → 0.0.
pub fn studio_tier(hits: usize) -> f64 {
    match hits {
        0 => 0.0,
        1 => 0.5,
        _ => 1.0,
    }
}

/// Studio bonus for a raw production-companies cell.
///
/// `None` when the cell itself is absent; a present cell without any
/// recognised studio scores `0.0`.
pub fn studio_signal(cell: Option<&str>, studios: &StudioSet) -> Option<f64> {
    let cell = cell.map(str::trim).filter(|s| !s.is_empty())?;
    let companies = parse_list_cell(Some(cell), ListStyle::Companies);
    Some(studio_tier(count_studio_hits(&companies, studios)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalization_strips_punctuation() {
        assert_eq!(normalize_company_name("  Lucasfilm Ltd. (U.S.) "), "lucasfilm ltd u s");
        assert_eq!(normalize_company_name("Metro-Goldwyn-Mayer"), "metro goldwyn mayer");
    }

    #[test]
    fn substring_containment_counts_keys() {
        let studios = StudioSet::default();
        assert_eq!(count_studio_hits(&names(&["Walt Disney Pictures"]), &studios), 1);
        assert_eq!(
            count_studio_hits(&names(&["Walt Disney Pictures", "Pixar Animation Studios"]), &studios),
            2
        );
        // "20th Century Fox" contains both "20th century" and "fox".
        assert_eq!(count_studio_hits(&names(&["20th Century Fox"]), &studios), 2);
        assert_eq!(count_studio_hits(&names(&["A24"]), &studios), 0);
    }

    #[test]
    fn tier_is_three_level() {
        assert_eq!(studio_tier(0), 0.0);
        assert_eq!(studio_tier(1), 0.5);
        assert_eq!(studio_tier(2), 1.0);
        assert_eq!(studio_tier(7), 1.0);
    }

    #[test]
    fn signal_distinguishes_absent_from_unmatched() {
        let studios = StudioSet::default();
        assert_eq!(studio_signal(None, &studios), None);
        assert_eq!(studio_signal(Some("[]"), &studios), Some(0.0));
        assert_eq!(studio_signal(Some("Blumhouse; Universal Pictures"), &studios), Some(0.5));
        assert_eq!(
            studio_signal(Some(r#"[{"name": "Warner Bros."}, {"name": "Legendary"}, {"name": "DC"}]"#), &studios),
            Some(0.5)
        );
    }
}
