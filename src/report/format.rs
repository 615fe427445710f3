//! Formatted terminal output.
//!
//! Formatting lives here so the scoring code stays free of presentation and
//! output changes are localized.

use std::collections::BTreeMap;

use crate::blend::FinalRanking;
use crate::domain::{Domain, FinalScore};

/// Fixed-width leaderboard of the given rows.
pub fn format_leaderboard(rows: &[FinalScore]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>5} {:<12} {:<40} {:>11}", "rank", "item_id", "title", "final_score").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<5} {:-<12} {:-<40} {:-<11}", "", "", "", "").trim_end());
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:>5} {:<12} {:<40} {:>11.2}",
                r.rank,
                truncate(&r.item_id, 12),
                truncate(&r.title, 40),
                r.final_score,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Effective weights as percentages, one per line.
pub fn format_weights(weights: &BTreeMap<Domain, f64>) -> String {
    let mut out = String::new();
    for (domain, weight) in weights {
        out.push_str(&format!(
            "  - {}: {:.2}% {}\n",
            domain,
            weight * 100.0,
            domain.rationale()
        ));
    }
    out
}

/// Short header printed above the leaderboard by `mrank score`.
pub fn format_run_summary(ranking: &FinalRanking, top_n: usize) -> String {
    let mut out = String::new();
    out.push_str("=== mrank - blended movie ranking ===\n");
    out.push_str(&format!(
        "Items ranked: {} | domains present: {}\n",
        ranking.len(),
        join_domains(&ranking.present)
    ));
    if !ranking.missing.is_empty() {
        out.push_str(&format!(
            "Missing domains (contribute 0): {}\n",
            join_domains(&ranking.missing)
        ));
    }
    out.push_str("Weights (after normalization):\n");
    out.push_str(&format_weights(&ranking.weights));
    out.push_str(&format!("\nTop {}:\n", top_n.min(ranking.len())));
    out
}

pub(crate) fn join_domains(domains: &[Domain]) -> String {
    if domains.is_empty() {
        return "none".to_string();
    }
    domains.iter().map(|d| d.name()).collect::<Vec<_>>().join(", ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn final_score(rank: usize, id: &str, title: &str, score: f64) -> FinalScore {
        FinalScore {
            rank,
            item_id: id.to_string(),
            title: title.to_string(),
            per_domain: BTreeMap::new(),
            final_score: score,
        }
    }

    #[test]
    fn leaderboard_rows_are_fixed_width() {
        let rows = vec![
            final_score(1, "27205", "Inception", 91.234),
            final_score(2, "1", "A title that is much longer than forty characters in total", 5.0),
        ];
        let text = format_leaderboard(&rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(" rank item_id"));
        assert!(lines[2].ends_with("91.23"));
        assert!(lines[3].contains("A title that is much longer than forty ."));
    }

    #[test]
    fn weights_are_listed_as_percentages() {
        let weights = BTreeMap::from([(Domain::Content, 0.4), (Domain::Time, 0.15)]);
        let text = format_weights(&weights);
        assert!(text.starts_with("  - content: 40.00% "));
        assert!(text.contains("  - time: 15.00% "));
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd.");
    }
}
