//! Reading component tables back from disk for a standalone blend.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::{ComponentScore, ComponentTable, Domain};
use crate::error::AppError;
use crate::io::ingest::{build_header_map, get_optional, parse_opt_f64};

const ID_COLUMNS: [&str; 2] = ["item_id", "movie_id"];

/// Load `01_content_scores.csv` … `04_time_scores.csv` from `dir`.
///
/// An absent file is `MissingInput` unless `allow_missing` is set, in which
/// case the domain is skipped with a warning and the blend treats it as a
/// zero contribution.
pub fn load_component_tables(dir: &Path, allow_missing: bool) -> Result<BTreeMap<Domain, ComponentTable>, AppError> {
    let mut tables = BTreeMap::new();
    for domain in Domain::ALL {
        let path = dir.join(format!("{}.csv", domain.table_stem()));
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if allow_missing => {
                warn!(domain = %domain, path = %path.display(), error = %e, "tables: component table absent; skipping");
                continue;
            }
            Err(e) => {
                return Err(AppError::missing_input(format!(
                    "Missing component table for `{domain}` at '{}': {e}",
                    path.display()
                )));
            }
        };
        let table = read_component_table(domain, file)
            .map_err(|e| AppError::new(e.kind(), format!("{}: {e}", path.display())))?;
        info!(domain = %domain, rows = table.len(), "tables: component table loaded");
        tables.insert(domain, table);
    }
    Ok(tables)
}

/// Parse one `item_id,title,component_score` table.
pub fn read_component_table<R: Read>(domain: Domain, source: R) -> Result<ComponentTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| AppError::schema(format!("Failed to read table headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let mut missing = Vec::new();
    let id_column = ID_COLUMNS.iter().copied().find(|c| header_map.contains_key(*c));
    if id_column.is_none() {
        missing.push("`item_id`");
    }
    for (col, label) in [("title", "`title`"), ("component_score", "`component_score`")] {
        if !header_map.contains_key(col) {
            missing.push(label);
        }
    }
    let Some(id_column) = id_column.filter(|_| missing.is_empty()) else {
        return Err(AppError::schema(format!(
            "Missing required column(s): {}",
            missing.join(", ")
        )));
    };

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| AppError::schema(format!("CSV parse error on line {line}: {e}")))?;

        let Some(item_id) = get_optional(&record, &header_map, id_column) else {
            debug!(domain = %domain, line, "tables: row without id dropped");
            continue;
        };
        let Some(score) = parse_opt_f64(get_optional(&record, &header_map, "component_score")) else {
            debug!(domain = %domain, line, item_id, "tables: row without a numeric score dropped");
            continue;
        };
        rows.push(ComponentScore {
            item_id: item_id.to_string(),
            title: get_optional(&record, &header_map, "title").unwrap_or_default().to_string(),
            score,
        });
    }

    Ok(ComponentTable::from_unsorted(domain, rows, Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn accepts_movie_id_alias_and_drops_empty_ids() {
        let csv = "movie_id,title,component_score\n7,Seven,40.5\n,Ghost,99\n8,Eight,80\n";
        let table = read_component_table(Domain::Rating, csv.as_bytes()).unwrap();
        let ids: Vec<&str> = table.rows.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, ["8", "7"]);
        assert!((table.rows[1].score - 40.5).abs() < 1e-12);
    }

    #[test]
    fn missing_columns_are_named() {
        let err = read_component_table(Domain::Time, "item_id,score\n1,2\n".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
        let msg = err.to_string();
        assert!(msg.contains("`title`"));
        assert!(msg.contains("`component_score`"));
        assert!(!msg.contains("`item_id`"));
    }

    #[test]
    fn absent_table_fails_unless_allowed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("01_content_scores.csv"),
            "item_id,title,component_score\n1,A,10\n",
        )
        .unwrap();

        let err = load_component_tables(dir.path(), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput);
        assert!(err.to_string().contains("02_rating_scores.csv"));

        let tables = load_component_tables(dir.path(), true).unwrap();
        assert_eq!(tables.keys().copied().collect::<Vec<_>>(), vec![Domain::Content]);
    }
}
