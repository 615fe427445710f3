//! Catalog CSV ingest.
//!
//! Turns a heterogeneous movie-catalog export into `CatalogItem`s that every
//! scorer can read without further validation.
//!
//! - **Strict schema** for identity columns (`item_id`, `title`)
//! - **Lenient cells** everywhere else: unparseable numbers and dates become
//!   missing values, never errors
//! - **Row-level rejection** is counted and reported, not raised

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::CatalogItem;
use crate::error::AppError;

/// Accepted spellings of the identity column, in preference order.
const ID_COLUMNS: [&str; 3] = ["item_id", "id", "movie_id"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: usable items plus bookkeeping for the run log.
#[derive(Debug, Clone)]
pub struct IngestedCatalog {
    pub items: Vec<CatalogItem>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestedCatalog {
    pub fn rows_rejected(&self) -> usize {
        self.rows_read - self.rows_used
    }
}

/// Load a catalog CSV from disk.
pub fn load_catalog(path: &Path) -> Result<IngestedCatalog, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::missing_input(format!("Failed to open catalog '{}': {e}", path.display())))?;
    let catalog = read_catalog(file)?;
    info!(
        path = %path.display(),
        rows_read = catalog.rows_read,
        rows_used = catalog.rows_used,
        rejected = catalog.rows_rejected(),
        "ingest: catalog loaded"
    );
    Ok(catalog)
}

/// Read a catalog from any reader (used by `load_catalog` and tests).
pub fn read_catalog<R: Read>(source: R) -> Result<IngestedCatalog, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::schema(format!("Failed to read catalog headers: {e}")))?
        .clone();
    let columns = Columns::resolve(&headers)?;

    let mut items = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match columns.parse_row(&record) {
            Ok(item) => items.push(item),
            Err((id, message)) => {
                debug!(line, id = id.as_deref().unwrap_or(""), %message, "ingest: row rejected");
                row_errors.push(RowError { line, id, message });
            }
        }
    }

    let rows_used = items.len();
    if rows_used == 0 {
        return Err(AppError::missing_input(
            "Catalog has no usable rows (every row lacks `item_id` or `title`).",
        ));
    }

    Ok(IngestedCatalog {
        items,
        row_errors,
        rows_read,
        rows_used,
    })
}

/// Resolved column positions. Only the identity columns are mandatory.
struct Columns {
    item_id: usize,
    title: usize,
    by_name: HashMap<String, usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, AppError> {
        let by_name = build_header_map(headers);
        let item_id = ID_COLUMNS.iter().find_map(|c| by_name.get(*c).copied());
        let title = by_name.get("title").copied();

        match (item_id, title) {
            (Some(item_id), Some(title)) => Ok(Self { item_id, title, by_name }),
            (item_id, title) => {
                let mut missing = Vec::new();
                if item_id.is_none() {
                    missing.push("`item_id`");
                }
                if title.is_none() {
                    missing.push("`title`");
                }
                Err(AppError::schema(format!(
                    "Missing required catalog column(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }

    fn text(&self, record: &StringRecord, name: &str) -> Option<String> {
        get_optional(record, &self.by_name, name).map(str::to_string)
    }

    fn number(&self, record: &StringRecord, name: &str) -> Option<f64> {
        parse_opt_f64(get_optional(record, &self.by_name, name))
    }

    fn parse_row(&self, record: &StringRecord) -> Result<CatalogItem, (Option<String>, String)> {
        let item_id = cell(record, self.item_id);
        let title = cell(record, self.title);

        let item_id = item_id.ok_or_else(|| (None, "Missing required value: `item_id`".to_string()))?;
        let title =
            title.ok_or_else(|| (Some(item_id.to_string()), "Missing required value: `title`".to_string()))?;

        Ok(CatalogItem {
            item_id: item_id.to_string(),
            title: title.to_string(),
            overview: self.text(record, "overview"),
            genres: self.text(record, "genres"),
            keywords: self.text(record, "keywords"),
            production_companies: self.text(record, "production_companies"),
            spoken_languages: self.text(record, "spoken_languages"),
            original_language: self.text(record, "original_language"),
            budget: self.number(record, "budget"),
            revenue: self.number(record, "revenue"),
            vote_average: self.number(record, "vote_average"),
            vote_count: self.number(record, "vote_count"),
            popularity: self.number(record, "popularity"),
            runtime: self.number(record, "runtime"),
            release_date: get_optional(record, &self.by_name, "release_date").and_then(parse_date),
        })
    }
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins on duplicate headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    cell(record, *idx)
}

/// Parse a release date. Accepts ISO, slash-separated ISO, day-first
/// slashes, and a leading ISO date followed by a time.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
    let s = s.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    let head = s.split(['T', ' ']).next()?;
    if head.len() < s.len() {
        return NaiveDate::parse_from_str(head, "%Y-%m-%d").ok();
    }
    None
}

pub(crate) fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const CATALOG: &str = "\u{feff}ID,Title,overview,budget,revenue,release_date,runtime\n\
        1,Alpha,A story,100,500,2020-05-01,120\n\
        2,,No title here,1,2,2020-01-01,90\n\
        ,Nameless,,,,,\n\
        4,Delta,,abc,inf,someday,\n";

    #[test]
    fn reads_items_and_rejects_rows_without_identity() {
        let catalog = read_catalog(CATALOG.as_bytes()).unwrap();
        assert_eq!(catalog.rows_read, 4);
        assert_eq!(catalog.rows_used, 2);
        assert_eq!(catalog.rows_rejected(), 2);

        let ids: Vec<&str> = catalog.items.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, ["1", "4"]);

        assert_eq!(catalog.row_errors[0].line, 3);
        assert_eq!(catalog.row_errors[0].id.as_deref(), Some("2"));
    }

    #[test]
    fn unparseable_cells_become_missing() {
        let catalog = read_catalog(CATALOG.as_bytes()).unwrap();
        let alpha = &catalog.items[0];
        assert_eq!(alpha.budget, Some(100.0));
        assert_eq!(alpha.release_date, NaiveDate::from_ymd_opt(2020, 5, 1));
        assert_eq!(alpha.vote_average, None);

        let delta = &catalog.items[1];
        assert_eq!(delta.budget, None);
        assert_eq!(delta.revenue, None);
        assert_eq!(delta.release_date, None);
        assert_eq!(delta.overview, None);
    }

    #[test]
    fn missing_identity_columns_are_a_schema_error() {
        let err = read_catalog("name,overview\nx,y\n".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
        assert!(err.to_string().contains("`item_id`"));
        assert!(err.to_string().contains("`title`"));
    }

    #[test]
    fn missing_file_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(&dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput);
    }

    #[test]
    fn date_formats() {
        let d = NaiveDate::from_ymd_opt(2019, 7, 3);
        assert_eq!(parse_date("2019-07-03"), d);
        assert_eq!(parse_date("2019/07/03"), d);
        assert_eq!(parse_date("03/07/2019"), d);
        assert_eq!(parse_date("2019-07-03 12:30:00"), d);
        assert_eq!(parse_date("2019-07-03T12:30:00"), d);
        assert_eq!(parse_date("July 2019"), None);
        assert_eq!(parse_date(""), None);
    }
}
