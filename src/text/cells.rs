//! Parsing of list-like catalog cells.
//!
//! Catalog exports store genres, keywords, companies, and languages as one of:
//!
//! - a JSON array of strings or `{ "name": ... }` records
//! - a Python-literal array of the same (`repr` output: either quote style,
//!   `None`, `True`, `False`)
//! - plain delimited text (`Action, Drama`)
//!
//! `parse_structured` handles the first two and reports `ParseFailed` for
//! anything else; `parse_list_cell` then falls back to a delimiter split.

use std::iter::Peekable;
use std::str::Chars;

use serde_json::{Map, Value};
use tracing::debug;

/// Outcome of the structured parse attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCell {
    ParsedList(Vec<String>),
    ParseFailed,
}

/// How a given column is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// Genres and keywords: `name` records, comma fallback.
    Names,
    /// Production companies: `name` records, comma/semicolon fallback.
    Companies,
    /// Spoken languages: `iso_639_1` and `name` per record, comma fallback, lower-cased.
    Languages,
}

impl ListStyle {
    fn record_keys(self) -> &'static [&'static str] {
        match self {
            ListStyle::Names | ListStyle::Companies => &["name"],
            ListStyle::Languages => &["iso_639_1", "name"],
        }
    }

    fn delimiters(self) -> &'static [char] {
        match self {
            ListStyle::Companies => &[',', ';'],
            ListStyle::Names | ListStyle::Languages => &[','],
        }
    }
}

/// Parse a cell into its entries. Never fails: malformed cells fall back to a
/// delimiter split, and an empty result means "no entries".
pub fn parse_list_cell(raw: Option<&str>, style: ListStyle) -> Vec<String> {
    let Some(text) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    let entries = match parse_structured(text, style.record_keys()) {
        ListCell::ParsedList(entries) => entries,
        ListCell::ParseFailed => {
            debug!(cell = text, "list cell is not structured; splitting on delimiters");
            split_delimited(text, style.delimiters())
        }
    };

    match style {
        ListStyle::Languages => entries.into_iter().map(|e| e.to_lowercase()).collect(),
        ListStyle::Names | ListStyle::Companies => entries,
    }
}

/// Try to read `text` as an array of strings / records.
pub fn parse_structured(text: &str, keys: &[&str]) -> ListCell {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(v) => Some(v),
        Err(_) if text.starts_with('[') || text.starts_with('(') => PyLiteral::parse(text),
        Err(_) => None,
    };

    let Some(Value::Array(items)) = value else {
        return ListCell::ParseFailed;
    };

    let mut out = Vec::new();
    for item in items {
        match item {
            Value::String(s) => push_trimmed(&mut out, &s),
            Value::Object(map) => {
                for key in keys {
                    if let Some(Value::String(s)) = map.get(*key) {
                        push_trimmed(&mut out, s);
                    }
                }
            }
            Value::Number(n) => push_trimmed(&mut out, &n.to_string()),
            _ => {}
        }
    }
    ListCell::ParsedList(out)
}

/// Repeated entries are kept; they count towards genre and keyword totals.
fn push_trimmed(out: &mut Vec<String>, s: &str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s.to_string());
    }
}

/// Reader for Python `repr` literals: lists, tuples, dicts, strings in either
/// quote style, numbers, `None`, `True`, and `False`.
///
/// Any other syntax is rejected as a whole so the caller can fall back.
struct PyLiteral<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> PyLiteral<'a> {
    fn parse(text: &'a str) -> Option<Value> {
        let mut reader = Self {
            chars: text.chars().peekable(),
        };
        let value = reader.value()?;
        reader.skip_ws();
        reader.chars.peek().is_none().then_some(value)
    }

    fn skip_ws(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn value(&mut self) -> Option<Value> {
        self.skip_ws();
        match *self.chars.peek()? {
            '[' => {
                self.chars.next();
                self.sequence(']').map(Value::Array)
            }
            '(' => {
                self.chars.next();
                self.sequence(')').map(Value::Array)
            }
            '{' => {
                self.chars.next();
                self.dict().map(Value::Object)
            }
            quote @ ('\'' | '"') => {
                self.chars.next();
                self.string(quote).map(Value::String)
            }
            c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            c if c.is_alphabetic() => self.keyword(),
            _ => None,
        }
    }

    fn sequence(&mut self, close: char) -> Option<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.chars.next_if_eq(&close).is_some() {
                return Some(items);
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.chars.next()? {
                ',' => {}
                c if c == close => return Some(items),
                _ => return None,
            }
        }
    }

    fn dict(&mut self) -> Option<Map<String, Value>> {
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.chars.next_if_eq(&'}').is_some() {
                return Some(map);
            }
            let key = match self.value()? {
                Value::String(s) => s,
                other => other.to_string(),
            };
            self.skip_ws();
            if self.chars.next()? != ':' {
                return None;
            }
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws();
            match self.chars.next()? {
                ',' => {}
                '}' => return Some(map),
                _ => return None,
            }
        }
    }

    fn string(&mut self, quote: char) -> Option<String> {
        let mut out = String::new();
        loop {
            match self.chars.next()? {
                c if c == quote => return Some(out),
                '\\' => match self.chars.next()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    'x' => out.push(self.hex_escape(2)?),
                    'u' => out.push(self.hex_escape(4)?),
                    'U' => out.push(self.hex_escape(8)?),
                    c @ ('\\' | '\'' | '"') => out.push(c),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                c => out.push(c),
            }
        }
    }

    fn hex_escape(&mut self, digits: usize) -> Option<char> {
        let hex = (0..digits)
            .map(|_| self.chars.next())
            .collect::<Option<String>>()?;
        char::from_u32(u32::from_str_radix(&hex, 16).ok()?)
    }

    fn number(&mut self) -> Option<Value> {
        let mut text = String::new();
        while let Some(c) = self
            .chars
            .next_if(|c| c.is_ascii_alphanumeric() || matches!(*c, '-' | '+' | '.'))
        {
            text.push(c);
        }
        if let Ok(n) = text.parse::<i64>() {
            return Some(Value::from(n));
        }
        let x: f64 = text.parse().ok()?;
        serde_json::Number::from_f64(x).map(Value::Number)
    }

    fn keyword(&mut self) -> Option<Value> {
        let mut word = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
            word.push(c);
        }
        match word.as_str() {
            "None" => Some(Value::Null),
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            _ => None,
        }
    }
}

fn split_delimited(text: &str, delimiters: &[char]) -> Vec<String> {
    let inner = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(text);
    inner
        .split(|c: char| delimiters.contains(&c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
