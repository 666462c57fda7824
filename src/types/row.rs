//! Raw table rows produced by the ingestor

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A single cell of an uploaded table.
///
/// Fields that parse fully as a finite number become `Number`, anything else
/// stays `Text`. `Missing` pads rows that are shorter than the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Coerce a cleaned field into a typed cell
    pub fn coerce(field: &str) -> Self {
        match field.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(field.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Missing => Ok(()),
        }
    }
}

/// Ordered column names, in header order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnSet(Vec<String>);

impl ColumnSet {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// One data line keyed by column name.
///
/// The ingestor guarantees one entry per column of the owning table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRow {
    values: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: &str, value: CellValue) {
        self.values.insert(column.to_string(), value);
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_numbers_and_text() {
        assert_eq!(CellValue::coerce("12.5"), CellValue::Number(12.5));
        assert_eq!(CellValue::coerce("-3"), CellValue::Number(-3.0));
        assert_eq!(CellValue::coerce("x"), CellValue::Text("x".to_string()));
        assert_eq!(CellValue::coerce("12abc"), CellValue::Text("12abc".to_string()));
        assert_eq!(CellValue::coerce(""), CellValue::Text(String::new()));
    }

    #[test]
    fn test_non_finite_stays_text() {
        assert_eq!(CellValue::coerce("NaN"), CellValue::Text("NaN".to_string()));
        assert_eq!(CellValue::coerce("inf"), CellValue::Text("inf".to_string()));
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(1.0).to_string(), "1");
        assert_eq!(CellValue::Number(0.25).to_string(), "0.25");
        assert_eq!(CellValue::Missing.to_string(), "");
    }
}
