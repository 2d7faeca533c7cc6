use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One parsed spreadsheet cell. Empty cells and empty strings are `Blank`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Blank,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Blank
        } else {
            CellValue::Text(value)
        }
    }

    /// Blank, empty text, zero and NaN count as "no value" for filter options.
    pub fn is_falsy(&self) -> bool {
        match self {
            CellValue::Blank => true,
            CellValue::Text(v) => v.is_empty(),
            CellValue::Number(v) => *v == 0.0 || v.is_nan(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(v) => f.write_str(v),
            CellValue::Number(v) => f.write_str(&format_number(*v)),
            CellValue::Blank => Ok(()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(v) => serializer.serialize_str(v),
            CellValue::Number(v) => serializer.serialize_f64(*v),
            CellValue::Blank => serializer.serialize_str(""),
        }
    }
}

/// Integral values print without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// A spreadsheet row keyed by column name, in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    fields: Vec<(String, CellValue)>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Replaces the value when `column` is already present.
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        let column = column.into();
        if let Some(slot) = self.fields.iter_mut().find(|(name, _)| *name == column) {
            slot.1 = value;
        } else {
            self.fields.push((column, value));
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut row = RowRecord::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

/// Displayed columns come from the first row's keys.
pub fn display_columns(rows: &[RowRecord]) -> Vec<String> {
    rows.first()
        .map(|row| row.columns().map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsy_matches_javascript_truthiness() {
        assert!(CellValue::Blank.is_falsy());
        assert!(CellValue::Text(String::new()).is_falsy());
        assert!(CellValue::Number(0.0).is_falsy());
        assert!(CellValue::Number(f64::NAN).is_falsy());
        assert!(!CellValue::Number(-1.5).is_falsy());
        assert!(!CellValue::text("0").is_falsy());
    }

    #[test]
    fn numbers_display_without_trailing_zero() {
        assert_eq!(CellValue::Number(16.0).to_string(), "16");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Blank.to_string(), "");
    }

    #[test]
    fn insert_keeps_first_position_for_existing_key() {
        let mut row = RowRecord::new();
        row.insert("Product", CellValue::text("A"));
        row.insert("Release", CellValue::text("1"));
        row.insert("Product", CellValue::text("B"));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["Product", "Release"]);
        assert_eq!(row.get("Product"), Some(&CellValue::text("B")));
        assert_eq!(row.get("Missing"), None);
    }
}
