//! Core table types for representing loaded CSV data

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A parsed table from a single CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Row data
    pub rows: Vec<Row>,
    /// Source file path
    pub source_path: PathBuf,
}

impl Table {
    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a cell by row index and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.find_column(column)?;
        self.rows.get(row).and_then(|r| r.get(col.index))
    }
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name as it appears in the header
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    /// Cell values for each column
    pub cells: Vec<CellValue>,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A cell value with type detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// Text value
    Text(String),
    /// Empty cell present in the source
    Null,
    /// No such column in the row's source file (introduced by merging)
    Missing,
}

impl CellValue {
    /// Parse a field into a CellValue, detecting the type
    ///
    /// Numbers are only recognised when they print back to the exact source
    /// text, so `"007"`, `"1.50"` and `" 3"` stay text and survive a rewrite
    /// unchanged.
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }

        if let Ok(i) = s.parse::<i64>() {
            if i.to_string() == s {
                return CellValue::Integer(i);
            }
        }

        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() && f.to_string() == s {
                return CellValue::Float(f);
            }
        }

        CellValue::Text(s.to_string())
    }

    /// Check if the cell holds no value (empty or missing)
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Null | CellValue::Missing)
    }

    /// Check if the cell is a merge gap
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Convert to the string written to CSV
    pub fn to_string_value(&self) -> String {
        match self {
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Null | CellValue::Missing => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_parse_integer() {
        assert_eq!(CellValue::parse("42"), CellValue::Integer(42));
        assert_eq!(CellValue::parse("-123"), CellValue::Integer(-123));
        assert_eq!(CellValue::parse("0"), CellValue::Integer(0));
    }

    #[test]
    fn test_cell_value_parse_float() {
        assert_eq!(CellValue::parse("3.25"), CellValue::Float(3.25));
        assert_eq!(CellValue::parse("-2.5"), CellValue::Float(-2.5));
    }

    #[test]
    fn test_cell_value_keeps_non_canonical_numbers_as_text() {
        assert_eq!(CellValue::parse("007"), CellValue::Text("007".to_string()));
        assert_eq!(CellValue::parse("1.50"), CellValue::Text("1.50".to_string()));
        assert_eq!(CellValue::parse(" 3"), CellValue::Text(" 3".to_string()));
        assert_eq!(CellValue::parse("NaN"), CellValue::Text("NaN".to_string()));
    }

    #[test]
    fn test_cell_value_parse_text() {
        assert_eq!(
            CellValue::parse("hello"),
            CellValue::Text("hello".to_string())
        );
        assert_eq!(
            CellValue::parse("A01"),
            CellValue::Text("A01".to_string())
        );
    }

    #[test]
    fn test_cell_value_parse_empty() {
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse("   "), CellValue::Text("   ".to_string()));
    }

    #[test]
    fn test_cell_value_is_empty() {
        assert!(CellValue::Null.is_empty());
        assert!(CellValue::Missing.is_empty());
        assert!(CellValue::Missing.is_missing());
        assert!(!CellValue::Null.is_missing());
        assert!(!CellValue::Integer(0).is_empty());
        assert!(!CellValue::Text("".to_string()).is_empty());
    }

    #[test]
    fn test_to_string_value_round_trips_source_text() {
        for raw in ["12", "-4", "0.5", "plate_A", ""] {
            assert_eq!(CellValue::parse(raw).to_string_value(), raw);
        }
        assert_eq!(CellValue::Missing.to_string_value(), "");
    }
}
