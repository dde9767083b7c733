//! CSV parser producing [`Table`] values

use crate::error::{Error, Result};
use crate::table::{CellValue, Column, Row, Table};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Parse a CSV file into a Table
pub fn parse_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_reader(BufReader::new(file), path.to_path_buf())
}

/// Parse CSV from a string (useful for testing)
pub fn parse_csv_str(content: &str, source_name: &str) -> Result<Table> {
    parse_reader(content.as_bytes(), PathBuf::from(source_name))
}

fn parse_reader<R: Read>(reader: R, path: PathBuf) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // short rows are padded below
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: path.clone(),
        source: e,
    })?;

    if headers.is_empty() {
        return Err(Error::CsvParse {
            path,
            message: "no columns found in CSV".to_string(),
        });
    }

    let columns: Vec<Column> = normalize_headers(headers.iter())
        .into_iter()
        .enumerate()
        .map(|(i, name)| Column::new(name, i))
        .collect();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;

        if record.len() > columns.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(Error::CsvParse {
                path,
                message: format!(
                    "line {}: expected {} fields, found {}",
                    line,
                    columns.len(),
                    record.len()
                ),
            });
        }

        let mut cells: Vec<CellValue> = record.iter().map(CellValue::parse).collect();
        cells.resize(columns.len(), CellValue::Null);

        rows.push(Row::new(cells));
    }

    Ok(Table {
        columns,
        rows,
        source_path: path,
    })
}

/// Give every header a usable, unique name
///
/// Blank headers become `Unnamed: <index>`; repeated names get `.1`, `.2`, ...
/// appended in order of appearance.
fn normalize_headers<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let raw: Vec<String> = headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {}", i)
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut taken: HashSet<String> = raw.iter().cloned().collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for name in &raw {
        if seen.insert(name.as_str()) {
            names.push(name.clone());
            continue;
        }

        let mut n = 1;
        let mut candidate = format!("{}.{}", name, n);
        while taken.contains(&candidate) {
            n += 1;
            candidate = format!("{}.{}", name, n);
        }
        taken.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_simple_csv() {
        let csv = "id,val\n1,10\n2,20\n";
        let table = parse_csv_str(csv, "test.csv").unwrap();

        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0].name, "id");
        assert_eq!(table.columns[1].name, "val");

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells[0], CellValue::Integer(1));
        assert_eq!(table.rows[1].cells[1], CellValue::Integer(20));
    }

    #[test]
    fn test_parse_with_empty_cells() {
        let csv = "ID,Name,Value\n1,,100\n2,bar,\n";
        let table = parse_csv_str(csv, "test.csv").unwrap();

        assert_eq!(table.rows[0].cells[1], CellValue::Null);
        assert_eq!(table.rows[1].cells[2], CellValue::Null);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let csv = "well,note\nA01,\"hello, world\"\nA02,\"say \"\"hi\"\"\"\n";
        let table = parse_csv_str(csv, "test.csv").unwrap();

        assert_eq!(
            table.value(0, "note"),
            Some(&CellValue::Text("hello, world".to_string()))
        );
        assert_eq!(
            table.value(1, "note"),
            Some(&CellValue::Text("say \"hi\"".to_string()))
        );
    }

    #[test]
    fn test_short_rows_are_padded() {
        let csv = "a,b,c\n1\n";
        let table = parse_csv_str(csv, "test.csv").unwrap();

        assert_eq!(
            table.rows[0].cells,
            vec![CellValue::Integer(1), CellValue::Null, CellValue::Null]
        );
    }

    #[test]
    fn test_long_row_is_an_error() {
        let csv = "a,b\n1,2\n1,2,3\n";
        let err = parse_csv_str(csv, "test.csv").unwrap_err();

        assert!(err.is_parse_error());
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let err = parse_csv_str("", "empty.csv").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let table = parse_csv_str("a,b\n", "test.csv").unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_normalize_headers() {
        let names = normalize_headers(["", "a", "a", "a.1", "a"]);
        assert_eq!(names, vec!["Unnamed: 0", "a", "a.2", "a.1", "a.3"]);
    }

    #[test]
    fn test_parse_invalid_utf8_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, b"a,b\n\xff\xfe,1\n").unwrap();

        let err = parse_csv(&path).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_parse_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = parse_csv(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
