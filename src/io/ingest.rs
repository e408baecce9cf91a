//! CSV ingest for the rating tables.
//!
//! This module turns a scraped rating-comparison CSV into a column-oriented
//! table of optional numbers.
//!
//! Design goals:
//! - **Strict schema**: column names must match exactly (only surrounding
//!   whitespace and a UTF-8 BOM are tolerated)
//! - **Cell-level leniency**: empty or unparsable cells become missing values,
//!   unparsable ones are reported
//! - **Separation of concerns**: no pairing or fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::error::{RegressionError, Result};

/// A cell that held text but could not be read as a number.
#[derive(Debug, Clone)]
pub struct CellError {
    pub line: usize,
    pub column: String,
    pub value: String,
}

/// Column-oriented numeric table with missing values.
#[derive(Debug, Clone)]
pub struct RatingTable {
    name: String,
    header_map: HashMap<String, usize>,
    columns: Vec<Vec<Option<f64>>>,
    rows: usize,
    cell_errors: Vec<CellError>,
}

impl RatingTable {
    /// Build a table from named columns of equal length.
    pub fn from_columns(name: impl Into<String>, columns: Vec<(&str, Vec<Option<f64>>)>) -> Result<Self> {
        let name = name.into();
        let rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        if let Some((_, bad)) = columns.iter().find(|(_, c)| c.len() != rows) {
            return Err(RegressionError::LengthMismatch {
                x_len: rows,
                y_len: bad.len(),
            });
        }

        let header_map = columns
            .iter()
            .enumerate()
            .map(|(idx, (col, _))| (normalize_header_name(col), idx))
            .collect();
        let columns = columns.into_iter().map(|(_, c)| c).collect();

        Ok(Self {
            name,
            header_map,
            columns,
            rows,
            cell_errors: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_errors(&self) -> &[CellError] {
        &self.cell_errors
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.header_map.contains_key(column)
    }

    /// Fail with an `InputSchema` error for the first absent column.
    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        match required.iter().find(|c| !self.has_column(c)) {
            Some(missing) => Err(self.missing(missing)),
            None => Ok(()),
        }
    }

    pub fn column(&self, column: &str) -> Result<&[Option<f64>]> {
        let idx = self.header_map.get(column).ok_or_else(|| self.missing(column))?;
        Ok(&self.columns[*idx])
    }

    /// Rows where both columns are present, as two aligned vectors.
    pub fn complete_pairs(&self, a: &str, b: &str) -> Result<(Vec<f64>, Vec<f64>)> {
        let left = self.column(a)?;
        let right = self.column(b)?;
        Ok(left
            .iter()
            .zip(right)
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .unzip())
    }

    fn missing(&self, column: &str) -> RegressionError {
        RegressionError::InputSchema {
            table: self.name.clone(),
            column: column.to_string(),
        }
    }
}

/// Load a rating table from a CSV file with a header row.
pub fn load_rating_table(name: &str, path: &Path) -> Result<RatingTable> {
    let file = File::open(path).map_err(|source| RegressionError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = read_rating_table(name, file).map_err(|err| match err {
        RegressionError::Csv { source, .. } => RegressionError::Csv {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })?;

    debug!(
        table = name,
        path = %path.display(),
        rows = table.rows(),
        columns = table.columns.len(),
        "loaded rating table"
    );
    Ok(table)
}

/// Parse a rating table from any CSV reader.
pub fn read_rating_table<R: Read>(name: &str, input: R) -> Result<RatingTable> {
    let csv_err = |source| RegressionError::Csv {
        path: name.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers().map_err(csv_err)?.clone();
    let header_map = build_header_map(&headers);
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();

    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];
    let mut cell_errors = Vec::new();
    let mut rows = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based lines, plus the header line.
        let line = idx + 2;
        let record = result.map_err(csv_err)?;
        rows += 1;

        for (col, values) in columns.iter_mut().enumerate() {
            let raw = record.get(col).unwrap_or("");
            let value = parse_cell(raw);
            if value.is_none() && !raw.is_empty() {
                cell_errors.push(CellError {
                    line,
                    column: names[col].clone(),
                    value: raw.to_string(),
                });
            }
            values.push(value);
        }
    }

    if !cell_errors.is_empty() {
        warn!(
            table = name,
            count = cell_errors.len(),
            first_line = cell_errors[0].line,
            first_column = %cell_errors[0].column,
            "treating unparsable cells as missing"
        );
    }

    Ok(RatingTable {
        name: name.to_string(),
        header_map,
        columns,
        rows,
        cell_errors,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM; without
    // stripping it, schema validation would report that column as missing.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_cell(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\u{feff}chess_com_blitz,lichess_blitz,lichess_bullet\n\
                       500,1030,\n\
                       1000, 1420 ,975\n\
                       2000,2100,n/a\n";

    #[test]
    fn reads_columns_with_missing_cells() {
        let table = read_rating_table("cross", CSV.as_bytes()).unwrap();
        assert_eq!(table.rows(), 3);
        assert_eq!(
            table.column("chess_com_blitz").unwrap(),
            &[Some(500.0), Some(1000.0), Some(2000.0)]
        );
        assert_eq!(table.column("lichess_blitz").unwrap()[1], Some(1420.0));
        assert_eq!(table.column("lichess_bullet").unwrap(), &[None, Some(975.0), None]);
    }

    #[test]
    fn reports_unparsable_cells() {
        let table = read_rating_table("cross", CSV.as_bytes()).unwrap();
        let errors = table.cell_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 4);
        assert_eq!(errors[0].column, "lichess_bullet");
        assert_eq!(errors[0].value, "n/a");
    }

    #[test]
    fn complete_pairs_drop_incomplete_rows() {
        let table = read_rating_table("cross", CSV.as_bytes()).unwrap();
        let (x, y) = table.complete_pairs("lichess_bullet", "chess_com_blitz").unwrap();
        assert_eq!(x, vec![975.0]);
        assert_eq!(y, vec![1000.0]);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let table = read_rating_table("cross", CSV.as_bytes()).unwrap();
        let err = table.require_columns(&["lichess_blitz", "lichess_rapid"]).unwrap_err();
        match err {
            RegressionError::InputSchema { table, column } => {
                assert_eq!(table, "cross");
                assert_eq!(column, "lichess_rapid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn column_names_are_case_sensitive() {
        let table = read_rating_table("cross", "Lichess_Blitz\n1500\n".as_bytes()).unwrap();
        assert!(!table.has_column("lichess_blitz"));
    }

    #[test]
    fn short_rows_pad_with_missing() {
        let table = read_rating_table("t", "a,b\n1,2\n3\n".as_bytes()).unwrap();
        assert_eq!(table.column("b").unwrap(), &[Some(2.0), None]);
    }

    #[test]
    fn from_columns_rejects_ragged_input() {
        let err = RatingTable::from_columns(
            "t",
            vec![("a", vec![Some(1.0)]), ("b", vec![Some(1.0), Some(2.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, RegressionError::LengthMismatch { .. }));
    }
}
