//! Column data for line plots

use std::io::Read;
use std::path::Path;

use ndarray::Array2;
use tracing::debug;

use crate::error::{IoError, IoResult};
use crate::matrix::{open, parse_cell};

/// Read named numeric columns from a CSV file with a header row
///
/// Empty cells become NaN so that gaps survive into plots.
pub fn read_columns_csv(path: &Path) -> IoResult<(Vec<String>, Array2<f64>)> {
    let (headers, data) = parse_columns(open(path)?).map_err(|e| match e {
        IoError::Empty(_) => IoError::Empty(path.display().to_string()),
        other => other,
    })?;
    debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = data.nrows(),
        "read columns"
    );
    Ok((headers, data))
}

/// Parse headed CSV columns from any reader
pub fn parse_columns<R: Read>(reader: R) -> IoResult<(Vec<String>, Array2<f64>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(IoError::Empty("columns".to_string()));
    }

    let mut values = Vec::new();
    let mut rows = 0;
    for (r, record) in reader.records().enumerate() {
        let record = record?;
        // Line numbers count the header
        let row = r + 2;
        if record.len() != headers.len() {
            return Err(IoError::RaggedRow {
                row,
                expected: headers.len(),
                found: record.len(),
            });
        }
        for (c, cell) in record.iter().enumerate() {
            values.push(if cell.is_empty() {
                f64::NAN
            } else {
                parse_cell(cell, row, c + 1)?
            });
        }
        rows += 1;
    }
    if rows == 0 {
        return Err(IoError::Empty("columns".to_string()));
    }

    let data = Array2::from_shape_vec((rows, headers.len()), values)
        .map_err(|e| IoError::InvalidFormat(e.to_string()))?;
    Ok((headers, data))
}
