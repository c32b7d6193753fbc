//! Labeled matrices in CSV files
//!
//! A matrix file holds one row of numbers per line. An optional header row
//! names the columns; when its first cell is empty, or when the first cell of
//! the first data row is not a number, the first column holds row labels.
//! Column labels win over row labels when both are present.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::Path;

use ndarray::Array2;
use tracing::debug;

use crate::error::{IoError, IoResult};

/// A matrix with optional labels for its rows and columns
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledMatrix {
    pub labels: Option<Vec<String>>,
    pub matrix: Array2<f64>,
}

impl LabeledMatrix {
    pub fn new(matrix: Array2<f64>) -> Self {
        Self {
            labels: None,
            matrix,
        }
    }

    /// Attach labels, one per column
    pub fn with_labels(matrix: Array2<f64>, labels: Vec<String>) -> IoResult<Self> {
        if labels.len() != matrix.ncols() {
            return Err(IoError::LabelCount {
                labels: labels.len(),
                columns: matrix.ncols(),
            });
        }
        Ok(Self {
            labels: Some(labels),
            matrix,
        })
    }

    pub fn is_square(&self) -> bool {
        self.matrix.nrows() == self.matrix.ncols()
    }

    /// Labels, or `0, 1, 2, ...` when there are none
    pub fn labels_or_indices(&self) -> Vec<String> {
        match &self.labels {
            Some(labels) => labels.clone(),
            None => (0..self.matrix.ncols()).map(|i| i.to_string()).collect(),
        }
    }
}

pub(crate) fn open(path: &Path) -> IoResult<BufReader<File>> {
    if !path.exists() {
        return Err(IoError::FileNotFound(path.display().to_string()));
    }
    let file = File::open(path).map_err(|e| IoError::OpenFailed(e.to_string()))?;
    Ok(BufReader::new(file))
}

pub(crate) fn parse_cell(value: &str, row: usize, column: usize) -> IoResult<f64> {
    value.parse().map_err(|_| IoError::NotNumeric {
        row,
        column,
        value: value.to_string(),
    })
}

/// Read a matrix from a CSV file
pub fn read_matrix_csv(path: &Path, has_header: bool) -> IoResult<LabeledMatrix> {
    let matrix = parse_matrix(open(path)?, has_header).map_err(|e| match e {
        IoError::Empty(_) => IoError::Empty(path.display().to_string()),
        other => other,
    })?;
    debug!(
        path = %path.display(),
        rows = matrix.matrix.nrows(),
        cols = matrix.matrix.ncols(),
        labeled = matrix.labels.is_some(),
        "read matrix"
    );
    Ok(matrix)
}

/// Parse CSV matrix data; rows and columns in errors count from one
pub fn parse_matrix<R: Read>(reader: R, has_header: bool) -> IoResult<LabeledMatrix> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = reader.records();

    let header: Option<Vec<String>> = if has_header {
        match records.next() {
            Some(record) => Some(record?.iter().map(str::to_string).collect()),
            None => return Err(IoError::Empty("matrix".to_string())),
        }
    } else {
        None
    };
    let rows = records.collect::<Result<Vec<_>, _>>()?;
    let first = rows
        .first()
        .ok_or_else(|| IoError::Empty("matrix".to_string()))?;

    let labeled_rows = first.get(0).is_some_and(|c| c.parse::<f64>().is_err())
        || header
            .as_ref()
            .and_then(|h| h.first())
            .is_some_and(|c| c.is_empty());
    let skip = usize::from(labeled_rows);
    let width = first.len() - skip.min(first.len());
    let offset = usize::from(has_header);

    let mut row_labels = Vec::with_capacity(rows.len());
    let mut values = Vec::with_capacity(rows.len() * width);
    for (r, record) in rows.iter().enumerate() {
        if record.len() != first.len() {
            return Err(IoError::RaggedRow {
                row: r + offset + 1,
                expected: first.len(),
                found: record.len(),
            });
        }
        for (c, cell) in record.iter().enumerate() {
            if c < skip {
                row_labels.push(cell.to_string());
            } else {
                values.push(parse_cell(cell, r + offset + 1, c + 1)?);
            }
        }
    }
    let matrix = Array2::from_shape_vec((rows.len(), width), values)
        .map_err(|e| IoError::InvalidFormat(e.to_string()))?;

    let column_labels = match header {
        // A header may or may not carry a corner cell above the row labels
        Some(header) if header.len() == width + 1 => Some(header[1..].to_vec()),
        Some(header) if header.len() == width => Some(header),
        Some(header) => {
            return Err(IoError::LabelCount {
                labels: header.len(),
                columns: width,
            })
        }
        None => None,
    };
    Ok(LabeledMatrix {
        labels: column_labels.or(labeled_rows.then_some(row_labels)),
        matrix,
    })
}

/// Write a matrix as CSV
///
/// Labels become a header row with an empty corner cell; square matrices
/// also get them as a leading row label column.
pub fn write_matrix_csv(path: &Path, data: &LabeledMatrix) -> IoResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    format_matrix(file, data)?;
    debug!(path = %path.display(), "wrote matrix");
    Ok(())
}

/// Write CSV matrix data to any writer
pub fn format_matrix<W: Write>(writer: W, data: &LabeledMatrix) -> IoResult<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    let row_labels = data.labels.as_ref().filter(|_| data.is_square());

    if let Some(labels) = &data.labels {
        let corner = row_labels.map(|_| String::new());
        writer.write_record(corner.iter().chain(labels))?;
    }
    for (i, row) in data.matrix.rows().into_iter().enumerate() {
        let label = row_labels.map(|labels| labels[i].clone());
        writer.write_record(label.into_iter().chain(row.iter().map(f64::to_string)))?;
    }
    writer.flush()?;
    Ok(())
}
