//! CSV loader producing transformed 2-D points.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Point;

#[derive(Debug, Error)]
pub enum DatasetLoadError {
    #[error("Failed to read {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Column {column:?} not found in {path} (available: {available})")]
    MissingColumn {
        path: PathBuf,
        column: String,
        available: String,
    },
    #[error("No usable rows in {path} ({skipped} skipped)")]
    Empty { path: PathBuf, skipped: usize },
    #[error("Delimiter {delimiter:?} is not a single ASCII character")]
    InvalidDelimiter { delimiter: char },
}

/// Per-column transform applied after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    Identity,
    Log10,
    NegLog10,
}

impl Transform {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Transform::Identity => value,
            Transform::Log10 => value.log10(),
            Transform::NegLog10 => -value.log10(),
        }
    }
}

/// Named column plus its transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub transform: Transform,
}

/// Which columns become the point coordinates.
///
/// Defaults read asteroid diameters and rotation periods as `(log10 d, -log10 P)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetOptions {
    pub x_column: String,
    pub y_column: String,
    pub x_transform: Transform,
    pub y_transform: Transform,
    pub delimiter: char,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            x_column: "diameter (km)".to_string(),
            y_column: "Period (h)".to_string(),
            x_transform: Transform::Log10,
            y_transform: Transform::NegLog10,
            delimiter: ',',
        }
    }
}

impl DatasetOptions {
    pub fn x(&self) -> ColumnSpec {
        ColumnSpec {
            name: self.x_column.clone(),
            transform: self.x_transform,
        }
    }

    pub fn y(&self) -> ColumnSpec {
        ColumnSpec {
            name: self.y_column.clone(),
            transform: self.y_transform,
        }
    }
}

/// Load points from a header-bearing delimited file, in file order.
///
/// Rows with a missing or unparseable cell, or whose transformed value is not finite
/// (e.g. `log10` of a non-positive number), are skipped.
pub fn load_points(path: &Path, options: &DatasetOptions) -> Result<Vec<Point>, DatasetLoadError> {
    let file = std::fs::File::open(path).map_err(|source| DatasetLoadError::Csv {
        path: path.to_path_buf(),
        source: source.into(),
    })?;
    let points = load_points_from_reader(file, path, options)?;
    tracing::info!(points = points.len(), path = %path.display(), "Loaded point set");
    Ok(points)
}

/// Same as [`load_points`] over any reader; `origin` is only used in messages.
pub fn load_points_from_reader<R: Read>(
    reader: R,
    origin: &Path,
    options: &DatasetOptions,
) -> Result<Vec<Point>, DatasetLoadError> {
    let delimiter = delimiter_byte(options.delimiter)?;
    let csv_error = |source: csv::Error| DatasetLoadError::Csv {
        path: origin.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers().map_err(csv_error)?.clone();
    let x_spec = options.x();
    let y_spec = options.y();
    let x_idx = column_index(&headers, &x_spec.name, origin)?;
    let y_idx = column_index(&headers, &y_spec.name, origin)?;

    let mut points = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let x = read_cell(&record, x_idx, x_spec.transform);
        let y = read_cell(&record, y_idx, y_spec.transform);
        match (x, y) {
            (Some(x), Some(y)) => points.push(Point::new(x, y)),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, path = %origin.display(), "Skipped rows without usable values");
    }
    if points.is_empty() {
        return Err(DatasetLoadError::Empty {
            path: origin.to_path_buf(),
            skipped,
        });
    }
    Ok(points)
}

fn column_index(
    headers: &csv::StringRecord,
    name: &str,
    origin: &Path,
) -> Result<usize, DatasetLoadError> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| DatasetLoadError::MissingColumn {
            path: origin.to_path_buf(),
            column: name.to_string(),
            available: headers.iter().collect::<Vec<_>>().join(", "),
        })
}

fn read_cell(record: &csv::StringRecord, idx: usize, transform: Transform) -> Option<f64> {
    let raw = record.get(idx)?.parse::<f64>().ok()?;
    let value = transform.apply(raw);
    value.is_finite().then_some(value)
}

/// The `csv` reader splits on a single byte, so only ASCII delimiters are usable.
pub fn delimiter_byte(delimiter: char) -> Result<u8, DatasetLoadError> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(DatasetLoadError::InvalidDelimiter { delimiter })
    }
}
