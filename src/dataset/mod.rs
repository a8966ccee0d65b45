//! Tabular point sources.

pub mod loader;

pub use loader::{
    ColumnSpec, DatasetLoadError, DatasetOptions, Transform, delimiter_byte, load_points,
};
