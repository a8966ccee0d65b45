//! Presentation sinks for a finished run.
//!
//! Sinks receive the full point set and the run outcome. Nothing they do feeds back into
//! self-training.

use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::Point;
use crate::training::SelfTrainOutcome;

mod json;
mod plot;
mod table;

pub use json::{Agreement, JsonReport, RunReport, SideAgreement};
pub use plot::{PlotStyle, ScatterPlot};
pub use table::LabelsCsv;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode report {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to write table {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Failed to save plot {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Point count {points} does not match label count {labels}")]
    LabelMismatch { points: usize, labels: usize },
}

/// Receives the final boundary and per-point classification.
pub trait PresentationSink {
    /// Short description used in logs.
    fn describe(&self) -> String;

    fn present(&mut self, points: &[Point], outcome: &SelfTrainOutcome) -> Result<(), ReportError>;
}

pub(crate) fn ensure_parent(path: &std::path::Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

pub(crate) fn check_lengths(points: &[Point], outcome: &SelfTrainOutcome) -> Result<(), ReportError> {
    if points.len() != outcome.labels.len() {
        return Err(ReportError::LabelMismatch {
            points: points.len(),
            labels: outcome.labels.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::geometry::{Line, Point};
    use crate::labeling::{Side, label};
    use crate::ml::Boundary;
    use crate::training::{IterationRecord, SelfTrainOutcome};

    pub fn sample() -> (Vec<Point>, SelfTrainOutcome) {
        let points = vec![
            Point::new(0.0, 1.0),
            Point::new(1.0, 0.5),
            Point::new(0.5, -1.0),
            Point::new(2.0, -2.0),
        ];
        let line = Line::new(-0.5, 0.0);
        let boundary = Boundary {
            normal_x: 0.5,
            normal_y: 1.0,
            offset: 0.0,
        };
        let outcome = SelfTrainOutcome {
            line,
            gap: 0.2,
            boundary,
            labels: boundary.classify_all(&points),
            pseudo_labels: label(&points, line, 0.2),
            iterations_run: 2,
            converged: true,
            history: vec![
                IterationRecord {
                    iteration: 0,
                    line: Line::new(-0.4, 0.1),
                    upper: 2,
                    lower: 2,
                    unlabeled: 0,
                    trained: 4,
                },
                IterationRecord {
                    iteration: 1,
                    line,
                    upper: 2,
                    lower: 2,
                    unlabeled: 0,
                    trained: 4,
                },
            ],
        };
        assert_eq!(outcome.labels, vec![Side::Upper, Side::Upper, Side::Lower, Side::Lower]);
        (points, outcome)
    }
}
