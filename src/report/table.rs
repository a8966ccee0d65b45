use std::path::PathBuf;

use super::{PresentationSink, ReportError, check_lengths, ensure_parent};
use crate::geometry::Point;
use crate::labeling::Label;
use crate::training::SelfTrainOutcome;

/// Writes one row per point: `x,y,label,pseudo_label`.
///
/// `label` is the final classification (`1` upper, `0` lower); `pseudo_label` is the margin
/// label against the final line, with `-1` for points inside the band.
#[derive(Debug, Clone)]
pub struct LabelsCsv {
    path: PathBuf,
}

impl LabelsCsv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PresentationSink for LabelsCsv {
    fn describe(&self) -> String {
        format!("labels {}", self.path.display())
    }

    fn present(&mut self, points: &[Point], outcome: &SelfTrainOutcome) -> Result<(), ReportError> {
        check_lengths(points, outcome)?;
        ensure_parent(&self.path)?;
        let csv_error = |source: csv::Error| ReportError::Csv {
            path: self.path.clone(),
            source,
        };
        let mut writer = csv::Writer::from_path(&self.path).map_err(csv_error)?;
        writer
            .write_record(["x", "y", "label", "pseudo_label"])
            .map_err(csv_error)?;
        for ((point, side), pseudo) in points
            .iter()
            .zip(&outcome.labels)
            .zip(&outcome.pseudo_labels)
        {
            writer
                .write_record([
                    point.x.to_string(),
                    point.y.to_string(),
                    side.code().to_string(),
                    pseudo_code(*pseudo).to_string(),
                ])
                .map_err(csv_error)?;
        }
        writer.flush().map_err(|source| ReportError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn pseudo_code(label: Label) -> i8 {
    match label.side() {
        Some(side) => side.code() as i8,
        None => -1,
    }
}
