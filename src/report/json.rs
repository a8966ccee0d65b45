use std::path::PathBuf;

use serde::Serialize;

use super::{PresentationSink, ReportError, check_lengths, ensure_parent};
use crate::geometry::Point;
use crate::labeling::Side;
use crate::ml::Boundary;
use crate::ml::metrics::ConfusionMatrix;
use crate::training::{IterationRecord, SelfTrainOutcome};

/// Serialized run summary written by [`JsonReport`].
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub classifier: &'a str,
    pub k: f64,
    pub b: f64,
    pub gap: f64,
    pub iterations_run: usize,
    pub converged: bool,
    pub boundary: Boundary,
    pub points: usize,
    pub upper: usize,
    pub lower: usize,
    /// Agreement of the final classifier with the margin labels of the final line.
    pub agreement: Agreement,
    pub history: &'a [IterationRecord],
}

#[derive(Debug, Clone, Serialize)]
pub struct Agreement {
    pub compared: u64,
    pub accuracy: f64,
    pub upper: SideAgreement,
    pub lower: SideAgreement,
    pub confusion: ConfusionMatrix,
}

/// Precision and recall of the final classification for one side, against the margin labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SideAgreement {
    pub precision: f64,
    pub recall: f64,
}

impl SideAgreement {
    fn new(confusion: &ConfusionMatrix, side: Side) -> Self {
        let (precision, recall) = confusion.precision_recall(side);
        Self { precision, recall }
    }
}

impl<'a> RunReport<'a> {
    pub fn new(classifier: &'a str, outcome: &'a SelfTrainOutcome) -> Self {
        let confusion = ConfusionMatrix::from_labels(&outcome.pseudo_labels, &outcome.labels);
        Self {
            classifier,
            k: outcome.line.k,
            b: outcome.line.b,
            gap: outcome.gap,
            iterations_run: outcome.iterations_run,
            converged: outcome.converged,
            boundary: outcome.boundary,
            points: outcome.labels.len(),
            upper: outcome.count(Side::Upper),
            lower: outcome.count(Side::Lower),
            agreement: Agreement {
                compared: confusion.total(),
                accuracy: confusion.accuracy(),
                upper: SideAgreement::new(&confusion, Side::Upper),
                lower: SideAgreement::new(&confusion, Side::Lower),
                confusion,
            },
            history: &outcome.history,
        }
    }
}

/// Writes a pretty-printed JSON summary of the run.
#[derive(Debug, Clone)]
pub struct JsonReport {
    path: PathBuf,
    classifier: String,
}

impl JsonReport {
    pub fn new(path: impl Into<PathBuf>, classifier: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            classifier: classifier.into(),
        }
    }
}

impl PresentationSink for JsonReport {
    fn describe(&self) -> String {
        format!("report {}", self.path.display())
    }

    fn present(&mut self, points: &[Point], outcome: &SelfTrainOutcome) -> Result<(), ReportError> {
        check_lengths(points, outcome)?;
        let report = RunReport::new(&self.classifier, outcome);
        let bytes = serde_json::to_vec_pretty(&report).map_err(|source| ReportError::Json {
            path: self.path.clone(),
            source,
        })?;
        ensure_parent(&self.path)?;
        std::fs::write(&self.path, bytes).map_err(|source| ReportError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
