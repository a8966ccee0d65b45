//! Linear classifiers used as boundary oracles for self-training.
//!
//! Any model that can fit a straight decision boundary to two-class 2-D points implements
//! [`LinearClassifier`]. The self-training driver never looks past the returned [`Boundary`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Point;
use crate::labeling::Side;

pub mod fitter;
pub mod linear_svm;
pub mod logreg;
pub mod metrics;

pub use fitter::{FitError, FittedBoundary, fit};
pub use linear_svm::{LinearSvm, SvmOptions};
pub use logreg::{LogisticRegression, TrainOptions};

/// Decision boundary `normal_x * x + normal_y * y + offset = 0`.
///
/// Positive decision values are classified as [`Side::Upper`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub normal_x: f64,
    pub normal_y: f64,
    pub offset: f64,
}

impl Boundary {
    #[inline]
    pub fn decision(&self, point: Point) -> f64 {
        self.normal_x * point.x + self.normal_y * point.y + self.offset
    }

    pub fn classify(&self, point: Point) -> Side {
        if self.decision(point) > 0.0 {
            Side::Upper
        } else {
            Side::Lower
        }
    }

    /// Classify every point. The result is total: there is no unlabeled outcome.
    pub fn classify_all(&self, points: &[Point]) -> Vec<Side> {
        points.iter().map(|&point| self.classify(point)).collect()
    }

    pub fn is_finite(&self) -> bool {
        self.normal_x.is_finite() && self.normal_y.is_finite() && self.offset.is_finite()
    }
}

/// Failures reported by a classifier while fitting.
#[derive(Debug, Error, PartialEq)]
pub enum ClassifierError {
    #[error("no training points")]
    Empty,
    #[error("got {points} points but {labels} labels")]
    LengthMismatch { points: usize, labels: usize },
    #[error("training data contains only {present:?} points; two classes are required")]
    SingleClass { present: Side },
    #[error("training data contains non-finite coordinates")]
    NonFiniteInput,
    #[error("{model} produced a non-finite boundary")]
    NonFiniteBoundary { model: &'static str },
}

/// Capability to fit a linear decision boundary to labeled 2-D points.
pub trait LinearClassifier {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    fn fit(&self, points: &[Point], labels: &[Side]) -> Result<Boundary, ClassifierError>;
}

impl<C: LinearClassifier + ?Sized> LinearClassifier for Box<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fit(&self, points: &[Point], labels: &[Side]) -> Result<Boundary, ClassifierError> {
        (**self).fit(points, labels)
    }
}

/// Shared input checks for the built-in classifiers.
pub(crate) fn validate_training_input(
    points: &[Point],
    labels: &[Side],
) -> Result<(), ClassifierError> {
    if points.len() != labels.len() {
        return Err(ClassifierError::LengthMismatch {
            points: points.len(),
            labels: labels.len(),
        });
    }
    let Some(&first) = labels.first() else {
        return Err(ClassifierError::Empty);
    };
    if labels.iter().all(|&side| side == first) {
        return Err(ClassifierError::SingleClass { present: first });
    }
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(ClassifierError::NonFiniteInput);
    }
    Ok(())
}

/// `+1` for upper, `-1` for lower.
pub(crate) fn signed_target(side: Side) -> f64 {
    match side {
        Side::Upper => 1.0,
        Side::Lower => -1.0,
    }
}
