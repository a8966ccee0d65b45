//! Converts a classifier's decision boundary into slope/intercept form.

use thiserror::Error;

use super::{Boundary, ClassifierError, LinearClassifier};
use crate::geometry::Line;
use crate::labeling::TrainSet;

/// Relative size below which the y-component of a normal counts as zero.
const NORMAL_Y_EPSILON: f64 = 1e-12;

#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("no upper or lower points remain outside the margin band")]
    DegenerateSplit,
    #[error("fitted boundary is vertical (normal_y = {normal_y:e}) and has no slope/intercept form")]
    DegenerateFit { normal_y: f64 },
    #[error("classifier failed: {0}")]
    Classifier(#[from] ClassifierError),
}

/// Fitted boundary in both line and normal-vector form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedBoundary {
    pub line: Line,
    pub boundary: Boundary,
}

/// Fit `classifier` to a training split and express the result as `y = k * x + b`.
pub fn fit<C>(classifier: &C, train: &TrainSet) -> Result<FittedBoundary, FitError>
where
    C: LinearClassifier + ?Sized,
{
    if train.is_empty() {
        return Err(FitError::DegenerateSplit);
    }
    let boundary = classifier.fit(&train.points, &train.labels)?;
    let line = line_from_boundary(&boundary)?;
    Ok(FittedBoundary { line, boundary })
}

/// `k = -normal_x / normal_y`, `b = -offset / normal_y`.
pub fn line_from_boundary(boundary: &Boundary) -> Result<Line, FitError> {
    let Boundary {
        normal_x,
        normal_y,
        offset,
    } = *boundary;
    let scale = normal_x.abs().max(offset.abs());
    if normal_y == 0.0 || normal_y.abs() <= NORMAL_Y_EPSILON * scale {
        return Err(FitError::DegenerateFit { normal_y });
    }
    Ok(Line::new(-normal_x / normal_y, -offset / normal_y))
}
