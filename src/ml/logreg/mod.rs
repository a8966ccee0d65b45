//! Binary logistic regression over 2-D points.

use super::{Boundary, ClassifierError, LinearClassifier, validate_training_input};
use crate::geometry::Point;
use crate::labeling::Side;

mod train;
pub use train::{TrainOptions, train_logreg};

/// Fitted logistic model; `sigmoid(w · p + bias)` is the probability of [`Side::Upper`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogRegModel {
    pub weights: [f64; 2],
    pub bias: f64,
}

impl LogRegModel {
    pub fn boundary(&self) -> Boundary {
        Boundary {
            normal_x: self.weights[0],
            normal_y: self.weights[1],
            offset: self.bias,
        }
    }
}

/// [`LinearClassifier`] adapter around [`train_logreg`].
#[derive(Debug, Clone, Default)]
pub struct LogisticRegression {
    options: TrainOptions,
}

impl LogisticRegression {
    pub fn new(options: TrainOptions) -> Self {
        Self { options }
    }
}

impl LinearClassifier for LogisticRegression {
    fn name(&self) -> &'static str {
        "logistic"
    }

    fn fit(&self, points: &[Point], labels: &[Side]) -> Result<Boundary, ClassifierError> {
        validate_training_input(points, labels)?;
        let model = train_logreg(points, labels, &self.options);
        let boundary = model.boundary();
        if !boundary.is_finite() {
            return Err(ClassifierError::NonFiniteBoundary { model: self.name() });
        }
        Ok(boundary)
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
