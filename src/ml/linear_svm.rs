//! Squared-hinge linear SVM trained by dual coordinate descent.
//!
//! The bias is learned as the weight of a constant feature (`intercept_scaling`) and is
//! regularized along with the normal vector. Coordinates are visited in a shuffled order drawn
//! from a generator seeded per fit, so identical inputs always produce identical boundaries.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{Boundary, ClassifierError, LinearClassifier, signed_target, validate_training_input};
use crate::geometry::Point;
use crate::labeling::Side;

/// Hyperparameters for [`LinearSvm`].
#[derive(Debug, Clone)]
pub struct SvmOptions {
    /// Inverse regularization strength.
    pub c: f64,
    /// Stopping threshold on the spread of projected gradients.
    pub tolerance: f64,
    /// Maximum number of passes over the training set.
    pub max_iter: usize,
    /// Value of the synthetic constant feature carrying the intercept.
    pub intercept_scaling: f64,
    /// Seed for the coordinate visiting order.
    pub seed: u64,
}

impl Default for SvmOptions {
    fn default() -> Self {
        Self {
            c: 1.0,
            tolerance: 1e-4,
            max_iter: 1000,
            intercept_scaling: 1.0,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinearSvm {
    options: SvmOptions,
}

impl LinearSvm {
    pub fn new(options: SvmOptions) -> Self {
        Self { options }
    }
}

impl LinearClassifier for LinearSvm {
    fn name(&self) -> &'static str {
        "linear_svm"
    }

    fn fit(&self, points: &[Point], labels: &[Side]) -> Result<Boundary, ClassifierError> {
        validate_training_input(points, labels)?;
        let opts = &self.options;
        let rows: Vec<[f64; 3]> = points
            .iter()
            .map(|p| [p.x, p.y, opts.intercept_scaling])
            .collect();
        let targets: Vec<f64> = labels.iter().map(|&side| signed_target(side)).collect();

        let diag = 0.5 / opts.c.max(f64::MIN_POSITIVE);
        let q_diag: Vec<f64> = rows.iter().map(|row| dot(row, row) + diag).collect();
        let mut alpha = vec![0.0f64; rows.len()];
        let mut w = [0.0f64; 3];
        let mut order: Vec<usize> = (0..rows.len()).collect();
        let mut rng = StdRng::seed_from_u64(opts.seed);

        let mut passes = 0usize;
        let mut converged = false;
        while passes < opts.max_iter.max(1) {
            passes += 1;
            order.shuffle(&mut rng);
            let mut pg_max = f64::NEG_INFINITY;
            let mut pg_min = f64::INFINITY;
            for &i in &order {
                let grad = targets[i] * dot(&w, &rows[i]) - 1.0 + diag * alpha[i];
                let projected = if alpha[i] == 0.0 { grad.min(0.0) } else { grad };
                pg_max = pg_max.max(projected);
                pg_min = pg_min.min(projected);
                if projected.abs() > 1e-12 {
                    let previous = alpha[i];
                    alpha[i] = (previous - grad / q_diag[i]).max(0.0);
                    let step = (alpha[i] - previous) * targets[i];
                    for (wj, xj) in w.iter_mut().zip(rows[i].iter()) {
                        *wj += step * xj;
                    }
                }
            }
            if pg_max - pg_min <= opts.tolerance {
                converged = true;
                break;
            }
        }
        if !converged {
            tracing::debug!(passes, "linear SVM stopped at max_iter before reaching tolerance");
        }

        let boundary = Boundary {
            normal_x: w[0],
            normal_y: w[1],
            offset: w[2] * opts.intercept_scaling,
        };
        if !boundary.is_finite() {
            return Err(ClassifierError::NonFiniteBoundary { model: self.name() });
        }
        Ok(boundary)
    }
}

#[inline]
fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
