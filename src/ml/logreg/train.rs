use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};

use super::{LogRegModel, sigmoid};
use crate::geometry::Point;
use crate::labeling::Side;

/// Training options for the logistic boundary model.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
    pub batch_size: usize,
    pub seed: u64,
    pub balance_classes: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 200,
            learning_rate: 0.1,
            l2: 1e-4,
            batch_size: 64,
            seed: 42,
            balance_classes: true,
        }
    }
}

/// Fit a logistic model with mini-batch gradient descent.
///
/// Inputs must already be validated (same length, both classes present, finite).
pub fn train_logreg(points: &[Point], labels: &[Side], options: &TrainOptions) -> LogRegModel {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut weights = [0.0f64; 2];
    let mut bias = 0.0f64;
    for w in &mut weights {
        *w = (rng.random::<f64>() - 0.5) * 0.01;
    }

    let mut indices: Vec<usize> = (0..points.len()).collect();
    let batch_size = options.batch_size.max(1);
    let lr = options.learning_rate;
    let l2 = options.l2.max(0.0);
    let class_weights = class_weights(labels, options.balance_classes);

    for _epoch in 0..options.epochs {
        indices.shuffle(&mut rng);
        for chunk in indices.chunks(batch_size) {
            let mut grad_w = [0.0f64; 2];
            let mut grad_b = 0.0f64;
            let mut batch_weight = 0.0f64;
            for &idx in chunk {
                let point = points[idx];
                let (target, weight) = match labels[idx] {
                    Side::Upper => (1.0, class_weights[0]),
                    Side::Lower => (0.0, class_weights[1]),
                };
                let prob = sigmoid(weights[0] * point.x + weights[1] * point.y + bias);
                let diff = (prob - target) * weight;
                grad_w[0] += diff * point.x;
                grad_w[1] += diff * point.y;
                grad_b += diff;
                batch_weight += weight;
            }
            if batch_weight == 0.0 {
                continue;
            }
            let inv = 1.0 / batch_weight;
            for (w, g) in weights.iter_mut().zip(grad_w) {
                *w -= lr * (g * inv + l2 * *w);
            }
            bias -= lr * grad_b * inv;
        }
    }

    LogRegModel { weights, bias }
}

/// Per-class loss weights as `[upper, lower]`.
fn class_weights(labels: &[Side], balance: bool) -> [f64; 2] {
    if !balance {
        return [1.0, 1.0];
    }
    let upper = labels.iter().filter(|&&side| side == Side::Upper).count() as f64;
    let lower = labels.len() as f64 - upper;
    let total = upper + lower;
    let weight = |count: f64| if count == 0.0 { 0.0 } else { total / (2.0 * count) };
    [weight(upper), weight(lower)]
}
