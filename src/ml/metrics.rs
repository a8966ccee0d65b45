//! Agreement metrics between two labelings of the same points.

use serde::Serialize;

use crate::labeling::{Label, Side};

/// 2x2 confusion matrix indexed by [`Side`] (`upper = 0`, `lower = 1`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    /// Row-major counts (`truth * 2 + predicted`).
    pub counts: [u32; 4],
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare pseudo-labels against final predictions, skipping unlabeled points.
    pub fn from_labels(truth: &[Label], predicted: &[Side]) -> Self {
        let mut cm = Self::new();
        for (label, &side) in truth.iter().zip(predicted) {
            if let Some(truth_side) = label.side() {
                cm.add(truth_side, side);
            }
        }
        cm
    }

    pub fn add(&mut self, truth: Side, predicted: Side) {
        let idx = index(truth) * 2 + index(predicted);
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: Side, predicted: Side) -> u32 {
        self.counts[index(truth) * 2 + index(predicted)]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Fraction of counted points on the diagonal; `0.0` when empty.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct =
            self.get(Side::Upper, Side::Upper) as u64 + self.get(Side::Lower, Side::Lower) as u64;
        correct as f64 / total as f64
    }

    /// `(precision, recall)` for one side.
    pub fn precision_recall(&self, side: Side) -> (f64, f64) {
        let other = match side {
            Side::Upper => Side::Lower,
            Side::Lower => Side::Upper,
        };
        let tp = self.get(side, side) as f64;
        let fp = self.get(other, side) as f64;
        let fn_ = self.get(side, other) as f64;
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        (precision, recall)
    }
}

fn index(side: Side) -> usize {
    match side {
        Side::Upper => 0,
        Side::Lower => 1,
    }
}
