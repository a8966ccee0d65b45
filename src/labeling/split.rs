//! Stratified train/eval partitioning of pseudo-labeled points.

use rand::Rng;
use rand::seq::SliceRandom;

use super::margin::{Label, Side};
use crate::geometry::Point;

/// Labeled training points: the (possibly truncated) upper class followed by the lower class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainSet {
    pub points: Vec<Point>,
    pub labels: Vec<Side>,
}

impl TrainSet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of training points carrying `side`.
    pub fn count(&self, side: Side) -> usize {
        self.labels.iter().filter(|&&label| label == side).count()
    }
}

/// Points left inside the margin band. Every member is implicitly `Label::Unlabeled`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalSet {
    pub points: Vec<Point>,
}

impl EvalSet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.points.iter().map(|_| Label::Unlabeled)
    }
}

/// Partition `points` by `labels` into a shuffled training set and the unlabeled residue.
///
/// The upper class is shuffled and truncated to `floor(ratio * |upper|)`; the lower class is
/// shuffled and always kept whole, so `ratio < 1` only thins the upper class. Empty classes
/// contribute nothing.
pub fn split<R>(points: &[Point], labels: &[Label], ratio: f64, rng: &mut R) -> (TrainSet, EvalSet)
where
    R: Rng + ?Sized,
{
    debug_assert_eq!(points.len(), labels.len(), "one label per point");
    let mut upper = Vec::new();
    let mut lower = Vec::new();
    let mut eval = EvalSet::default();
    for (&point, &label) in points.iter().zip(labels) {
        match label {
            Label::Upper => upper.push(point),
            Label::Lower => lower.push(point),
            Label::Unlabeled => eval.points.push(point),
        }
    }

    upper.shuffle(rng);
    upper.truncate(subsample_len(upper.len(), ratio));
    lower.shuffle(rng);

    let mut train = TrainSet {
        labels: Vec::with_capacity(upper.len() + lower.len()),
        points: Vec::with_capacity(upper.len() + lower.len()),
    };
    train.labels.extend(std::iter::repeat_n(Side::Upper, upper.len()));
    train.labels.extend(std::iter::repeat_n(Side::Lower, lower.len()));
    train.points.extend(upper);
    train.points.extend(lower);
    (train, eval)
}

fn subsample_len(count: usize, ratio: f64) -> usize {
    let kept = (ratio * count as f64).floor();
    if kept.is_nan() || kept <= 0.0 {
        0
    } else {
        (kept as usize).min(count)
    }
}
