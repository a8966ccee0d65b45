//! Points and candidate boundary lines in the 2-D feature space.

use serde::{Deserialize, Serialize};

/// A single observation in transformed feature coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Candidate boundary `y = k * x + b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Slope.
    pub k: f64,
    /// Intercept.
    pub b: f64,
}

impl Line {
    pub const fn new(k: f64, b: f64) -> Self {
        Self { k, b }
    }

    /// Height of the line at `x`, shifted vertically by `offset`.
    #[inline]
    pub fn at(&self, x: f64, offset: f64) -> f64 {
        self.k * x + self.b + offset
    }

    /// Largest absolute change of either parameter between `self` and `other`.
    pub fn max_delta(&self, other: &Line) -> f64 {
        (self.k - other.k).abs().max((self.b - other.b).abs())
    }
}

/// Evaluate `k * x + b + offset` for every point, in input order.
pub fn evaluate(points: &[Point], line: Line, offset: f64) -> Vec<f64> {
    points.iter().map(|point| line.at(point.x, offset)).collect()
}
