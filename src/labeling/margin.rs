//! Margin-band pseudo-labels.

use serde::{Deserialize, Serialize};

use crate::geometry::{Line, Point, evaluate};

/// Side of a boundary. Final classifications only ever use these two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Upper,
    Lower,
}

impl Side {
    /// Numeric code used in exported tables (`1` upper, `0` lower).
    pub fn code(self) -> u8 {
        match self {
            Side::Upper => 1,
            Side::Lower => 0,
        }
    }
}

/// Three-way pseudo-label assigned from a line and margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Upper,
    Lower,
    Unlabeled,
}

impl Label {
    pub fn side(self) -> Option<Side> {
        match self {
            Label::Upper => Some(Side::Upper),
            Label::Lower => Some(Side::Lower),
            Label::Unlabeled => None,
        }
    }

    pub fn is_labeled(self) -> bool {
        self != Label::Unlabeled
    }
}

impl From<Side> for Label {
    fn from(side: Side) -> Self {
        match side {
            Side::Upper => Label::Upper,
            Side::Lower => Label::Lower,
        }
    }
}

/// Label every point against the band `[k*x + b - gap, k*x + b + gap]`.
///
/// Points strictly above the upper edge are `Upper`, points strictly below the lower edge are
/// `Lower`, and everything else is `Unlabeled`. The upper test runs first, so when `gap` is
/// negative (the band is inverted) a point satisfying both tests is `Upper`. A zero gap labels
/// only points lying exactly on the line as `Unlabeled`.
pub fn label(points: &[Point], line: Line, gap: f64) -> Vec<Label> {
    let upper_edge = evaluate(points, line, gap);
    let lower_edge = evaluate(points, line, -gap);
    points
        .iter()
        .zip(upper_edge.iter().zip(lower_edge.iter()))
        .map(|(point, (&upper, &lower))| {
            if point.y > upper {
                Label::Upper
            } else if point.y < lower {
                Label::Lower
            } else {
                Label::Unlabeled
            }
        })
        .collect()
}
