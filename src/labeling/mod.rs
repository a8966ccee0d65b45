//! Pseudo-labeling helpers.
//!
//! Points are labeled heuristically by their position relative to a candidate line and its
//! margin band, then partitioned into a training set and an unlabeled residue.

pub mod margin;
pub mod split;

pub use margin::{Label, Side, label};
pub use split::{EvalSet, TrainSet, split};
