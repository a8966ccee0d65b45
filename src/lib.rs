//! Self-training estimate of a linear boundary between two populations of 2-D points.
//!
//! The loop labels points outside a margin band around a candidate line, refits a linear
//! classifier on those pseudo-labels, and adopts the fitted boundary as the next candidate.

/// Application directories for config and logs.
pub mod app_dirs;
/// TOML run configuration.
pub mod config;
/// CSV point ingestion.
pub mod dataset;
/// Points and lines.
pub mod geometry;
/// Margin pseudo-labels and train/eval splitting.
pub mod labeling;
/// Tracing subscriber setup.
pub mod logging;
/// Linear classifiers and boundary fitting.
pub mod ml;
/// Output sinks for finished runs.
pub mod report;
/// The self-training driver.
pub mod training;

pub use geometry::{Line, Point};
pub use labeling::{Label, Side};
pub use ml::{Boundary, LinearClassifier};
pub use training::{SelfTrainError, SelfTrainOptions, SelfTrainOutcome, SelfTrainer};
