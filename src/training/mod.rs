//! Self-training loop: pseudo-label, split, refit, repeat.

mod driver;
mod error;

pub use driver::{
    DEFAULT_GAP, DEFAULT_INITIAL_B, DEFAULT_ITERATIONS, DEFAULT_RATIO, IterationRecord,
    SelfTrainOptions, SelfTrainOutcome, SelfTrainer,
};
pub use error::{ErrorKind, SelfTrainError};
