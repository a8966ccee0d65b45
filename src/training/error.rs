use thiserror::Error;

use crate::ml::{ClassifierError, FitError};

/// Fatal errors for a self-training run.
#[derive(Debug, Error, PartialEq)]
pub enum SelfTrainError {
    #[error("point set is empty")]
    EmptyDataset,
    #[error("invalid self-training options: {0}")]
    InvalidOptions(String),
    /// A step of the loop failed. The run is aborted and no partial outcome is returned.
    #[error("iteration {iteration}: {source}")]
    Iteration { iteration: usize, source: FitError },
}

/// Coarse classification of [`SelfTrainError`] for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyDataset,
    InvalidOptions,
    DegenerateSplit,
    DegenerateFit,
    ClassifierFailure,
}

impl SelfTrainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SelfTrainError::EmptyDataset => ErrorKind::EmptyDataset,
            SelfTrainError::InvalidOptions(_) => ErrorKind::InvalidOptions,
            SelfTrainError::Iteration { source, .. } => match source {
                FitError::DegenerateSplit => ErrorKind::DegenerateSplit,
                FitError::DegenerateFit { .. } => ErrorKind::DegenerateFit,
                FitError::Classifier(_) => ErrorKind::ClassifierFailure,
            },
        }
    }

    /// Zero-based iteration at which the run failed, if it got that far.
    pub fn iteration(&self) -> Option<usize> {
        match self {
            SelfTrainError::Iteration { iteration, .. } => Some(*iteration),
            _ => None,
        }
    }

    pub fn classifier_error(&self) -> Option<&ClassifierError> {
        match self {
            SelfTrainError::Iteration {
                source: FitError::Classifier(err),
                ..
            } => Some(err),
            _ => None,
        }
    }
}
