use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use super::error::SelfTrainError;
use crate::geometry::{Line, Point};
use crate::labeling::{Label, Side, label, split};
use crate::ml::{Boundary, FittedBoundary, LinearClassifier, fit};

pub const DEFAULT_INITIAL_B: f64 = -1.2;
pub const DEFAULT_GAP: f64 = 0.2;
pub const DEFAULT_ITERATIONS: usize = 1000;
pub const DEFAULT_RATIO: f64 = 1.0;

/// Parameters of one self-training run.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfTrainOptions {
    /// Starting line. The slope largely decides which solution the loop settles on.
    pub initial_line: Line,
    /// Half-width of the exclusion band. Negative values invert the band.
    pub gap: f64,
    /// Upper bound on fit rounds.
    pub iterations: usize,
    /// Fraction of upper-class points kept for training; lower-class points are always kept.
    pub ratio: f64,
    /// Seed for shuffling; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Stop once both `k` and `b` move by strictly less than this between rounds.
    /// Disabled when `None`.
    pub tolerance: Option<f64>,
}

impl SelfTrainOptions {
    pub fn new(initial_k: f64) -> Self {
        Self {
            initial_line: Line::new(initial_k, DEFAULT_INITIAL_B),
            gap: DEFAULT_GAP,
            iterations: DEFAULT_ITERATIONS,
            ratio: DEFAULT_RATIO,
            seed: None,
            tolerance: None,
        }
    }

    pub fn validate(&self) -> Result<(), SelfTrainError> {
        let invalid = |msg: String| Err(SelfTrainError::InvalidOptions(msg));
        if !self.initial_line.k.is_finite() || !self.initial_line.b.is_finite() {
            return invalid(format!(
                "initial line must be finite (k = {}, b = {})",
                self.initial_line.k, self.initial_line.b
            ));
        }
        if !self.gap.is_finite() {
            return invalid(format!("gap must be finite, got {}", self.gap));
        }
        if self.iterations == 0 {
            return invalid("iterations must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.ratio) {
            return invalid(format!("ratio must be within [0, 1], got {}", self.ratio));
        }
        if let Some(tolerance) = self.tolerance
            && !(tolerance.is_finite() && tolerance > 0.0)
        {
            return invalid(format!("tolerance must be positive, got {tolerance}"));
        }
        Ok(())
    }
}

/// Summary of a single fit round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationRecord {
    pub iteration: usize,
    /// Line fitted in this round.
    pub line: Line,
    /// Points labeled upper/lower/unlabeled against the previous line.
    pub upper: usize,
    pub lower: usize,
    pub unlabeled: usize,
    /// Points actually handed to the classifier.
    pub trained: usize,
}

/// Final state of a completed run.
#[derive(Debug, Clone)]
pub struct SelfTrainOutcome {
    pub line: Line,
    pub gap: f64,
    /// Decision boundary of the last fitted classifier.
    pub boundary: Boundary,
    /// Final classification of every input point, in input order.
    pub labels: Vec<Side>,
    /// Margin labels against the final line, kept for agreement reporting.
    pub pseudo_labels: Vec<Label>,
    pub iterations_run: usize,
    pub converged: bool,
    pub history: Vec<IterationRecord>,
}

impl SelfTrainOutcome {
    pub fn count(&self, side: Side) -> usize {
        self.labels.iter().filter(|&&label| label == side).count()
    }
}

/// Drives the fixed-budget self-training loop with a borrowed classifier.
pub struct SelfTrainer<'a, C: ?Sized> {
    classifier: &'a C,
    options: SelfTrainOptions,
}

impl<'a, C> SelfTrainer<'a, C>
where
    C: LinearClassifier + ?Sized,
{
    pub fn new(classifier: &'a C, options: SelfTrainOptions) -> Self {
        Self {
            classifier,
            options,
        }
    }

    /// Run with a generator built from the configured seed.
    pub fn run(&self, points: &[Point]) -> Result<SelfTrainOutcome, SelfTrainError> {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.run_with_rng(points, &mut rng)
    }

    /// Run with a caller-owned generator. Concurrent runs must each own their generator.
    pub fn run_with_rng<R>(
        &self,
        points: &[Point],
        rng: &mut R,
    ) -> Result<SelfTrainOutcome, SelfTrainError>
    where
        R: Rng + ?Sized,
    {
        self.options.validate()?;
        if points.is_empty() {
            return Err(SelfTrainError::EmptyDataset);
        }
        let opts = &self.options;
        info!(
            points = points.len(),
            classifier = self.classifier.name(),
            k = opts.initial_line.k,
            b = opts.initial_line.b,
            gap = opts.gap,
            iterations = opts.iterations,
            "Starting self-training"
        );

        let mut line = opts.initial_line;
        let mut last: Option<FittedBoundary> = None;
        let mut history = Vec::with_capacity(opts.iterations.min(4096));
        let mut converged = false;

        for iteration in 0..opts.iterations {
            let labels = label(points, line, opts.gap);
            let (train, eval) = split(points, &labels, opts.ratio, rng);
            let fitted = fit(self.classifier, &train)
                .map_err(|source| SelfTrainError::Iteration { iteration, source })?;

            let record = IterationRecord {
                iteration,
                line: fitted.line,
                upper: labels.iter().filter(|&&l| l == Label::Upper).count(),
                lower: labels.iter().filter(|&&l| l == Label::Lower).count(),
                unlabeled: eval.len(),
                trained: train.len(),
            };
            debug!(
                iteration,
                k = fitted.line.k,
                b = fitted.line.b,
                upper = record.upper,
                lower = record.lower,
                unlabeled = record.unlabeled,
                "Fitted boundary"
            );
            history.push(record);

            let delta = line.max_delta(&fitted.line);
            line = fitted.line;
            last = Some(fitted);
            if let Some(tolerance) = opts.tolerance
                && delta < tolerance
            {
                converged = true;
                break;
            }
        }

        let Some(fitted) = last else {
            return Err(SelfTrainError::InvalidOptions(
                "iterations must be at least 1".to_string(),
            ));
        };
        let outcome = finalize(points, fitted, opts.gap, history, converged);
        info!(
            k = outcome.line.k,
            b = outcome.line.b,
            iterations = outcome.iterations_run,
            converged = outcome.converged,
            upper = outcome.count(Side::Upper),
            lower = outcome.count(Side::Lower),
            "Self-training finished"
        );
        Ok(outcome)
    }
}

fn finalize(
    points: &[Point],
    fitted: FittedBoundary,
    gap: f64,
    history: Vec<IterationRecord>,
    converged: bool,
) -> SelfTrainOutcome {
    SelfTrainOutcome {
        line: fitted.line,
        gap,
        boundary: fitted.boundary,
        labels: fitted.boundary.classify_all(points),
        pseudo_labels: label(points, fitted.line, gap),
        iterations_run: history.len(),
        converged,
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{ClassifierError, LinearSvm};
    use crate::training::ErrorKind;
    use std::cell::Cell;

    /// Deterministic population pair: two parallel bands around `y = -0.5x - 1`.
    fn bands() -> Vec<Point> {
        let mut points = Vec::new();
        for i in 0..60 {
            let x = i as f64 * 0.04;
            let jitter = ((i * 31) % 9) as f64 * 0.04;
            points.push(Point::new(x, -0.5 * x - 1.0 + 0.5 + jitter));
            points.push(Point::new(x, -0.5 * x - 1.0 - 0.5 - jitter));
        }
        points
    }

    fn options(initial_k: f64) -> SelfTrainOptions {
        SelfTrainOptions {
            initial_line: Line::new(initial_k, -1.0),
            gap: 0.2,
            iterations: 25,
            ratio: 1.0,
            seed: Some(5),
            tolerance: None,
        }
    }

    /// Records how many times it was asked to fit and can fail on a chosen call.
    struct Scripted {
        calls: Cell<usize>,
        fail_at: Option<usize>,
        boundary: Boundary,
    }

    impl LinearClassifier for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn fit(&self, _: &[Point], _: &[Side]) -> Result<Boundary, ClassifierError> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            if self.fail_at == Some(call) {
                return Err(ClassifierError::NonFiniteBoundary { model: "scripted" });
            }
            Ok(self.boundary)
        }
    }

    fn flat_boundary() -> Boundary {
        Boundary {
            normal_x: 0.5,
            normal_y: 1.0,
            offset: 1.0,
        }
    }

    #[test]
    fn runs_full_budget_without_tolerance() {
        let classifier = Scripted {
            calls: Cell::new(0),
            fail_at: None,
            boundary: flat_boundary(),
        };
        let outcome = SelfTrainer::new(&classifier, options(-0.5)).run(&bands()).unwrap();
        assert_eq!(classifier.calls.get(), 25);
        assert_eq!(outcome.iterations_run, 25);
        assert!(!outcome.converged);
    }

    #[test]
    fn tolerance_stops_once_line_is_stable() {
        let classifier = Scripted {
            calls: Cell::new(0),
            fail_at: None,
            boundary: flat_boundary(),
        };
        let mut opts = options(-0.5);
        opts.tolerance = Some(1e-9);
        let outcome = SelfTrainer::new(&classifier, opts).run(&bands()).unwrap();
        // Round 0 moves b from -1.0 to -1.0 exactly, so the first comparison already converges.
        assert_eq!(outcome.line, Line::new(-0.5, -1.0));
        assert!(outcome.converged);
        assert_eq!(classifier.calls.get(), 1);
    }

    #[test]
    fn movement_equal_to_tolerance_keeps_iterating() {
        let classifier = Scripted {
            calls: Cell::new(0),
            fail_at: None,
            boundary: flat_boundary(),
        };
        let mut opts = options(-0.5);
        opts.initial_line = Line::new(-0.5, -1.25);
        opts.tolerance = Some(0.25);
        let outcome = SelfTrainer::new(&classifier, opts).run(&bands()).unwrap();
        // Round 0 moves b by exactly 0.25; only the unchanged round 1 falls below it.
        assert!(outcome.converged);
        assert_eq!(classifier.calls.get(), 2);
        assert_eq!(outcome.iterations_run, 2);
    }

    #[test]
    fn finalization_labels_every_point() {
        let points = bands();
        let svm = LinearSvm::default();
        let outcome = SelfTrainer::new(&svm, options(-0.3)).run(&points).unwrap();
        assert_eq!(outcome.labels.len(), points.len());
        assert_eq!(outcome.pseudo_labels.len(), points.len());
        assert_eq!(
            outcome.count(Side::Upper) + outcome.count(Side::Lower),
            points.len()
        );
        assert_eq!(outcome.labels, outcome.boundary.classify_all(&points));
    }

    #[test]
    fn recovers_band_boundary() {
        let svm = LinearSvm::default();
        let outcome = SelfTrainer::new(&svm, options(-0.3)).run(&bands()).unwrap();
        assert!((outcome.line.k + 0.5).abs() < 0.1, "k = {}", outcome.line.k);
        assert!((outcome.line.b + 1.0).abs() < 0.1, "b = {}", outcome.line.b);
        assert_eq!(outcome.count(Side::Upper), 60);
    }

    #[test]
    fn same_seed_reproduces_run() {
        let svm = LinearSvm::default();
        let points = bands();
        let a = SelfTrainer::new(&svm, options(-0.2)).run(&points).unwrap();
        let b = SelfTrainer::new(&svm, options(-0.2)).run(&points).unwrap();
        assert_eq!(a.history, b.history);
        assert_eq!(a.labels, b.labels);
    }

    #[test]
    fn empty_points_fail_before_fitting() {
        let svm = LinearSvm::default();
        let err = SelfTrainer::new(&svm, options(0.0)).run(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyDataset);
    }

    #[test]
    fn wide_gap_reports_degenerate_split_at_first_iteration() {
        let svm = LinearSvm::default();
        let mut opts = options(-0.5);
        opts.gap = 100.0;
        let err = SelfTrainer::new(&svm, opts).run(&bands()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateSplit);
        assert_eq!(err.iteration(), Some(0));
    }

    #[test]
    fn classifier_failure_reports_iteration() {
        let classifier = Scripted {
            calls: Cell::new(0),
            fail_at: Some(3),
            boundary: flat_boundary(),
        };
        let err = SelfTrainer::new(&classifier, options(-0.5))
            .run(&bands())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClassifierFailure);
        assert_eq!(err.iteration(), Some(3));
        assert!(err.classifier_error().is_some());
        // The run is aborted at the failing round; no later round is attempted.
        assert_eq!(classifier.calls.get(), 4);
    }

    #[test]
    fn vertical_boundary_is_degenerate_fit() {
        let classifier = Scripted {
            calls: Cell::new(0),
            fail_at: None,
            boundary: Boundary {
                normal_x: 1.0,
                normal_y: 0.0,
                offset: -1.0,
            },
        };
        let err = SelfTrainer::new(&classifier, options(-0.5))
            .run(&bands())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateFit);
        assert_eq!(err.iteration(), Some(0));
    }

    #[test]
    fn invalid_options_are_rejected() {
        let svm = LinearSvm::default();
        let mut opts = options(0.0);
        opts.iterations = 0;
        assert_eq!(
            SelfTrainer::new(&svm, opts).run(&bands()).unwrap_err().kind(),
            ErrorKind::InvalidOptions
        );
        let mut opts = options(0.0);
        opts.ratio = 1.5;
        assert!(opts.validate().is_err());
        let mut opts = options(f64::NAN);
        opts.gap = -0.3;
        assert!(opts.validate().is_err());
        let mut opts = options(0.0);
        opts.gap = -0.3;
        assert!(opts.validate().is_ok());
    }
}
