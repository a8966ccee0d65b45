mod support;

use rand::SeedableRng;
use rand::rngs::StdRng;
use spinbound::config::{ClassifierKind, RunConfig};
use spinbound::dataset::{DatasetOptions, load_points};
use spinbound::labeling::{Label, Side, label, split};
use spinbound::ml::{LinearSvm, LogisticRegression};
use spinbound::report::{JsonReport, LabelsCsv, PlotStyle, PresentationSink, ScatterPlot};
use spinbound::training::{ErrorKind, SelfTrainOptions, SelfTrainer};
use spinbound::{Line, Point};
use support::env::ConfigHomeGuard;
use support::scatter::{two_populations, write_asteroid_csv};

fn scenario_points() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 2.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, -2.0),
    ]
}

fn options(initial: Line, gap: f64, iterations: usize) -> SelfTrainOptions {
    SelfTrainOptions {
        initial_line: initial,
        gap,
        iterations,
        ratio: 1.0,
        seed: Some(2024),
        tolerance: None,
    }
}

#[test]
fn four_point_scenario() {
    let points = scenario_points();
    let labels = label(&points, Line::new(0.0, 0.0), 0.5);
    assert_eq!(
        labels,
        vec![Label::Unlabeled, Label::Upper, Label::Unlabeled, Label::Lower]
    );

    let (train, eval) = split(&points, &labels, 1.0, &mut StdRng::seed_from_u64(0));
    assert_eq!(train.len(), 2);
    assert_eq!(eval.len(), 2);

    let svm = LinearSvm::default();
    let outcome = SelfTrainer::new(&svm, options(Line::new(0.0, 0.0), 0.5, 1))
        .run(&points)
        .unwrap();
    assert_eq!(outcome.iterations_run, 1);
    assert_eq!(outcome.labels.len(), 4);
    assert_eq!(outcome.labels[1], Side::Upper);
    assert_eq!(outcome.labels[3], Side::Lower);
}

#[test]
fn converges_to_the_population_gap() {
    let points = two_populations(1, 400, -0.6, -1.2, 0.25);
    let svm = LinearSvm::default();
    let mut opts = options(Line::new(-0.4, -1.2), 0.2, 60);
    opts.tolerance = Some(1e-6);
    let outcome = SelfTrainer::new(&svm, opts).run(&points).unwrap();
    assert!((outcome.line.k + 0.6).abs() < 0.1, "k = {}", outcome.line.k);
    assert!((outcome.line.b + 1.2).abs() < 0.1, "b = {}", outcome.line.b);
    assert!(outcome.iterations_run <= 60);
    assert!(outcome.count(Side::Upper) >= 390);
    assert!(outcome.count(Side::Lower) >= 390);
}

#[test]
fn logistic_classifier_drives_the_same_loop() {
    let points = two_populations(8, 200, 0.3, 0.0, 0.3);
    let logreg = LogisticRegression::default();
    let outcome = SelfTrainer::new(&logreg, options(Line::new(0.0, 0.0), 0.2, 10))
        .run(&points)
        .unwrap();
    let misplaced = points
        .iter()
        .zip(&outcome.labels)
        .enumerate()
        .filter(|(idx, (_, side))| {
            let expected = if idx % 2 == 0 { Side::Upper } else { Side::Lower };
            **side != expected
        })
        .count();
    assert!(misplaced < 40, "{misplaced} points on the wrong side");
}

#[test]
fn seeded_runs_are_reproducible() {
    let points = two_populations(3, 150, -0.6, -1.2, 0.2);
    let svm = LinearSvm::default();
    let a = SelfTrainer::new(&svm, options(Line::new(-0.6, -1.2), 0.2, 30))
        .run(&points)
        .unwrap();
    let b = SelfTrainer::new(&svm, options(Line::new(-0.6, -1.2), 0.2, 30))
        .run(&points)
        .unwrap();
    assert_eq!(a.line, b.line);
    assert_eq!(a.history, b.history);
}

#[test]
fn degenerate_split_names_iteration() {
    let points = two_populations(5, 50, 0.0, 0.0, 0.2);
    let svm = LinearSvm::default();
    let err = SelfTrainer::new(&svm, options(Line::new(0.0, 0.0), 50.0, 10))
        .run(&points)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DegenerateSplit);
    assert_eq!(err.iteration(), Some(0));
    assert!(err.to_string().contains("iteration 0"));
}

#[test]
fn one_sided_labels_surface_classifier_failure() {
    // Line far below every point: everything is upper, nothing is lower.
    let points = two_populations(6, 50, 0.0, 0.0, 0.2);
    let svm = LinearSvm::default();
    let err = SelfTrainer::new(&svm, options(Line::new(0.0, -100.0), 0.2, 10))
        .run(&points)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ClassifierFailure);
    assert_eq!(err.iteration(), Some(0));
}

#[test]
fn csv_to_reports_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("asteroids.csv");
    let original = two_populations(11, 120, -0.6, -1.2, 0.3);
    write_asteroid_csv(&csv_path, &original);

    let points = load_points(&csv_path, &DatasetOptions::default()).unwrap();
    assert_eq!(points.len(), original.len());
    for (loaded, source) in points.iter().zip(&original) {
        assert!((loaded.x - source.x).abs() < 1e-9);
        assert!((loaded.y - source.y).abs() < 1e-9);
    }

    let svm = LinearSvm::default();
    let outcome = SelfTrainer::new(&svm, options(Line::new(-0.6, -1.2), 0.2, 50))
        .run(&points)
        .unwrap();

    let out = dir.path().join("out");
    let mut sinks: Vec<Box<dyn PresentationSink>> = vec![
        Box::new(JsonReport::new(out.join("report.json"), "linear_svm")),
        Box::new(LabelsCsv::new(out.join("labels.csv"))),
        Box::new(ScatterPlot::new(
            out.join("boundary.png"),
            PlotStyle {
                width: 200,
                height: 150,
                ..PlotStyle::default()
            },
        )),
    ];
    for sink in &mut sinks {
        sink.present(&points, &outcome).unwrap();
    }

    let report: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["iterations_run"], 50);
    assert_eq!(report["points"], 240);
    let labels = std::fs::read_to_string(out.join("labels.csv")).unwrap();
    assert_eq!(labels.lines().count(), 241);
    assert!(out.join("boundary.png").is_file());
}

#[test]
fn config_file_in_app_dir_is_picked_up() {
    let temp = tempfile::tempdir().unwrap();
    let _guard = ConfigHomeGuard::set(temp.path().to_path_buf());
    let root = spinbound::app_dirs::app_root_dir().unwrap();
    std::fs::write(
        root.join("config.toml"),
        "[run]\ninitial_k = -0.6\niterations = 12\n\n[classifier]\nkind = \"logistic\"\n",
    )
    .unwrap();

    let config = RunConfig::load_or_default(None).unwrap();
    assert_eq!(config.run.initial_k, Some(-0.6));
    assert_eq!(config.run.iterations, 12);
    assert_eq!(config.classifier.kind, ClassifierKind::Logistic);
    assert_eq!(config.self_train_options().unwrap().initial_line, Line::new(-0.6, -1.2));
}
