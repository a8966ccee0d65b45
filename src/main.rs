//! Command-line runner: load points, self-train a boundary, write reports.

use std::path::{Path, PathBuf};

use spinbound::config::{ClassifierKind, RunConfig};
use spinbound::dataset::load_points;
use spinbound::labeling::{Label, label};
use spinbound::logging::{self, LoggingOptions};
use spinbound::report::{JsonReport, LabelsCsv, PlotStyle, PresentationSink, ScatterPlot};
use spinbound::training::{SelfTrainError, SelfTrainer};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = parse_args(std::env::args().skip(1).collect())?;
    let logging_options = LoggingOptions {
        default_level: if cli.verbose { "debug" } else { "info" },
        log_file: !cli.no_log_file,
    };
    if let Err(err) = logging::init(&logging_options) {
        eprintln!("Logging disabled: {err}");
    }

    let mut config =
        RunConfig::load_or_default(cli.config.as_deref()).map_err(|err| err.to_string())?;
    cli.apply(&mut config);
    if cli.preview {
        let path = run_preview(&config)?;
        println!("preview: {}", path.display());
        return Ok(());
    }
    let options = config.self_train_options().map_err(|err| err.to_string())?;
    let points = load_configured_points(&config)?;
    let classifier = config.classifier.build();
    let outcome = SelfTrainer::new(&*classifier, options)
        .run(&points)
        .map_err(describe_failure)?;

    println!("k: {}, b: {}, gap: {}", outcome.line.k, outcome.line.b, outcome.gap);
    println!(
        "iterations: {}{}",
        outcome.iterations_run,
        if outcome.converged { " (converged)" } else { "" }
    );

    for mut sink in build_sinks(&config, classifier.name()) {
        sink.present(&points, &outcome)
            .map_err(|err| err.to_string())?;
        tracing::info!("Wrote {}", sink.describe());
    }
    Ok(())
}

fn load_configured_points(config: &RunConfig) -> Result<Vec<spinbound::Point>, String> {
    let data_path = config
        .data
        .path
        .as_deref()
        .ok_or_else(|| format!("No data file given (use --data or [data] path)\n\n{}", help_text()))?;
    let dataset_options = config.data.dataset_options().map_err(|err| err.to_string())?;
    load_points(data_path, &dataset_options).map_err(|err| err.to_string())
}

/// Draw the raw scatter against the starting line and its band, then stop. No fitting happens.
fn run_preview(config: &RunConfig) -> Result<PathBuf, String> {
    let (line, gap) = config.preview_line().map_err(|err| err.to_string())?;
    let points = load_configured_points(config)?;
    let labels = label(&points, line, gap);
    let count = |wanted: Label| labels.iter().filter(|&&l| l == wanted).count();
    tracing::info!(
        k = line.k,
        b = line.b,
        gap,
        upper = count(Label::Upper),
        lower = count(Label::Lower),
        unlabeled = count(Label::Unlabeled),
        "Preview labels"
    );
    let path = config.output.dir.join("preview.png");
    ScatterPlot::new(&path, plot_style(config))
        .write_preview(&points, line, gap)
        .map_err(|err| err.to_string())?;
    Ok(path)
}

fn plot_style(config: &RunConfig) -> PlotStyle {
    PlotStyle {
        width: config.output.plot_width,
        height: config.output.plot_height,
        ..PlotStyle::default()
    }
}

fn describe_failure(err: SelfTrainError) -> String {
    match err.iteration() {
        Some(iteration) => format!(
            "Self-training failed ({:?}) at iteration {iteration}: {err}",
            err.kind()
        ),
        None => format!("Self-training failed ({:?}): {err}", err.kind()),
    }
}

fn build_sinks(config: &RunConfig, classifier: &str) -> Vec<Box<dyn PresentationSink>> {
    let output = &config.output;
    let dir: &Path = &output.dir;
    let mut sinks: Vec<Box<dyn PresentationSink>> = Vec::new();
    if output.report {
        sinks.push(Box::new(JsonReport::new(dir.join("report.json"), classifier)));
    }
    if output.labels_csv {
        sinks.push(Box::new(LabelsCsv::new(dir.join("labels.csv"))));
    }
    if output.plot {
        sinks.push(Box::new(ScatterPlot::new(dir.join("boundary.png"), plot_style(config))));
    }
    sinks
}

/// Command-line overrides. Unset fields keep the config file value.
#[derive(Debug, Clone, Default, PartialEq)]
struct CliOptions {
    config: Option<PathBuf>,
    data: Option<PathBuf>,
    initial_k: Option<f64>,
    initial_b: Option<f64>,
    gap: Option<f64>,
    iterations: Option<usize>,
    ratio: Option<f64>,
    seed: Option<u64>,
    tolerance: Option<f64>,
    classifier: Option<ClassifierKind>,
    out: Option<PathBuf>,
    no_plot: bool,
    preview: bool,
    no_log_file: bool,
    verbose: bool,
}

impl CliOptions {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(path) = &self.data {
            config.data.path = Some(path.clone());
        }
        if let Some(k) = self.initial_k {
            config.run.initial_k = Some(k);
        }
        if let Some(b) = self.initial_b {
            config.run.initial_b = b;
        }
        if let Some(gap) = self.gap {
            config.run.gap = gap;
        }
        if let Some(iterations) = self.iterations {
            config.run.iterations = iterations;
        }
        if let Some(ratio) = self.ratio {
            config.run.ratio = ratio;
        }
        if let Some(seed) = self.seed {
            config.run.seed = Some(seed);
        }
        if let Some(tolerance) = self.tolerance {
            config.run.tolerance = Some(tolerance);
        }
        if let Some(kind) = self.classifier {
            config.classifier.kind = kind;
        }
        if let Some(out) = &self.out {
            config.output.dir = out.clone();
        }
        if self.no_plot {
            config.output.plot = false;
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        match flag {
            "-h" | "--help" => return Err(help_text()),
            "--no-plot" => options.no_plot = true,
            "--preview" => options.preview = true,
            "--no-log-file" => options.no_log_file = true,
            "-v" | "--verbose" => options.verbose = true,
            "--config" => options.config = Some(PathBuf::from(next_value(&args, &mut idx)?)),
            "--data" => options.data = Some(PathBuf::from(next_value(&args, &mut idx)?)),
            "--out" => options.out = Some(PathBuf::from(next_value(&args, &mut idx)?)),
            "--initial-k" => options.initial_k = Some(parse_next(&args, &mut idx)?),
            "--initial-b" => options.initial_b = Some(parse_next(&args, &mut idx)?),
            "--gap" => options.gap = Some(parse_next(&args, &mut idx)?),
            "--iterations" => options.iterations = Some(parse_next(&args, &mut idx)?),
            "--ratio" => options.ratio = Some(parse_next(&args, &mut idx)?),
            "--seed" => options.seed = Some(parse_next(&args, &mut idx)?),
            "--tolerance" => options.tolerance = Some(parse_next(&args, &mut idx)?),
            "--classifier" => {
                options.classifier = Some(next_value(&args, &mut idx)?.parse::<ClassifierKind>()?);
            }
            unknown => {
                return Err(format!("Unknown argument: {unknown}\n\n{}", help_text()));
            }
        }
        idx += 1;
    }
    Ok(options)
}

/// Advance past the flag at `idx` and return its value.
fn next_value<'a>(args: &'a [String], idx: &mut usize) -> Result<&'a str, String> {
    let flag = &args[*idx];
    *idx += 1;
    args.get(*idx)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_next<T: std::str::FromStr>(args: &[String], idx: &mut usize) -> Result<T, String> {
    let flag = args[*idx].as_str();
    let value = next_value(args, idx)?;
    parse_value(flag, value)
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .parse::<T>()
        .map_err(|_| format!("Invalid {flag} value: {value}"))
}

fn help_text() -> String {
    [
        "spinbound",
        "",
        "Estimates the linear boundary between two populations of (log-diameter, log-period)",
        "points by self-training a linear classifier on margin pseudo-labels.",
        "",
        "Usage:",
        "  spinbound --data <file.csv> --initial-k <f64> [options]",
        "  spinbound --data <file.csv> --preview [--initial-k <f64>] [--initial-b <f64>] [--gap <f64>]",
        "",
        "Options:",
        "  --config <file>        TOML config (default: <config dir>/.spinbound/config.toml if present).",
        "  --data <file>          CSV point source.",
        "  --initial-k <f64>      Starting slope (required unless set in config).",
        "  --initial-b <f64>      Starting intercept (default: -1.2).",
        "  --gap <f64>            Margin half-width (default: 0.2).",
        "  --iterations <n>       Fit rounds (default: 1000).",
        "  --ratio <f64>          Fraction of upper-class points used for training (default: 1).",
        "  --seed <u64>           Shuffle seed (default: random).",
        "  --tolerance <f64>      Stop early once k and b move less than this.",
        "  --classifier <kind>    linear_svm (default) or logistic.",
        "  --out <dir>            Output directory (default: spinbound_out).",
        "  --no-plot              Skip the PNG scatter plot.",
        "  --preview              Only draw the data with the starting line and band",
        "                         (<out>/preview.png); no fitting. Slope defaults to -0.6.",
        "  --no-log-file          Log to stdout only.",
        "  -v, --verbose          Log every iteration.",
    ]
    .join("\n")
}
