//! Run configuration loaded from TOML.
//!
//! Config keys (TOML): `[run]`, `[data]`, `[classifier]`, `[output]`. Every key is optional
//! except `run.initial_k`, which may instead be supplied on the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;
use crate::dataset::{DatasetOptions, Transform, delimiter_byte};
use crate::geometry::Line;
use crate::ml::{LinearClassifier, LinearSvm, LogisticRegression, SvmOptions, TrainOptions};
use crate::training::{
    DEFAULT_GAP, DEFAULT_INITIAL_B, DEFAULT_ITERATIONS, DEFAULT_RATIO, SelfTrainOptions,
};

/// Default filename of the configuration inside the application directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Slope of the reference line drawn by a preview when `run.initial_k` is unset.
pub const PREVIEW_INITIAL_K: f64 = -0.6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("run.initial_k is required (set it in the config or pass --initial-k)")]
    MissingInitialK,
    #[error("Invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
    #[error("Failed to resolve application directory: {0}")]
    AppDir(#[from] app_dirs::AppDirError),
}

/// Complete configuration of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub run: RunSettings,
    pub data: DataSettings,
    pub classifier: ClassifierSettings,
    pub output: OutputSettings,
}

/// Config keys: `initial_k`, `initial_b`, `gap`, `iterations`, `ratio`, `seed`, `tolerance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub initial_k: Option<f64>,
    pub initial_b: f64,
    pub gap: f64,
    pub iterations: usize,
    pub ratio: f64,
    pub seed: Option<u64>,
    pub tolerance: Option<f64>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            initial_k: None,
            initial_b: DEFAULT_INITIAL_B,
            gap: DEFAULT_GAP,
            iterations: DEFAULT_ITERATIONS,
            ratio: DEFAULT_RATIO,
            seed: None,
            tolerance: None,
        }
    }
}

/// Config keys: `path`, `x_column`, `y_column`, `x_transform`, `y_transform`, `delimiter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub path: Option<PathBuf>,
    pub x_column: String,
    pub y_column: String,
    pub x_transform: Transform,
    pub y_transform: Transform,
    pub delimiter: char,
}

impl Default for DataSettings {
    fn default() -> Self {
        let columns = DatasetOptions::default();
        Self {
            path: None,
            x_column: columns.x_column,
            y_column: columns.y_column,
            x_transform: columns.x_transform,
            y_transform: columns.y_transform,
            delimiter: columns.delimiter,
        }
    }
}

impl DataSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if delimiter_byte(self.delimiter).is_err() {
            return Err(invalid(
                "data.delimiter",
                format!("must be a single ASCII character, got {:?}", self.delimiter),
            ));
        }
        Ok(())
    }

    pub fn dataset_options(&self) -> Result<DatasetOptions, ConfigError> {
        self.validate()?;
        Ok(DatasetOptions {
            x_column: self.x_column.clone(),
            y_column: self.y_column.clone(),
            x_transform: self.x_transform,
            y_transform: self.y_transform,
            delimiter: self.delimiter,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    LinearSvm,
    Logistic,
}

impl std::str::FromStr for ClassifierKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "linear_svm" | "svm" => Ok(ClassifierKind::LinearSvm),
            "logistic" | "logreg" => Ok(ClassifierKind::Logistic),
            other => Err(format!("Unknown classifier: {other} (expected linear_svm or logistic)")),
        }
    }
}

/// Config keys: `kind`, `c`, `tolerance`, `max_iter`, `seed`, `learning_rate`, `epochs`,
/// `batch_size`, `l2`, `balance_classes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub kind: ClassifierKind,
    pub c: f64,
    pub tolerance: f64,
    pub max_iter: usize,
    pub seed: u64,
    pub learning_rate: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub l2: f64,
    pub balance_classes: bool,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        let svm = SvmOptions::default();
        let logreg = TrainOptions::default();
        Self {
            kind: ClassifierKind::default(),
            c: svm.c,
            tolerance: svm.tolerance,
            max_iter: svm.max_iter,
            seed: svm.seed,
            learning_rate: logreg.learning_rate,
            epochs: logreg.epochs,
            batch_size: logreg.batch_size,
            l2: logreg.l2,
            balance_classes: logreg.balance_classes,
        }
    }
}

impl ClassifierSettings {
    pub fn build(&self) -> Box<dyn LinearClassifier> {
        match self.kind {
            ClassifierKind::LinearSvm => Box::new(LinearSvm::new(SvmOptions {
                c: self.c,
                tolerance: self.tolerance,
                max_iter: self.max_iter,
                seed: self.seed,
                ..SvmOptions::default()
            })),
            ClassifierKind::Logistic => Box::new(LogisticRegression::new(TrainOptions {
                epochs: self.epochs,
                learning_rate: self.learning_rate,
                l2: self.l2,
                batch_size: self.batch_size,
                seed: self.seed,
                balance_classes: self.balance_classes,
            })),
        }
    }
}

/// Config keys: `dir`, `report`, `labels_csv`, `plot`, `plot_width`, `plot_height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub report: bool,
    pub labels_csv: bool,
    pub plot: bool,
    pub plot_width: u32,
    pub plot_height: u32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("spinbound_out"),
            report: true,
            labels_csv: true,
            plot: true,
            plot_width: 900,
            plot_height: 700,
        }
    }
}

impl RunConfig {
    /// Parse a TOML document; `path` is only used in error messages.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load `explicit` if given, else the application config if present, else defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        let path = config_path()?;
        if path.is_file() {
            tracing::info!("Using config {}", path.display());
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check every setting and produce loop options.
    pub fn self_train_options(&self) -> Result<SelfTrainOptions, ConfigError> {
        let run = &self.run;
        let initial_k = run.initial_k.ok_or(ConfigError::MissingInitialK)?;
        require_finite("run.initial_k", initial_k)?;
        require_finite("run.initial_b", run.initial_b)?;
        require_finite("run.gap", run.gap)?;
        if run.iterations == 0 {
            return Err(invalid("run.iterations", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&run.ratio) {
            return Err(invalid("run.ratio", format!("must be within [0, 1], got {}", run.ratio)));
        }
        if let Some(tolerance) = run.tolerance
            && !(tolerance.is_finite() && tolerance > 0.0)
        {
            return Err(invalid("run.tolerance", format!("must be positive, got {tolerance}")));
        }
        self.data.validate()?;
        self.validate_classifier()?;
        Ok(SelfTrainOptions {
            initial_line: Line::new(initial_k, run.initial_b),
            gap: run.gap,
            iterations: run.iterations,
            ratio: run.ratio,
            seed: run.seed,
            tolerance: run.tolerance,
        })
    }

    /// Reference line and band half-width for a preview. Classifier settings are not consulted.
    pub fn preview_line(&self) -> Result<(Line, f64), ConfigError> {
        let run = &self.run;
        let k = run.initial_k.unwrap_or(PREVIEW_INITIAL_K);
        require_finite("run.initial_k", k)?;
        require_finite("run.initial_b", run.initial_b)?;
        require_finite("run.gap", run.gap)?;
        self.data.validate()?;
        Ok((Line::new(k, run.initial_b), run.gap))
    }

    fn validate_classifier(&self) -> Result<(), ConfigError> {
        let c = &self.classifier;
        match c.kind {
            ClassifierKind::LinearSvm => {
                if !(c.c.is_finite() && c.c > 0.0) {
                    return Err(invalid("classifier.c", format!("must be positive, got {}", c.c)));
                }
                if !(c.tolerance.is_finite() && c.tolerance > 0.0) {
                    return Err(invalid(
                        "classifier.tolerance",
                        format!("must be positive, got {}", c.tolerance),
                    ));
                }
            }
            ClassifierKind::Logistic => {
                if !(c.learning_rate.is_finite() && c.learning_rate > 0.0) {
                    return Err(invalid(
                        "classifier.learning_rate",
                        format!("must be positive, got {}", c.learning_rate),
                    ));
                }
                if c.epochs == 0 {
                    return Err(invalid("classifier.epochs", "must be at least 1"));
                }
            }
        }
        Ok(())
    }
}

/// Path of the configuration file inside the application directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

fn require_finite(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(key, format!("must be finite, got {value}")))
    }
}

fn invalid(key: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        message: message.into(),
    }
}
