//! Case files.
//!
//! The format follows the file extension. Every format describes the same
//! structure, tagged by `kind`:
//!
//! ```toml
//! kind = "distillation"
//! x_feed = 0.48
//! x_distillate = 0.9
//! x_bottoms = 0.01
//! reflux = { auto = { factor = 1.5 } }
//! target_stages = 10
//! minimizer = "grid"
//!
//! [equilibrium]
//! model = "table"
//! x = [0.0, 0.5, 1.0]
//! y = [0.0, 0.7, 1.0]
//! ```

use std::{fs, path::Path};

use serde::Deserialize;
use stagewise_column::{
    absorption::AbsorptionSpec, distillation::DistillationSpec, economics::CostWeights,
};
use stagewise_core::{
    EquilibriumError, EquilibriumRelation,
    equilibrium::{Extrapolation, Interpolation, Perturbation},
};
use stagewise_solvers::{
    Minimizer,
    optimization::{golden_section, grid},
};
use thiserror::Error;

/// Vapour compositions of the default benzene-toluene-like table, sampled at
/// 50 evenly spaced liquid compositions from 0 to 0.98.
const DEFAULT_VLE_Y: [f64; 50] = [
    0.000, 0.135, 0.235, 0.311, 0.372, 0.421, 0.463, 0.499, 0.529, 0.556, 0.580, 0.602, 0.622,
    0.640, 0.656, 0.672, 0.686, 0.700, 0.713, 0.725, 0.737, 0.748, 0.759, 0.769, 0.779, 0.789,
    0.799, 0.808, 0.817, 0.826, 0.835, 0.844, 0.853, 0.861, 0.870, 0.878, 0.886, 0.895, 0.903,
    0.911, 0.919, 0.927, 0.936, 0.944, 0.952, 0.960, 0.968, 0.976, 0.984, 0.992,
];

const DEFAULT_VLE_X_MAX: f64 = 0.98;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported case file extension {0:?} (expected toml, json, yaml or yml)")]
    UnknownFormat(String),
    #[error("failed to read case file")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML case")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON case")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML case")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid equilibrium relation")]
    Equilibrium(#[from] EquilibriumError),
}

/// An equilibrium relation as written in a case file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum EquilibriumConfig {
    Linear {
        slope: f64,
        #[serde(default)]
        perturbations: Vec<Perturbation>,
    },
    Table {
        x: Vec<f64>,
        y: Vec<f64>,
        #[serde(default)]
        interpolation: Interpolation,
        #[serde(default)]
        extrapolation: Extrapolation,
        #[serde(default)]
        perturbations: Vec<Perturbation>,
    },
}

impl Default for EquilibriumConfig {
    fn default() -> Self {
        #[allow(clippy::cast_precision_loss)]
        let step = DEFAULT_VLE_X_MAX / (DEFAULT_VLE_Y.len() - 1) as f64;
        #[allow(clippy::cast_precision_loss)]
        let x = (0..DEFAULT_VLE_Y.len()).map(|i| i as f64 * step).collect();
        Self::Table {
            x,
            y: DEFAULT_VLE_Y.to_vec(),
            interpolation: Interpolation::Linear,
            extrapolation: Extrapolation::Clamp,
            perturbations: Vec::new(),
        }
    }
}

impl EquilibriumConfig {
    /// Builds the relation, applying perturbations in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the table or a perturbation is invalid.
    pub fn build(&self) -> Result<EquilibriumRelation, EquilibriumError> {
        let (relation, perturbations) = match self {
            Self::Linear {
                slope,
                perturbations,
            } => (EquilibriumRelation::linear(*slope)?, perturbations),
            Self::Table {
                x,
                y,
                interpolation,
                extrapolation,
                perturbations,
            } => (
                EquilibriumRelation::tabulated(x.clone(), y.clone(), *interpolation, *extrapolation)?,
                perturbations,
            ),
        };
        perturbations
            .iter()
            .try_fold(relation, |relation, perturbation| {
                relation.with_perturbation(*perturbation)
            })
    }
}

/// The pinch minimizer, with each strategy's default settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimizerChoice {
    #[default]
    GoldenSection,
    Grid,
}

impl MinimizerChoice {
    #[must_use]
    pub fn build(self) -> Minimizer {
        match self {
            Self::GoldenSection => Minimizer::GoldenSection(golden_section::Config::default()),
            Self::Grid => Minimizer::Grid(grid::Config::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AbsorptionCase {
    #[serde(flatten)]
    pub spec: AbsorptionSpec,
    pub equilibrium: EquilibriumConfig,
    #[serde(default)]
    pub minimizer: MinimizerChoice,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DistillationCase {
    #[serde(flatten)]
    pub spec: DistillationSpec,
    #[serde(default)]
    pub equilibrium: EquilibriumConfig,
    /// Also search for the reflux ratio giving this many ideal stages.
    #[serde(default)]
    pub target_stages: Option<usize>,
    /// Also sweep reflux ratios for the cheapest design.
    #[serde(default)]
    pub economics: Option<CostWeights>,
    #[serde(default)]
    pub minimizer: MinimizerChoice,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Case {
    Absorption(AbsorptionCase),
    Distillation(DistillationCase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
    Yaml,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(ConfigError::UnknownFormat(extension)),
        }
    }
}

fn parse(text: &str, format: Format) -> Result<Case, ConfigError> {
    Ok(match format {
        Format::Toml => toml::from_str(text)?,
        Format::Json => serde_json::from_str(text)?,
        Format::Yaml => serde_yaml::from_str(text)?,
    })
}

/// Reads a case file, choosing the format from its extension.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the extension is unknown, the file cannot be
/// read, or its contents do not describe a case.
pub fn load(path: &Path) -> Result<Case, ConfigError> {
    let format = Format::from_path(path)?;
    let text = fs::read_to_string(path)?;
    parse(&text, format)
}
