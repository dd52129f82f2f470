use std::fmt;

use ninterp::error::{InterpolateError, ValidateError};
use thiserror::Error;

/// A coordinate axis of an equilibrium table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

/// Errors from building or evaluating an equilibrium relation.
#[derive(Debug, Error)]
pub enum EquilibriumError {
    #[error("equilibrium slope must be finite and positive, got {0}")]
    NonPositiveSlope(f64),

    #[error("table has {x_len} x values but {y_len} y values")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("table needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("table {axis} values must be finite")]
    NonFiniteTable { axis: Axis },

    #[error("table {axis} values must be strictly increasing (at index {index})")]
    NonMonotonic { axis: Axis, index: usize },

    #[error("{axis} = {value} lies outside the table range [{lower}, {upper}]")]
    OutOfRange {
        axis: Axis,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("invalid perturbation: {0}")]
    InvalidPerturbation(&'static str),

    #[error("equilibrium value is not finite at x = {x}")]
    NonFiniteValue { x: f64 },

    #[error("no composition in [{lower}, {upper}] is in equilibrium with y = {y}")]
    NoInverse { y: f64, lower: f64, upper: f64 },

    #[error(transparent)]
    Validation(#[from] ValidateError),

    #[error(transparent)]
    Interpolation(#[from] InterpolateError),
}
