use stagewise_core::{EquilibriumError, LineError, NotConverged};
use stagewise_solvers::{bisection, optimization};
use thiserror::Error;

/// A single trial of a stage search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trial {
    /// The searched parameter (a stage count or a reflux ratio).
    pub parameter: f64,
    /// Stages required at `parameter`.
    pub stages: usize,
}

/// Errors raised by column calculations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("{parameter} = {supplied} is below the minimum of {minimum}")]
    InfeasibleDrivingForce {
        parameter: &'static str,
        supplied: f64,
        minimum: f64,
    },

    #[error("stage {stage} moved against the direction of progress: {previous} -> {projected}")]
    ParameterInconsistency {
        stage: usize,
        previous: f64,
        projected: f64,
    },

    #[error("stage {stage}: {quantity} = {value} is outside its physical range")]
    PhysicalBoundViolation {
        stage: usize,
        quantity: &'static str,
        value: f64,
    },

    #[error("degenerate slope: {context}")]
    DegenerateSlope { context: &'static str },

    #[error(transparent)]
    NonConvergence(#[from] NotConverged),

    #[error("stage search exhausted {budget} trials without meeting the target")]
    InfeasibleSearch {
        budget: usize,
        closest: Option<Trial>,
    },

    #[error("search range [{lower}, {upper}] is empty or not finite")]
    InvalidSearchRange { lower: f64, upper: f64 },

    #[error("{context} is not finite at x = {x}")]
    NonFinite { context: &'static str, x: f64 },

    #[error(transparent)]
    Equilibrium(#[from] EquilibriumError),
}

impl From<LineError> for Error {
    fn from(err: LineError) -> Self {
        match err {
            LineError::Degenerate { context } => Self::DegenerateSlope { context },
            LineError::InvalidReflux(value) => Self::InvalidParameter {
                name: "reflux",
                value,
                reason: "must be finite and positive",
            },
        }
    }
}

impl Error {
    /// Maps a minimizer failure, unwrapping errors raised by the objective.
    pub(crate) fn from_minimizer(err: optimization::Error<Self>, context: &'static str) -> Self {
        match err {
            optimization::Error::Function { source, .. } => source,
            optimization::Error::InvalidBracket { left, right } => Self::InvalidSearchRange {
                lower: left,
                upper: right,
            },
            optimization::Error::NonFiniteObjective { x, .. } => Self::NonFinite { context, x },
        }
    }

    /// Maps a bisection failure, unwrapping errors raised by the residual.
    pub(crate) fn from_bisection(err: bisection::Error<Self>, budget: usize) -> Self {
        match err {
            bisection::Error::Function { source, .. } => source,
            bisection::Error::NoBracket { .. } => Self::InfeasibleSearch {
                budget,
                closest: None,
            },
            bisection::Error::ZeroWidthBracket { value } => Self::InvalidSearchRange {
                lower: value,
                upper: value,
            },
            bisection::Error::NonFiniteBracket { value } => Self::InvalidSearchRange {
                lower: value,
                upper: value,
            },
            bisection::Error::NonFiniteResidual { x, .. } => Self::NonFinite {
                context: "search residual",
                x,
            },
            bisection::Error::InvalidConfig(_) => Self::InvalidParameter {
                name: "search tolerance",
                value: f64::NAN,
                reason: "search configuration is invalid",
            },
        }
    }
}

/// Checks that `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, Error> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must be finite and positive",
        })
    }
}

/// Checks that `value` is a finite composition in `[0, 1]`.
pub(crate) fn require_fraction(name: &'static str, value: f64) -> Result<f64, Error> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must lie in [0, 1]",
        })
    }
}
