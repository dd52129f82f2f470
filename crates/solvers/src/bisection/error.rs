use thiserror::Error;

use super::ConfigError;

/// Bisection failures; `E` is the residual function's own error.
#[derive(Debug, Error)]
pub enum Error<E> {
    #[error("bracket has zero width: left and right are both {value}")]
    ZeroWidthBracket { value: f64 },

    #[error("bracket contains non-finite value: {value}")]
    NonFiniteBracket { value: f64 },

    #[error("residual does not change sign: f({left}) = {left_residual}, f({right}) = {right_residual}")]
    NoBracket {
        left: f64,
        right: f64,
        left_residual: f64,
        right_residual: f64,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("residual evaluation failed at x = {x}")]
    Function {
        x: f64,
        #[source]
        source: E,
    },

    #[error("non-finite residual {residual} at x = {x}")]
    NonFiniteResidual { x: f64, residual: f64 },
}
