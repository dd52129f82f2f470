//! Bounded single-variable minimization.
//!
//! Two interchangeable strategies minimize a scalar function over a closed
//! bracket:
//!
//! - [`golden_section`]: derivative-free search for unimodal functions
//! - [`grid`]: a coarse uniform scan followed by a refined scan around the
//!   coarse optimum
//!
//! [`Minimizer`] selects one of them at construction time so callers hold a
//! single capability and never fall back at runtime.

pub mod golden_section;
pub mod grid;

use thiserror::Error;

/// Errors that can occur during minimization.
///
/// `E` is the error type of the objective function.
#[derive(Debug, Error)]
pub enum Error<E> {
    #[error("bracket [{left}, {right}] is not a finite interval of positive width")]
    InvalidBracket { left: f64, right: f64 },

    #[error("objective evaluation failed at x = {x}")]
    Function {
        x: f64,
        #[source]
        source: E,
    },

    #[error("objective is not finite at x = {x}: {objective}")]
    NonFiniteObjective { x: f64, objective: f64 },
}

/// Which strategy produced a [`Minimum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GoldenSection,
    Grid,
}

/// The located minimum of an objective.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    /// Best estimate of the minimizing x.
    pub x: f64,
    /// Objective value at `x`.
    pub objective: f64,
    /// Number of objective evaluations performed.
    pub evaluations: usize,
    /// Whether the strategy met its own convergence criterion.
    pub converged: bool,
    /// Strategy that produced this result.
    pub method: Method,
}

/// A bounded scalar minimizer with its strategy fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Minimizer {
    GoldenSection(golden_section::Config),
    Grid(grid::Config),
}

impl Default for Minimizer {
    fn default() -> Self {
        Self::GoldenSection(golden_section::Config::default())
    }
}

impl Minimizer {
    /// Minimizes `f` over `bracket` with the configured strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if the bracket is invalid or `f` fails or returns a
    /// non-finite value.
    pub fn minimize<F, E>(&self, f: F, bracket: [f64; 2]) -> Result<Minimum, Error<E>>
    where
        F: FnMut(f64) -> Result<f64, E>,
    {
        match self {
            Self::GoldenSection(config) => golden_section::minimize(f, bracket, config),
            Self::Grid(config) => grid::minimize(f, bracket, config),
        }
    }
}

/// Orders and validates a bracket.
fn ordered<E>(bracket: [f64; 2]) -> Result<(f64, f64), Error<E>> {
    let [a, b] = bracket;
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    if !left.is_finite() || !right.is_finite() || right - left <= 0.0 {
        return Err(Error::InvalidBracket { left, right });
    }
    Ok((left, right))
}

/// Evaluates the objective, attaching `x` to failures.
fn evaluate<F, E>(f: &mut F, x: f64) -> Result<f64, Error<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let objective = f(x).map_err(|source| Error::Function { x, source })?;
    if objective.is_finite() {
        Ok(objective)
    } else {
        Err(Error::NonFiniteObjective { x, objective })
    }
}
