//! Two-pass grid scan for single-variable minimization.
//!
//! A coarse uniform scan locates the best grid point, then a finer uniform
//! scan covers a window of neighbouring coarse points around it. Unlike golden
//! section search this tolerates objectives with several local minima, at the
//! cost of many more evaluations.

use ndarray::Array1;

use super::{Error, Method, Minimum, evaluate, ordered};

/// Configuration for the grid minimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    coarse_points: usize,
    refine_half_width: usize,
    refine_points: usize,
}

/// Errors that can occur when validating a grid minimizer config.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("coarse_points must be at least 2, got {0}")]
    CoarsePoints(usize),

    #[error("refine_points must be at least 2, got {0}")]
    RefinePoints(usize),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coarse_points: 5001,
            refine_half_width: 5,
            refine_points: 2001,
        }
    }
}

impl Config {
    /// Creates a validated grid config.
    ///
    /// # Errors
    ///
    /// Returns an error if either scan would have fewer than two points.
    pub fn new(
        coarse_points: usize,
        refine_half_width: usize,
        refine_points: usize,
    ) -> Result<Self, ConfigError> {
        if coarse_points < 2 {
            return Err(ConfigError::CoarsePoints(coarse_points));
        }
        if refine_points < 2 {
            return Err(ConfigError::RefinePoints(refine_points));
        }
        Ok(Self {
            coarse_points,
            refine_half_width,
            refine_points,
        })
    }

    #[must_use]
    pub fn coarse_points(&self) -> usize {
        self.coarse_points
    }

    #[must_use]
    pub fn refine_half_width(&self) -> usize {
        self.refine_half_width
    }

    #[must_use]
    pub fn refine_points(&self) -> usize {
        self.refine_points
    }
}

/// Finds the minimum of `f` on `bracket` with a coarse-then-refined scan.
///
/// The result always reports `converged = true`: a grid scan has no iterative
/// stopping criterion to miss.
///
/// # Errors
///
/// Returns an error if the bracket is invalid or `f` fails or returns a
/// non-finite value.
pub fn minimize<F, E>(mut f: F, bracket: [f64; 2], config: &Config) -> Result<Minimum, Error<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let (left, right) = ordered(bracket)?;
    let coarse = Array1::linspace(left, right, config.coarse_points);

    let mut evaluations = 0;
    let mut best_index = 0;
    let mut best = (coarse[0], f64::INFINITY);
    for (index, &x) in coarse.iter().enumerate() {
        let objective = evaluate(&mut f, x)?;
        evaluations += 1;
        if objective < best.1 {
            best = (x, objective);
            best_index = index;
        }
    }

    let lo = coarse[best_index.saturating_sub(config.refine_half_width)];
    let hi = coarse[(best_index + config.refine_half_width).min(coarse.len() - 1)];
    if hi > lo {
        for x in Array1::linspace(lo, hi, config.refine_points) {
            let objective = evaluate(&mut f, x)?;
            evaluations += 1;
            if objective < best.1 {
                best = (x, objective);
            }
        }
    }

    let (x, objective) = best;
    Ok(Minimum {
        x,
        objective,
        evaluations,
        converged: true,
        method: Method::Grid,
    })
}
