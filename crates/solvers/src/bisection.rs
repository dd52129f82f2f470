//! Bisection root finding for scalar functions.
//!
//! The function may be fallible and may be a step function (for example an
//! integer stage count minus a target); the solver only relies on the sign of
//! the residual at each trial point.

mod bracket;
mod config;
mod error;
mod solution;

pub use bracket::{Bracket, Sign};
pub use config::{Config, ConfigError};
pub use error::Error;
pub use solution::{Solution, Status};

use crate::Observer;

use bracket::{Bounds, BoundsError};

/// Control actions supported by the bisection solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the solver and return the best point found so far.
    StopEarly,
}

/// Iteration event emitted by the bisection solver.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    /// Iteration counter (1-based within the bisection loop).
    pub iter: usize,
    /// Current search bracket.
    pub bracket: [f64; 2],
    /// The midpoint that was evaluated.
    pub x: f64,
    /// Residual at the midpoint.
    pub residual: f64,
}

/// Finds a root of `f` using the bisection method.
/// Observers see each iteration's midpoint and bracket state.
///
/// # Errors
///
/// Returns an error if the bracket or config is invalid, if the residuals at
/// the bracket ends share a sign, or if `f` fails or returns a non-finite value.
pub fn solve<F, E, Obs>(
    mut f: F,
    bracket: [f64; 2],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
    Obs: Observer<Event, Action>,
{
    config.validate()?;

    let bounds = Bounds::new(bracket).map_err(|err| match err {
        BoundsError::NonFinite(value) => Error::NonFiniteBracket { value },
        BoundsError::ZeroWidth(value) => Error::ZeroWidthBracket { value },
    })?;

    let left_residual = residual(&mut f, bounds.left)?;
    if left_residual.abs() <= config.residual_tol {
        return Ok(Solution::new(
            Status::Converged,
            (bounds.left, left_residual),
            0,
        ));
    }

    let right_residual = residual(&mut f, bounds.right)?;
    if right_residual.abs() <= config.residual_tol {
        return Ok(Solution::new(
            Status::Converged,
            (bounds.right, right_residual),
            0,
        ));
    }

    if Sign::of(left_residual) == Sign::of(right_residual) {
        return Err(Error::NoBracket {
            left: bounds.left,
            right: bounds.right,
            left_residual,
            right_residual,
        });
    }

    let mut best = if left_residual.abs() <= right_residual.abs() {
        (bounds.left, left_residual)
    } else {
        (bounds.right, right_residual)
    };

    let mut bracket = Bracket::new(bounds, Sign::of(left_residual));

    for iter in 1..=config.max_iters {
        let mid = bracket.midpoint();
        let mid_residual = residual(&mut f, mid)?;

        if mid_residual.abs() < best.1.abs() {
            best = (mid, mid_residual);
        }

        let event = Event {
            iter,
            bracket: bracket.as_array(),
            x: mid,
            residual: mid_residual,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution::new(Status::StoppedByObserver, best, iter));
        }

        if mid_residual.abs() <= config.residual_tol {
            return Ok(Solution::new(Status::Converged, (mid, mid_residual), iter));
        }

        bracket.shrink(mid, Sign::of(mid_residual));

        if bracket.is_x_converged(config.x_abs_tol, config.x_rel_tol) {
            return Ok(Solution::new(Status::Converged, best, iter));
        }
    }

    Ok(Solution::new(Status::MaxIters, best, config.max_iters))
}

/// Runs bisection without observation.
///
/// # Errors
///
/// See [`solve`].
pub fn solve_unobserved<F, E>(
    f: F,
    bracket: [f64; 2],
    config: &Config,
) -> Result<Solution, Error<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    solve(f, bracket, config, ())
}

fn residual<F, E>(f: &mut F, x: f64) -> Result<f64, Error<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let value = f(x).map_err(|source| Error::Function { x, source })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::NonFiniteResidual { x, residual: value })
    }
}
