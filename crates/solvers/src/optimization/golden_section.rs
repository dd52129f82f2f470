//! Golden section search for single-variable minimization.
//!
//! Golden section search finds the minimum of a unimodal function on a
//! bounded interval. It maintains two interior points positioned by the golden
//! ratio, compares their objectives, and shrinks the bracket toward the better
//! point. The bracket ends themselves are never evaluated.

mod bracket;
mod config;

pub use config::{Config, ConfigError};

use bracket::GoldenBracket;

use super::{Error, Method, Minimum, evaluate, ordered};

/// Finds the minimum of `f` on `bracket` using golden section search.
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
    let mut bracket = GoldenBracket::new(left, right);

    let mut inner_left = (bracket.inner_left, evaluate(&mut f, bracket.inner_left)?);
    let mut inner_right = (bracket.inner_right, evaluate(&mut f, bracket.inner_right)?);
    let mut evaluations = 2;

    let best = |a: (f64, f64), b: (f64, f64)| if a.1 <= b.1 { a } else { b };

    for _ in 0..config.max_iters() {
        if bracket.is_converged(config.x_abs_tol(), config.x_rel_tol()) {
            let (x, objective) = best(inner_left, inner_right);
            return Ok(Minimum {
                x,
                objective,
                evaluations,
                converged: true,
                method: Method::GoldenSection,
            });
        }

        if inner_left.1 <= inner_right.1 {
            bracket.shrink_right();
            inner_right = inner_left;
            inner_left = (bracket.inner_left, evaluate(&mut f, bracket.inner_left)?);
        } else {
            bracket.shrink_left();
            inner_left = inner_right;
            inner_right = (bracket.inner_right, evaluate(&mut f, bracket.inner_right)?);
        }
        evaluations += 1;
    }

    let (x, objective) = best(inner_left, inner_right);
    Ok(Minimum {
        x,
        objective,
        evaluations,
        converged: bracket.is_converged(config.x_abs_tol(), config.x_rel_tol()),
        method: Method::GoldenSection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    #[test]
    fn minimizes_polynomial() {
        // Local minimum of x³ - 4x at x = 2/sqrt(3).
        let f = |x: f64| -> Result<f64, Infallible> { Ok(x.powi(3) - 4.0 * x) };

        let minimum = minimize(f, [-2.0, 2.0], &Config::default()).expect("should converge");

        assert!(minimum.converged);
        assert_relative_eq!(minimum.x, 2.0 / 3.0_f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn max_iters_reports_unconverged_best() {
        let f = |x: f64| -> Result<f64, Infallible> { Ok(x) };
        let config = Config::new(1, 1e-12, 1e-12).expect("valid config");

        let minimum = minimize(f, [0.0, 10.0], &config).expect("should complete");

        assert!(!minimum.converged);
        assert_eq!(minimum.evaluations, 3);
        // The new left interior point (~2.36) is the best after one shrink.
        assert_relative_eq!(minimum.x, 2.360_679_8, epsilon = 1e-6);
    }
}
