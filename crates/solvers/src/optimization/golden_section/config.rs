use thiserror::Error;

/// Iteration budget and bracket-width tolerances for golden-section search.
///
/// The search stops once the bracket is narrower than
/// `x_abs_tol + x_rel_tol·|x|` or after `max_iters` shrinks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    x_abs_tol: f64,
    x_rel_tol: f64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("absolute bracket tolerance must be finite and non-negative")]
    XAbs,
    #[error("relative bracket tolerance must be finite and non-negative")]
    XRel,
}

impl Default for Config {
    /// 200 shrinks take a unit bracket well below `1e-12`.
    fn default() -> Self {
        Self {
            max_iters: 200,
            x_abs_tol: 1e-12,
            x_rel_tol: 1e-12,
        }
    }
}

fn is_tolerance(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl Config {
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first invalid tolerance.
    pub fn new(max_iters: usize, x_abs_tol: f64, x_rel_tol: f64) -> Result<Self, ConfigError> {
        match (is_tolerance(x_abs_tol), is_tolerance(x_rel_tol)) {
            (false, _) => Err(ConfigError::XAbs),
            (true, false) => Err(ConfigError::XRel),
            (true, true) => Ok(Self {
                max_iters,
                x_abs_tol,
                x_rel_tol,
            }),
        }
    }

    /// The same tolerances with a different iteration budget.
    #[must_use]
    pub fn with_max_iters(self, max_iters: usize) -> Self {
        Self { max_iters, ..self }
    }

    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    #[must_use]
    pub fn x_abs_tol(&self) -> f64 {
        self.x_abs_tol
    }

    #[must_use]
    pub fn x_rel_tol(&self) -> f64 {
        self.x_rel_tol
    }
}
