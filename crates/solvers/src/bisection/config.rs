use thiserror::Error;

/// Stopping rules for bisection.
///
/// A run stops when `|residual| <= residual_tol`, when the bracket is
/// narrower than `x_abs_tol + x_rel_tol·|x|`, or after `max_iters`
/// midpoints. A step-valued residual (such as a stage count) usually wants a
/// `residual_tol` of half a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub max_iters: usize,
    pub x_abs_tol: f64,
    pub x_rel_tol: f64,
    pub residual_tol: f64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("absolute bracket tolerance must be finite and non-negative")]
    XAbs,
    #[error("relative bracket tolerance must be finite and non-negative")]
    XRel,
    #[error("residual tolerance must be finite and non-negative")]
    Residual,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 100,
            x_abs_tol: 1e-12,
            x_rel_tol: 1e-12,
            residual_tol: 1e-12,
        }
    }
}

impl Config {
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first invalid tolerance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        [
            (self.x_abs_tol, ConfigError::XAbs),
            (self.x_rel_tol, ConfigError::XRel),
            (self.residual_tol, ConfigError::Residual),
        ]
        .into_iter()
        .find(|(value, _)| !value.is_finite() || *value < 0.0)
        .map_or(Ok(()), |(_, err)| Err(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_in_order() {
        let config = Config {
            x_rel_tol: -1.0,
            residual_tol: f64::NAN,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::XRel));
        assert_eq!(Config::default().validate(), Ok(()));
    }
}
