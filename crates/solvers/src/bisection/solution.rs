/// Why a bisection run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The residual or the bracket width met its tolerance.
    Converged,
    /// The iteration budget ran out first.
    MaxIters,
    /// The observer asked to stop.
    StoppedByObserver,
}

/// Outcome of a bisection run.
///
/// `x` is the trial with the smallest residual seen, which for a step-valued
/// residual need not be the last midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub status: Status,
    pub x: f64,
    pub residual: f64,
    pub iters: usize,
}

impl Solution {
    pub(super) fn new(status: Status, (x, residual): (f64, f64), iters: usize) -> Self {
        Self {
            status,
            x,
            residual,
            iters,
        }
    }

    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.status == Status::Converged
    }
}
