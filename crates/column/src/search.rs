//! Searches over the stage count.
//!
//! [`minimal_stage_count`] scans trial stage counts upwards until one meets
//! the target. [`reflux_for_stages`] bisects on the reflux ratio until a
//! column needs a given number of stages.

use stagewise_solvers::bisection::{self, Action, Event};
use tracing::{debug, info, warn};

use crate::{Error, Trial};

/// Finds the smallest `n` in `1..=cap` for which `reaches(n)` holds.
///
/// Each trial typically re-steps the whole column, so the scan costs
/// `O(cap²)` stage evaluations in the worst case. Feasible columns stop at
/// their stage count, which is small next to the cap.
///
/// # Errors
///
/// Returns [`Error::InfeasibleSearch`] if no trial succeeds, and propagates
/// errors from `reaches`.
pub fn minimal_stage_count<F>(cap: usize, mut reaches: F) -> Result<usize, Error>
where
    F: FnMut(usize) -> Result<bool, Error>,
{
    for n in 1..=cap {
        if reaches(n)? {
            debug!(stages = n, "stage search accepted trial");
            return Ok(n);
        }
    }
    warn!(cap, "stage search found no feasible stage count");
    Err(Error::InfeasibleSearch {
        budget: cap,
        closest: None,
    })
}

/// Settings for [`reflux_for_stages`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefluxSearch {
    /// Upper end of the reflux bracket.
    pub max_reflux: f64,
    /// Maximum number of bisection trials.
    pub budget: usize,
}

impl Default for RefluxSearch {
    fn default() -> Self {
        Self {
            max_reflux: 10.0,
            budget: 50,
        }
    }
}

/// The outcome of a successful [`reflux_for_stages`] search.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RefluxMatch {
    pub reflux: f64,
    pub stages: usize,
    pub trials: usize,
}

/// Bisects on the reflux ratio in `[min_reflux, search.max_reflux]` until
/// `stages_at(R)` equals `target`.
///
/// The stage count falls as reflux rises, so the residual
/// `stages_at(R) − target` is a non-increasing step function and a match is
/// any trial within half a stage of zero.
///
/// # Errors
///
/// Returns [`Error::InfeasibleSearch`] with the closest trial if the target
/// lies outside what the bracket can deliver or the budget runs out, and
/// propagates errors from `stages_at`.
pub fn reflux_for_stages<F>(
    target: usize,
    min_reflux: f64,
    search: &RefluxSearch,
    mut stages_at: F,
) -> Result<RefluxMatch, Error>
where
    F: FnMut(f64) -> Result<usize, Error>,
{
    if !(min_reflux.is_finite() && search.max_reflux.is_finite() && min_reflux < search.max_reflux)
    {
        return Err(Error::InvalidSearchRange {
            lower: min_reflux,
            upper: search.max_reflux,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let target_f = target as f64;
    let config = bisection::Config {
        max_iters: search.budget,
        residual_tol: 0.5,
        ..bisection::Config::default()
    };

    let mut closest: Option<Trial> = None;
    let mut trials = 0;
    let mut record = |reflux: f64, stages: usize| {
        trials += 1;
        let better = closest.is_none_or(|best| {
            stages.abs_diff(target) < best.stages.abs_diff(target)
        });
        if better {
            closest = Some(Trial {
                parameter: reflux,
                stages,
            });
        }
    };

    let residual = |reflux: f64| -> Result<f64, Error> {
        let stages = stages_at(reflux)?;
        record(reflux, stages);
        #[allow(clippy::cast_precision_loss)]
        let stages = stages as f64;
        Ok(stages - target_f)
    };
    let observer = |event: &Event| -> Option<Action> {
        debug!(
            iter = event.iter,
            reflux = event.x,
            residual = event.residual,
            "reflux search trial"
        );
        None
    };

    let outcome = bisection::solve(residual, [min_reflux, search.max_reflux], &config, observer);

    match outcome {
        Ok(solution) if solution.is_converged() && solution.residual.abs() < 1.0 => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let stages = (solution.residual + target_f).round() as usize;
            info!(target, reflux = solution.x, trials, "reflux search matched stage count");
            Ok(RefluxMatch {
                reflux: solution.x,
                stages,
                trials,
            })
        }
        Ok(_) | Err(bisection::Error::NoBracket { .. }) => {
            warn!(target, trials, ?closest, "reflux search did not match stage count");
            Err(Error::InfeasibleSearch {
                budget: search.budget,
                closest,
            })
        }
        Err(err) => Err(Error::from_bisection(err, search.budget)),
    }
}
