//! Trade-off between stage count and reflux.
//!
//! Capital cost grows with the number of stages and operating cost with the
//! reboiler duty, which scales as `R/(R+1)`. A sweep over reflux ratios
//! picks the cheapest weighted sum `C = a·N + b·R/(R+1)`.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Error;

fn one() -> f64 {
    1.0
}

/// Cost weights `a` (per stage) and `b` (per unit of `R/(R+1)`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    #[serde(default = "one")]
    pub per_stage: f64,
    #[serde(default = "one")]
    pub per_duty: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            per_stage: 1.0,
            per_duty: 1.0,
        }
    }
}

impl CostWeights {
    /// Cost of a column with `stages` stages at `reflux`.
    #[must_use]
    pub fn cost(&self, stages: usize, reflux: f64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let stages = stages as f64;
        self.per_stage * stages + self.per_duty * reflux / (reflux + 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostPoint {
    pub reflux: f64,
    pub stages: usize,
    pub cost: f64,
}

/// Every evaluated point and the cheapest one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomicSweep {
    pub points: Vec<CostPoint>,
    pub optimum: CostPoint,
}

/// Evaluates the cost at each reflux ratio and returns the cheapest.
///
/// Ties go to the earliest (lowest-reflux) point.
///
/// # Errors
///
/// Returns [`Error::InvalidSearchRange`] if `refluxes` is empty, and
/// propagates errors from `stages_at`.
pub fn sweep<I, F>(refluxes: I, weights: &CostWeights, mut stages_at: F) -> Result<EconomicSweep, Error>
where
    I: IntoIterator<Item = f64>,
    F: FnMut(f64) -> Result<usize, Error>,
{
    let points = refluxes
        .into_iter()
        .map(|reflux| {
            let stages = stages_at(reflux)?;
            Ok(CostPoint {
                reflux,
                stages,
                cost: weights.cost(stages, reflux),
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let optimum = points
        .iter()
        .copied()
        .reduce(|best, point| if point.cost < best.cost { point } else { best })
        .ok_or(Error::InvalidSearchRange {
            lower: f64::NAN,
            upper: f64::NAN,
        })?;

    info!(
        reflux = optimum.reflux,
        stages = optimum.stages,
        cost = optimum.cost,
        "economic optimum"
    );
    Ok(EconomicSweep { points, optimum })
}
