//! Pinch points and minimum driving forces.

use stagewise_core::{DrivingForceResult, EquilibriumRelation, FeedLine, PinchMethod};
use stagewise_solvers::{Minimizer, Minimum, optimization::Method};
use tracing::{debug, info};

use crate::Error;

/// Limits for the slope of the limiting rectifying line.
const SLOPE_FLOOR: f64 = 1e-8;
const SLOPE_CEILING: f64 = 1.0 - 1e-8;

/// Locates pinch points and derives Lmin or Rmin from them.
///
/// The minimizer is fixed at construction. Golden section search is the
/// default; [`Minimizer::Grid`] trades evaluations for robustness against
/// relations with several local minima.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PinchSolver {
    minimizer: Minimizer,
}

impl PinchSolver {
    #[must_use]
    pub fn new(minimizer: Minimizer) -> Self {
        Self { minimizer }
    }

    /// Finds where the feed line meets the equilibrium relation.
    ///
    /// A vertical feed line (saturated liquid) is resolved directly at its x.
    /// Otherwise the separation `|y*(x) − q(x)|` is minimized over the part of
    /// the relation's domain inside `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Propagates equilibrium and minimizer failures.
    pub fn find_pinch(
        &self,
        equilibrium: &EquilibriumRelation,
        feed: &FeedLine,
    ) -> Result<(f64, f64, PinchMethod), Error> {
        let line = match feed {
            FeedLine::Vertical { x } => {
                return Ok((*x, equilibrium.value_at(*x)?, PinchMethod::Direct));
            }
            FeedLine::Sloped(line) => line,
        };

        let minimum = self
            .minimizer
            .minimize(
                |x: f64| -> Result<f64, Error> {
                    Ok((equilibrium.value_at(x)? - line.at(x)).abs())
                },
                fraction_interval(equilibrium),
            )
            .map_err(|err| Error::from_minimizer(err, "feed-line separation"))?;

        debug!(
            x = minimum.x,
            separation = minimum.objective,
            evaluations = minimum.evaluations,
            "located feed-line pinch"
        );
        Ok((
            minimum.x,
            equilibrium.value_at(minimum.x)?,
            pinch_method(&minimum),
        ))
    }

    /// Minimum reflux ratio for a column with distillate `x_distillate`.
    ///
    /// The limiting rectifying line joins `(x_D, x_D)` to the pinch point.
    /// Its slope is clamped into `(0, 1)` so that `Rmin = m/(1−m)` stays
    /// finite when the pinch sits on the distillate.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`PinchSolver::find_pinch`].
    pub fn minimum_reflux(
        &self,
        equilibrium: &EquilibriumRelation,
        feed: &FeedLine,
        x_distillate: f64,
    ) -> Result<DrivingForceResult, Error> {
        let (pinch_x, pinch_y, method) = self.find_pinch(equilibrium, feed)?;

        let denom = pinch_x - x_distillate;
        let slope = if denom.abs() < 1e-10 {
            SLOPE_CEILING
        } else {
            (pinch_y - x_distillate) / denom
        };
        let slope = slope.clamp(SLOPE_FLOOR, SLOPE_CEILING);
        let minimum = slope / (1.0 - slope);

        info!(pinch_x, pinch_y, r_min = minimum, "minimum reflux");
        Ok(DrivingForceResult {
            pinch_x,
            pinch_y,
            minimum,
            method,
        })
    }

    /// Minimum solvent rate for an absorber on a solute-free ratio basis.
    ///
    /// The leanest operating line runs from the top point `(x_in, y_out)` to
    /// where it first touches the equilibrium relation. For a linear law the
    /// touch point is the rich end, `(y_in/m, y_in)`, and
    /// `Lmin = V·(y_in − y_out)/(y_in/m − x_in)`. For other relations the
    /// steepest chord from the top point to the curve is searched for.
    ///
    /// An infinite minimum is returned when the solvent already enters at or
    /// above equilibrium with the rich gas.
    ///
    /// # Errors
    ///
    /// Propagates equilibrium and minimizer failures.
    pub fn minimum_solvent(
        &self,
        equilibrium: &EquilibriumRelation,
        gas_rate: f64,
        y_in: f64,
        y_out: f64,
        x_in: f64,
    ) -> Result<DrivingForceResult, Error> {
        let x_rich = equilibrium.inverse_at(y_in)?;
        let denom = x_rich - x_in;

        if denom <= 0.0 {
            return Ok(DrivingForceResult {
                pinch_x: x_rich,
                pinch_y: y_in,
                minimum: f64::INFINITY,
                method: PinchMethod::ClosedForm,
            });
        }

        let chord = (y_in - y_out) / denom;
        let result = if equilibrium.linear_slope().is_some() {
            DrivingForceResult {
                pinch_x: x_rich,
                pinch_y: y_in,
                minimum: gas_rate * chord,
                method: PinchMethod::ClosedForm,
            }
        } else {
            let left = x_in + 1e-6 * denom;
            let minimum = self
                .minimizer
                .minimize(
                    |x: f64| -> Result<f64, Error> {
                        Ok(-(equilibrium.value_at(x)? - y_out) / (x - x_in))
                    },
                    [left, x_rich],
                )
                .map_err(|err| Error::from_minimizer(err, "operating-line chord"))?;

            if -minimum.objective > chord {
                DrivingForceResult {
                    pinch_x: minimum.x,
                    pinch_y: equilibrium.value_at(minimum.x)?,
                    minimum: gas_rate * -minimum.objective,
                    method: pinch_method(&minimum),
                }
            } else {
                DrivingForceResult {
                    pinch_x: x_rich,
                    pinch_y: y_in,
                    minimum: gas_rate * chord,
                    method: pinch_method(&minimum),
                }
            }
        };

        info!(
            pinch_x = result.pinch_x,
            pinch_y = result.pinch_y,
            l_min = result.minimum,
            "minimum solvent rate"
        );
        Ok(result)
    }
}

/// The part of the relation's domain inside `[0, 1]`.
fn fraction_interval(equilibrium: &EquilibriumRelation) -> [f64; 2] {
    let [lo, hi] = equilibrium.domain();
    [lo.max(0.0), hi.min(1.0)]
}

fn pinch_method(minimum: &Minimum) -> PinchMethod {
    match minimum.method {
        Method::GoldenSection => PinchMethod::Minimized,
        Method::Grid => PinchMethod::Grid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use stagewise_core::equilibrium::{Extrapolation, Interpolation};
    use stagewise_solvers::optimization::grid;

    fn curved() -> EquilibriumRelation {
        // Relative volatility 2.5 sampled on a coarse grid.
        let x: Vec<f64> = (0..=20).map(|i| f64::from(i) / 20.0).collect();
        let y = x.iter().map(|x| 2.5 * x / (1.0 + 1.5 * x)).collect();
        EquilibriumRelation::tabulated(x, y, Interpolation::Linear, Extrapolation::Clamp).unwrap()
    }

    #[test]
    fn saturated_liquid_feed_needs_no_search() {
        let equilibrium = EquilibriumRelation::linear(1.6).unwrap();
        let feed = FeedLine::from_quality(1.0, 0.4);

        let (x, y, method) = PinchSolver::default().find_pinch(&equilibrium, &feed).unwrap();

        assert_eq!(method, PinchMethod::Direct);
        assert_eq!(x, 0.4);
        assert_eq!(y, equilibrium.value_at(0.4).unwrap());
    }

    #[test]
    fn both_strategies_find_a_sloped_feed_pinch() {
        let equilibrium = curved();
        let feed = FeedLine::from_quality(0.5, 0.45);

        let golden = PinchSolver::default().find_pinch(&equilibrium, &feed).unwrap();
        let grid = PinchSolver::new(Minimizer::Grid(grid::Config::default()))
            .find_pinch(&equilibrium, &feed)
            .unwrap();

        assert_eq!(golden.2, PinchMethod::Minimized);
        assert_eq!(grid.2, PinchMethod::Grid);
        assert_relative_eq!(golden.0, grid.0, epsilon = 1e-5);
        // The pinch lies on the feed line y = -x + 0.9.
        assert_relative_eq!(golden.1, 0.9 - golden.0, epsilon = 1e-6);
    }

    #[test]
    fn minimum_reflux_rises_with_distillate_purity() {
        let equilibrium = curved();
        let feed = FeedLine::from_quality(1.0, 0.4);
        let solver = PinchSolver::default();

        let lower = solver.minimum_reflux(&equilibrium, &feed, 0.85).unwrap();
        let higher = solver.minimum_reflux(&equilibrium, &feed, 0.95).unwrap();

        assert!(lower.minimum > 0.0);
        assert!(higher.minimum >= lower.minimum);
    }

    #[test]
    fn pinch_on_distillate_is_clamped() {
        let equilibrium = curved();
        let feed = FeedLine::from_quality(1.0, 0.9);

        let result = PinchSolver::default()
            .minimum_reflux(&equilibrium, &feed, 0.9)
            .unwrap();

        assert!(result.minimum.is_finite());
        assert_relative_eq!(result.minimum, SLOPE_CEILING / (1.0 - SLOPE_CEILING));
    }

    #[test]
    fn linear_minimum_solvent_matches_closed_form() {
        let equilibrium = EquilibriumRelation::linear(0.4).unwrap();

        let result = PinchSolver::default()
            .minimum_solvent(&equilibrium, 100.0, 0.04, 0.002, 0.002)
            .unwrap();

        assert_eq!(result.method, PinchMethod::ClosedForm);
        assert_relative_eq!(result.minimum, 100.0 * 0.038 / 0.098, epsilon = 1e-12);
        assert_relative_eq!(result.pinch_x, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn rich_solvent_gives_infinite_minimum() {
        let equilibrium = EquilibriumRelation::linear(0.4).unwrap();

        let result = PinchSolver::default()
            .minimum_solvent(&equilibrium, 100.0, 0.04, 0.002, 0.2)
            .unwrap();

        assert!(!result.is_feasible());
    }

    #[test]
    fn curved_minimum_solvent_finds_interior_tangent() {
        // A concave relation with a non-zero outlet gas pinches before the rich end.
        let equilibrium = curved();

        let result = PinchSolver::default()
            .minimum_solvent(&equilibrium, 1.0, 0.6, 0.05, 0.0)
            .unwrap();

        let rich_x = equilibrium.inverse_at(0.6).unwrap();
        assert_eq!(result.method, PinchMethod::Minimized);
        assert!(result.pinch_x < rich_x - 0.1);
        assert_relative_eq!(result.pinch_x, 0.15, epsilon = 1e-6);
        assert_relative_eq!(result.minimum, 1.707_48, epsilon = 1e-5);
        assert!(result.minimum > 0.55 / rich_x);
    }
}
