//! Binary distillation columns on a mole-fraction basis.
//!
//! The staircase is stepped from the distillate `(x_D, x_D)` down to the
//! bottoms composition `x_W`, switching from the rectifying to the stripping
//! line at the feed.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use stagewise_core::{
    DrivingForceResult, EquilibriumRelation, FeedLine, LineSet, Section, SectionedLines,
    StageSequence,
};
use tracing::info;

use crate::{
    Discipline, Efficiency, EfficiencyTracker, Error, PinchSolver, StageStepper, StepSettings,
    economics::{self, CostWeights, EconomicSweep},
    error::{require_fraction, require_positive},
    search::{self, RefluxMatch, RefluxSearch},
};

/// Number of reflux ratios in an economic sweep.
const SWEEP_POINTS: usize = 20;

fn default_quality() -> f64 {
    1.0
}

fn default_reflux_factor() -> f64 {
    1.5
}

fn default_max_stages() -> usize {
    2000
}

fn default_tolerance() -> f64 {
    1e-6
}

/// How the operating reflux ratio is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reflux {
    /// A given reflux ratio, which must not be below the minimum.
    Fixed(f64),
    /// A multiple of the minimum reflux ratio.
    Auto {
        #[serde(default = "default_reflux_factor")]
        factor: f64,
    },
}

impl Default for Reflux {
    fn default() -> Self {
        Self::Auto {
            factor: default_reflux_factor(),
        }
    }
}

/// Inputs for a distillation column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistillationSpec {
    pub x_feed: f64,
    /// Feed quality: 1 for saturated liquid, 0 for saturated vapour.
    #[serde(default = "default_quality")]
    pub q: f64,
    pub x_distillate: f64,
    pub x_bottoms: f64,
    #[serde(default)]
    pub reflux: Reflux,
    /// Murphree liquid efficiency.
    #[serde(default)]
    pub liquid_efficiency: Option<f64>,
    /// Murphree vapour efficiency; takes precedence when below one.
    #[serde(default)]
    pub vapor_efficiency: Option<f64>,
    #[serde(default = "default_max_stages")]
    pub max_stages: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl DistillationSpec {
    /// Checks compositions, feed quality, reflux, efficiency and settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] naming the first offending input.
    pub fn validate(&self) -> Result<(), Error> {
        require_fraction("x_bottoms", self.x_bottoms)?;
        require_fraction("x_feed", self.x_feed)?;
        require_fraction("x_distillate", self.x_distillate)?;
        if self.x_feed <= self.x_bottoms {
            return Err(Error::InvalidParameter {
                name: "x_feed",
                value: self.x_feed,
                reason: "must be above x_bottoms",
            });
        }
        if self.x_distillate <= self.x_feed {
            return Err(Error::InvalidParameter {
                name: "x_distillate",
                value: self.x_distillate,
                reason: "must be above x_feed",
            });
        }
        if !self.q.is_finite() {
            return Err(Error::InvalidParameter {
                name: "q",
                value: self.q,
                reason: "must be finite",
            });
        }
        match self.reflux {
            Reflux::Fixed(reflux) => {
                require_positive("reflux", reflux)?;
            }
            Reflux::Auto { factor } => {
                require_positive("reflux_factor", factor)?;
            }
        }
        Efficiency::select(self.liquid_efficiency, self.vapor_efficiency)?;
        if self.max_stages == 0 {
            return Err(Error::InvalidParameter {
                name: "max_stages",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidParameter {
                name: "tolerance",
                value: self.tolerance,
                reason: "must be finite and non-negative",
            });
        }
        Ok(())
    }
}

/// Results of a distillation calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistillationReport {
    pub minimum: DrivingForceResult,
    pub reflux: f64,
    pub lines: LineSet,
    pub ideal: StageSequence,
    /// First ideal stage on the stripping line.
    pub feed_stage: Option<usize>,
    pub efficiency: Option<Efficiency>,
    pub real: Option<StageSequence>,
    /// Whether the bottoms target was reached, by the real trajectory when
    /// one was tracked.
    pub achieved: bool,
}

impl DistillationReport {
    #[must_use]
    pub fn ideal_stages(&self) -> usize {
        self.ideal.stage_count
    }

    #[must_use]
    pub fn real_stages(&self) -> Option<usize> {
        self.real.as_ref().map(|real| real.stage_count)
    }
}

/// A distillation column bound to its inputs and an equilibrium relation.
#[derive(Debug, Clone)]
pub struct DistillationColumn<'a> {
    spec: DistillationSpec,
    equilibrium: &'a EquilibriumRelation,
    pinch: PinchSolver,
}

impl<'a> DistillationColumn<'a> {
    /// Validates `spec` and binds it to `equilibrium`.
    ///
    /// # Errors
    ///
    /// See [`DistillationSpec::validate`].
    pub fn new(
        spec: DistillationSpec,
        equilibrium: &'a EquilibriumRelation,
    ) -> Result<Self, Error> {
        spec.validate()?;
        Ok(Self {
            spec,
            equilibrium,
            pinch: PinchSolver::default(),
        })
    }

    #[must_use]
    pub fn with_pinch_solver(mut self, pinch: PinchSolver) -> Self {
        self.pinch = pinch;
        self
    }

    #[must_use]
    pub fn spec(&self) -> &DistillationSpec {
        &self.spec
    }

    #[must_use]
    pub fn feed_line(&self) -> FeedLine {
        FeedLine::from_quality(self.spec.q, self.spec.x_feed)
    }

    /// The minimum reflux ratio and its pinch point.
    ///
    /// # Errors
    ///
    /// Propagates pinch solver failures.
    pub fn minimum_reflux(&self) -> Result<DrivingForceResult, Error> {
        self.pinch
            .minimum_reflux(self.equilibrium, &self.feed_line(), self.spec.x_distillate)
    }

    /// The reflux ratio to operate at, given the minimum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InfeasibleDrivingForce`] if a fixed reflux is below
    /// the minimum.
    pub fn operating_reflux(&self, minimum: f64) -> Result<f64, Error> {
        match self.spec.reflux {
            Reflux::Fixed(reflux) => {
                if reflux < minimum * (1.0 - 1e-9) {
                    return Err(Error::InfeasibleDrivingForce {
                        parameter: "reflux",
                        supplied: reflux,
                        minimum,
                    });
                }
                Ok(reflux)
            }
            Reflux::Auto { factor } => Ok(factor * minimum),
        }
    }

    /// Rectifying, stripping and feed lines at `reflux`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateSlope`] if the lines do not intersect
    /// properly and [`Error::InvalidParameter`] for a non-positive reflux.
    pub fn lines(&self, reflux: f64) -> Result<LineSet, Error> {
        Ok(LineSet::Sectioned(SectionedLines::from_reflux(
            reflux,
            self.spec.x_distillate,
            self.spec.x_bottoms,
            self.feed_line(),
        )?))
    }

    fn settings(&self) -> StepSettings {
        StepSettings {
            max_stages: self.spec.max_stages,
            tolerance: self.spec.tolerance,
            ..StepSettings::default()
        }
    }

    fn start(&self) -> (f64, f64) {
        (self.spec.x_distillate, self.spec.x_distillate)
    }

    /// The ideal staircase at `reflux`.
    ///
    /// # Errors
    ///
    /// Propagates line construction and stepping failures.
    pub fn ideal_stages(&self, reflux: f64) -> Result<StageSequence, Error> {
        let lines = self.lines(reflux)?;
        let stepper = StageStepper::new(
            self.equilibrium,
            &lines,
            Discipline::VerticalFirst,
            self.settings(),
        )?;
        stepper.step(self.start(), self.spec.x_bottoms)
    }

    /// Ideal stages needed at `reflux`; a run that hits the cap counts as the
    /// cap.
    ///
    /// # Errors
    ///
    /// See [`DistillationColumn::ideal_stages`].
    pub fn stages_at(&self, reflux: f64) -> Result<usize, Error> {
        let sequence = self.ideal_stages(reflux)?;
        Ok(if sequence.converged {
            sequence.stage_count
        } else {
            self.spec.max_stages
        })
    }

    /// Runs the full column calculation.
    ///
    /// # Errors
    ///
    /// Fails if a fixed reflux is below the minimum, the lines are
    /// degenerate, or stepping detects inconsistent inputs.
    pub fn run(&self) -> Result<DistillationReport, Error> {
        let minimum = self.minimum_reflux()?;
        let reflux = self.operating_reflux(minimum.minimum)?;
        let lines = self.lines(reflux)?;
        let stepper = StageStepper::new(
            self.equilibrium,
            &lines,
            Discipline::VerticalFirst,
            self.settings(),
        )?;

        let ideal = stepper.step(self.start(), self.spec.x_bottoms)?;
        let feed_stage = ideal
            .stages
            .iter()
            .find(|record| record.section == Some(Section::Stripping))
            .map(|record| record.index);

        let efficiency =
            Efficiency::select(self.spec.liquid_efficiency, self.spec.vapor_efficiency)?;
        let real = efficiency
            .map(|efficiency| {
                EfficiencyTracker::new(efficiency).apply(
                    stepper.walk(self.start()),
                    self.equilibrium,
                    &lines,
                    self.start(),
                    self.spec.x_bottoms,
                    stepper.settings(),
                )
            })
            .transpose()?;

        let achieved = real.as_ref().map_or(ideal.converged, |real| real.converged);
        info!(
            r_min = minimum.minimum,
            reflux,
            ideal_stages = ideal.stage_count,
            feed_stage,
            real_stages = real.as_ref().map(|real| real.stage_count),
            achieved,
            "distillation column stepped"
        );

        Ok(DistillationReport {
            minimum,
            reflux,
            lines,
            ideal,
            feed_stage,
            efficiency,
            real,
            achieved,
        })
    }

    /// The reflux ratio at which the column needs `target` ideal stages.
    ///
    /// Bisects between `1.05·Rmin` and `search.max_reflux`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InfeasibleSearch`] if no reflux in the bracket gives
    /// `target` stages.
    pub fn reflux_for_stages(
        &self,
        target: usize,
        search: &RefluxSearch,
    ) -> Result<RefluxMatch, Error> {
        let minimum = self.minimum_reflux()?;
        search::reflux_for_stages(target, 1.05 * minimum.minimum, search, |reflux| {
            self.stages_at(reflux)
        })
    }

    /// Sweeps 20 reflux ratios over `[1.05·Rmin, 3·Rmin]` and picks the
    /// cheapest.
    ///
    /// # Errors
    ///
    /// Propagates stepping failures.
    pub fn economic_sweep(&self, weights: &CostWeights) -> Result<EconomicSweep, Error> {
        let minimum = self.minimum_reflux()?.minimum;
        economics::sweep(
            Array1::linspace(1.05 * minimum, 3.0 * minimum, SWEEP_POINTS),
            weights,
            |reflux| self.stages_at(reflux),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use stagewise_core::equilibrium::{Extrapolation, Interpolation};

    fn equilibrium() -> EquilibriumRelation {
        let x: Vec<f64> = (0..=20).map(|i| f64::from(i) / 20.0).collect();
        let y = x.iter().map(|x| 2.5 * x / (1.0 + 1.5 * x)).collect();
        EquilibriumRelation::tabulated(x, y, Interpolation::Linear, Extrapolation::Clamp).unwrap()
    }

    fn spec() -> DistillationSpec {
        DistillationSpec {
            x_feed: 0.4,
            q: 1.0,
            x_distillate: 0.9,
            x_bottoms: 0.05,
            reflux: Reflux::default(),
            liquid_efficiency: None,
            vapor_efficiency: None,
            max_stages: 2000,
            tolerance: 1e-6,
        }
    }

    #[test]
    fn auto_reflux_run_reaches_bottoms() {
        let equilibrium = equilibrium();
        let column = DistillationColumn::new(spec(), &equilibrium).unwrap();

        let report = column.run().unwrap();

        assert!(report.achieved);
        assert_relative_eq!(report.reflux, 1.5 * report.minimum.minimum, epsilon = 1e-12);
        assert!(report.ideal.terminal_x <= 0.05 + 1e-6);
        let feed = report.feed_stage.expect("column has a stripping section");
        assert!(feed > 1 && feed <= report.ideal_stages());
        assert!(report.real.is_none());
    }

    #[test]
    fn fixed_reflux_below_minimum_is_infeasible() {
        let equilibrium = equilibrium();
        let column = DistillationColumn::new(
            DistillationSpec {
                reflux: Reflux::Fixed(0.5),
                ..spec()
            },
            &equilibrium,
        )
        .unwrap();

        assert!(matches!(
            column.run(),
            Err(Error::InfeasibleDrivingForce {
                parameter: "reflux",
                ..
            })
        ));
    }

    #[test]
    fn efficiency_adds_real_stages() {
        let equilibrium = equilibrium();
        let column = DistillationColumn::new(
            DistillationSpec {
                liquid_efficiency: Some(0.7),
                ..spec()
            },
            &equilibrium,
        )
        .unwrap();

        let report = column.run().unwrap();

        assert_eq!(report.efficiency, Some(Efficiency::Liquid(0.7)));
        assert!(report.achieved);
        assert!(report.real_stages().unwrap() > report.ideal_stages());
    }

    #[test]
    fn more_reflux_never_needs_more_stages() {
        let equilibrium = equilibrium();
        let column = DistillationColumn::new(spec(), &equilibrium).unwrap();
        let r_min = column.minimum_reflux().unwrap().minimum;

        let counts: Vec<usize> = [1.1, 1.5, 2.0, 3.0, 5.0]
            .iter()
            .map(|factor| column.stages_at(factor * r_min).unwrap())
            .collect();

        assert!(counts.windows(2).all(|pair| pair[1] <= pair[0]));
    }

    #[test]
    fn reflux_search_hits_target_stage_count() {
        let equilibrium = equilibrium();
        let column = DistillationColumn::new(spec(), &equilibrium).unwrap();
        let target = column.stages_at(2.0 * column.minimum_reflux().unwrap().minimum).unwrap();

        let found = column
            .reflux_for_stages(target, &RefluxSearch::default())
            .unwrap();

        assert_eq!(found.stages, target);
        assert_eq!(column.stages_at(found.reflux).unwrap(), target);
    }

    #[test]
    fn economic_sweep_covers_the_reflux_range() {
        let equilibrium = equilibrium();
        let column = DistillationColumn::new(spec(), &equilibrium).unwrap();
        let r_min = column.minimum_reflux().unwrap().minimum;

        let sweep = column.economic_sweep(&CostWeights::default()).unwrap();

        assert_eq!(sweep.points.len(), 20);
        assert_relative_eq!(sweep.points[0].reflux, 1.05 * r_min, epsilon = 1e-12);
        assert_relative_eq!(sweep.points[19].reflux, 3.0 * r_min, epsilon = 1e-12);
        assert!(sweep.points.iter().all(|p| p.cost >= sweep.optimum.cost));
    }

    #[test]
    fn rejects_misordered_compositions() {
        let equilibrium = equilibrium();
        let result = DistillationColumn::new(
            DistillationSpec {
                x_bottoms: 0.5,
                ..spec()
            },
            &equilibrium,
        );

        assert!(matches!(
            result,
            Err(Error::InvalidParameter { name: "x_feed", .. })
        ));
    }
}
