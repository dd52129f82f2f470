//! Counter-current gas absorbers on a solute-free (mole ratio) basis.
//!
//! Gas enters the bottom at ratio `Y_in` and must leave the top at `Y_out`;
//! solvent enters the top at `X_in`. The staircase is stepped from the top.

mod balance;

pub use balance::{MaterialBalance, StreamFlows};

use serde::{Deserialize, Serialize};
use stagewise_core::{DrivingForceResult, EquilibriumRelation, LineSet, OperatingLine, StageSequence};
use tracing::{info, warn};

use crate::{
    Discipline, Error, PinchSolver, StageStepper, StepSettings,
    error::require_positive,
    search::minimal_stage_count,
};

/// Tolerance for accepting a trial stage count in the integer search.
const SEARCH_TOLERANCE: f64 = 1e-8;

/// Lower bound on the integer search cap.
const SEARCH_CAP: usize = 2000;

fn default_solvent_factor() -> f64 {
    1.5
}

fn default_hetp() -> f64 {
    0.5
}

fn default_max_stages() -> usize {
    300
}

/// Inputs for an absorber.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsorptionSpec {
    /// Solute ratio in the entering gas, `Y_F`.
    pub y_in: f64,
    /// Target solute ratio in the leaving gas, `Y_N`.
    pub y_out: f64,
    /// Solute ratio in the entering solvent, `X_0`.
    pub x_in: f64,
    /// Inert gas flow, `V`.
    pub gas_rate: f64,
    /// Solvent flow, `L`. Absent or non-positive means `solvent_factor·Lmin`.
    #[serde(default)]
    pub solvent_rate: Option<f64>,
    #[serde(default = "default_solvent_factor")]
    pub solvent_factor: f64,
    /// Height equivalent to a theoretical plate.
    #[serde(default = "default_hetp")]
    pub hetp: f64,
    /// Stage cap for the staircase.
    #[serde(default = "default_max_stages")]
    pub max_stages: usize,
}

impl AbsorptionSpec {
    /// Checks that the inputs describe a physically meaningful absorber.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] naming the first offending input.
    pub fn validate(&self) -> Result<(), Error> {
        require_positive("gas_rate", self.gas_rate)?;
        require_positive("solvent_factor", self.solvent_factor)?;
        require_positive("hetp", self.hetp)?;
        if !self.y_out.is_finite() || self.y_out < 0.0 {
            return Err(Error::InvalidParameter {
                name: "y_out",
                value: self.y_out,
                reason: "must be finite and non-negative",
            });
        }
        if !self.y_in.is_finite() || self.y_in <= self.y_out {
            return Err(Error::InvalidParameter {
                name: "y_in",
                value: self.y_in,
                reason: "must be finite and above y_out",
            });
        }
        if !self.x_in.is_finite() || self.x_in < 0.0 {
            return Err(Error::InvalidParameter {
                name: "x_in",
                value: self.x_in,
                reason: "must be finite and non-negative",
            });
        }
        if let Some(rate) = self.solvent_rate {
            if !rate.is_finite() {
                return Err(Error::InvalidParameter {
                    name: "solvent_rate",
                    value: rate,
                    reason: "must be finite",
                });
            }
        }
        if self.max_stages == 0 {
            return Err(Error::InvalidParameter {
                name: "max_stages",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// One row of the bottom-up stage table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageTableRow {
    pub stage: usize,
    pub x: f64,
    pub y: f64,
}

/// Results of an absorber calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsorptionReport {
    pub minimum: DrivingForceResult,
    pub solvent_rate: f64,
    pub line: OperatingLine,
    /// Staircase stepped from the top of the column.
    pub ideal: StageSequence,
    /// Smallest stage count found by the integer search, if any.
    pub searched_stages: Option<usize>,
    /// Stage count used for sizing.
    pub stages: usize,
    /// `stages · HETP`.
    pub packed_height: f64,
    pub stage_table: Vec<StageTableRow>,
    pub balance: MaterialBalance,
}

/// An absorber bound to its inputs and an equilibrium relation.
#[derive(Debug, Clone)]
pub struct AbsorptionColumn<'a> {
    spec: AbsorptionSpec,
    equilibrium: &'a EquilibriumRelation,
    pinch: PinchSolver,
}

impl<'a> AbsorptionColumn<'a> {
    /// Validates `spec` and binds it to `equilibrium`.
    ///
    /// # Errors
    ///
    /// See [`AbsorptionSpec::validate`].
    pub fn new(spec: AbsorptionSpec, equilibrium: &'a EquilibriumRelation) -> Result<Self, Error> {
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
    pub fn spec(&self) -> &AbsorptionSpec {
        &self.spec
    }

    /// The minimum solvent rate.
    ///
    /// # Errors
    ///
    /// Propagates pinch solver failures.
    pub fn minimum_solvent(&self) -> Result<DrivingForceResult, Error> {
        let AbsorptionSpec {
            y_in,
            y_out,
            x_in,
            gas_rate,
            ..
        } = self.spec;
        self.pinch
            .minimum_solvent(self.equilibrium, gas_rate, y_in, y_out, x_in)
    }

    /// The solvent rate to operate at, given the minimum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the minimum is infinite and
    /// [`Error::InfeasibleDrivingForce`] if a supplied rate is below it.
    pub fn operating_solvent(&self, minimum: f64) -> Result<f64, Error> {
        if !minimum.is_finite() || minimum <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "x_in",
                value: self.spec.x_in,
                reason: "entering solvent is at or above equilibrium with the entering gas",
            });
        }
        match self.spec.solvent_rate {
            Some(rate) if rate > 0.0 => {
                if rate < minimum * (1.0 - 1e-9) {
                    return Err(Error::InfeasibleDrivingForce {
                        parameter: "solvent_rate",
                        supplied: rate,
                        minimum,
                    });
                }
                info!(solvent_rate = rate, ratio = rate / minimum, "using supplied solvent rate");
                Ok(rate)
            }
            _ => {
                let rate = minimum * self.spec.solvent_factor;
                info!(
                    solvent_rate = rate,
                    factor = self.spec.solvent_factor,
                    "solvent rate set from minimum"
                );
                Ok(rate)
            }
        }
    }

    /// The operating line through the top of the column at `solvent_rate`.
    #[must_use]
    pub fn operating_line(&self, solvent_rate: f64) -> OperatingLine {
        let slope = solvent_rate / self.spec.gas_rate;
        OperatingLine::new(slope, self.spec.y_out - slope * self.spec.x_in)
    }

    /// Runs the full absorber calculation.
    ///
    /// # Errors
    ///
    /// Fails if the solvent rate is infeasible or stepping detects
    /// inconsistent inputs.
    pub fn run(&self) -> Result<AbsorptionReport, Error> {
        let spec = &self.spec;
        let minimum = self.minimum_solvent()?;
        let solvent_rate = self.operating_solvent(minimum.minimum)?;
        let line = self.operating_line(solvent_rate);
        let lines = LineSet::Single(line);

        let settings = StepSettings {
            max_stages: spec.max_stages,
            ..StepSettings::default()
        };
        let stepper =
            StageStepper::new(self.equilibrium, &lines, Discipline::HorizontalFirst, settings)?;
        let start = (spec.x_in, spec.y_out);
        let ideal = stepper.step(start, spec.y_in)?;

        let search = minimal_stage_count(spec.max_stages.max(SEARCH_CAP), |n| {
            let trial = stepper.with_max_stages(n).trial(start, spec.y_in)?;
            Ok(trial
                .last()
                .is_some_and(|record| record.y >= spec.y_in - SEARCH_TOLERANCE))
        });
        let searched_stages = match search {
            Ok(n) => Some(n),
            Err(Error::InfeasibleSearch { .. }) => {
                warn!(
                    fallback = ideal.stage_count,
                    "stage search failed, using the staircase count"
                );
                None
            }
            Err(err) => return Err(err),
        };
        let stages = searched_stages.unwrap_or(ideal.stage_count);

        let stage_table = self.stage_table(&line, stages + 5)?;
        let balance = MaterialBalance::new(
            spec.y_in,
            spec.y_out,
            spec.x_in,
            spec.gas_rate,
            solvent_rate,
        );

        #[allow(clippy::cast_precision_loss)]
        let packed_height = stages as f64 * spec.hetp;
        info!(
            l_min = minimum.minimum,
            solvent_rate,
            stages,
            packed_height,
            "absorber sized"
        );

        Ok(AbsorptionReport {
            minimum,
            solvent_rate,
            line,
            ideal,
            searched_stages,
            stages,
            packed_height,
            stage_table,
            balance,
        })
    }

    /// Stage compositions listed from the bottom of the column up.
    ///
    /// Starts from the rich liquid on the operating line at `Y_in` and
    /// alternates equilibrium and operating-line projections until the gas is
    /// at the outlet target, the liquid stops getting leaner, or `cap` rows
    /// are written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateSlope`] for a horizontal operating line and
    /// [`Error::PhysicalBoundViolation`] if the rich liquid is negative.
    pub fn stage_table(&self, line: &OperatingLine, cap: usize) -> Result<Vec<StageTableRow>, Error> {
        let mut x = line.inverse(self.spec.y_in)?;
        if !x.is_finite() || x < 0.0 {
            return Err(Error::PhysicalBoundViolation {
                stage: 1,
                quantity: "x",
                value: x,
            });
        }

        let mut rows = Vec::new();
        for stage in 1..=cap.max(1) {
            let y = self.equilibrium.value_at(x)?;
            rows.push(StageTableRow { stage, x, y });
            if y <= self.spec.y_out + 1e-12 {
                break;
            }
            let next = line.inverse(y)?;
            if next > x + 1e-12 {
                break;
            }
            x = next;
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use approx::assert_relative_eq;
    use tracing::Level;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    fn spec() -> AbsorptionSpec {
        AbsorptionSpec {
            y_in: 0.04,
            y_out: 0.002,
            x_in: 0.002,
            gas_rate: 100.0,
            solvent_rate: None,
            solvent_factor: 1.5,
            hetp: 0.5,
            max_stages: 300,
        }
    }

    #[test]
    fn auto_solvent_rate_is_factor_times_minimum() {
        let equilibrium = EquilibriumRelation::linear(0.4).unwrap();
        let column = AbsorptionColumn::new(spec(), &equilibrium).unwrap();

        let report = column.run().unwrap();

        assert_relative_eq!(report.minimum.minimum, 3.8 / 0.098, epsilon = 1e-9);
        assert_relative_eq!(report.solvent_rate, 1.5 * 3.8 / 0.098, epsilon = 1e-9);
        assert_eq!(report.searched_stages, Some(7));
        assert_eq!(report.stages, 7);
        assert_relative_eq!(report.packed_height, 3.5);
    }

    #[test]
    fn supplied_rate_below_minimum_is_rejected() {
        let equilibrium = EquilibriumRelation::linear(0.4).unwrap();
        let column = AbsorptionColumn::new(
            AbsorptionSpec {
                solvent_rate: Some(30.0),
                ..spec()
            },
            &equilibrium,
        )
        .unwrap();

        match column.run() {
            Err(Error::InfeasibleDrivingForce {
                supplied, minimum, ..
            }) => {
                assert_relative_eq!(supplied, 30.0);
                assert_relative_eq!(minimum, 3.8 / 0.098, epsilon = 1e-9);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn non_positive_supplied_rate_means_auto() {
        let equilibrium = EquilibriumRelation::linear(0.4).unwrap();
        let column = AbsorptionColumn::new(
            AbsorptionSpec {
                solvent_rate: Some(0.0),
                ..spec()
            },
            &equilibrium,
        )
        .unwrap();

        assert_relative_eq!(
            column.operating_solvent(10.0).unwrap(),
            15.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn stage_table_runs_from_bottom_to_top() {
        let equilibrium = EquilibriumRelation::linear(0.4).unwrap();
        let column = AbsorptionColumn::new(spec(), &equilibrium).unwrap();
        let line = column.operating_line(58.163_265_306_122_45);

        let table = column.stage_table(&line, 12).unwrap();

        assert_relative_eq!(table[0].x, line.inverse(0.04).unwrap());
        assert!(table.windows(2).all(|pair| pair[1].x < pair[0].x));
        assert!(table.last().unwrap().y <= 0.002 + 1e-12 || table.len() == 12);
    }

    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn failing_search_trials_do_not_warn() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));
        let equilibrium = EquilibriumRelation::linear(0.4).unwrap();
        let column = AbsorptionColumn::new(spec(), &equilibrium).unwrap();

        let report = tracing::subscriber::with_default(subscriber, || column.run().unwrap());

        assert!(report.searched_stages.is_some_and(|n| n > 1));
        assert_eq!(warnings.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn validation_names_the_offending_input() {
        let equilibrium = EquilibriumRelation::linear(0.4).unwrap();
        let result = AbsorptionColumn::new(
            AbsorptionSpec {
                y_out: 0.05,
                ..spec()
            },
            &equilibrium,
        );

        assert!(matches!(
            result,
            Err(Error::InvalidParameter { name: "y_in", .. })
        ));
    }
}
