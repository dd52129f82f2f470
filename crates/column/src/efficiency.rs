//! Murphree stage efficiency.

use serde::Serialize;
use stagewise_core::{EquilibriumRelation, LineSet, StageKind, StageRecord, StageSequence};
use tracing::{debug, warn};

use crate::{Error, Stage, StepSettings};

/// A Murphree efficiency in one phase, `0 < E ≤ 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "phase", content = "value", rename_all = "snake_case")]
pub enum Efficiency {
    /// The liquid moves a fraction `E` of the way to the ideal composition.
    Liquid(f64),
    /// The vapour moves a fraction `E` of the way to equilibrium.
    Vapor(f64),
}

impl Efficiency {
    /// A validated liquid-phase efficiency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `0 < value ≤ 1`.
    pub fn liquid(value: f64) -> Result<Self, Error> {
        validate("liquid_efficiency", value).map(Self::Liquid)
    }

    /// A validated vapour-phase efficiency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `0 < value ≤ 1`.
    pub fn vapor(value: f64) -> Result<Self, Error> {
        validate("vapor_efficiency", value).map(Self::Vapor)
    }

    /// Chooses between optional liquid and vapour efficiencies.
    ///
    /// A vapour efficiency below one takes precedence; a vapour efficiency of
    /// exactly one defers to the liquid efficiency if given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the chosen value is out of range
    /// or a supplied vapour efficiency is not in `(0, 1]`.
    #[allow(clippy::float_cmp)]
    pub fn select(liquid: Option<f64>, vapor: Option<f64>) -> Result<Option<Self>, Error> {
        match (liquid, vapor) {
            (_, Some(v)) if v != 1.0 => Self::vapor(v).map(Some),
            (Some(l), _) => Self::liquid(l).map(Some),
            (None, _) => Ok(None),
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        match *self {
            Self::Liquid(value) | Self::Vapor(value) => value,
        }
    }
}

fn validate(name: &'static str, value: f64) -> Result<f64, Error> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must lie in (0, 1]",
        })
    }
}

/// Derives the real trajectory of a column from its ideal stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EfficiencyTracker {
    efficiency: Efficiency,
}

impl EfficiencyTracker {
    #[must_use]
    pub fn new(efficiency: Efficiency) -> Self {
        Self { efficiency }
    }

    #[must_use]
    pub fn efficiency(&self) -> Efficiency {
        self.efficiency
    }

    /// Tracks the real compositions alongside `ideal`, starting from `start`.
    ///
    /// Each ideal stage moves the real point part of the way:
    ///
    /// - liquid: `x ← x + E·(x_ideal − x)`, with `y` on the stage's operating
    ///   line
    /// - vapour: `y ← y + E·(y*(x_ideal) − y)`, with `x` from inverting the
    ///   stage's operating line
    ///
    /// `ideal` should not stop at the bottoms composition, since the real
    /// trajectory lags behind it; pass an unbounded [`crate::StageWalk`]. The
    /// run ends once the real liquid reaches `target_x` or after
    /// `settings.max_stages` stages, in which case it reports
    /// `converged = false`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhysicalBoundViolation`] if the real liquid leaves
    /// `[0, 1]`, and propagates errors from `ideal` and from line inversion.
    pub fn apply<I>(
        &self,
        ideal: I,
        equilibrium: &EquilibriumRelation,
        lines: &LineSet,
        start: (f64, f64),
        target_x: f64,
        settings: &StepSettings,
    ) -> Result<StageSequence, Error>
    where
        I: IntoIterator<Item = Result<Stage, Error>>,
    {
        let (mut x, mut y) = start;
        let mut stages = vec![StageRecord {
            index: 0,
            kind: StageKind::Start,
            x,
            y,
            section: None,
        }];
        let mut stage_count = 0;

        for stage in ideal.into_iter().take(settings.max_stages) {
            let stage = stage?;
            let line = lines.line(stage.section);
            match self.efficiency {
                Efficiency::Liquid(e) => {
                    x += e * (stage.x - x);
                    y = line.at(x);
                }
                Efficiency::Vapor(e) => {
                    y += e * (equilibrium.value_at(stage.x)? - y);
                    x = line.inverse(y)?;
                }
            }
            stage_count = stage.index;
            stages.push(StageRecord {
                index: stage.index,
                kind: StageKind::Real,
                x,
                y,
                section: stage.section,
            });

            if x <= target_x {
                debug!(stages = stage_count, x, "real trajectory reached target");
                return Ok(StageSequence {
                    stages,
                    stage_count,
                    terminal_x: x,
                    converged: true,
                });
            }
            if !(-settings.bound_slack..=1.0 + settings.bound_slack).contains(&x) {
                return Err(Error::PhysicalBoundViolation {
                    stage: stage.index,
                    quantity: "x_real",
                    value: x,
                });
            }
        }

        warn!(
            max_stages = settings.max_stages,
            x,
            target_x,
            efficiency = self.efficiency.value(),
            "real trajectory hit its stage cap before reaching the target"
        );
        Ok(StageSequence {
            stages,
            stage_count,
            terminal_x: x,
            converged: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use stagewise_core::{
        FeedLine, SectionedLines,
        equilibrium::{Extrapolation, Interpolation},
    };

    use crate::{Discipline, StageStepper};

    fn column() -> (EquilibriumRelation, LineSet) {
        let x: Vec<f64> = (0..=20).map(|i| f64::from(i) / 20.0).collect();
        let y = x.iter().map(|x| 2.5 * x / (1.0 + 1.5 * x)).collect();
        let equilibrium =
            EquilibriumRelation::tabulated(x, y, Interpolation::Linear, Extrapolation::Clamp)
                .unwrap();
        let lines = LineSet::Sectioned(
            SectionedLines::from_reflux(3.0, 0.9, 0.05, FeedLine::from_quality(1.0, 0.45))
                .unwrap(),
        );
        (equilibrium, lines)
    }

    fn settings() -> StepSettings {
        StepSettings {
            max_stages: 2000,
            tolerance: 1e-6,
            ..StepSettings::default()
        }
    }

    #[test]
    fn selection_prefers_sub_unit_vapor_efficiency() {
        assert_eq!(
            Efficiency::select(Some(0.7), Some(0.6)).unwrap(),
            Some(Efficiency::Vapor(0.6))
        );
        assert_eq!(
            Efficiency::select(Some(0.7), Some(1.0)).unwrap(),
            Some(Efficiency::Liquid(0.7))
        );
        assert_eq!(Efficiency::select(None, Some(1.0)).unwrap(), None);
        assert!(Efficiency::select(Some(1.2), None).is_err());
        assert!(Efficiency::vapor(0.0).is_err());
    }

    #[test]
    fn out_of_range_vapor_efficiency_is_not_ignored() {
        for vapor in [5.0, f64::NAN, f64::INFINITY, -0.5] {
            assert!(
                matches!(
                    Efficiency::select(Some(0.7), Some(vapor)),
                    Err(Error::InvalidParameter {
                        name: "vapor_efficiency",
                        ..
                    })
                ),
                "vapor {vapor}"
            );
        }
    }

    #[test]
    fn unit_liquid_efficiency_reproduces_the_ideal_run() {
        let (equilibrium, lines) = column();
        let stepper =
            StageStepper::new(&equilibrium, &lines, Discipline::VerticalFirst, settings())
                .unwrap();
        let ideal = stepper.step((0.9, 0.9), 0.05).unwrap();

        let real = EfficiencyTracker::new(Efficiency::Liquid(1.0))
            .apply(
                stepper.walk((0.9, 0.9)),
                &equilibrium,
                &lines,
                (0.9, 0.9),
                0.05,
                &settings(),
            )
            .unwrap();

        assert!(real.converged);
        assert_eq!(real.stage_count, ideal.stage_count);
        assert_relative_eq!(real.terminal_x, ideal.terminal_x, epsilon = 1e-12);
    }

    #[test]
    fn partial_efficiency_needs_more_stages() {
        let (equilibrium, lines) = column();
        let stepper =
            StageStepper::new(&equilibrium, &lines, Discipline::VerticalFirst, settings())
                .unwrap();
        let ideal = stepper.step((0.9, 0.9), 0.05).unwrap();

        for efficiency in [Efficiency::Liquid(0.6), Efficiency::Vapor(0.6)] {
            let real = EfficiencyTracker::new(efficiency)
                .apply(
                    stepper.walk((0.9, 0.9)),
                    &equilibrium,
                    &lines,
                    (0.9, 0.9),
                    0.05,
                    &settings(),
                )
                .unwrap();

            assert!(real.converged, "{efficiency:?} should reach the bottoms");
            assert!(real.stage_count > ideal.stage_count);
            assert!(real.terminal_x <= 0.05);
        }
    }

    #[test]
    fn liquid_steps_stay_between_previous_and_ideal() {
        let (equilibrium, lines) = column();
        let stepper =
            StageStepper::new(&equilibrium, &lines, Discipline::VerticalFirst, settings())
                .unwrap();
        let ideal: Vec<Stage> = stepper
            .walk((0.9, 0.9))
            .take(40)
            .collect::<Result<_, _>>()
            .unwrap();

        let real = EfficiencyTracker::new(Efficiency::Liquid(0.5))
            .apply(
                ideal.iter().copied().map(Ok),
                &equilibrium,
                &lines,
                (0.9, 0.9),
                0.05,
                &settings(),
            )
            .unwrap();

        let mut previous = 0.9;
        for (record, stage) in real.stages[1..].iter().zip(&ideal) {
            assert!(record.x < previous);
            assert!(record.x > stage.x);
            assert_relative_eq!(record.x, previous + 0.5 * (stage.x - previous), epsilon = 1e-12);
            previous = record.x;
        }
    }

    #[test]
    fn tiny_efficiency_stops_at_the_cap() {
        let (equilibrium, lines) = column();
        let stepper =
            StageStepper::new(&equilibrium, &lines, Discipline::VerticalFirst, settings())
                .unwrap();
        let capped = StepSettings {
            max_stages: 25,
            ..settings()
        };

        let real = EfficiencyTracker::new(Efficiency::Liquid(0.01))
            .apply(
                stepper.walk((0.9, 0.9)),
                &equilibrium,
                &lines,
                (0.9, 0.9),
                0.05,
                &capped,
            )
            .unwrap();

        assert!(!real.converged);
        assert_eq!(real.stage_count, 25);
    }
}
