//! The stage staircase.
//!
//! A run starts from a terminal point of the column and alternates two
//! projections: horizontally onto the equilibrium relation, then vertically
//! onto the active operating line. Each pair is one theoretical stage.

use stagewise_core::{
    EquilibriumRelation, LineSet, Section, StageKind, StageRecord, StageSequence,
};
use tracing::{debug, warn};

use crate::Error;

/// Direction of progress through the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// Gas composition rises from stage to stage and the run ends once it
    /// reaches the target (absorbers, stepped from the lean end).
    HorizontalFirst,
    /// Liquid composition falls from stage to stage and the run ends once it
    /// reaches the target (distillation, stepped from the distillate).
    VerticalFirst,
}

/// Numerical settings for a stepping run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSettings {
    /// Stage cap; reaching it ends the run unconverged.
    pub max_stages: usize,
    /// Tolerance on the termination and no-backtrack tests.
    pub tolerance: f64,
    /// How far a composition may exceed its physical bound before the run
    /// fails.
    pub bound_slack: f64,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            max_stages: 300,
            tolerance: 1e-12,
            bound_slack: 1e-6,
        }
    }
}

/// One theoretical stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    /// 1-based stage number.
    pub index: usize,
    /// Liquid composition leaving the stage, in equilibrium with `y_in`.
    pub x: f64,
    /// Gas composition the horizontal projection started from.
    pub y_in: f64,
    /// Gas composition on the operating line at `x`.
    pub y_out: f64,
    /// Column section, for sectioned line sets.
    pub section: Option<Section>,
}

/// Walks the staircase for one equilibrium relation and line set.
///
/// The stepper holds no state between runs: the same inputs always give the
/// same sequence.
#[derive(Debug, Clone, Copy)]
pub struct StageStepper<'a> {
    equilibrium: &'a EquilibriumRelation,
    lines: &'a LineSet,
    discipline: Discipline,
    settings: StepSettings,
}

impl<'a> StageStepper<'a> {
    /// Creates a stepper.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the tolerances are negative or
    /// non-finite, or if the stage cap is zero.
    pub fn new(
        equilibrium: &'a EquilibriumRelation,
        lines: &'a LineSet,
        discipline: Discipline,
        settings: StepSettings,
    ) -> Result<Self, Error> {
        if settings.max_stages == 0 {
            return Err(Error::InvalidParameter {
                name: "max_stages",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        for (name, value) in [
            ("tolerance", settings.tolerance),
            ("bound_slack", settings.bound_slack),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and non-negative",
                });
            }
        }

        Ok(Self {
            equilibrium,
            lines,
            discipline,
            settings,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &StepSettings {
        &self.settings
    }

    #[must_use]
    pub fn lines(&self) -> &'a LineSet {
        self.lines
    }

    #[must_use]
    pub fn equilibrium(&self) -> &'a EquilibriumRelation {
        self.equilibrium
    }

    /// Returns a copy of this stepper with a different stage cap.
    #[must_use]
    pub fn with_max_stages(mut self, max_stages: usize) -> Self {
        self.settings.max_stages = max_stages.max(1);
        self
    }

    /// An unbounded iterator over stages starting at `start`.
    ///
    /// The walk applies the clamp and no-backtrack guards but never
    /// terminates on its own; [`StageStepper::step`] adds the target test,
    /// the range guard and the stage cap.
    #[must_use]
    pub fn walk(&self, start: (f64, f64)) -> StageWalk<'a> {
        StageWalk {
            stepper: *self,
            x: start.0,
            y: start.1,
            index: 0,
            section: None,
            failed: false,
        }
    }

    /// Steps from `start` until the target composition is reached.
    ///
    /// The target is a gas composition for [`Discipline::HorizontalFirst`]
    /// and a liquid composition for [`Discipline::VerticalFirst`]. Reaching
    /// the stage cap is not an error: the result reports
    /// `converged = false`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterInconsistency`] if a stage moves backwards,
    /// [`Error::PhysicalBoundViolation`] if a composition leaves its range,
    /// and propagates equilibrium evaluation errors.
    pub fn step(&self, start: (f64, f64), target: f64) -> Result<StageSequence, Error> {
        let sequence = self.run(start, target)?;
        if !sequence.converged {
            warn!(
                max_stages = self.settings.max_stages,
                terminal_x = sequence.terminal_x,
                target,
                "staircase hit its stage cap before reaching the target"
            );
        }
        Ok(sequence)
    }

    /// Like [`StageStepper::step`], for runs whose cap is a trial stage count.
    ///
    /// Falling short of the target is the expected answer for most trials, so
    /// it is logged at debug level only.
    ///
    /// # Errors
    ///
    /// See [`StageStepper::step`].
    pub fn trial(&self, start: (f64, f64), target: f64) -> Result<StageSequence, Error> {
        let sequence = self.run(start, target)?;
        if !sequence.converged {
            debug!(
                stages = self.settings.max_stages,
                terminal_x = sequence.terminal_x,
                target,
                "trial stage count falls short of the target"
            );
        }
        Ok(sequence)
    }

    fn run(&self, start: (f64, f64), target: f64) -> Result<StageSequence, Error> {
        let mut stages = vec![StageRecord {
            index: 0,
            kind: StageKind::Start,
            x: start.0,
            y: start.1,
            section: None,
        }];
        let mut terminal_x = start.0;
        let mut stage_count = 0;

        for stage in self.walk(start).take(self.settings.max_stages) {
            let stage = stage?;
            stages.push(StageRecord {
                index: stage.index,
                kind: StageKind::Horizontal,
                x: stage.x,
                y: stage.y_in,
                section: stage.section,
            });
            stages.push(StageRecord {
                index: stage.index,
                kind: StageKind::Vertical,
                x: stage.x,
                y: stage.y_out,
                section: stage.section,
            });
            stage_count = stage.index;
            terminal_x = stage.x;

            if self.reached(&stage, target) {
                debug!(stages = stage_count, terminal_x, "staircase reached target");
                return Ok(StageSequence {
                    stages,
                    stage_count,
                    terminal_x,
                    converged: true,
                });
            }
            self.check_bounds(&stage)?;
        }

        Ok(StageSequence {
            stages,
            stage_count,
            terminal_x,
            converged: false,
        })
    }

    fn reached(&self, stage: &Stage, target: f64) -> bool {
        match self.discipline {
            Discipline::HorizontalFirst => stage.y_out >= target - self.settings.tolerance,
            Discipline::VerticalFirst => stage.x <= target + self.settings.tolerance,
        }
    }

    fn check_bounds(&self, stage: &Stage) -> Result<(), Error> {
        let upper = 1.0 + self.settings.bound_slack;
        let lower = -self.settings.bound_slack;
        if stage.x > upper {
            return Err(Error::PhysicalBoundViolation {
                stage: stage.index,
                quantity: "x",
                value: stage.x,
            });
        }
        if self.discipline == Discipline::VerticalFirst && !(lower..=upper).contains(&stage.y_out)
        {
            return Err(Error::PhysicalBoundViolation {
                stage: stage.index,
                quantity: "y",
                value: stage.y_out,
            });
        }
        Ok(())
    }
}

/// Iterator over the stages of a staircase, see [`StageStepper::walk`].
///
/// After yielding an error the walk is exhausted.
#[derive(Debug, Clone)]
pub struct StageWalk<'a> {
    stepper: StageStepper<'a>,
    x: f64,
    y: f64,
    index: usize,
    section: Option<Section>,
    failed: bool,
}

impl StageWalk<'_> {
    fn advance(&mut self) -> Result<Stage, Error> {
        let StageStepper {
            equilibrium,
            lines,
            discipline,
            settings,
        } = self.stepper;
        self.index += 1;

        let x = equilibrium.inverse_at(self.y)?.max(0.0);
        let backtracked = match discipline {
            Discipline::HorizontalFirst => x + settings.tolerance < self.x,
            Discipline::VerticalFirst => x > self.x + settings.tolerance,
        };
        if backtracked {
            return Err(Error::ParameterInconsistency {
                stage: self.index,
                previous: self.x,
                projected: x,
            });
        }

        let section = lines.section_for(x, self.section);
        let mut y_out = lines.line(section).at(x);
        if discipline == Discipline::VerticalFirst {
            y_out = y_out.max(0.0);
        }

        let stage = Stage {
            index: self.index,
            x,
            y_in: self.y,
            y_out,
            section,
        };
        self.x = x;
        self.y = y_out;
        self.section = section;
        Ok(stage)
    }
}

impl Iterator for StageWalk<'_> {
    type Item = Result<Stage, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let stage = self.advance();
        self.failed = stage.is_err();
        Some(stage)
    }
}
