//! McCabe–Thiele stage calculations for absorbers and distillation columns.
//!
//! The engine is made of four pieces that share the value objects from
//! `stagewise-core`:
//!
//! - [`StageStepper`] walks the staircase between an equilibrium relation and
//!   the operating line(s).
//! - [`PinchSolver`] finds the pinch point and the minimum driving force
//!   (minimum solvent rate or minimum reflux).
//! - [`search`] finds the smallest stage count that meets a target, or the
//!   reflux ratio that yields a given stage count.
//! - [`EfficiencyTracker`] derives a Murphree-corrected trajectory from the
//!   ideal one.
//!
//! [`absorption::AbsorptionColumn`] and [`distillation::DistillationColumn`]
//! wire them together for the two column types.

pub mod absorption;
pub mod distillation;
pub mod economics;
pub mod search;

mod efficiency;
mod error;
mod pinch;
mod stepper;

pub use efficiency::{Efficiency, EfficiencyTracker};
pub use error::{Error, Trial};
pub use pinch::PinchSolver;
pub use stepper::{Discipline, Stage, StageStepper, StageWalk, StepSettings};
