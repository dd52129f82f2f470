//! Value objects for staged mass-transfer calculations.
//!
//! This crate holds the immutable pieces a McCabe–Thiele calculation is built
//! from: the [`EquilibriumRelation`] between the two phases, the operating
//! lines in a [`LineSet`], and the [`StageRecord`]s a stepping run produces.
//! The stepping engine itself lives in `stagewise-column`.

pub mod equilibrium;
pub mod line;

mod driving_force;
mod stage;

pub use driving_force::{DrivingForceResult, PinchMethod};
pub use equilibrium::{EquilibriumError, EquilibriumRelation};
pub use line::{FeedLine, LineError, LineSet, OperatingLine, Section, SectionedLines};
pub use stage::{NotConverged, StageKind, StageRecord, StageSequence};
