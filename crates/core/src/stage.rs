use serde::Serialize;
use thiserror::Error;

use crate::line::Section;

/// The projection that produced a [`StageRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// The starting point of a run.
    Start,
    /// Projection onto the equilibrium relation at constant y.
    Horizontal,
    /// Projection onto an operating line at constant x.
    Vertical,
    /// An ideal stage summarised as a single point.
    Theoretical,
    /// A stage corrected for efficiency.
    Real,
}

/// One point of a stage staircase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageRecord {
    pub index: usize,
    pub kind: StageKind,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
}

/// The ordered output of a stepping run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSequence {
    pub stages: Vec<StageRecord>,
    pub stage_count: usize,
    pub terminal_x: f64,
    pub converged: bool,
}

/// A run that hit its stage cap before reaching its target.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("stepping stopped after {stage_count} stages at x = {terminal_x} without reaching the target")]
pub struct NotConverged {
    pub stage_count: usize,
    pub terminal_x: f64,
}

impl StageSequence {
    /// Returns the sequence if it converged.
    ///
    /// # Errors
    ///
    /// Returns [`NotConverged`] if the run stopped at its stage cap.
    pub fn require_converged(self) -> Result<Self, NotConverged> {
        if self.converged {
            Ok(self)
        } else {
            Err(NotConverged {
                stage_count: self.stage_count,
                terminal_x: self.terminal_x,
            })
        }
    }

    /// Returns the last record of the run, if any.
    #[must_use]
    pub fn last(&self) -> Option<&StageRecord> {
        self.stages.last()
    }

    /// Collapses a staircase into one [`StageKind::Theoretical`] point per
    /// stage, located at the end of each stage's operating-line projection.
    #[must_use]
    pub fn theoretical(&self) -> Vec<StageRecord> {
        self.stages
            .iter()
            .filter(|record| matches!(record.kind, StageKind::Vertical | StageKind::Real))
            .map(|record| StageRecord {
                kind: StageKind::Theoretical,
                ..*record
            })
            .collect()
    }
}
