//! Running a parsed case.

use serde::Serialize;
use stagewise_column::{
    Error, PinchSolver,
    absorption::{AbsorptionColumn, AbsorptionReport},
    distillation::{DistillationColumn, DistillationReport},
    economics::EconomicSweep,
    search::{RefluxMatch, RefluxSearch},
};
use stagewise_core::StageRecord;
use tracing::{info, warn};

use crate::config::{AbsorptionCase, Case, ConfigError, DistillationCase};

#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Column(#[from] Error),
}

#[derive(Debug, Serialize)]
pub struct DistillationOutput {
    #[serde(flatten)]
    pub column: DistillationReport,
    /// One point per ideal stage, at the end of its operating-line step.
    pub theoretical: Vec<StageRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub economics: Option<EconomicSweep>,
}

/// Outcome of a reflux search; an unreachable target is reported, not fatal.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetOutcome {
    Matched(RefluxMatch),
    Unreachable { stages: usize, message: String },
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Absorption(AbsorptionReport),
    Distillation(DistillationOutput),
}

impl Case {
    /// Builds the equilibrium relation and runs the column.
    ///
    /// # Errors
    ///
    /// Returns a [`CaseError`] if the relation is invalid or the column
    /// calculation fails.
    pub fn run(&self) -> Result<Report, CaseError> {
        match self {
            Self::Absorption(case) => run_absorption(case).map(Report::Absorption),
            Self::Distillation(case) => run_distillation(case).map(Report::Distillation),
        }
    }
}

fn run_absorption(case: &AbsorptionCase) -> Result<AbsorptionReport, CaseError> {
    let equilibrium = case.equilibrium.build().map_err(ConfigError::from)?;
    let report = AbsorptionColumn::new(case.spec, &equilibrium)?
        .with_pinch_solver(PinchSolver::new(case.minimizer.build()))
        .run()?;
    info!(stages = report.stages, "absorption case complete");
    Ok(report)
}

fn run_distillation(case: &DistillationCase) -> Result<DistillationOutput, CaseError> {
    let equilibrium = case.equilibrium.build().map_err(ConfigError::from)?;
    let column = DistillationColumn::new(case.spec, &equilibrium)?
        .with_pinch_solver(PinchSolver::new(case.minimizer.build()));
    let report = column.run()?;

    let target = case
        .target_stages
        .map(|stages| match column.reflux_for_stages(stages, &RefluxSearch::default()) {
            Ok(found) => Ok(TargetOutcome::Matched(found)),
            Err(err @ Error::InfeasibleSearch { .. }) => {
                warn!(stages, %err, "stage target unreachable");
                Ok(TargetOutcome::Unreachable {
                    stages,
                    message: err.to_string(),
                })
            }
            Err(err) => Err(err),
        })
        .transpose()?;

    let economics = case
        .economics
        .map(|weights| column.economic_sweep(&weights))
        .transpose()?;

    info!(
        ideal_stages = report.ideal_stages(),
        achieved = report.achieved,
        "distillation case complete"
    );
    Ok(DistillationOutput {
        theoretical: report.ideal.theoretical(),
        column: report,
        target,
        economics,
    })
}
