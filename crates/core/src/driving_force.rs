use serde::Serialize;

/// How a pinch point was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinchMethod {
    /// Read directly off the equilibrium relation, no search performed.
    Direct,
    /// Closed-form expression for a linear equilibrium law.
    ClosedForm,
    /// Bounded minimization of the separation between the two relations.
    Minimized,
    /// Two-pass grid scan of the separation.
    Grid,
}

/// The pinch point and the minimum driving force derived from it.
///
/// `minimum` is a solvent rate (absorption) or a reflux ratio
/// (distillation). An infinite minimum marks an infeasible configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrivingForceResult {
    pub pinch_x: f64,
    pub pinch_y: f64,
    pub minimum: f64,
    pub method: PinchMethod,
}

impl DrivingForceResult {
    /// Returns true if the minimum is finite.
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.minimum.is_finite()
    }
}
