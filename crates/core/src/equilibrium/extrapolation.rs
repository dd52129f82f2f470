use serde::Deserialize;

/// What a tabulated relation does outside its breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolation {
    /// Return an error.
    Reject,
    /// Hold the end value.
    #[default]
    Clamp,
    /// Continue the end segment.
    Extend,
}

impl From<Extrapolation> for ninterp::interpolator::Extrapolate<f64> {
    fn from(value: Extrapolation) -> Self {
        match value {
            Extrapolation::Reject => Self::Error,
            Extrapolation::Clamp => Self::Clamp,
            Extrapolation::Extend => Self::Enable,
        }
    }
}
