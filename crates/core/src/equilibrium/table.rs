use ndarray::Array1;
use ninterp::prelude::{Interp1DOwned, Interpolator};
use serde::Deserialize;

use super::{Axis, EquilibriumError, Extrapolation, spline::NaturalSpline};

/// How values between breakpoints are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    NaturalCubicSpline,
}

#[derive(Debug, Clone)]
enum Curve {
    Linear(Interp1DOwned<f64, ninterp::strategy::Linear>),
    Spline(NaturalSpline),
}

impl Curve {
    fn new(
        x: &[f64],
        y: &[f64],
        interpolation: Interpolation,
        extrapolation: Extrapolation,
    ) -> Result<Self, EquilibriumError> {
        Ok(match interpolation {
            Interpolation::Linear => Self::Linear(Interp1DOwned::new(
                Array1::from(x.to_vec()),
                Array1::from(y.to_vec()),
                ninterp::strategy::Linear,
                extrapolation.into(),
            )?),
            Interpolation::NaturalCubicSpline => Self::Spline(NaturalSpline::new(x, y)),
        })
    }

    fn eval(&self, t: f64, extrapolation: Extrapolation) -> Result<f64, EquilibriumError> {
        match self {
            Self::Linear(interp) => Ok(interp.interpolate(&[t])?),
            Self::Spline(spline) => {
                let t = match extrapolation {
                    Extrapolation::Clamp => t.clamp(spline.first(), spline.last()),
                    Extrapolation::Reject | Extrapolation::Extend => t,
                };
                Ok(spline.eval(t))
            }
        }
    }
}

/// Tabulated equilibrium data with forward and inverse interpolants.
///
/// Both columns must be strictly increasing so the inverse interpolant,
/// built over the swapped table, is well defined.
#[derive(Debug, Clone)]
pub struct Table {
    x: Vec<f64>,
    y: Vec<f64>,
    interpolation: Interpolation,
    extrapolation: Extrapolation,
    forward: Curve,
    inverse: Curve,
}

impl Table {
    /// Validates the breakpoints and builds both interpolants.
    ///
    /// # Errors
    ///
    /// Returns an error if the columns differ in length, hold fewer than two
    /// points, contain non-finite values, or are not strictly increasing.
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
        interpolation: Interpolation,
        extrapolation: Extrapolation,
    ) -> Result<Self, EquilibriumError> {
        if x.len() != y.len() {
            return Err(EquilibriumError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(EquilibriumError::TooFewPoints(x.len()));
        }
        check_increasing(&x, Axis::X)?;
        check_increasing(&y, Axis::Y)?;

        let forward = Curve::new(&x, &y, interpolation, extrapolation)?;
        let inverse = Curve::new(&y, &x, interpolation, extrapolation)?;

        Ok(Self {
            x,
            y,
            interpolation,
            extrapolation,
            forward,
            inverse,
        })
    }

    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    #[must_use]
    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// The x-range covered by the breakpoints.
    #[must_use]
    pub fn range(&self) -> [f64; 2] {
        [self.x[0], self.x[self.x.len() - 1]]
    }

    /// Interpolates y at `x`.
    ///
    /// # Errors
    ///
    /// Returns [`EquilibriumError::OutOfRange`] if `x` is outside the table
    /// and extrapolation is rejected.
    pub fn value_at(&self, x: f64) -> Result<f64, EquilibriumError> {
        self.check(x, Axis::X, &self.x)?;
        self.forward.eval(x, self.extrapolation)
    }

    /// Interpolates x at `y` over the swapped table.
    ///
    /// # Errors
    ///
    /// Returns [`EquilibriumError::OutOfRange`] if `y` is outside the table
    /// and extrapolation is rejected.
    pub fn inverse_at(&self, y: f64) -> Result<f64, EquilibriumError> {
        self.check(y, Axis::Y, &self.y)?;
        self.inverse.eval(y, self.extrapolation)
    }

    fn check(&self, value: f64, axis: Axis, column: &[f64]) -> Result<(), EquilibriumError> {
        let lower = column[0];
        let upper = column[column.len() - 1];
        if self.extrapolation == Extrapolation::Reject && !(lower..=upper).contains(&value) {
            return Err(EquilibriumError::OutOfRange {
                axis,
                value,
                lower,
                upper,
            });
        }
        Ok(())
    }
}

fn check_increasing(values: &[f64], axis: Axis) -> Result<(), EquilibriumError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(EquilibriumError::NonFiniteTable { axis });
    }
    match values.windows(2).position(|pair| pair[1] <= pair[0]) {
        Some(index) => Err(EquilibriumError::NonMonotonic {
            axis,
            index: index + 1,
        }),
        None => Ok(()),
    }
}
