//! Phase-equilibrium relations.
//!
//! An [`EquilibriumRelation`] maps a liquid (or solvent-phase) composition to
//! the gas composition in equilibrium with it, and back. The base relation is
//! either a linear law or tabulated data; an ordered list of
//! [`Perturbation`]s may be layered on top and is applied at evaluation time.

mod error;
mod extrapolation;
mod perturbation;
mod spline;
mod table;

pub use error::{Axis, EquilibriumError};
pub use extrapolation::Extrapolation;
pub use perturbation::Perturbation;
pub use table::{Interpolation, Table};

use stagewise_solvers::bisection;

/// The unperturbed relation.
#[derive(Debug, Clone)]
pub enum BaseRelation {
    /// `y = slope·x`, as for a dilute solute obeying Henry's law.
    Linear { slope: f64 },
    /// Interpolated equilibrium data.
    Tabulated(Table),
}

/// A base relation plus ordered perturbations.
#[derive(Debug, Clone)]
pub struct EquilibriumRelation {
    base: BaseRelation,
    perturbations: Vec<Perturbation>,
}

impl EquilibriumRelation {
    /// A linear law `y = slope·x`.
    ///
    /// # Errors
    ///
    /// Returns [`EquilibriumError::NonPositiveSlope`] unless the slope is
    /// finite and positive.
    pub fn linear(slope: f64) -> Result<Self, EquilibriumError> {
        if !slope.is_finite() || slope <= 0.0 {
            return Err(EquilibriumError::NonPositiveSlope(slope));
        }
        Ok(Self {
            base: BaseRelation::Linear { slope },
            perturbations: Vec::new(),
        })
    }

    /// A relation interpolated from `(x, y)` breakpoints.
    ///
    /// # Errors
    ///
    /// See [`Table::new`].
    pub fn tabulated(
        x: Vec<f64>,
        y: Vec<f64>,
        interpolation: Interpolation,
        extrapolation: Extrapolation,
    ) -> Result<Self, EquilibriumError> {
        Ok(Self {
            base: BaseRelation::Tabulated(Table::new(x, y, interpolation, extrapolation)?),
            perturbations: Vec::new(),
        })
    }

    /// Appends a perturbation, applied after any already present.
    ///
    /// # Errors
    ///
    /// Returns [`EquilibriumError::InvalidPerturbation`] if its parameters are
    /// out of range.
    pub fn with_perturbation(mut self, perturbation: Perturbation) -> Result<Self, EquilibriumError> {
        perturbation.validate()?;
        self.perturbations.push(perturbation);
        Ok(self)
    }

    #[must_use]
    pub fn base(&self) -> &BaseRelation {
        &self.base
    }

    #[must_use]
    pub fn perturbations(&self) -> &[Perturbation] {
        &self.perturbations
    }

    /// The slope of an unperturbed linear law.
    #[must_use]
    pub fn linear_slope(&self) -> Option<f64> {
        match self.base {
            BaseRelation::Linear { slope } if self.perturbations.is_empty() => Some(slope),
            _ => None,
        }
    }

    /// The x-range over which evaluation is allowed.
    ///
    /// A linear law accepts any non-negative composition. A table that
    /// rejects extrapolation is limited to its breakpoints.
    #[must_use]
    pub fn domain(&self) -> [f64; 2] {
        match &self.base {
            BaseRelation::Linear { .. } => [0.0, f64::INFINITY],
            BaseRelation::Tabulated(table) => match table.extrapolation() {
                Extrapolation::Reject => table.range(),
                Extrapolation::Clamp | Extrapolation::Extend => {
                    [f64::NEG_INFINITY, f64::INFINITY]
                }
            },
        }
    }

    /// The equilibrium gas composition at liquid composition `x`.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` is outside the domain or the value is not
    /// finite.
    pub fn value_at(&self, x: f64) -> Result<f64, EquilibriumError> {
        let base = match &self.base {
            BaseRelation::Linear { slope } => slope * x,
            BaseRelation::Tabulated(table) => table.value_at(x)?,
        };
        let y = self
            .perturbations
            .iter()
            .fold(base, |y, perturbation| perturbation.apply(x, y));

        if y.is_finite() {
            Ok(y)
        } else {
            Err(EquilibriumError::NonFiniteValue { x })
        }
    }

    /// The liquid composition in equilibrium with gas composition `y`.
    ///
    /// Unperturbed relations invert in closed form or over the swapped table.
    /// Perturbed relations are inverted numerically over the part of the
    /// domain inside `[0, 1]`, so that `value_at(inverse_at(y)) == y` holds
    /// wherever `y` is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if `y` is out of range and extrapolation is rejected,
    /// or if no inverse can be bracketed.
    pub fn inverse_at(&self, y: f64) -> Result<f64, EquilibriumError> {
        if self.perturbations.is_empty() {
            return match &self.base {
                BaseRelation::Linear { slope } => Ok(y / slope),
                BaseRelation::Tabulated(table) => table.inverse_at(y),
            };
        }
        self.solve_inverse(y)
    }

    fn solve_inverse(&self, y: f64) -> Result<f64, EquilibriumError> {
        let [lo, hi] = self.domain();
        let (lower, upper) = (lo.max(0.0), hi.min(1.0));
        let (y_lower, y_upper) = (self.value_at(lower)?, self.value_at(upper)?);

        let rejects = matches!(
            &self.base,
            BaseRelation::Tabulated(table) if table.extrapolation() == Extrapolation::Reject
        );
        if y <= y_lower || y >= y_upper {
            if rejects && !(y_lower..=y_upper).contains(&y) {
                return Err(EquilibriumError::OutOfRange {
                    axis: Axis::Y,
                    value: y,
                    lower: y_lower,
                    upper: y_upper,
                });
            }
            return Ok(if y <= y_lower { lower } else { upper });
        }

        bisection::solve_unobserved(
            |x| self.value_at(x).map(|value| value - y),
            [lower, upper],
            &bisection::Config::default(),
        )
        .map(|solution| solution.x)
        .map_err(|err| match err {
            bisection::Error::Function { source, .. } => source,
            _ => EquilibriumError::NoInverse { y, lower, upper },
        })
    }
}
