use serde::{Deserialize, Serialize};

use super::EquilibriumError;

fn default_width() -> f64 {
    0.05
}

/// A modification applied on top of a base equilibrium relation.
///
/// Perturbations run in order on the base value, and each result is clipped
/// to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Perturbation {
    /// Gaussian bump of height `strength` centred on `centre`.
    ///
    /// A negative strength pulls the curve down near an azeotrope, a
    /// positive one pushes it up.
    Azeotropic {
        centre: f64,
        strength: f64,
        #[serde(default = "default_width")]
        width: f64,
    },
    /// Uniform scaling by `1 + (alpha_factor − 1)·solvent_ratio`, modelling
    /// the relative-volatility boost from an entrainer.
    Extractive { solvent_ratio: f64, alpha_factor: f64 },
}

impl Perturbation {
    pub(super) fn validate(&self) -> Result<(), EquilibriumError> {
        match *self {
            Self::Azeotropic {
                centre,
                strength,
                width,
            } => {
                if !centre.is_finite() || !strength.is_finite() {
                    return Err(EquilibriumError::InvalidPerturbation(
                        "azeotrope centre and strength must be finite",
                    ));
                }
                if !width.is_finite() || width <= 0.0 {
                    return Err(EquilibriumError::InvalidPerturbation(
                        "azeotrope width must be finite and positive",
                    ));
                }
            }
            Self::Extractive {
                solvent_ratio,
                alpha_factor,
            } => {
                if !solvent_ratio.is_finite() || solvent_ratio < 0.0 {
                    return Err(EquilibriumError::InvalidPerturbation(
                        "solvent ratio must be finite and non-negative",
                    ));
                }
                if !alpha_factor.is_finite() || alpha_factor <= 0.0 {
                    return Err(EquilibriumError::InvalidPerturbation(
                        "alpha factor must be finite and positive",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Applies the perturbation to `y`, the current value at `x`.
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> f64 {
        let perturbed = match *self {
            Self::Azeotropic {
                centre,
                strength,
                width,
            } => y + strength * (-(x - centre).powi(2) / (2.0 * width * width)).exp(),
            Self::Extractive {
                solvent_ratio,
                alpha_factor,
            } => y * (1.0 + (alpha_factor - 1.0) * solvent_ratio),
        };
        perturbed.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn azeotropic_bump_peaks_at_centre() {
        let bump = Perturbation::Azeotropic {
            centre: 0.6,
            strength: -0.05,
            width: 0.05,
        };

        assert_relative_eq!(bump.apply(0.6, 0.7), 0.65, epsilon = 1e-12);
        assert_relative_eq!(bump.apply(0.1, 0.3), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn extractive_scaling_is_clipped() {
        let solvent = Perturbation::Extractive {
            solvent_ratio: 0.5,
            alpha_factor: 1.4,
        };

        assert_relative_eq!(solvent.apply(0.3, 0.5), 0.6, epsilon = 1e-12);
        assert_relative_eq!(solvent.apply(0.95, 0.99), 1.0);
    }

    #[test]
    fn rejects_non_positive_width() {
        let bump = Perturbation::Azeotropic {
            centre: 0.6,
            strength: 0.1,
            width: 0.0,
        };
        assert!(bump.validate().is_err());
    }
}
