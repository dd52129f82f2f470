//! Shared fixtures for the column integration tests.

#![allow(dead_code)]

use stagewise_column::{absorption::AbsorptionSpec, distillation::DistillationSpec, distillation::Reflux};
use stagewise_core::{
    EquilibriumRelation,
    equilibrium::{Extrapolation, Interpolation},
};

/// Vapour compositions of a benzene-toluene-like system on 50 evenly spaced
/// liquid compositions from 0 to 0.98.
pub const VLE_Y: [f64; 50] = [
    0.000, 0.135, 0.235, 0.311, 0.372, 0.421, 0.463, 0.499, 0.529, 0.556, 0.580, 0.602, 0.622,
    0.640, 0.656, 0.672, 0.686, 0.700, 0.713, 0.725, 0.737, 0.748, 0.759, 0.769, 0.779, 0.789,
    0.799, 0.808, 0.817, 0.826, 0.835, 0.844, 0.853, 0.861, 0.870, 0.878, 0.886, 0.895, 0.903,
    0.911, 0.919, 0.927, 0.936, 0.944, 0.952, 0.960, 0.968, 0.976, 0.984, 0.992,
];

pub fn vle_x() -> Vec<f64> {
    (0..VLE_Y.len())
        .map(|i| 0.98 * f64::from(u32::try_from(i).unwrap()) / 49.0)
        .collect()
}

/// The tabulated relation, interpolated linearly and clamped at its ends.
pub fn vle() -> EquilibriumRelation {
    EquilibriumRelation::tabulated(
        vle_x(),
        VLE_Y.to_vec(),
        Interpolation::Linear,
        Extrapolation::Clamp,
    )
    .unwrap()
}

/// `Y = 0.4·X`.
pub fn henry() -> EquilibriumRelation {
    EquilibriumRelation::linear(0.4).unwrap()
}

pub fn absorber() -> AbsorptionSpec {
    AbsorptionSpec {
        y_in: 0.04,
        y_out: 0.002,
        x_in: 0.002,
        gas_rate: 100.0,
        solvent_rate: None,
        solvent_factor: 1.5,
        hetp: 0.5,
        max_stages: 300,
    }
}

pub fn column() -> DistillationSpec {
    DistillationSpec {
        x_feed: 0.48,
        q: 1.0,
        x_distillate: 0.90,
        x_bottoms: 0.01,
        reflux: Reflux::Auto { factor: 1.5 },
        liquid_efficiency: None,
        vapor_efficiency: None,
        max_stages: 2000,
        tolerance: 1e-6,
    }
}
