/// The inverse golden ratio: 1/φ = φ - 1.
const INV_PHI: f64 = 0.618_033_988_749_895;

/// Golden section search bracket.
///
/// Maintains the outer interval [left, right] and two interior points
/// positioned according to the golden ratio.
#[derive(Debug, Clone, Copy)]
pub(super) struct GoldenBracket {
    left: f64,
    right: f64,
    /// Inner left point at `left + (1 - φ⁻¹) * width`.
    pub(super) inner_left: f64,
    /// Inner right point at `left + φ⁻¹ * width`.
    pub(super) inner_right: f64,
}

impl GoldenBracket {
    /// Creates a bracket from ordered bounds.
    pub(super) fn new(left: f64, right: f64) -> Self {
        let width = right - left;
        Self {
            left,
            right,
            inner_left: left + (1.0 - INV_PHI) * width,
            inner_right: left + INV_PHI * width,
        }
    }

    fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Shrinks to `[left, inner_right]`; the old `inner_left` becomes the new
    /// `inner_right`.
    pub(super) fn shrink_right(&mut self) {
        self.right = self.inner_right;
        self.inner_right = self.inner_left;
        self.inner_left = self.left + (1.0 - INV_PHI) * self.width();
    }

    /// Shrinks to `[inner_left, right]`; the old `inner_right` becomes the new
    /// `inner_left`.
    pub(super) fn shrink_left(&mut self) {
        self.left = self.inner_left;
        self.inner_left = self.inner_right;
        self.inner_right = self.left + INV_PHI * self.width();
    }

    /// Returns true once the interior points are within tolerance.
    pub(super) fn is_converged(&self, x_abs_tol: f64, x_rel_tol: f64) -> bool {
        let gap = (self.inner_right - self.inner_left).abs();
        let mid = 0.5 * (self.inner_left + self.inner_right);
        gap <= x_abs_tol + x_rel_tol * mid.abs()
    }
}
