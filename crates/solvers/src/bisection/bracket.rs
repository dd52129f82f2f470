/// An interval known to contain a sign change, with the sign on its left end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    left: f64,
    right: f64,
    left_sign: Sign,
}

impl Bracket {
    pub(super) fn new(bounds: Bounds, left_sign: Sign) -> Self {
        Self {
            left: bounds.left,
            right: bounds.right,
            left_sign,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> [f64; 2] {
        [self.left, self.right]
    }

    #[must_use]
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.left + self.right)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Width test `right − left <= abs + rel·|mid|`.
    #[must_use]
    pub fn is_x_converged(&self, x_abs_tol: f64, x_rel_tol: f64) -> bool {
        self.width() <= x_abs_tol + x_rel_tol * self.midpoint().abs()
    }

    /// Replaces whichever end shares `sign`, keeping the sign change inside.
    pub(super) fn shrink(&mut self, x: f64, sign: Sign) {
        if self.left_sign == sign {
            self.left = x;
        } else {
            self.right = x;
        }
    }
}

/// Residual sign; zero counts as positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    #[must_use]
    pub fn of(value: f64) -> Self {
        if value >= 0.0 {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }
}

/// Finite, ordered, distinct endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Bounds {
    pub(super) left: f64,
    pub(super) right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum BoundsError {
    NonFinite(f64),
    ZeroWidth(f64),
}

impl Bounds {
    pub(super) fn new(bracket: [f64; 2]) -> Result<Self, BoundsError> {
        let [left, right] = bracket;

        if !left.is_finite() {
            return Err(BoundsError::NonFinite(left));
        }
        if !right.is_finite() {
            return Err(BoundsError::NonFinite(right));
        }

        #[allow(clippy::float_cmp)]
        if left == right {
            return Err(BoundsError::ZeroWidth(left));
        }

        if left < right {
            Ok(Self { left, right })
        } else {
            Ok(Self {
                left: right,
                right: left,
            })
        }
    }
}
