use ndarray::Array1;

/// A natural cubic spline through ordered knots.
///
/// Second derivatives vanish at both ends. Outside the knots the end
/// segments' cubics are evaluated as-is.
#[derive(Debug, Clone)]
pub(super) struct NaturalSpline {
    x: Array1<f64>,
    y: Array1<f64>,
    second: Array1<f64>,
}

impl NaturalSpline {
    /// Builds the spline; `x` must be strictly increasing with `len ≥ 2`.
    pub(super) fn new(x: &[f64], y: &[f64]) -> Self {
        let n = x.len();
        let x = Array1::from(x.to_vec());
        let y = Array1::from(y.to_vec());
        let mut second = Array1::<f64>::zeros(n);

        if n > 2 {
            let h: Array1<f64> = (0..n - 1).map(|i| x[i + 1] - x[i]).collect();

            // Thomas algorithm over the interior knots.
            let mut upper = Array1::<f64>::zeros(n);
            let mut rhs = Array1::<f64>::zeros(n);
            for i in 1..n - 1 {
                let lower = h[i - 1];
                let diag = 2.0 * (h[i - 1] + h[i]);
                let d = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
                let denom = diag - lower * upper[i - 1];
                upper[i] = h[i] / denom;
                rhs[i] = (d - lower * rhs[i - 1]) / denom;
            }
            for i in (1..n - 1).rev() {
                second[i] = rhs[i] - upper[i] * second[i + 1];
            }
        }

        Self { x, y, second }
    }

    pub(super) fn first(&self) -> f64 {
        self.x[0]
    }

    pub(super) fn last(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// Evaluates the spline at `t`.
    pub(super) fn eval(&self, t: f64) -> f64 {
        let n = self.x.len();
        let i = self
            .x
            .iter()
            .take_while(|&&knot| knot <= t)
            .count()
            .saturating_sub(1)
            .min(n - 2);

        let h = self.x[i + 1] - self.x[i];
        let a = (self.x[i + 1] - t) / h;
        let b = (t - self.x[i]) / h;

        a * self.y[i]
            + b * self.y[i + 1]
            + ((a.powi(3) - a) * self.second[i] + (b.powi(3) - b) * self.second[i + 1]) * h * h
                / 6.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn passes_through_knots() {
        let x = [0.0, 0.2, 0.5, 0.7, 1.0];
        let y = [0.0, 0.4, 0.7, 0.8, 1.0];
        let spline = NaturalSpline::new(&x, &y);

        for (xi, yi) in x.iter().zip(y) {
            assert_relative_eq!(spline.eval(*xi), yi, epsilon = 1e-12);
        }
    }

    #[test]
    fn reproduces_linear_data() {
        let x = [0.0, 0.1, 0.4, 1.0];
        let y = x.map(|v| 0.5 * v + 0.1);
        let spline = NaturalSpline::new(&x, &y);

        assert_relative_eq!(spline.eval(0.25), 0.225, epsilon = 1e-12);
        assert_relative_eq!(spline.eval(1.2), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn natural_end_conditions() {
        let spline = NaturalSpline::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]);

        assert_relative_eq!(spline.second[0], 0.0);
        assert_relative_eq!(spline.second[2], 0.0);
        // Symmetric data: 6·(-1 - 1) / (2·(1 + 1)) = -3.
        assert_relative_eq!(spline.second[1], -3.0);
        assert_relative_eq!(spline.eval(0.5), spline.eval(1.5), epsilon = 1e-12);
    }
}
