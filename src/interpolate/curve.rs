/// Piecewise linear function through a set of samples.
///
/// Outside the sampled range the function continues along the first (or last) segment.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolant {
    /// Returns None if there are less than 2 samples, or if the x values are not finite and
    /// strictly ascending.
    pub fn new(samples: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = samples.into_iter().unzip();

        let ascending = xs.windows(2).all(|w| w[0] < w[1]);
        let finite = xs.iter().chain(&ys).all(|v| v.is_finite());

        (xs.len() >= 2 && ascending && finite).then_some(Self { xs, ys })
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        // largest i such that xs[i] <= x, clamped to a valid segment
        let i = self
            .xs
            .partition_point(|&v| v <= x)
            .saturating_sub(1)
            .min(n - 2);

        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);

        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}
