use glam::Vec2;

/// A piecewise-constant 1D distribution over `[0, 1)`.
///
/// Construction normalizes the weights; sampling walks the CDF with a
/// binary search, so a draw costs O(log N).
#[derive(Debug, Clone)]
pub struct Distribution1D {
    function: Vec<f32>,
    cdf: Vec<f32>,
    integral: f32,
}

impl Distribution1D {
    /// Builds the distribution from non-negative weights. All-zero
    /// weights degrade to the uniform distribution so that sampling
    /// stays total.
    #[must_use]
    pub fn new(weights: &[f32]) -> Self {
        assert!(!weights.is_empty(), "distribution needs at least one weight");
        let n = weights.len();
        let mut cdf = Vec::with_capacity(n + 1);
        cdf.push(0.0);
        let mut accum = 0.0_f32;
        for &w in weights {
            debug_assert!(w >= 0.0 && w.is_finite());
            accum += w / n as f32;
            cdf.push(accum);
        }
        let integral = accum;
        if integral == 0.0 {
            for (i, c) in cdf.iter_mut().enumerate() {
                *c = i as f32 / n as f32;
            }
        } else {
            for c in &mut cdf {
                *c /= integral;
            }
        }
        Self {
            function: weights.to_vec(),
            cdf,
            integral,
        }
    }

    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.function.len()
    }

    /// The unnormalized integral of the weights over `[0, 1)`.
    #[inline]
    #[must_use]
    pub fn integral(&self) -> f32 {
        self.integral
    }

    fn offset(&self, u: f32) -> usize {
        // Last cdf entry <= u; partition_point returns the first > u.
        self.cdf
            .partition_point(|&c| c <= u)
            .saturating_sub(1)
            .min(self.count() - 1)
    }

    /// Samples a discrete index. Returns `(index, pdf, remapped_u)`
    /// where `remapped_u` is uniform again and may be reused.
    #[must_use]
    pub fn sample_discrete(&self, u: f32) -> (usize, f32, f32) {
        let index = self.offset(u);
        let lo = self.cdf[index];
        let hi = self.cdf[index + 1];
        let width = hi - lo;
        let remapped = if width > 0.0 { (u - lo) / width } else { u };
        (index, self.pdf_discrete(index), remapped)
    }

    /// Probability of a given index under discrete sampling.
    #[must_use]
    pub fn pdf_discrete(&self, index: usize) -> f32 {
        if self.integral == 0.0 {
            1.0 / self.count() as f32
        } else {
            self.function[index] / (self.integral * self.count() as f32)
        }
    }

    /// Samples a continuous coordinate in `[0, 1)`. Returns
    /// `(x, pdf, index)`.
    #[must_use]
    pub fn sample_continuous(&self, u: f32) -> (f32, f32, usize) {
        let index = self.offset(u);
        let lo = self.cdf[index];
        let hi = self.cdf[index + 1];
        let width = hi - lo;
        let du = if width > 0.0 { (u - lo) / width } else { 0.0 };
        let x = (index as f32 + du) / self.count() as f32;
        let pdf = if self.integral > 0.0 {
            self.function[index] / self.integral
        } else {
            1.0
        };
        (x, pdf, index)
    }

    /// Density at a continuous coordinate.
    #[must_use]
    pub fn pdf_continuous(&self, x: f32) -> f32 {
        let index = ((x * self.count() as f32) as usize).min(self.count() - 1);
        if self.integral > 0.0 {
            self.function[index] / self.integral
        } else {
            1.0
        }
    }
}

/// A piecewise-constant 2D distribution: a marginal over rows and one
/// conditional distribution per row.
#[derive(Debug, Clone)]
pub struct Distribution2D {
    conditional: Vec<Distribution1D>,
    marginal: Distribution1D,
}

impl Distribution2D {
    /// Builds from a row-major grid of non-negative weights.
    #[must_use]
    pub fn new(weights: &[f32], width: usize, height: usize) -> Self {
        assert_eq!(weights.len(), width * height);
        let conditional: Vec<Distribution1D> = (0..height)
            .map(|y| Distribution1D::new(&weights[y * width..(y + 1) * width]))
            .collect();
        let marginal_weights: Vec<f32> = conditional.iter().map(Distribution1D::integral).collect();
        let marginal = Distribution1D::new(&marginal_weights);
        Self {
            conditional,
            marginal,
        }
    }

    /// Samples a point in `[0, 1)²`. Returns `(uv, pdf)`.
    #[must_use]
    pub fn sample_continuous(&self, u: Vec2) -> (Vec2, f32) {
        let (y, pdf_y, row) = self.marginal.sample_continuous(u.y);
        let (x, pdf_x, _) = self.conditional[row].sample_continuous(u.x);
        (Vec2::new(x, y), pdf_x * pdf_y)
    }

    /// Density at a point of `[0, 1)²`.
    #[must_use]
    pub fn pdf(&self, uv: Vec2) -> f32 {
        let rows = self.conditional.len();
        let row = ((uv.y * rows as f32) as usize).min(rows - 1);
        self.marginal.pdf_continuous(uv.y) * self.conditional[row].pdf_continuous(uv.x)
    }
}
