use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::geometry::Selection;

/// Moments of a single selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats1 {
    pub min: u16,
    pub max: u16,
    pub mean: f64,
    /// Population standard deviation
    pub stdev: f64,
}

/// Moments of two selections and of their per-pixel difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats2 {
    pub a: Stats1,
    pub b: Stats1,
    /// Standard deviation of `a - b` divided by sqrt(2): the noise of one frame
    /// when both carry the same independent noise.
    pub stdev: f64,
}

/// Exact running sums. 128-bit accumulators leave room for gigapixel
/// selections of 16-bit samples, and the variance numerator
/// `n*sum(x^2) - sum(x)^2` is formed without rounding.
#[derive(Debug, Default, Clone, Copy)]
struct Moments {
    count: u64,
    sum: i128,
    sum_sq: u128,
}

impl Moments {
    #[inline]
    fn push(&mut self, value: i64) {
        self.count += 1;
        self.sum += i128::from(value);
        let magnitude = u128::from(value.unsigned_abs());
        self.sum_sq += magnitude * magnitude;
    }

    fn mean(&self) -> f64 {
        self.sum as f64 / self.count as f64
    }

    fn variance(&self) -> f64 {
        let n = i128::from(self.count);
        let numerator = n * self.sum_sq as i128 - self.sum * self.sum;
        (numerator as f64 / (n as f64 * n as f64)).max(0.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Extremes {
    min: u16,
    max: u16,
}

impl Extremes {
    fn new(first: u16) -> Self {
        Self { min: first, max: first }
    }

    #[inline]
    fn push(&mut self, value: u16) {
        if value > self.max {
            self.max = value;
        } else if value < self.min {
            self.min = value;
        }
    }
}

fn finish(moments: &Moments, extremes: Extremes) -> Stats1 {
    Stats1 {
        min: extremes.min,
        max: extremes.max,
        mean: moments.mean(),
        stdev: moments.variance().sqrt(),
    }
}

/// Minimum, maximum, mean and population standard deviation in one pass.
pub fn analyze(selection: &Selection<'_>) -> Result<Stats1> {
    let mut pixels = selection.pixels();
    let first = pixels
        .next()
        .ok_or_else(|| AnalysisError::EmptyInput("analyze over an empty selection".to_string()))?;

    let mut moments = Moments::default();
    let mut extremes = Extremes::new(first);
    moments.push(i64::from(first));

    for value in pixels {
        extremes.push(value);
        moments.push(i64::from(value));
    }

    Ok(finish(&moments, extremes))
}

/// Pairwise statistics of two selections with the same size and placement,
/// typically the same area of two frames shot under identical conditions.
pub fn subtract(a: &Selection<'_>, b: &Selection<'_>) -> Result<Stats2> {
    if !a.same_placement(b) {
        return Err(AnalysisError::ShapeMismatch(format!(
            "can't subtract selections of different size/placement: {}x{}+{}+{} vs {}x{}+{}+{}",
            a.width(),
            a.height(),
            a.x(),
            a.y(),
            b.width(),
            b.height(),
            b.x(),
            b.y()
        )));
    }

    let mut pixels_a = a.pixels();
    let mut pixels_b = b.pixels();
    let (first_a, first_b) = match (pixels_a.next(), pixels_b.next()) {
        (Some(va), Some(vb)) => (va, vb),
        _ => return Err(AnalysisError::EmptyInput("subtract over empty selections".to_string())),
    };

    let mut moments_a = Moments::default();
    let mut moments_b = Moments::default();
    let mut moments_d = Moments::default();
    let mut extremes_a = Extremes::new(first_a);
    let mut extremes_b = Extremes::new(first_b);
    moments_a.push(i64::from(first_a));
    moments_b.push(i64::from(first_b));
    moments_d.push(i64::from(first_a) - i64::from(first_b));

    for (va, vb) in pixels_a.zip(pixels_b) {
        extremes_a.push(va);
        extremes_b.push(vb);
        moments_a.push(i64::from(va));
        moments_b.push(i64::from(vb));
        moments_d.push(i64::from(va) - i64::from(vb));
    }

    Ok(Stats2 {
        a: finish(&moments_a, extremes_a),
        b: finish(&moments_b, extremes_b),
        stdev: (moments_d.variance() / 2.0).sqrt(),
    })
}
