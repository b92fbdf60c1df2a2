//! Composite Simpson's rule for sampled, possibly non-uniform data.
//!
//! Each pair of intervals `(h0, h1)` contributes
//!
//! ```text
//! (h0 + h1)/6 * [ y0 (2 - h1/h0) + y1 (h0 + h1)^2 / (h0 h1) + y2 (2 - h0/h1) ]
//! ```
//!
//! which reduces to the textbook `h/3 (y0 + 4 y1 + y2)` on a uniform axis.
//!
//! For an even number of samples (odd number of intervals) the rule cannot
//! tile the range, so we average two estimates: Simpson on the first `N-1`
//! samples plus a trapezoid on the last interval, and a trapezoid on the first
//! interval plus Simpson on the last `N-1` samples.

/// Integrate `y(x)` over the sampled range.
///
/// Zero-width intervals contribute nothing instead of producing NaN.
///
/// # Panics
/// Panics if `x` and `y` have different lengths.
pub fn simpson(y: &[f64], x: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "simpson: x and y lengths differ");
    let n = y.len();
    if n < 2 {
        return 0.0;
    }

    if n % 2 == 1 {
        return basic_simpson(y, x, 0, n as isize - 2);
    }

    let last_dx = x[n - 1] - x[n - 2];
    let first_dx = x[1] - x[0];
    let trapz = 0.5 * last_dx * (y[n - 1] + y[n - 2]) + 0.5 * first_dx * (y[1] + y[0]);
    let simp = basic_simpson(y, x, 0, n as isize - 3) + basic_simpson(y, x, 1, n as isize - 2);

    simp / 2.0 + trapz / 2.0
}

/// Simpson over the points at `indices`, gathered in order.
pub fn simpson_at(y: &[f64], x: &[f64], indices: &[usize]) -> f64 {
    let ys: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
    let xs: Vec<f64> = indices.iter().map(|&i| x[i]).collect();
    simpson(&ys, &xs)
}

/// Sum the three-point panels starting at `start`, `start + 2`, ... while the
/// panel start is below `stop`.
fn basic_simpson(y: &[f64], x: &[f64], start: usize, stop: isize) -> f64 {
    let mut total = 0.0;
    let mut i = start;
    while (i as isize) < stop {
        let h0 = x[i + 1] - x[i];
        let h1 = x[i + 2] - x[i + 1];
        let hsum = h0 + h1;
        let hprod = h0 * h1;
        let h0_over_h1 = if h1 != 0.0 { h0 / h1 } else { 0.0 };
        let h1_over_h0 = if h0_over_h1 != 0.0 { 1.0 / h0_over_h1 } else { 0.0 };
        let mid = if hprod != 0.0 { hsum * (hsum / hprod) } else { 0.0 };

        total += hsum / 6.0 * (y[i] * (2.0 - h1_over_h0) + y[i + 1] * mid + y[i + 2] * (2.0 - h0_over_h1));
        i += 2;
    }
    total
}
