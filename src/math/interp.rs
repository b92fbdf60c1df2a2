//! Piecewise-linear resampling with flat extrapolation.
//!
//! Resampling a model grid means interpolating every mu column onto the same
//! target axis. The bracketing of each target point only depends on the two
//! axes, so it is computed once (`Stencil`) and then applied to each column.

/// Evenly spaced points over `[start, stop]`; the last point is exactly `stop`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            out[n - 1] = stop;
            out
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bracket {
    lo: usize,
    hi: usize,
    frac: f64,
}

/// Interpolation weights of a target axis against sorted sample abscissae.
#[derive(Debug, Clone)]
pub struct Stencil {
    brackets: Vec<Bracket>,
    n_source: usize,
}

impl Stencil {
    /// Bracket every `x` in `targets` against ascending `xp`.
    ///
    /// Targets below `xp[0]` take the first sample, targets at or above the
    /// last abscissa take the last sample. Returns `None` when `xp` is empty.
    pub fn new(targets: &[f64], xp: &[f64]) -> Option<Self> {
        let last = xp.len().checked_sub(1)?;
        let brackets = targets
            .iter()
            .map(|&x| {
                if !(x >= xp[0]) {
                    Bracket { lo: 0, hi: 0, frac: 0.0 }
                } else if x >= xp[last] {
                    Bracket {
                        lo: last,
                        hi: last,
                        frac: 0.0,
                    }
                } else {
                    // xp[lo] <= x < xp[lo + 1]
                    let lo = xp.partition_point(|&v| v <= x) - 1;
                    let frac = (x - xp[lo]) / (xp[lo + 1] - xp[lo]);
                    Bracket { lo, hi: lo + 1, frac }
                }
            })
            .collect();

        Some(Self {
            brackets,
            n_source: xp.len(),
        })
    }

    /// Number of target points.
    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// Interpolate sample values `fp` (parallel to the `xp` used to build the
    /// stencil) onto the target axis.
    ///
    /// # Panics
    /// Panics if `fp.len()` differs from the stencil's source length.
    pub fn apply(&self, fp: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.brackets.len()];
        self.apply_into(fp, &mut out);
        out
    }

    /// In-place variant of [`Stencil::apply`].
    ///
    /// # Panics
    /// Panics if `fp` does not match the source length or `out` does not
    /// match the target length.
    pub fn apply_into(&self, fp: &[f64], out: &mut [f64]) {
        assert_eq!(fp.len(), self.n_source, "sample values do not match stencil abscissae");
        assert_eq!(out.len(), self.brackets.len(), "output does not match stencil targets");
        for (o, b) in out.iter_mut().zip(self.brackets.iter()) {
            let f0 = fp[b.lo];
            *o = if b.lo == b.hi { f0 } else { f0 + b.frac * (fp[b.hi] - f0) };
        }
    }
}

/// One-shot linear interpolation of `(xp, fp)` at `targets`.
///
/// `xp` must be ascending. An empty `xp` yields an empty result.
pub fn interp(targets: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    match Stencil::new(targets, xp) {
        Some(stencil) => stencil.apply(fp),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_hits_both_ends() {
        let xs = linspace(490.0, 610.0, 7);
        assert_eq!(xs.len(), 7);
        assert_eq!(xs[0], 490.0);
        assert_eq!(xs[6], 610.0);
        assert!((xs[3] - 550.0).abs() < 1e-12);
        assert!(xs.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }

    #[test]
    fn interp_is_linear_inside_and_flat_outside() {
        let xp = [1.0, 2.0, 4.0];
        let fp = [10.0, 20.0, 0.0];
        let out = interp(&[0.0, 1.0, 1.5, 2.0, 3.0, 4.0, 9.0], &xp, &fp);
        let expected = [10.0, 10.0, 15.0, 20.0, 10.0, 0.0, 0.0];
        for (a, b) in out.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12, "got {a}, expected {b}");
        }
    }

    #[test]
    fn stencil_is_reusable_across_columns() {
        let xp = [0.0, 1.0];
        let stencil = Stencil::new(&[0.25, 0.75], &xp).unwrap();
        assert_eq!(stencil.len(), 2);
        assert_eq!(stencil.apply(&[0.0, 4.0]), vec![1.0, 3.0]);
        assert_eq!(stencil.apply(&[2.0, 2.0]), vec![2.0, 2.0]);
    }

    #[test]
    fn single_sample_is_constant() {
        assert_eq!(interp(&[-1.0, 5.0], &[3.0], &[7.0]), vec![7.0, 7.0]);
        assert!(interp(&[1.0], &[], &[]).is_empty());
    }
}
