//! Passband normalisation.
//!
//! Turns a caller-supplied throughput curve (any order, any scale) into a
//! sorted curve whose throughput drops to zero just outside its native range
//! and peaks at exactly 1.0. The zero padding makes the later interpolation
//! onto the model axis fall to zero beyond the band instead of extrapolating
//! the edge throughput.

use log::debug;

use crate::domain::{Passband, RawPassband};
use crate::error::LdError;

const STAGE: &str = "passband";

/// Sort, zero-pad and peak-normalise a passband.
///
/// With no sensitivity supplied, a unit boxcar over the native wavelengths is
/// used (the padded end points are still zero), so the result is identical to
/// passing explicit ones.
pub fn normalize_passband(raw: &RawPassband, pad_nm: f64) -> Result<Passband, LdError> {
    let n = raw.wavelength_nm.len();
    if n == 0 {
        return Err(LdError::degenerate(STAGE, "passband has no samples"));
    }
    if let Some(s) = &raw.sensitivity {
        if s.len() != n {
            return Err(LdError::shape(
                STAGE,
                format!("{n} wavelengths but {} sensitivity values", s.len()),
            ));
        }
        if let Some(i) = s.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(LdError::invalid(
                STAGE,
                format!("sensitivity[{i}] = {} is not a finite non-negative number", s[i]),
            ));
        }
    }
    if let Some(i) = raw.wavelength_nm.iter().position(|w| !w.is_finite()) {
        return Err(LdError::invalid(STAGE, format!("wavelength[{i}] is not finite")));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| raw.wavelength_nm[a].total_cmp(&raw.wavelength_nm[b]));

    let mut wavelength_nm = Vec::with_capacity(n + 2);
    let mut sensitivity = Vec::with_capacity(n + 2);

    wavelength_nm.push(raw.wavelength_nm[order[0]] - pad_nm);
    sensitivity.push(0.0);
    for &i in &order {
        wavelength_nm.push(raw.wavelength_nm[i]);
        sensitivity.push(raw.sensitivity.as_ref().map_or(1.0, |s| s[i]));
    }
    wavelength_nm.push(raw.wavelength_nm[order[n - 1]] + pad_nm);
    sensitivity.push(0.0);

    if raw.sensitivity.is_some() {
        let peak = sensitivity.iter().copied().fold(0.0_f64, f64::max);
        if peak <= 0.0 {
            return Err(LdError::degenerate(STAGE, "peak sensitivity is zero"));
        }
        for s in &mut sensitivity {
            *s /= peak;
        }
    }

    debug!(
        "passband normalised: {} samples over [{:.4}, {:.4}] nm{}",
        wavelength_nm.len(),
        wavelength_nm[0],
        wavelength_nm[wavelength_nm.len() - 1],
        if raw.sensitivity.is_none() { " (boxcar)" } else { "" }
    );

    Ok(Passband::from_parts(wavelength_nm, sensitivity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_pads_and_normalises() {
        let raw = RawPassband::new(vec![520.0, 500.0, 510.0], vec![2.0, 1.0, 4.0]);
        let pb = normalize_passband(&raw, 0.01).unwrap();

        assert_eq!(pb.len(), 5);
        assert!((pb.wavelength_nm()[0] - 499.99).abs() < 1e-9);
        assert!((pb.wavelength_nm()[4] - 520.01).abs() < 1e-9);
        assert_eq!(&pb.wavelength_nm()[1..4], &[500.0, 510.0, 520.0]);
        assert_eq!(pb.sensitivity(), &[0.0, 0.25, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn peak_is_exactly_one_for_arbitrary_scales() {
        for scale in [1e-7, 0.3, 17.0, 4.2e5] {
            let s: Vec<f64> = [0.1, 0.7, 0.93, 0.2].iter().map(|v| v * scale).collect();
            let raw = RawPassband::new(vec![400.0, 450.0, 500.0, 550.0], s);
            let pb = normalize_passband(&raw, 0.01).unwrap();
            let peak = pb.sensitivity().iter().copied().fold(f64::MIN, f64::max);
            assert_eq!(peak, 1.0);
            assert_eq!(pb.sensitivity()[0], 0.0);
            assert_eq!(*pb.sensitivity().last().unwrap(), 0.0);
        }
    }

    #[test]
    fn boxcar_equals_explicit_ones() {
        let w = vec![600.0, 500.0, 550.0];
        let boxcar = normalize_passband(&RawPassband::boxcar(w.clone()), 0.01).unwrap();
        let ones = normalize_passband(&RawPassband::new(w, vec![1.0; 3]), 0.01).unwrap();
        assert_eq!(boxcar, ones);
        assert_eq!(boxcar.sensitivity(), &[0.0, 1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn rejects_degenerate_and_mismatched_input() {
        let err = normalize_passband(&RawPassband::new(vec![500.0, 510.0], vec![0.0, 0.0]), 0.01).unwrap_err();
        assert!(matches!(err, LdError::DegenerateBand { stage: "passband", .. }));

        let err = normalize_passband(&RawPassband::boxcar(vec![]), 0.01).unwrap_err();
        assert!(matches!(err, LdError::DegenerateBand { .. }));

        let err = normalize_passband(&RawPassband::new(vec![500.0, 510.0], vec![1.0]), 0.01).unwrap_err();
        assert!(matches!(err, LdError::ShapeMismatch { .. }));

        let err = normalize_passband(&RawPassband::new(vec![500.0], vec![f64::NAN]), 0.01).unwrap_err();
        assert!(matches!(err, LdError::InvalidInput { .. }));
    }
}
