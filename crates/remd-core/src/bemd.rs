//! Bivariate Empirical Mode Decomposition
//!
//! BEMD decomposes a complex-valued signal by rotating it through a set of
//! projection directions in the complex plane: each direction contributes
//! the spline envelope of its projection's maxima, the contributions are
//! combined into a complex mean with the `2/num_directions` normalisation of
//! the continuous-direction integral, and the mean is subtracted. A fixed
//! number of sifting passes extracts each mode; there is no S-number
//! criterion in the bivariate case.
//!
//! ## Example
//!
//! ```rust
//! use remd_core::bemd::{bemd, uniform_directions};
//! use remd_core::emd::num_imfs;
//! use remd_core::types::Complex;
//!
//! let n = 256;
//! let signal: Vec<Complex> = (0..n)
//!     .map(|i| {
//!         let t = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
//!         Complex::from_polar(1.0, 8.0 * t)
//!     })
//!     .collect();
//! let directions = uniform_directions(16);
//! let m = num_imfs(n);
//! let mut output = vec![Complex::new(0.0, 0.0); m * n];
//! bemd(&signal, &directions, &mut output, 0, 10).unwrap();
//! ```

use num_complex::Complex64;

use crate::emd::num_imfs;
use crate::extrema::find_maxima;
use crate::spline::evaluate_spline;
use crate::types::{EmdError, EmdResult};

/// `num` projection angles evenly spaced over the full circle.
pub fn uniform_directions(num: usize) -> Vec<f64> {
    (0..num)
        .map(|k| 2.0 * std::f64::consts::PI * k as f64 / num as f64)
        .collect()
}

/// Scratch for bivariate sifting: one projection buffer, maxima arrays, an
/// envelope buffer and the complex mean accumulator. One instance serves the
/// whole decomposition; nothing here is shared between threads.
struct BemdWorkspace {
    projected: Vec<f64>,
    maxx: Vec<f64>,
    maxy: Vec<f64>,
    envelope: Vec<f64>,
    spline_scratch: Vec<f64>,
    mean: Vec<Complex64>,
}

impl BemdWorkspace {
    fn new(n: usize) -> Self {
        Self {
            projected: vec![0.0; n],
            maxx: Vec::with_capacity(n + 2),
            maxy: Vec::with_capacity(n + 2),
            envelope: vec![0.0; n],
            spline_scratch: vec![0.0; if n > 2 { 5 * n - 10 } else { 0 }],
            mean: vec![Complex64::new(0.0, 0.0); n],
        }
    }
}

/// One sifting pass: accumulate the directional envelope mean and subtract
/// it from the signal in place.
fn sift_once(x: &mut [Complex64], directions: &[f64], w: &mut BemdWorkspace) -> EmdResult<()> {
    w.mean.fill(Complex64::new(0.0, 0.0));
    for &phi in directions {
        let (sin_phi, cos_phi) = phi.sin_cos();
        for (p, xi) in w.projected.iter_mut().zip(x.iter()) {
            *p = xi.re * cos_phi + xi.im * sin_phi;
        }
        find_maxima(&w.projected, &mut w.maxx, &mut w.maxy);
        evaluate_spline(&w.maxx, &w.maxy, &mut w.envelope, &mut w.spline_scratch)?;
        let dir = Complex64::from_polar(1.0, phi);
        for (mi, &ei) in w.mean.iter_mut().zip(w.envelope.iter()) {
            *mi += dir * ei;
        }
    }
    let scale = 2.0 / directions.len() as f64;
    for (xi, mi) in x.iter_mut().zip(w.mean.iter()) {
        *xi -= *mi * scale;
    }
    Ok(())
}

/// BEMD of the complex `input` into `num_modes` rows written row-major into
/// `output`; each mode is produced by `num_siftings` passes over the given
/// projection `directions`. `num_modes == 0` requests the [`num_imfs`]
/// default. An empty input succeeds and writes nothing.
///
/// # Panics
///
/// Panics if `directions` is empty or `output.len()` is not
/// `num_modes · input.len()` (after resolving the default).
pub fn bemd(
    input: &[Complex64],
    directions: &[f64],
    output: &mut [Complex64],
    num_modes: usize,
    num_siftings: u32,
) -> EmdResult<()> {
    if num_siftings == 0 {
        return Err(EmdError::NoConvergencePossible);
    }
    assert!(
        !directions.is_empty(),
        "at least one projection direction is required"
    );
    let n = input.len();
    if n == 0 {
        return Ok(());
    }
    let m = if num_modes == 0 { num_imfs(n) } else { num_modes };
    assert_eq!(
        output.len(),
        m * n,
        "output must be a row-major {m}x{n} matrix"
    );
    let mut w = BemdWorkspace::new(n);
    let mut x = input.to_vec();
    let mut res = input.to_vec();
    for imf_i in 0..m - 1 {
        if imf_i != 0 {
            x.copy_from_slice(&res);
        }
        for _ in 0..num_siftings {
            sift_once(&mut x, directions, &mut w)?;
        }
        for (r, &xi) in res.iter_mut().zip(x.iter()) {
            *r -= xi;
        }
        output[imf_i * n..(imf_i + 1) * n].copy_from_slice(&x);
        tracing::debug!(imf = imf_i, "bivariate mode extracted");
    }
    output[(m - 1) * n..].copy_from_slice(&res);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn two_tone(n: usize) -> (Vec<Complex64>, Vec<Complex64>, Vec<Complex64>) {
        let slow: Vec<Complex64> = (0..n)
            .map(|i| {
                let t = 2.0 * PI * i as f64 / n as f64;
                Complex64::from_polar(1.0, 2.0 * t) * (0.3 * t).cos()
            })
            .collect();
        let fast: Vec<Complex64> = (0..n)
            .map(|i| {
                let t = 2.0 * PI * i as f64 / n as f64;
                Complex64::from_polar(1.0, 17.0 * t) * (0.3 * (2.3 * t).sin().abs())
            })
            .collect();
        let sum = slow.iter().zip(&fast).map(|(a, b)| a + b).collect();
        (sum, slow, fast)
    }

    /// Normalised magnitude of the complex inner product.
    fn correlation(a: &[Complex64], b: &[Complex64]) -> f64 {
        let dot: Complex64 = a.iter().zip(b).map(|(x, y)| x * y.conj()).sum();
        let na: f64 = a.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
        let nb: f64 = b.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
        dot.norm() / (na * nb)
    }

    #[test]
    fn test_rejects_zero_siftings() {
        let signal = vec![Complex64::new(1.0, 0.0); 16];
        let mut output = vec![Complex64::new(0.0, 0.0); 16];
        assert_eq!(
            bemd(&signal, &uniform_directions(8), &mut output, 1, 0),
            Err(EmdError::NoConvergencePossible)
        );
    }

    #[test]
    fn test_empty_input_succeeds() {
        let mut output: Vec<Complex64> = Vec::new();
        bemd(&[], &uniform_directions(8), &mut output, 0, 10).unwrap();
    }

    #[test]
    fn test_single_mode_returns_the_input_as_residual() {
        let (signal, _, _) = two_tone(128);
        let mut output = vec![Complex64::new(0.0, 0.0); 128];
        bemd(&signal, &uniform_directions(16), &mut output, 1, 10).unwrap();
        assert_eq!(output, signal);
    }

    #[test]
    fn test_row_sum_reconstructs_the_input() {
        let (signal, _, _) = two_tone(256);
        let n = signal.len();
        let m = 4;
        let mut output = vec![Complex64::new(0.0, 0.0); m * n];
        bemd(&signal, &uniform_directions(32), &mut output, m, 10).unwrap();
        for i in 0..n {
            let sum: Complex64 = output.chunks(n).map(|row| row[i]).sum();
            assert!(
                (sum - signal[i]).norm() < 1e-9,
                "sample {i}: {sum} vs {}",
                signal[i]
            );
        }
    }

    #[test]
    fn test_fast_rotation_lands_in_row_zero() {
        let n = 512;
        let (signal, slow, fast) = two_tone(n);
        let m = 4;
        let mut output = vec![Complex64::new(0.0, 0.0); m * n];
        bemd(&signal, &uniform_directions(64), &mut output, m, 10).unwrap();

        let row0 = &output[..n];
        let row1 = &output[n..2 * n];
        assert!(
            correlation(row0, &fast) > correlation(row0, &slow),
            "row 0 should follow the fast rotation"
        );
        assert!(
            correlation(row1, &slow) > correlation(row1, &fast),
            "row 1 should follow the slow rotation"
        );
    }

    #[test]
    fn test_uniform_directions_span_the_circle() {
        let dirs = uniform_directions(4);
        assert_eq!(dirs.len(), 4);
        assert!((dirs[0] - 0.0).abs() < 1e-12);
        assert!((dirs[2] - PI).abs() < 1e-12);
    }
}
