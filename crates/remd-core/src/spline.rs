//! Envelope interpolation over irregular knots
//!
//! Fits a natural cubic spline (second derivative zero at both ends) through
//! a strictly increasing knot sequence and evaluates it at every integer
//! sample of the output grid. With fewer than four knots the interpolant
//! degrades gracefully: a parabola for three, a line for two, a constant for
//! one. The knots must cover the grid (`xs[0] ≤ 0` and `xs[n-1] ≥ N−1`), so
//! the caller never asks for extrapolation; the virtual endpoint extrema
//! from [`crate::extrema`] guarantee exactly that.
//!
//! ## Example
//!
//! ```rust
//! use remd_core::spline::evaluate_spline;
//!
//! let xs = [0.0, 4.0, 9.0];
//! let ys = [0.0, 16.0, 81.0]; // y = x²
//! let mut out = [0.0; 10];
//! evaluate_spline(&xs, &ys, &mut out, &mut []).unwrap();
//! assert!((out[2] - 4.0).abs() < 1e-9); // three knots: exact parabola
//! ```

use crate::types::{EmdError, EmdResult};

/// Evaluate the envelope through `(xs, ys)` at the integer grid
/// `0..out.len()`.
///
/// `scratch` is only used for four or more knots, where the tridiagonal
/// solve needs workspace; `5·n − 10` doubles (`n` = number of knots) is
/// always sufficient, matching the sifting workspace allocation.
///
/// # Panics
///
/// Panics if `xs` and `ys` differ in length, or if `scratch` is too small
/// for a cubic fit through `xs.len()` knots.
pub fn evaluate_spline(
    xs: &[f64],
    ys: &[f64],
    out: &mut [f64],
    scratch: &mut [f64],
) -> EmdResult<()> {
    assert_eq!(xs.len(), ys.len(), "knot arrays must be parallel");
    let n = xs.len();
    if n == 0 {
        return Err(EmdError::NotEnoughPointsForSpline);
    }
    if n == 1 {
        out.fill(ys[0]);
        return Ok(());
    }
    if !xs.windows(2).all(|w| w[0] < w[1]) {
        return Err(EmdError::InvalidSplinePoints);
    }
    if !out.is_empty() && (xs[0] > 0.0 || xs[n - 1] < (out.len() - 1) as f64) {
        return Err(EmdError::InvalidSplinePoints);
    }

    match n {
        2 => {
            let slope = (ys[1] - ys[0]) / (xs[1] - xs[0]);
            for (j, o) in out.iter_mut().enumerate() {
                *o = ys[0] + slope * (j as f64 - xs[0]);
            }
            Ok(())
        }
        3 => {
            // Newton divided differences: the unique interpolating parabola.
            let d1 = (ys[1] - ys[0]) / (xs[1] - xs[0]);
            let d2 = (ys[2] - ys[1]) / (xs[2] - xs[1]);
            let c2 = (d2 - d1) / (xs[2] - xs[0]);
            for (j, o) in out.iter_mut().enumerate() {
                let t = j as f64;
                *o = ys[0] + d1 * (t - xs[0]) + c2 * (t - xs[0]) * (t - xs[1]);
            }
            Ok(())
        }
        _ => cubic_spline(xs, ys, out, scratch),
    }
}

/// Natural cubic spline: Thomas solve for the interior second derivatives,
/// then piecewise evaluation with a binary search per grid point.
fn cubic_spline(xs: &[f64], ys: &[f64], out: &mut [f64], scratch: &mut [f64]) -> EmdResult<()> {
    let n = xs.len();
    let k = n - 2; // interior unknowns; the natural ends are zero
    assert!(
        scratch.len() >= n + 2 * k,
        "spline scratch too small: need {} doubles, got {}",
        n + 2 * k,
        scratch.len()
    );
    let (m2, rest) = scratch.split_at_mut(n);
    let (cp, rest) = rest.split_at_mut(k);
    let dp = &mut rest[..k];

    for i in 0..k {
        let j = i + 1;
        let h_lo = xs[j] - xs[j - 1];
        let h_hi = xs[j + 1] - xs[j];
        let diag = 2.0 * (h_lo + h_hi);
        let rhs = 6.0 * ((ys[j + 1] - ys[j]) / h_hi - (ys[j] - ys[j - 1]) / h_lo);
        let beta = if i == 0 { diag } else { diag - h_lo * cp[i - 1] };
        if !beta.is_finite() || beta == 0.0 {
            return Err(EmdError::NumericLibraryError);
        }
        cp[i] = h_hi / beta;
        dp[i] = if i == 0 {
            rhs / beta
        } else {
            (rhs - h_lo * dp[i - 1]) / beta
        };
    }

    m2[0] = 0.0;
    m2[n - 1] = 0.0;
    for i in (0..k).rev() {
        let j = i + 1;
        m2[j] = dp[i] - cp[i] * m2[j + 1];
    }

    for (j, o) in out.iter_mut().enumerate() {
        let t = j as f64;
        let p = xs.partition_point(|&xk| xk <= t);
        let seg = p.saturating_sub(1).min(n - 2);
        let h = xs[seg + 1] - xs[seg];
        let a = (xs[seg + 1] - t) / h;
        let b = (t - xs[seg]) / h;
        *o = a * ys[seg]
            + b * ys[seg + 1]
            + ((a * a * a - a) * m2[seg] + (b * b * b - b) * m2[seg + 1]) * (h * h) / 6.0;
    }
    Ok(())
}
