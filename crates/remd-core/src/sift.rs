//! The sifting engine
//!
//! Sifting drives a signal toward an intrinsic mode function by repeatedly
//! subtracting the mean of its upper and lower spline envelopes. The loop
//! stops when the S-number criterion fires (the extrema and zero-crossing
//! counts have been stable for `s_number` consecutive iterations and are
//! balanced) or when the hard `num_siftings` cap is reached, whichever comes
//! first. One [`SiftingWorkspace`] holds every scratch buffer the loop
//! touches, so the per-iteration cost is free of allocation.
//!
//! ## Example
//!
//! ```rust
//! use remd_core::sift::{sift, SiftingWorkspace};
//!
//! let mut signal: Vec<f64> = (0..128)
//!     .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 32.0).sin())
//!     .collect();
//! let mut workspace = SiftingWorkspace::new(signal.len());
//! let count = sift(&mut signal, &mut workspace, 4, 50).unwrap();
//! assert!(count <= 50);
//! // `signal` now holds the extracted IMF.
//! ```

use crate::extrema::{find_extrema, ExtremaCounts};
use crate::spline::evaluate_spline;
use crate::types::EmdResult;

/// Sift count at which a divergence warning is emitted (the loop keeps
/// going; pathological inputs can legitimately take a while).
pub const DEFAULT_DIVERGENCE_WARNING: u32 = 10_000;

/// Scratch buffers for sifting one signal of a fixed length.
///
/// Sized for the worst case of every sample being an extremum; create one
/// per worker and reuse it across modes and members. Not shareable between
/// threads without external synchronisation (every call takes `&mut`).
#[derive(Debug, Clone)]
pub struct SiftingWorkspace {
    n: usize,
    maxx: Vec<f64>,
    maxy: Vec<f64>,
    minx: Vec<f64>,
    miny: Vec<f64>,
    maxspline: Vec<f64>,
    minspline: Vec<f64>,
    spline_scratch: Vec<f64>,
    warn_threshold: u32,
}

impl SiftingWorkspace {
    /// Allocate a workspace for signals of length `n`.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            maxx: Vec::with_capacity(n + 2),
            maxy: Vec::with_capacity(n + 2),
            minx: Vec::with_capacity(n + 2),
            miny: Vec::with_capacity(n + 2),
            maxspline: vec![0.0; n],
            minspline: vec![0.0; n],
            // The spline solve needs at most 5·m−10 doubles for m knots and
            // m never exceeds n.
            spline_scratch: vec![0.0; if n > 2 { 5 * n - 10 } else { 0 }],
            warn_threshold: DEFAULT_DIVERGENCE_WARNING,
        }
    }

    /// Override the sift count at which the divergence warning fires.
    /// A threshold of 0 disables the warning.
    pub fn warn_threshold(mut self, threshold: u32) -> Self {
        self.warn_threshold = threshold;
        self
    }

    /// Signal length this workspace was sized for.
    pub fn len(&self) -> usize {
        self.n
    }

    /// True when sized for empty signals.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}

/// Reduce `signal` to an intrinsic mode function in place.
///
/// Returns the number of sifting iterations performed. On return `signal`
/// holds the extracted IMF; forming the residual (previous signal minus IMF)
/// is the caller's job. At least one of `s_number` and `num_siftings` must
/// be nonzero or the loop would never terminate; the public entry points
/// validate this before calling.
///
/// # Panics
///
/// Panics if `signal.len()` differs from the workspace length.
pub fn sift(
    signal: &mut [f64],
    w: &mut SiftingWorkspace,
    s_number: u32,
    num_siftings: u32,
) -> EmdResult<u32> {
    assert_eq!(signal.len(), w.n, "workspace sized for a different signal length");
    let mut sift_counter: u32 = 0;
    let mut s_counter: u32 = 0;
    let mut prev: Option<ExtremaCounts> = None;

    while num_siftings == 0 || sift_counter < num_siftings {
        sift_counter += 1;
        if w.warn_threshold != 0 && sift_counter == w.warn_threshold {
            tracing::warn!(
                sift_counter,
                "sifting is not converging; the signal may be pathological"
            );
        }
        let counts = find_extrema(signal, &mut w.maxx, &mut w.maxy, &mut w.minx, &mut w.miny);
        if s_number > 0 {
            if let Some(p) = prev {
                let drift = counts.num_max.abs_diff(p.num_max)
                    + counts.num_min.abs_diff(p.num_min)
                    + counts.num_zc.abs_diff(p.num_zc);
                if drift <= 1 {
                    s_counter += 1;
                    if s_counter >= s_number {
                        // Interior extrema and zero crossings must also be
                        // balanced; the 4 accounts for the two virtual
                        // endpoints on each envelope.
                        let balance = counts.num_max as i64 + counts.num_min as i64
                            - 4
                            - counts.num_zc as i64;
                        if balance.abs() <= 1 {
                            break;
                        }
                    }
                } else {
                    s_counter = 0;
                }
            }
            prev = Some(counts);
        }
        evaluate_spline(&w.maxx, &w.maxy, &mut w.maxspline, &mut w.spline_scratch)?;
        evaluate_spline(&w.minx, &w.miny, &mut w.minspline, &mut w.spline_scratch)?;
        for (i, s) in signal.iter_mut().enumerate() {
            *s -= 0.5 * (w.maxspline[i] + w.minspline[i]);
        }
    }
    Ok(sift_counter)
}
