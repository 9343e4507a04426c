//! Plain Empirical Mode Decomposition
//!
//! Decomposes a signal into intrinsic mode functions by repeatedly sifting
//! the running residual: each extracted IMF is subtracted from the residual,
//! and the final residual becomes the last output row. The same residual
//! recurrence is the per-member body of the ensemble variants, which is why
//! the accumulation goes through per-row locks even in the single-member
//! case (uncontended, one atomic per row).
//!
//! ## Example
//!
//! ```rust
//! use remd_core::emd::{emd, num_imfs};
//!
//! let signal: Vec<f64> = (0..256)
//!     .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 64.0).sin())
//!     .collect();
//! let m = num_imfs(signal.len());
//! let mut output = vec![0.0; m * signal.len()];
//! emd(&signal, &mut output, 0, 4, 50).unwrap();
//! // Row 0 is the highest-frequency mode, the last row the residual.
//! ```

use std::sync::Mutex;

use crate::array_ops;
use crate::sift::{sift, SiftingWorkspace};
use crate::types::{EmdError, EmdResult};

/// Default number of output rows (IMFs plus residual) for a signal of
/// length `n`: 0 for an empty signal, 1 when the signal is too short to
/// sift, `⌊log₂ n⌋` otherwise.
pub fn num_imfs(n: usize) -> usize {
    if n == 0 {
        0
    } else if n <= 3 {
        1
    } else {
        n.ilog2() as usize
    }
}

/// Residual buffer plus sifting scratch for one EMD run.
pub(crate) struct EmdWorkspace {
    pub(crate) res: Vec<f64>,
    pub(crate) sift: SiftingWorkspace,
}

impl EmdWorkspace {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            res: vec![0.0; n],
            sift: SiftingWorkspace::new(n),
        }
    }
}

/// Extract all modes of `x` and accumulate them into the locked output
/// rows. `x` is destroyed in the process. This is both the body of [`emd`]
/// and the per-member step of EEMD, where several workers add into the same
/// rows concurrently.
pub(crate) fn emd_accumulate(
    x: &mut [f64],
    w: &mut EmdWorkspace,
    rows: &[Mutex<&mut [f64]>],
    s_number: u32,
    num_siftings: u32,
) -> EmdResult<()> {
    let m = rows.len();
    debug_assert!(m >= 1);
    array_ops::copy(x, &mut w.res);
    for imf_i in 0..m - 1 {
        if imf_i != 0 {
            array_ops::copy(&w.res, x);
        }
        let sift_count = sift(x, &mut w.sift, s_number, num_siftings)?;
        array_ops::sub(x, &mut w.res);
        {
            let mut guard = rows[imf_i].lock().unwrap();
            let row: &mut [f64] = &mut guard;
            array_ops::add(x, row);
        }
        tracing::debug!(imf = imf_i, siftings = sift_count, "IMF extracted");
    }
    let mut guard = rows[m - 1].lock().unwrap();
    let row: &mut [f64] = &mut guard;
    array_ops::add(&w.res, row);
    Ok(())
}

/// Decompose `input` into `num_modes` rows (IMFs plus residual) written
/// row-major into `output`. `num_modes == 0` requests the [`num_imfs`]
/// default. An empty input succeeds and writes nothing.
///
/// # Panics
///
/// Panics if `output.len()` is not `num_modes · input.len()` (after
/// resolving the default).
pub fn emd(
    input: &[f64],
    output: &mut [f64],
    num_modes: usize,
    s_number: u32,
    num_siftings: u32,
) -> EmdResult<()> {
    if s_number == 0 && num_siftings == 0 {
        return Err(EmdError::NoConvergencePossible);
    }
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
    output.fill(0.0);
    let rows: Vec<Mutex<&mut [f64]>> = output.chunks_mut(n).map(Mutex::new).collect();
    let mut x = input.to_vec();
    let mut w = EmdWorkspace::new(n);
    emd_accumulate(&mut x, &mut w, &rows, s_number, num_siftings)
}
