//! Complete Ensemble EMD with Adaptive Noise
//!
//! CEEMDAN extracts one mode at a time from a single shared residual, and
//! forces each stage with the *matching mode of the noise* rather than raw
//! noise: member `i` keeps a noise residual that is advanced by one EMD mode
//! per stage, so the ensemble noise stays aligned with the data mode being
//! extracted. The outer mode loop is sequential (mode `k+1` needs the
//! residual left by mode `k`); the inner loop over ensemble members runs in
//! parallel, all members adding into the same output row under one lock.
//!
//! ## Example
//!
//! ```rust
//! use remd_core::ceemdan::ceemdan;
//! use remd_core::emd::num_imfs;
//! use remd_core::types::EnsembleConfig;
//!
//! let signal: Vec<f64> = (0..256)
//!     .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 32.0).sin())
//!     .collect();
//! let config = EnsembleConfig { ensemble_size: 16, rng_seed: 42, ..Default::default() };
//! let m = num_imfs(signal.len());
//! let mut output = vec![0.0; m * signal.len()];
//! ceemdan(&signal, &mut output, 0, &config).unwrap();
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use std::sync::Mutex;

use crate::array_ops;
use crate::eemd::EnsembleWorkspace;
use crate::emd::num_imfs;
use crate::sift::sift;
use crate::types::{EmdResult, EnsembleConfig};

/// CEEMDAN of `input` into `num_modes` rows written row-major into
/// `output`. `num_modes == 0` requests the [`num_imfs`] default;
/// `num_modes == 1` short-circuits to copying the input (the only "mode" is
/// the residual). Reproducibility follows the same rules as
/// [`eemd`](crate::eemd::eemd): member `i`'s noise depends only on
/// `config.rng_seed + i`.
///
/// # Panics
///
/// Panics if `output.len()` is not `num_modes · input.len()` (after
/// resolving the default).
pub fn ceemdan(
    input: &[f64],
    output: &mut [f64],
    num_modes: usize,
    config: &EnsembleConfig,
) -> EmdResult<()> {
    config.validate()?;
    let n = input.len();
    if n == 0 {
        return Ok(());
    }
    if num_modes == 1 {
        assert_eq!(output.len(), n, "output must be a row-major 1x{n} matrix");
        output.copy_from_slice(input);
        return Ok(());
    }
    let m = if num_modes == 0 { num_imfs(n) } else { num_modes };
    assert_eq!(
        output.len(),
        m * n,
        "output must be a row-major {m}x{n} matrix"
    );
    output.fill(0.0);
    let ens = config.ensemble_size;
    let ensemble_scale = 1.0 / ens as f64;

    // Every mode of the data needs the matching mode of each member's noise
    // realisation, so the noise is generated up front and decomposed in
    // lockstep with the data.
    let mut noises = vec![0.0; ens * n];
    let mut noise_residuals = vec![0.0; ens * n];
    noises.par_chunks_mut(n).enumerate().for_each(|(en_i, noise)| {
        let mut rng = StdRng::seed_from_u64(config.rng_seed.wrapping_add(en_i as u64));
        for v in noise.iter_mut() {
            *v = StandardNormal.sample(&mut rng);
        }
    });

    let mut res = input.to_vec();
    for imf_i in 0..m - 1 {
        let res_sd = array_ops::stddev(&res);
        {
            let imf_row = Mutex::new(&mut output[imf_i * n..(imf_i + 1) * n]);
            let res_ref = &res;
            noises
                .par_chunks_mut(n)
                .zip(noise_residuals.par_chunks_mut(n))
                .try_for_each_init(
                    || EnsembleWorkspace::new(n),
                    |w, (noise, noise_residual)| -> EmdResult<()> {
                        // Fix the SNR of this stage: the forcing amplitude
                        // tracks the residual's spread over the noise's.
                        let noise_sd = array_ops::stddev(noise);
                        let sigma = if noise_sd != 0.0 {
                            config.noise_strength * res_sd / noise_sd
                        } else {
                            0.0
                        };
                        array_ops::addmul_to(res_ref, noise, sigma, &mut w.x);
                        sift(&mut w.x, &mut w.emd.sift, config.s_number, config.num_siftings)?;
                        {
                            let mut guard = imf_row.lock().unwrap();
                            let row: &mut [f64] = &mut guard;
                            array_ops::add(&w.x, row);
                        }
                        // Noise-mode recurrence: peel the next mode off this
                        // member's noise so the next stage is forced by it.
                        if imf_i == 0 {
                            array_ops::copy(noise, noise_residual);
                        } else {
                            array_ops::copy(noise_residual, noise);
                        }
                        sift(noise, &mut w.emd.sift, config.s_number, config.num_siftings)?;
                        array_ops::sub(noise, noise_residual);
                        Ok(())
                    },
                )?;
        }
        let row = &mut output[imf_i * n..(imf_i + 1) * n];
        array_ops::scale(row, ensemble_scale);
        array_ops::sub(row, &mut res);
    }
    array_ops::add(&res, &mut output[(m - 1) * n..]);
    Ok(())
}
