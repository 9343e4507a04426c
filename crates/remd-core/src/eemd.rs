//! Ensemble Empirical Mode Decomposition
//!
//! EEMD stabilises the mode mixing of plain EMD by decomposing many noisy
//! realisations of the input and averaging the results. Ensemble members run
//! in parallel on the rayon pool; each worker owns its workspace, and every
//! member seeds a fresh RNG from `rng_seed + member_index`, so the output is
//! independent of how members are assigned to workers. Workers accumulate
//! their IMFs into the shared output under one lock per row.
//!
//! ## Example
//!
//! ```rust
//! use remd_core::eemd::eemd;
//! use remd_core::emd::num_imfs;
//! use remd_core::types::EnsembleConfig;
//!
//! let signal: Vec<f64> = (0..256)
//!     .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 32.0).sin())
//!     .collect();
//! let config = EnsembleConfig { ensemble_size: 16, rng_seed: 42, ..Default::default() };
//! let m = num_imfs(signal.len());
//! let mut output = vec![0.0; m * signal.len()];
//! eemd(&signal, &mut output, 0, &config).unwrap();
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::array_ops;
use crate::emd::{emd_accumulate, num_imfs, EmdWorkspace};
use crate::types::{EmdError, EmdResult, EnsembleConfig};

/// Per-worker state for the ensemble loops: the member signal buffer plus
/// everything one EMD run needs. Created on worker entry by the parallel
/// iterator, dropped when the worker's share of members is done.
pub(crate) struct EnsembleWorkspace {
    pub(crate) x: Vec<f64>,
    pub(crate) emd: EmdWorkspace,
}

impl EnsembleWorkspace {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            x: vec![0.0; n],
            emd: EmdWorkspace::new(n),
        }
    }
}

/// Ensemble EMD of `input` into `num_modes` rows written row-major into
/// `output`, averaging `config.ensemble_size` noisy realisations. The noise
/// is Gaussian with standard deviation `config.noise_strength` times the
/// standard deviation of the input. `num_modes == 0` requests the
/// [`num_imfs`] default.
///
/// Reproducibility: the noise stream of member `i` depends only on
/// `config.rng_seed + i`. Bit-exact repeatability across runs additionally
/// requires a deterministic reduction order, i.e. a single-threaded pool.
///
/// # Panics
///
/// Panics if `output.len()` is not `num_modes · input.len()` (after
/// resolving the default).
pub fn eemd(
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
    let m = if num_modes == 0 { num_imfs(n) } else { num_modes };
    assert_eq!(
        output.len(),
        m * n,
        "output must be a row-major {m}x{n} matrix"
    );
    let noise_sigma = if config.noise_strength > 0.0 {
        config.noise_strength * array_ops::stddev(input)
    } else {
        0.0
    };
    output.fill(0.0);
    let rows: Vec<Mutex<&mut [f64]>> = output.chunks_mut(n).map(Mutex::new).collect();
    let members_done = AtomicUsize::new(0);

    (0..config.ensemble_size).into_par_iter().try_for_each_init(
        || EnsembleWorkspace::new(n),
        |w, en_i| -> EmdResult<()> {
            if config.noise_strength == 0.0 {
                array_ops::copy(input, &mut w.x);
            } else {
                // Seed from the member index, not the worker, so the stream
                // is reproducible whatever the scheduling.
                let mut rng =
                    StdRng::seed_from_u64(config.rng_seed.wrapping_add(en_i as u64));
                let normal = Normal::new(0.0, noise_sigma)
                    .map_err(|_| EmdError::NumericLibraryError)?;
                for (xi, &si) in w.x.iter_mut().zip(input) {
                    *xi = si + normal.sample(&mut rng);
                }
            }
            emd_accumulate(&mut w.x, &mut w.emd, &rows, config.s_number, config.num_siftings)?;
            let done = members_done.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!(
                member = done,
                total = config.ensemble_size,
                "ensemble member finished"
            );
            Ok(())
        },
    )?;

    drop(rows);
    if config.ensemble_size != 1 {
        array_ops::scale(output, 1.0 / config.ensemble_size as f64);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emd::emd;
    use std::f64::consts::PI;

    fn test_signal(n: usize, period: f64) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * i as f64 / period).sin()).collect()
    }

    #[test]
    fn test_single_member_without_noise_matches_emd() {
        let signal = test_signal(256, 32.0);
        let m = num_imfs(signal.len());
        let config = EnsembleConfig {
            ensemble_size: 1,
            noise_strength: 0.0,
            s_number: 4,
            num_siftings: 50,
            rng_seed: 0,
        };
        let mut ensemble_out = vec![0.0; m * signal.len()];
        let mut plain_out = vec![0.0; m * signal.len()];
        eemd(&signal, &mut ensemble_out, 0, &config).unwrap();
        emd(&signal, &mut plain_out, 0, 4, 50).unwrap();
        assert_eq!(ensemble_out, plain_out);
    }

    #[test]
    fn test_validation_failures_propagate() {
        let signal = test_signal(64, 16.0);
        let mut output = vec![0.0; num_imfs(64) * 64];
        let bad = EnsembleConfig { ensemble_size: 0, ..Default::default() };
        assert_eq!(
            eemd(&signal, &mut output, 0, &bad),
            Err(EmdError::InvalidEnsembleSize)
        );
        let no_noise = EnsembleConfig { ensemble_size: 8, noise_strength: 0.0, ..Default::default() };
        assert_eq!(
            eemd(&signal, &mut output, 0, &no_noise),
            Err(EmdError::NoNoiseAddedToEemd)
        );
    }

    #[test]
    fn test_empty_input_succeeds() {
        let mut output: [f64; 0] = [];
        let config = EnsembleConfig { ensemble_size: 8, ..Default::default() };
        eemd(&[], &mut output, 0, &config).unwrap();
    }

    #[test]
    fn test_single_worker_runs_are_bit_identical() {
        let signal = test_signal(256, 32.0);
        let n = signal.len();
        let m = num_imfs(n);
        let config = EnsembleConfig {
            ensemble_size: 16,
            noise_strength: 0.2,
            s_number: 4,
            num_siftings: 50,
            rng_seed: 42,
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap();
        let run = || {
            let mut output = vec![0.0; m * n];
            pool.install(|| eemd(&signal, &mut output, 0, &config)).unwrap();
            output
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_ensemble_mean_stays_close_to_the_input() {
        let signal = test_signal(256, 32.0);
        let n = signal.len();
        let m = num_imfs(n);
        let config = EnsembleConfig {
            ensemble_size: 16,
            noise_strength: 0.2,
            s_number: 4,
            num_siftings: 50,
            rng_seed: 42,
        };
        let mut output = vec![0.0; m * n];
        eemd(&signal, &mut output, 0, &config).unwrap();
        // The row sum reconstructs input + mean of the noise realisations;
        // the latter shrinks with the ensemble size but is not zero.
        for i in 0..n {
            let sum: f64 = output.chunks(n).map(|row| row[i]).sum();
            assert!(
                (sum - signal[i]).abs() < 0.2,
                "sample {i}: {sum} vs {}",
                signal[i]
            );
        }
    }
}
