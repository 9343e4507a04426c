//! Core types for mode decomposition
//!
//! This module defines the shared aliases, the error taxonomy and the
//! ensemble configuration used throughout the crate. Every decomposition
//! entry point reports failures through [`EmdError`], whose variants carry a
//! stable numeric code (see [`EmdError::code`]) so that callers bridging to
//! other environments can rely on the enumeration never being reshuffled.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A floating point sample (for real-valued signals).
pub type Sample = f64;

/// Type alias for complex samples using f64 precision (BEMD input).
pub type Complex = Complex64;

/// Result type for decomposition operations.
pub type EmdResult<T> = Result<T, EmdError>;

/// Errors that can occur during a decomposition.
///
/// `Ok(())` plays the role of the classic `SUCCESS` code 0; every failure
/// variant maps to a fixed nonzero code via [`EmdError::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EmdError {
    #[error("Invalid ensemble size (zero or negative)")]
    InvalidEnsembleSize,

    #[error("Invalid noise strength (negative)")]
    InvalidNoiseStrength,

    #[error("Positive noise strength but ensemble size is one (regular EMD)")]
    NoiseAddedToEmd,

    #[error("Ensemble size is more than one (EEMD) but noise strength is zero")]
    NoNoiseAddedToEemd,

    #[error("Stopping criteria invalid: would never converge")]
    NoConvergencePossible,

    #[error("Spline evaluation tried with insufficient points")]
    NotEnoughPointsForSpline,

    #[error("Spline evaluation points invalid")]
    InvalidSplinePoints,

    #[error("Error reported by numeric routines")]
    NumericLibraryError,

    #[error("Convergence not reached after sifting 10000 times")]
    NoConvergenceInSifting,
}

impl EmdError {
    /// Stable numeric code for this error. Success is 0 by convention.
    pub fn code(self) -> u32 {
        match self {
            EmdError::InvalidEnsembleSize => 1,
            EmdError::InvalidNoiseStrength => 2,
            EmdError::NoiseAddedToEmd => 3,
            EmdError::NoNoiseAddedToEemd => 4,
            EmdError::NoConvergencePossible => 5,
            EmdError::NotEnoughPointsForSpline => 6,
            EmdError::InvalidSplinePoints => 7,
            EmdError::NumericLibraryError => 8,
            EmdError::NoConvergenceInSifting => 9,
        }
    }
}

/// Configuration for the ensemble decompositions ([`eemd`](crate::eemd) and
/// [`ceemdan`](crate::ceemdan)).
///
/// `s_number` and `num_siftings` control the per-IMF sifting stop criterion:
/// a nonzero `s_number` stops once the extrema and zero-crossing counts have
/// been stable for that many consecutive iterations, a nonzero
/// `num_siftings` caps the iteration count outright. At least one of the two
/// must be nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Number of ensemble members (input + noise realisations) to average.
    pub ensemble_size: usize,
    /// Noise amplitude relative to the standard deviation of the input.
    pub noise_strength: f64,
    /// S-number stopping criterion; 0 disables it.
    pub s_number: u32,
    /// Hard cap on sifting iterations per IMF; 0 disables it.
    pub num_siftings: u32,
    /// Base RNG seed; member `i` always derives its stream from `rng_seed + i`.
    pub rng_seed: u64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            ensemble_size: 250,
            noise_strength: 0.2,
            s_number: 4,
            num_siftings: 50,
            rng_seed: 0,
        }
    }
}

impl EnsembleConfig {
    /// Check the parameter combination, failing fast with the matching code.
    pub fn validate(&self) -> EmdResult<()> {
        if self.ensemble_size == 0 {
            return Err(EmdError::InvalidEnsembleSize);
        }
        if self.noise_strength < 0.0 {
            return Err(EmdError::InvalidNoiseStrength);
        }
        if self.ensemble_size == 1 && self.noise_strength > 0.0 {
            return Err(EmdError::NoiseAddedToEmd);
        }
        if self.ensemble_size > 1 && self.noise_strength == 0.0 {
            return Err(EmdError::NoNoiseAddedToEemd);
        }
        if self.s_number == 0 && self.num_siftings == 0 {
            return Err(EmdError::NoConvergencePossible);
        }
        Ok(())
    }
}
