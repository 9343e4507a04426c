//! # remd-core — Empirical Mode Decomposition
//!
//! This crate decomposes nonstationary time series into a small, ordered
//! collection of intrinsic mode functions (IMFs) plus a residual. Four
//! decomposition variants are provided:
//!
//! - **EMD**: plain sifting of a real signal ([`emd::emd`])
//! - **EEMD**: ensemble averaging over noisy realisations ([`eemd::eemd`])
//! - **CEEMDAN**: complete ensemble EMD with adaptive noise, extracting one
//!   mode at a time from a shared residual ([`ceemdan::ceemdan`])
//! - **BEMD**: bivariate EMD of a complex signal over a set of projection
//!   directions ([`bemd::bemd`])
//!
//! ## Signal flow
//!
//! ```text
//! signal → extrema/zero crossings → spline envelopes → sift ⟳ → IMF
//!            └──────────── ensemble driver: members ∥, modes → residual ─┘
//! ```
//!
//! The output of every entry point is a caller-owned row-major `M × N`
//! matrix: rows `0..M-1` hold the IMFs ordered from the highest-frequency
//! mode down, row `M-1` holds the residual. Passing `num_modes == 0`
//! requests the default `⌊log₂ N⌋` rule of [`emd::num_imfs`].
//!
//! The ensemble variants run their members in parallel on the rayon pool.
//! Per-member noise streams are seeded from `rng_seed + member_index`, so
//! results do not depend on scheduling; bit-exact repeatability of the
//! accumulated output additionally needs a single-threaded pool, because
//! floating-point accumulation order is otherwise unordered.
//!
//! ## Example
//!
//! ```rust
//! use remd_core::prelude::*;
//!
//! // Two tones: EMD separates them into the first two rows.
//! let signal: Vec<f64> = (0..512)
//!     .map(|i| {
//!         let t = i as f64;
//!         (2.0 * std::f64::consts::PI * t / 16.0).sin()
//!             + 0.5 * (2.0 * std::f64::consts::PI * t / 128.0).sin()
//!     })
//!     .collect();
//! let m = num_imfs(signal.len());
//! let mut output = vec![0.0; m * signal.len()];
//! emd(&signal, &mut output, 0, 4, 50).unwrap();
//! let residual = &output[(m - 1) * signal.len()..];
//! assert_eq!(residual.len(), signal.len());
//! ```

pub mod array_ops;
pub mod bemd;
pub mod ceemdan;
pub mod eemd;
pub mod emd;
pub mod extrema;
pub mod sift;
pub mod spline;
pub mod types;

// Re-export the main entry points and types
pub use bemd::{bemd, uniform_directions};
pub use ceemdan::ceemdan;
pub use eemd::eemd;
pub use emd::{emd, num_imfs};
pub use sift::{sift, SiftingWorkspace};
pub use types::{Complex, EmdError, EmdResult, EnsembleConfig, Sample};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bemd::{bemd, uniform_directions};
    pub use crate::ceemdan::ceemdan;
    pub use crate::eemd::eemd;
    pub use crate::emd::{emd, num_imfs};
    pub use crate::types::{Complex, EmdError, EmdResult, EnsembleConfig, Sample};
}
