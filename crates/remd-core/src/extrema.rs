//! Extrema and zero-crossing detection
//!
//! Locates strict local maxima and minima of a sampled signal, reports
//! plateaus once at their midpoint, and appends a mirrored virtual extremum
//! on each side so the envelope splines can be evaluated over the whole
//! sample grid without extrapolation. The zero-crossing count feeds the
//! S-number stopping criterion of the sifter.
//!
//! Knot x-coordinates are `f64` because a plateau midpoint may fall between
//! two samples, and the virtual endpoints lie outside `[0, N-1]`.
//!
//! ## Example
//!
//! ```rust
//! use remd_core::extrema::find_extrema;
//!
//! let signal = vec![0.0, 1.0, 0.0, 2.0, 0.0];
//! let (mut maxx, mut maxy) = (Vec::new(), Vec::new());
//! let (mut minx, mut miny) = (Vec::new(), Vec::new());
//! let counts = find_extrema(&signal, &mut maxx, &mut maxy, &mut minx, &mut miny);
//! // Two interior maxima plus the two virtual endpoints.
//! assert_eq!(counts.num_max, 4);
//! assert_eq!(maxx, vec![-1.0, 1.0, 3.0, 5.0]);
//! ```

/// Extrema and zero-crossing counts of one detector pass.
///
/// `num_max` and `num_min` include the two virtual endpoints of each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtremaCounts {
    pub num_max: usize,
    pub num_min: usize,
    pub num_zc: usize,
}

/// Find maxima, minima and zero crossings of `signal` in one call.
///
/// The four output vectors are cleared and refilled; `maxx`/`minx` end up
/// strictly increasing with the virtual endpoints first and last.
pub fn find_extrema(
    signal: &[f64],
    maxx: &mut Vec<f64>,
    maxy: &mut Vec<f64>,
    minx: &mut Vec<f64>,
    miny: &mut Vec<f64>,
) -> ExtremaCounts {
    scan_extrema(signal, |a, b| a > b, maxx, maxy);
    scan_extrema(signal, |a, b| a < b, minx, miny);
    ExtremaCounts {
        num_max: maxx.len(),
        num_min: minx.len(),
        num_zc: count_zero_crossings(signal),
    }
}

/// Find only the maxima of `signal` (the projection envelopes of BEMD need
/// nothing else; minima of a signal are the maxima of its negation).
pub fn find_maxima(signal: &[f64], maxx: &mut Vec<f64>, maxy: &mut Vec<f64>) {
    scan_extrema(signal, |a, b| a > b, maxx, maxy);
}

/// One-sided extremum scan. `beats(a, b)` is `a > b` for maxima and `a < b`
/// for minima; everything else is symmetric between the two kinds.
fn scan_extrema(
    x: &[f64],
    beats: impl Fn(f64, f64) -> bool,
    outx: &mut Vec<f64>,
    outy: &mut Vec<f64>,
) {
    outx.clear();
    outy.clear();
    let n = x.len();
    if n == 0 {
        return;
    }
    if n == 1 {
        outx.push(0.0);
        outy.push(x[0]);
        return;
    }

    // Interior pass: strict extrema, plateaus reported at their midpoint.
    let mut i = 1;
    while i + 1 < n {
        if beats(x[i], x[i - 1]) && beats(x[i], x[i + 1]) {
            outx.push(i as f64);
            outy.push(x[i]);
            i += 1;
        } else if x[i] == x[i + 1] && x[i] != x[i - 1] {
            let mut b = i + 1;
            while b + 1 < n && x[b + 1] == x[b] {
                b += 1;
            }
            // A plateau running into the boundary is not interior.
            if b + 1 < n && beats(x[i], x[i - 1]) && beats(x[b], x[b + 1]) {
                outx.push((i + b) as f64 / 2.0);
                outy.push(x[i]);
            }
            i = b + 1;
        } else {
            i += 1;
        }
    }

    if outx.is_empty() {
        // No interior extrema of this kind: the boundary samples themselves
        // become the two knots (a degenerate, linear envelope).
        outx.push(0.0);
        outy.push(x[0]);
        outx.push((n - 1) as f64);
        outy.push(x[n - 1]);
        return;
    }

    // Virtual endpoints: reflect the first/last interior extremum across the
    // boundary sample. The mirrored knot keeps the inner neighbour's value
    // unless the boundary sample itself sticks out beyond it (a signal
    // ending above every interior maximum, say), in which case the boundary
    // value wins so the envelope never cuts through the data.
    let first_x = outx[0];
    let first_y = outy[0];
    let left_y = if beats(x[0], first_y) { x[0] } else { first_y };
    outx.insert(0, -first_x);
    outy.insert(0, left_y);

    let last_x = outx[outx.len() - 1];
    let last_y = outy[outy.len() - 1];
    let right_y = if beats(x[n - 1], last_y) { x[n - 1] } else { last_y };
    outx.push(2.0 * (n - 1) as f64 - last_x);
    outy.push(right_y);
}

/// Count sign transitions. A run of exact zeros counts once, at its first
/// index; transitions between nonzero samples count when the sign flips.
fn count_zero_crossings(x: &[f64]) -> usize {
    let mut zc = 0;
    for w in x.windows(2) {
        let (a, b) = (w[0], w[1]);
        if b == 0.0 {
            if a != 0.0 {
                zc += 1;
            }
        } else if a != 0.0 && (a > 0.0) != (b > 0.0) {
            zc += 1;
        }
    }
    zc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(signal: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, ExtremaCounts) {
        let (mut maxx, mut maxy) = (Vec::new(), Vec::new());
        let (mut minx, mut miny) = (Vec::new(), Vec::new());
        let counts = find_extrema(signal, &mut maxx, &mut maxy, &mut minx, &mut miny);
        (maxx, maxy, minx, miny, counts)
    }

    #[test]
    fn test_strict_interior_extrema() {
        let (maxx, maxy, minx, miny, counts) = run(&[0.0, 1.0, 0.0, 2.0, 0.0]);
        assert_eq!(maxx, vec![-1.0, 1.0, 3.0, 5.0]);
        assert_eq!(maxy, vec![1.0, 1.0, 2.0, 2.0]);
        // The boundary samples are themselves local minima, so the mirrored
        // endpoints take the boundary values.
        assert_eq!(minx, vec![-2.0, 2.0, 6.0]);
        assert_eq!(miny, vec![0.0, 0.0, 0.0]);
        assert_eq!(counts.num_max, 4);
        assert_eq!(counts.num_min, 3);
    }

    #[test]
    fn test_plateau_reported_at_midpoint() {
        let (maxx, maxy, _, _, _) = run(&[0.0, 1.0, 1.0, 0.0]);
        assert_eq!(maxx, vec![-1.5, 1.5, 4.5]);
        assert_eq!(maxy, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_monotone_shoulder_is_not_an_extremum() {
        // Equal neighbours inside a rise contribute neither a max nor a min.
        let (maxx, _, minx, _, counts) = run(&[0.0, 1.0, 1.0, 2.0]);
        assert_eq!(maxx, vec![0.0, 3.0]);
        assert_eq!(minx, vec![0.0, 3.0]);
        assert_eq!(counts.num_max, 2);
        assert_eq!(counts.num_min, 2);
    }

    #[test]
    fn test_boundary_plateau_is_skipped() {
        let (maxx, _, _, _, _) = run(&[2.0, 2.0, 2.0, 1.0, 0.0]);
        // Plateau touches index 0, so there is no interior maximum.
        assert_eq!(maxx, vec![0.0, 4.0]);
    }

    #[test]
    fn test_mirrored_endpoints_cover_the_grid() {
        let n = 64;
        let signal: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 16.0).sin())
            .collect();
        let (maxx, _, minx, _, _) = run(&signal);
        assert!(maxx[0] <= 0.0);
        assert!(*maxx.last().unwrap() >= (n - 1) as f64);
        assert!(minx[0] <= 0.0);
        assert!(*minx.last().unwrap() >= (n - 1) as f64);
        assert!(maxx.windows(2).all(|w| w[0] < w[1]));
        assert!(minx.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_boundary_sample_beyond_the_envelope_wins() {
        let (maxx, maxy, _, _, _) = run(&[5.0, 1.0, 3.0, 1.0, 2.0]);
        assert_eq!(maxx, vec![-2.0, 2.0, 6.0]);
        assert_eq!(maxy, vec![5.0, 3.0, 3.0]);
    }

    #[test]
    fn test_truncated_sinusoid_keeps_flat_envelopes() {
        // The signal ends mid-rise; the mirrored endpoints must stay at ±1,
        // not collapse toward the boundary samples.
        let signal: Vec<f64> = (0..256)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 64.0).sin())
            .collect();
        let (_, maxy, _, miny, _) = run(&signal);
        assert!(maxy.iter().all(|&y| (y - 1.0).abs() < 1e-12));
        assert!(miny.iter().all(|&y| (y + 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_zero_crossings_plain_sign_changes() {
        let (_, _, _, _, counts) = run(&[1.0, -1.0, 1.0, -1.0]);
        assert_eq!(counts.num_zc, 3);
    }

    #[test]
    fn test_zero_run_counts_once() {
        let (_, _, _, _, counts) = run(&[1.0, 0.0, 0.0, -1.0, 1.0]);
        // One crossing at the start of the zero run, one for −1 → 1.
        assert_eq!(counts.num_zc, 2);
    }

    #[test]
    fn test_leading_zeros_count_nothing() {
        let (_, _, _, _, counts) = run(&[0.0, 0.0, 1.0, 2.0]);
        assert_eq!(counts.num_zc, 0);
    }

    #[test]
    fn test_tiny_inputs() {
        let (maxx, maxy, minx, _, counts) = run(&[7.0]);
        assert_eq!(maxx, vec![0.0]);
        assert_eq!(maxy, vec![7.0]);
        assert_eq!(minx, vec![0.0]);
        assert_eq!(counts.num_zc, 0);

        let (maxx, maxy, _, _, _) = run(&[1.0, 2.0]);
        assert_eq!(maxx, vec![0.0, 1.0]);
        assert_eq!(maxy, vec![1.0, 2.0]);
    }

    #[test]
    fn test_find_maxima_matches_joint_detector() {
        let signal: Vec<f64> = (0..128)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 32.0).sin())
            .collect();
        let (mut mx, mut my) = (Vec::new(), Vec::new());
        find_maxima(&signal, &mut mx, &mut my);
        let (maxx, maxy, _, _, _) = run(&signal);
        assert_eq!(mx, maxx);
        assert_eq!(my, maxy);
    }
}
