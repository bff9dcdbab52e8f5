//! Running K/π tagging-calibration sums and the averaged confusion matrix.

use serde::Serialize;

/// Running sums of per-track K/π calibration values.
///
/// Fed once per charged reconstructed track across the whole stream,
/// regardless of the track's tag status; read once after stream
/// exhaustion. Never reset mid-stream.
#[derive(Debug, Clone, Default)]
pub struct CalibrationAccumulator {
    sum_k_as_k: f64,
    sum_k_as_pi: f64,
    sum_pi_as_k: f64,
    sum_pi_as_pi: f64,
    tracks: u64,
}

impl CalibrationAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one charged track's four calibration values.
    pub fn add(&mut self, k_as_k: f64, k_as_pi: f64, pi_as_k: f64, pi_as_pi: f64) {
        self.sum_k_as_k += k_as_k;
        self.sum_k_as_pi += k_as_pi;
        self.sum_pi_as_k += pi_as_k;
        self.sum_pi_as_pi += pi_as_pi;
        self.tracks += 1;
    }

    /// Number of tracks accumulated.
    pub fn tracks(&self) -> u64 {
        self.tracks
    }

    /// Averaged confusion matrix, or `None` when no track was accumulated.
    pub fn averages(&self) -> Option<PidMatrix> {
        if self.tracks == 0 {
            return None;
        }
        let n = self.tracks as f64;
        Some(PidMatrix {
            k_as_k: self.sum_k_as_k / n,
            k_as_pi: self.sum_k_as_pi / n,
            pi_as_k: self.sum_pi_as_k / n,
            pi_as_pi: self.sum_pi_as_pi / n,
        })
    }
}

/// Averaged 2×2 K/π confusion matrix.
///
/// Maps true populations to tagged populations:
///
/// ```text
/// [ N(tag K) ]   [ k_as_k   pi_as_k  ] [ N_true(K) ]
/// [ N(tag π) ] = [ k_as_pi  pi_as_pi ] [ N_true(π) ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PidMatrix {
    /// Average probability for a true kaon to be tagged as a kaon.
    pub k_as_k: f64,
    /// Average probability for a true kaon to be tagged as a pion.
    pub k_as_pi: f64,
    /// Average probability for a true pion to be tagged as a kaon.
    pub pi_as_k: f64,
    /// Average probability for a true pion to be tagged as a pion.
    pub pi_as_pi: f64,
}

impl PidMatrix {
    /// Determinant magnitude below which the inversion is skipped as
    /// numerically unstable.
    pub const MIN_DETERMINANT: f64 = 1e-8;

    /// `k_as_k·pi_as_pi − pi_as_k·k_as_pi`.
    pub fn determinant(&self) -> f64 {
        self.k_as_k * self.pi_as_pi - self.pi_as_k * self.k_as_pi
    }

    /// True when the determinant is too small to invert safely.
    pub fn is_degenerate(&self) -> bool {
        self.determinant().abs() < Self::MIN_DETERMINANT
    }

    /// Solve the 2×2 system for one bin's tagged counts.
    ///
    /// Small negative estimates from statistical fluctuations are floored
    /// at zero. The caller must check [`is_degenerate`](Self::is_degenerate)
    /// first.
    pub fn unfold(&self, tag_k: f64, tag_pi: f64) -> (f64, f64) {
        let det = self.determinant();
        let true_k = (self.pi_as_pi * tag_k - self.pi_as_k * tag_pi) / det;
        let true_pi = (-self.k_as_pi * tag_k + self.k_as_k * tag_pi) / det;
        (true_k.max(0.0), true_pi.max(0.0))
    }

    /// Propagate tagged-bin errors through the inversion, treating the
    /// transform as linear with fixed coefficients and the two inputs as
    /// uncorrelated.
    pub fn propagate_errors(&self, err_tag_k: f64, err_tag_pi: f64) -> (f64, f64) {
        let det = self.determinant();
        let err_true_k = ((self.pi_as_pi * err_tag_k / det).powi(2)
            + (self.pi_as_k * err_tag_pi / det).powi(2))
        .sqrt();
        let err_true_pi = ((self.k_as_pi * err_tag_k / det).powi(2)
            + (self.k_as_k * err_tag_pi / det).powi(2))
        .sqrt();
        (err_true_k, err_true_pi)
    }
}
