//! Unit-width binned aggregator with sum-of-squared-weights tracking.

use serde::{Deserialize, Serialize};

/// Weighted per-bin sums over tag bins `0..n_bins`.
///
/// Each bin holds Σw and Σw² under the weighted-fill convention: one fill
/// per event with `weight` equal to the per-event tagged count, so the bin
/// value is the raw count sum and `bin_error = sqrt(Σw²)`.
///
/// Bin indices are pre-clamped by the caller; the aggregator itself never
/// clamps or folds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedSeries {
    sum: Vec<f64>,
    sumw2: Vec<f64>,
}

impl BinnedSeries {
    /// Create an empty series with `n_bins` bins.
    pub fn new(n_bins: usize) -> Self {
        Self {
            sum: vec![0.0; n_bins],
            sumw2: vec![0.0; n_bins],
        }
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.sum.len()
    }

    /// Add `weight` to `bin`'s sum and `weight²` to its squared sum.
    pub fn fill(&mut self, bin: usize, weight: f64) {
        self.sum[bin] += weight;
        self.sumw2[bin] += weight * weight;
    }

    /// Overwrite one bin's value and standard error.
    pub fn set_bin(&mut self, bin: usize, value: f64, error: f64) {
        self.sum[bin] = value;
        self.sumw2[bin] = error * error;
    }

    /// Bin value (Σw).
    pub fn value(&self, bin: usize) -> f64 {
        self.sum[bin]
    }

    /// Bin standard error, `sqrt(Σw²)`.
    pub fn error(&self, bin: usize) -> f64 {
        self.sumw2[bin].sqrt()
    }

    /// Sum over all bins.
    pub fn total(&self) -> f64 {
        self.sum.iter().sum()
    }

    /// True when no bin holds a nonzero value or squared sum.
    pub fn is_empty(&self) -> bool {
        self.sum.iter().all(|&v| v == 0.0) && self.sumw2.iter().all(|&v| v == 0.0)
    }

    /// Bin-wise ratio `self / denominator`.
    ///
    /// A zero denominator bin yields value 0 with error 0 (this covers the
    /// `0/0 = 0` convention). Elsewhere the error combines the relative
    /// variances of numerator and denominator with zero covariance:
    /// `err² = (σn/d)² + (n·σd/d²)²`.
    pub fn divide(&self, denominator: &BinnedSeries) -> BinnedSeries {
        debug_assert_eq!(self.n_bins(), denominator.n_bins());
        let mut out = BinnedSeries::new(self.n_bins());
        for bin in 0..self.n_bins() {
            let n = self.value(bin);
            let d = denominator.value(bin);
            if d == 0.0 {
                continue;
            }
            let ratio = n / d;
            let err_n = self.error(bin);
            let err_d = denominator.error(bin);
            let variance = (err_n / d).powi(2) + (n * err_d / (d * d)).powi(2);
            out.set_bin(bin, ratio, variance.sqrt());
        }
        out
    }
}
