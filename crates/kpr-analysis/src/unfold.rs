//! Closed-form 2×2 confusion-matrix unfolding of the tagged yields.

use kpr_core::{Error, Result};

use crate::calibration::{CalibrationAccumulator, PidMatrix};
use crate::hist::BinnedSeries;

/// Bias-corrected yields and the matrix that produced them.
#[derive(Debug, Clone)]
pub struct UnfoldedYields {
    /// Corrected kaon yield per tag bin.
    pub kaon: BinnedSeries,
    /// Corrected pion yield per tag bin.
    pub pion: BinnedSeries,
    /// Averaged confusion matrix used for the inversion.
    pub matrix: PidMatrix,
}

/// Invert the averaged confusion matrix over every bin of the raw yields.
///
/// Fails with [`Error::DegenerateCalibration`] when no track was
/// accumulated or the determinant is below
/// [`PidMatrix::MIN_DETERMINANT`]; in either case the corrected series
/// stay absent and the raw yields are unaffected.
pub fn unfold_yields(
    raw_kaon: &BinnedSeries,
    raw_pion: &BinnedSeries,
    calibration: &CalibrationAccumulator,
) -> Result<UnfoldedYields> {
    let matrix = calibration.averages().ok_or_else(|| {
        Error::DegenerateCalibration("no tracks accumulated for efficiency calibration".into())
    })?;
    if matrix.is_degenerate() {
        return Err(Error::DegenerateCalibration(format!(
            "confusion-matrix determinant {:e} below {:e}",
            matrix.determinant(),
            PidMatrix::MIN_DETERMINANT
        )));
    }

    let n_bins = raw_kaon.n_bins();
    let mut kaon = BinnedSeries::new(n_bins);
    let mut pion = BinnedSeries::new(n_bins);
    for bin in 0..n_bins {
        let (true_k, true_pi) = matrix.unfold(raw_kaon.value(bin), raw_pion.value(bin));
        let (err_k, err_pi) = matrix.propagate_errors(raw_kaon.error(bin), raw_pion.error(bin));
        kaon.set_bin(bin, true_k, err_k);
        pion.set_bin(bin, true_pi, err_pi);
    }

    Ok(UnfoldedYields { kaon, pion, matrix })
}
