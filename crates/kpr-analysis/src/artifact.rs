//! Plot-friendly JSON artifact for the finalized results.

use serde::Serialize;

use crate::calibration::PidMatrix;
use crate::hist::BinnedSeries;
use crate::pipeline::{AnalysisConfig, AnalysisResults};

/// Artifact layout version.
pub const SCHEMA_VERSION: &str = "1";

/// One named binned series as (bin center, value, standard error) columns.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesArtifact {
    /// Series name.
    pub name: String,
    /// Bin centers (the tag value of each bin).
    pub bin_centers: Vec<f64>,
    /// Bin values.
    pub values: Vec<f64>,
    /// Bin standard errors.
    pub errors: Vec<f64>,
}

impl SeriesArtifact {
    /// Flatten a [`BinnedSeries`] into columns.
    pub fn from_series(name: &str, series: &BinnedSeries) -> Self {
        let n = series.n_bins();
        Self {
            name: name.to_string(),
            bin_centers: (0..n).map(|bin| bin as f64).collect(),
            values: (0..n).map(|bin| series.value(bin)).collect(),
            errors: (0..n).map(|bin| series.error(bin)).collect(),
        }
    }
}

/// Run metadata echoed into the artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactMeta {
    /// Producing tool name.
    pub tool: String,
    /// Producing tool version.
    pub tool_version: String,
    /// Configuration the run used.
    pub config: AnalysisConfig,
    /// Entries successfully materialized.
    pub events_read: u64,
    /// Entries skipped on read failure.
    pub events_skipped: u64,
    /// Events passing the selection.
    pub events_selected: u64,
    /// Charged tracks accumulated into the calibration sums.
    pub calibration_tracks: u64,
}

/// Corrected-yield block, present only when unfolding ran.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectedArtifact {
    /// Averaged confusion matrix used for the correction.
    pub pid_matrix: PidMatrix,
    /// Corrected kaon yield.
    pub kaon: SeriesArtifact,
    /// Corrected pion yield.
    pub pion: SeriesArtifact,
    /// Corrected K/π ratio.
    pub ratio: SeriesArtifact,
}

/// Full results artifact.
///
/// The corrected block is omitted entirely (not zero-filled) when the
/// calibration was degenerate or the run counted at generator level, so
/// downstream consumers can tell "no correction" apart from "corrected
/// to zero".
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisArtifact {
    /// Artifact layout version.
    pub schema_version: String,
    /// Run metadata.
    pub meta: ArtifactMeta,
    /// Raw kaon yield.
    pub raw_kaon: SeriesArtifact,
    /// Raw pion yield.
    pub raw_pion: SeriesArtifact,
    /// Raw K/π ratio.
    pub raw_ratio: SeriesArtifact,
    /// Corrected yields and ratio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected: Option<CorrectedArtifact>,
}

impl AnalysisArtifact {
    /// Assemble the artifact from finalized results.
    pub fn from_results(results: &AnalysisResults) -> Self {
        let corrected = results.corrected.as_ref().map(|c| CorrectedArtifact {
            pid_matrix: c.matrix,
            kaon: SeriesArtifact::from_series("corrected_kaon", &c.kaon),
            pion: SeriesArtifact::from_series("corrected_pion", &c.pion),
            ratio: SeriesArtifact::from_series("corrected_ratio", &c.ratio),
        });
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            meta: ArtifactMeta {
                tool: "kpr".to_string(),
                tool_version: kpr_core::VERSION.to_string(),
                config: results.config.clone(),
                events_read: results.counters.events_read,
                events_skipped: results.counters.events_skipped,
                events_selected: results.counters.events_selected,
                calibration_tracks: results.counters.calibration_tracks,
            },
            raw_kaon: SeriesArtifact::from_series("raw_kaon", &results.raw_kaon),
            raw_pion: SeriesArtifact::from_series("raw_pion", &results.raw_pion),
            raw_ratio: SeriesArtifact::from_series("raw_ratio", &results.raw_ratio),
            corrected,
        }
    }
}
