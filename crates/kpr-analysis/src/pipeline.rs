//! Pipeline orchestration: streaming, unfolding, finalized results.
//!
//! The three phases are enforced by ownership. Streaming mutates the
//! pipeline through `&mut self`; [`Pipeline::finalize`] consumes it, runs
//! the single unfolding pass and returns immutable [`AnalysisResults`].
//! Neither phase can be re-entered.

use serde::Serialize;

use kpr_core::{Error, Result};
use kpr_record::{EventReader, EventRecord};

use crate::calibration::CalibrationAccumulator;
use crate::classify::{GenLevelClassifier, RecoPidClassifier, TrackClassifier};
use crate::hist::BinnedSeries;
use crate::selection::EventSelection;
use crate::unfold::unfold_yields;

/// Run configuration.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisConfig {
    /// Maximum multiplicity tag; larger tags fold into the last bin.
    pub max_tag: usize,
    /// Optional cap on the number of entries processed.
    pub max_events: Option<u64>,
    /// Reference center-of-mass energy.
    pub ecm_ref: f64,
    /// Minimum charged multiplicity, inclusive.
    pub min_nch: i64,
    /// Lower thrust polar-angle edge, degrees.
    pub min_theta_deg: f64,
    /// Upper thrust polar-angle edge, degrees.
    pub max_theta_deg: f64,
    /// Count kaons/pions at generator level instead of from PID tags.
    pub gen_level: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_tag: 60,
            max_events: None,
            ecm_ref: 91.2,
            min_nch: 7,
            min_theta_deg: 30.0,
            max_theta_deg: 150.0,
            gen_level: false,
        }
    }
}

/// Stream counters reported alongside the results.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunCounters {
    /// Entries successfully materialized.
    pub events_read: u64,
    /// Entries skipped on read failure.
    pub events_skipped: u64,
    /// Events passing the selection.
    pub events_selected: u64,
    /// Charged tracks accumulated into the calibration sums.
    pub calibration_tracks: u64,
}

/// Corrected yields and their ratio, present only when unfolding ran.
#[derive(Debug, Clone)]
pub struct CorrectedYields {
    /// Corrected kaon yield per tag bin.
    pub kaon: BinnedSeries,
    /// Corrected pion yield per tag bin.
    pub pion: BinnedSeries,
    /// Corrected K/π ratio per tag bin.
    pub ratio: BinnedSeries,
    /// Averaged confusion matrix used for the correction.
    pub matrix: crate::calibration::PidMatrix,
}

/// Immutable results of a finalized run.
#[derive(Debug, Clone)]
pub struct AnalysisResults {
    /// Configuration the run used.
    pub config: AnalysisConfig,
    /// Raw kaon yield per tag bin.
    pub raw_kaon: BinnedSeries,
    /// Raw pion yield per tag bin.
    pub raw_pion: BinnedSeries,
    /// Raw K/π ratio per tag bin.
    pub raw_ratio: BinnedSeries,
    /// Corrected block; `None` when the calibration was degenerate or the
    /// run counted at generator level.
    pub corrected: Option<CorrectedYields>,
    /// Stream counters.
    pub counters: RunCounters,
}

/// One analysis run over an event stream.
pub struct Pipeline {
    config: AnalysisConfig,
    selection: EventSelection,
    classifier: Box<dyn TrackClassifier>,
    calibration: CalibrationAccumulator,
    kaon: BinnedSeries,
    pion: BinnedSeries,
    counters: RunCounters,
}

impl Pipeline {
    /// Build a pipeline, choosing the classifier from the configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        let selection = EventSelection::with_window_degrees(
            config.ecm_ref,
            config.min_nch,
            config.min_theta_deg,
            config.max_theta_deg,
        );
        let classifier: Box<dyn TrackClassifier> = if config.gen_level {
            Box::new(GenLevelClassifier)
        } else {
            Box::new(RecoPidClassifier)
        };
        let n_bins = config.max_tag + 1;
        Self {
            config,
            selection,
            classifier,
            calibration: CalibrationAccumulator::new(),
            kaon: BinnedSeries::new(n_bins),
            pion: BinnedSeries::new(n_bins),
            counters: RunCounters::default(),
        }
    }

    /// Select, classify and fold one event into the aggregators.
    pub fn process_event(&mut self, event: &EventRecord) {
        if !self.selection.accepts(event) {
            return;
        }
        self.counters.events_selected += 1;

        let counts = self.classifier.classify(event, &mut self.calibration);
        let bin = counts.multiplicity_tag.min(self.config.max_tag);
        self.kaon.fill(bin, counts.kaons as f64);
        self.pion.fill(bin, counts.pions as f64);
    }

    /// Stream every entry of `reader` through the pipeline, honoring the
    /// configured event cap.
    ///
    /// Per-entry read failures are logged and skipped; any other reader
    /// error aborts the run.
    pub fn run(&mut self, reader: &mut EventReader<'_>) -> Result<()> {
        let mut entries = reader.entry_count();
        if let Some(cap) = self.config.max_events {
            entries = entries.min(cap as usize);
        }
        tracing::info!(
            entries,
            classifier = self.classifier.name(),
            "starting event loop"
        );

        for index in 0..entries {
            let event = match reader.read(index) {
                Ok(event) => event,
                Err(Error::ReadFailure { index, reason }) => {
                    tracing::warn!(entry = index, %reason, "skipping unreadable record");
                    self.counters.events_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.counters.events_read += 1;
            self.process_event(event);
        }

        tracing::info!(
            read = self.counters.events_read,
            skipped = self.counters.events_skipped,
            selected = self.counters.events_selected,
            "event loop finished"
        );
        Ok(())
    }

    /// Close the stream phase: unfold once, build the ratios and return
    /// the immutable results.
    pub fn finalize(mut self) -> AnalysisResults {
        self.counters.calibration_tracks = self.calibration.tracks();

        let corrected = if self.config.gen_level {
            None
        } else {
            match unfold_yields(&self.kaon, &self.pion, &self.calibration) {
                Ok(unfolded) => {
                    tracing::info!(
                        k_as_k = unfolded.matrix.k_as_k,
                        k_as_pi = unfolded.matrix.k_as_pi,
                        pi_as_k = unfolded.matrix.pi_as_k,
                        pi_as_pi = unfolded.matrix.pi_as_pi,
                        "averaged K/pi confusion matrix"
                    );
                    let ratio = unfolded.kaon.divide(&unfolded.pion);
                    Some(CorrectedYields {
                        kaon: unfolded.kaon,
                        pion: unfolded.pion,
                        ratio,
                        matrix: unfolded.matrix,
                    })
                }
                Err(e) => {
                    tracing::warn!(%e, "skipping PID-matrix correction");
                    None
                }
            }
        };

        let raw_ratio = self.kaon.divide(&self.pion);
        AnalysisResults {
            config: self.config,
            raw_kaon: self.kaon,
            raw_pion: self.pion,
            raw_ratio,
            corrected,
            counters: self.counters,
        }
    }
}
