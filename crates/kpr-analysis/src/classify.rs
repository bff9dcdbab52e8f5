//! Per-track classification strategies.
//!
//! One classifier implementation exists per counting mode, chosen once per
//! run; the hot loop never branches on the mode.

use kpr_record::EventRecord;

use crate::calibration::CalibrationAccumulator;

/// Minimum PID decision level counted as a tag.
pub const TAG_LEVEL: i64 = 2;

/// PDG identifier of the charged kaon.
pub const PDG_KAON: i64 = 321;

/// PDG identifier of the charged pion.
pub const PDG_PION: i64 = 211;

/// Per-event tag counts produced by a classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagCounts {
    /// Tracks tagged as kaon, pion or proton candidates (non-exclusive),
    /// before clamping to the configured maximum.
    pub multiplicity_tag: usize,
    /// Kaon count for the yield fill.
    pub kaons: usize,
    /// Pion count for the yield fill.
    pub pions: usize,
}

/// Classification strategy over one selected event.
pub trait TrackClassifier: Send + Sync {
    /// Count tagged tracks and, where the mode calls for it, feed the
    /// calibration accumulator.
    fn classify(&self, event: &EventRecord, calibration: &mut CalibrationAccumulator)
        -> TagCounts;

    /// Mode name for logging.
    fn name(&self) -> &'static str;
}

/// Count the multiplicity-tagged reconstructed tracks: kaon, pion or
/// proton decision level at or above [`TAG_LEVEL`], any one suffices.
fn multiplicity_tag(event: &EventRecord) -> usize {
    let reco = &event.reco;
    let mut tagged = 0;
    for i in 0..event.n_reco {
        if reco.pid_kaon[i] >= TAG_LEVEL
            || reco.pid_pion[i] >= TAG_LEVEL
            || reco.pid_proton[i] >= TAG_LEVEL
        {
            tagged += 1;
        }
    }
    tagged
}

/// Reconstructed-level classifier: PID decision levels drive the yield
/// counts, and every charged track feeds the calibration accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoPidClassifier;

impl TrackClassifier for RecoPidClassifier {
    fn classify(
        &self,
        event: &EventRecord,
        calibration: &mut CalibrationAccumulator,
    ) -> TagCounts {
        let reco = &event.reco;
        let mut counts = TagCounts::default();
        for i in 0..event.n_reco {
            let kaon_tag = reco.pid_kaon[i] >= TAG_LEVEL;
            let pion_tag = reco.pid_pion[i] >= TAG_LEVEL;
            let proton_tag = reco.pid_proton[i] >= TAG_LEVEL;

            if kaon_tag || pion_tag || proton_tag {
                counts.multiplicity_tag += 1;
            }
            // Tag categories are not mutually exclusive: a track may count
            // as both kaon and pion.
            if kaon_tag {
                counts.kaons += 1;
            }
            if pion_tag {
                counts.pions += 1;
            }

            // Calibration values average over all charged tracks,
            // independent of tag status.
            if reco.charge[i] != 0.0 {
                calibration.add(
                    reco.eff_k_as_k[i],
                    reco.eff_k_as_pi[i],
                    reco.eff_pi_as_k[i],
                    reco.eff_pi_as_pi[i],
                );
            }
        }
        counts
    }

    fn name(&self) -> &'static str {
        "reco"
    }
}

/// Generator-level classifier: kaons and pions counted from truth PDG
/// identifiers. The multiplicity tag still comes from reconstructed PID
/// tags; no calibration is accumulated.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenLevelClassifier;

impl TrackClassifier for GenLevelClassifier {
    fn classify(
        &self,
        event: &EventRecord,
        _calibration: &mut CalibrationAccumulator,
    ) -> TagCounts {
        let mut counts = TagCounts {
            multiplicity_tag: multiplicity_tag(event),
            ..TagCounts::default()
        };
        for i in 0..event.n_gen {
            let abs_id = event.gen.id[i].abs();
            if abs_id == PDG_KAON {
                counts.kaons += 1;
            }
            if abs_id == PDG_PION {
                counts.pions += 1;
            }
        }
        counts
    }

    fn name(&self) -> &'static str {
        "gen"
    }
}
