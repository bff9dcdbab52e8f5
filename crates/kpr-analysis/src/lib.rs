//! # kpr-analysis
//!
//! Selection, classification, binned aggregation, confusion-matrix
//! unfolding and ratio building for kaon/pion yields versus the
//! track-multiplicity tag.
//!
//! The entry point is [`Pipeline`]: stream events through
//! [`Pipeline::run`], then call [`Pipeline::finalize`] once to unfold and
//! obtain [`AnalysisResults`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod calibration;
pub mod classify;
pub mod hist;
pub mod pipeline;
pub mod selection;
pub mod unfold;

pub use artifact::{
    AnalysisArtifact, ArtifactMeta, CorrectedArtifact, SeriesArtifact, SCHEMA_VERSION,
};
pub use calibration::{CalibrationAccumulator, PidMatrix};
pub use classify::{
    GenLevelClassifier, RecoPidClassifier, TagCounts, TrackClassifier, PDG_KAON, PDG_PION,
    TAG_LEVEL,
};
pub use hist::BinnedSeries;
pub use pipeline::{AnalysisConfig, AnalysisResults, CorrectedYields, Pipeline, RunCounters};
pub use selection::EventSelection;
pub use unfold::{unfold_yields, UnfoldedYields};
