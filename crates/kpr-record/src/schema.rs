//! Compiled per-category capacities.
//!
//! Declared counts in the container are an implicit contract with the
//! producer; a count above these maxima is clamped by the reader and
//! diagnosed once per offending entry, never indexed past.

/// Maximum generator-level particles per event.
pub const MAX_GEN: usize = 10_000;

/// Maximum reconstructed particles per event.
pub const MAX_RECO: usize = 10_000;

/// Maximum simulation-level particles per event.
pub const MAX_SIM: usize = 10_000;

/// Maximum K-short candidates per event.
pub const MAX_KSHORT: usize = 4_096;

/// Maximum phi candidates per event.
pub const MAX_PHI: usize = 4_096;
