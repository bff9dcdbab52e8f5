//! Event-level selection.

use serde::Serialize;

use kpr_record::EventRecord;

/// Event selection thresholds.
///
/// Pure predicate over one record; no state is carried across calls.
/// Failing any cut excludes the event from all downstream accumulation.
#[derive(Debug, Clone, Serialize)]
pub struct EventSelection {
    /// Reference center-of-mass energy the reconstructed energy sum is
    /// compared against.
    pub ecm_ref: f64,
    /// Minimum reconstructed-energy fraction, strict `>`.
    pub min_energy_fraction: f64,
    /// Minimum charged multiplicity, inclusive.
    pub min_nch: i64,
    /// Lower edge of the open thrust polar-angle window, radians.
    pub min_theta: f64,
    /// Upper edge of the open thrust polar-angle window, radians.
    pub max_theta: f64,
}

impl Default for EventSelection {
    fn default() -> Self {
        Self {
            ecm_ref: 91.2,
            min_energy_fraction: 0.5,
            min_nch: 7,
            min_theta: 30.0_f64.to_radians(),
            max_theta: 150.0_f64.to_radians(),
        }
    }
}

impl EventSelection {
    /// Build a selection with the angle window given in degrees.
    pub fn with_window_degrees(
        ecm_ref: f64,
        min_nch: i64,
        min_theta_deg: f64,
        max_theta_deg: f64,
    ) -> Self {
        Self {
            ecm_ref,
            min_nch,
            min_theta: min_theta_deg.to_radians(),
            max_theta: max_theta_deg.to_radians(),
            ..Self::default()
        }
    }

    /// Decide whether `event` enters the analysis.
    pub fn accepts(&self, event: &EventRecord) -> bool {
        let sum_reco_e: f64 = event.reco.e.iter().sum();
        if sum_reco_e / self.ecm_ref <= self.min_energy_fraction {
            return false;
        }
        if event.nch < self.min_nch {
            return false;
        }
        let theta = event.thrust_z.acos();
        theta > self.min_theta && theta < self.max_theta
    }
}
