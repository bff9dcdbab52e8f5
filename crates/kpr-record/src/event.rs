//! Event record layout: per-event scalars plus particle blocks.
//!
//! The particle blocks are struct-of-arrays with owned `Vec` columns.
//! After a successful read every declared count equals the length of each
//! column in its block (the reader clamps and truncates; see
//! [`crate::reader::EventReader::read`]).

use serde::{Deserialize, Serialize};

use crate::schema;

/// Generator-level (truth) particles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenBlock {
    /// Momentum x-components.
    pub px: Vec<f64>,
    /// Momentum y-components.
    pub py: Vec<f64>,
    /// Momentum z-components.
    pub pz: Vec<f64>,
    /// Energies.
    pub e: Vec<f64>,
    /// PDG particle identifiers (signed).
    pub id: Vec<i64>,
    /// Generator status codes.
    pub status: Vec<i64>,
}

/// Reconstructed particles with PID decisions and tagging calibration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoBlock {
    /// Momentum x-components.
    pub px: Vec<f64>,
    /// Momentum y-components.
    pub py: Vec<f64>,
    /// Momentum z-components.
    pub pz: Vec<f64>,
    /// Energies.
    pub e: Vec<f64>,
    /// Electric charges (0.0 for neutrals).
    pub charge: Vec<f64>,
    /// Kaon PID decision level; `>= 2` means tagged.
    pub pid_kaon: Vec<i64>,
    /// Pion PID decision level; `>= 2` means tagged.
    pub pid_pion: Vec<i64>,
    /// Proton PID decision level; `>= 2` means tagged.
    pub pid_proton: Vec<i64>,
    /// Probability for a true kaon at this track's kinematics to be tagged as a kaon.
    pub eff_k_as_k: Vec<f64>,
    /// Probability for a true kaon to be tagged as a pion.
    pub eff_k_as_pi: Vec<f64>,
    /// Probability for a true kaon to be tagged as a proton.
    pub eff_k_as_p: Vec<f64>,
    /// Probability for a true pion to be tagged as a kaon.
    pub eff_pi_as_k: Vec<f64>,
    /// Probability for a true pion to be tagged as a pion.
    pub eff_pi_as_pi: Vec<f64>,
    /// Probability for a true pion to be tagged as a proton.
    pub eff_pi_as_p: Vec<f64>,
    /// Probability for a true proton to be tagged as a kaon.
    pub eff_p_as_k: Vec<f64>,
    /// Probability for a true proton to be tagged as a pion.
    pub eff_p_as_pi: Vec<f64>,
    /// Probability for a true proton to be tagged as a proton.
    pub eff_p_as_p: Vec<f64>,
}

/// Simulation-level particles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimBlock {
    /// Momentum x-components.
    pub px: Vec<f64>,
    /// Momentum y-components.
    pub py: Vec<f64>,
    /// Momentum z-components.
    pub pz: Vec<f64>,
    /// Energies.
    pub e: Vec<f64>,
    /// PDG particle identifiers.
    pub id: Vec<i64>,
}

/// Secondary-vertex candidates (K-short or phi), built from two tracks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateBlock {
    /// Momentum x-components.
    pub px: Vec<f64>,
    /// Momentum y-components.
    pub py: Vec<f64>,
    /// Momentum z-components.
    pub pz: Vec<f64>,
    /// Energies.
    pub e: Vec<f64>,
    /// Index of the first daughter track in the reco block (-1 if unmatched).
    pub reco1: Vec<i64>,
    /// Index of the second daughter track in the reco block (-1 if unmatched).
    pub reco2: Vec<i64>,
}

/// One row of the event stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    /// Run identifier.
    pub run: i64,
    /// Event identifier within the run.
    pub event: i64,
    /// Center-of-mass energy.
    pub ecm: f64,
    /// Charged multiplicity.
    pub nch: i64,
    /// Total charged energy.
    pub total_ech: f64,
    /// Total neutral energy.
    pub total_eneu: f64,
    /// Thrust magnitude.
    pub thrust: f64,
    /// Cosine of the thrust-axis polar angle.
    pub thrust_z: f64,
    /// Declared generator-level particle count.
    pub n_gen: usize,
    /// Generator-level particles.
    pub gen: GenBlock,
    /// Declared reconstructed particle count.
    pub n_reco: usize,
    /// Reconstructed particles.
    pub reco: RecoBlock,
    /// Declared simulation-level particle count.
    pub n_sim: usize,
    /// Simulation-level particles.
    pub sim: SimBlock,
    /// Declared K-short candidate count.
    pub n_kshort: usize,
    /// K-short candidates.
    pub kshort: CandidateBlock,
    /// Declared phi candidate count.
    pub n_phi: usize,
    /// Phi candidates.
    pub phi: CandidateBlock,
}

fn conform_column<T>(
    name: &str,
    column: &mut Vec<T>,
    count: usize,
) -> std::result::Result<(), String> {
    if column.len() < count {
        return Err(format!(
            "column '{name}' has {} values, expected {count}",
            column.len()
        ));
    }
    column.truncate(count);
    Ok(())
}

impl GenBlock {
    fn conform(&mut self, count: usize, prefix: &str) -> std::result::Result<(), String> {
        conform_column(&format!("{prefix}.px"), &mut self.px, count)?;
        conform_column(&format!("{prefix}.py"), &mut self.py, count)?;
        conform_column(&format!("{prefix}.pz"), &mut self.pz, count)?;
        conform_column(&format!("{prefix}.e"), &mut self.e, count)?;
        conform_column(&format!("{prefix}.id"), &mut self.id, count)?;
        conform_column(&format!("{prefix}.status"), &mut self.status, count)?;
        Ok(())
    }
}

impl RecoBlock {
    fn conform(&mut self, count: usize, prefix: &str) -> std::result::Result<(), String> {
        conform_column(&format!("{prefix}.px"), &mut self.px, count)?;
        conform_column(&format!("{prefix}.py"), &mut self.py, count)?;
        conform_column(&format!("{prefix}.pz"), &mut self.pz, count)?;
        conform_column(&format!("{prefix}.e"), &mut self.e, count)?;
        conform_column(&format!("{prefix}.charge"), &mut self.charge, count)?;
        conform_column(&format!("{prefix}.pid_kaon"), &mut self.pid_kaon, count)?;
        conform_column(&format!("{prefix}.pid_pion"), &mut self.pid_pion, count)?;
        conform_column(&format!("{prefix}.pid_proton"), &mut self.pid_proton, count)?;
        conform_column(&format!("{prefix}.eff_k_as_k"), &mut self.eff_k_as_k, count)?;
        conform_column(&format!("{prefix}.eff_k_as_pi"), &mut self.eff_k_as_pi, count)?;
        conform_column(&format!("{prefix}.eff_k_as_p"), &mut self.eff_k_as_p, count)?;
        conform_column(&format!("{prefix}.eff_pi_as_k"), &mut self.eff_pi_as_k, count)?;
        conform_column(&format!("{prefix}.eff_pi_as_pi"), &mut self.eff_pi_as_pi, count)?;
        conform_column(&format!("{prefix}.eff_pi_as_p"), &mut self.eff_pi_as_p, count)?;
        conform_column(&format!("{prefix}.eff_p_as_k"), &mut self.eff_p_as_k, count)?;
        conform_column(&format!("{prefix}.eff_p_as_pi"), &mut self.eff_p_as_pi, count)?;
        conform_column(&format!("{prefix}.eff_p_as_p"), &mut self.eff_p_as_p, count)?;
        Ok(())
    }
}

impl SimBlock {
    fn conform(&mut self, count: usize, prefix: &str) -> std::result::Result<(), String> {
        conform_column(&format!("{prefix}.px"), &mut self.px, count)?;
        conform_column(&format!("{prefix}.py"), &mut self.py, count)?;
        conform_column(&format!("{prefix}.pz"), &mut self.pz, count)?;
        conform_column(&format!("{prefix}.e"), &mut self.e, count)?;
        conform_column(&format!("{prefix}.id"), &mut self.id, count)?;
        Ok(())
    }
}

impl CandidateBlock {
    fn conform(&mut self, count: usize, prefix: &str) -> std::result::Result<(), String> {
        conform_column(&format!("{prefix}.px"), &mut self.px, count)?;
        conform_column(&format!("{prefix}.py"), &mut self.py, count)?;
        conform_column(&format!("{prefix}.pz"), &mut self.pz, count)?;
        conform_column(&format!("{prefix}.e"), &mut self.e, count)?;
        conform_column(&format!("{prefix}.reco1"), &mut self.reco1, count)?;
        conform_column(&format!("{prefix}.reco2"), &mut self.reco2, count)?;
        Ok(())
    }
}

impl EventRecord {
    /// Clamp declared counts to the compiled capacities and truncate every
    /// column to the effective count.
    ///
    /// Returns the categories whose declared count exceeded capacity, or an
    /// error naming the first column shorter than its effective count.
    pub(crate) fn conform(&mut self) -> std::result::Result<Vec<&'static str>, String> {
        let mut clipped = Vec::new();
        if self.n_gen > schema::MAX_GEN {
            self.n_gen = schema::MAX_GEN;
            clipped.push("gen");
        }
        if self.n_reco > schema::MAX_RECO {
            self.n_reco = schema::MAX_RECO;
            clipped.push("reco");
        }
        if self.n_sim > schema::MAX_SIM {
            self.n_sim = schema::MAX_SIM;
            clipped.push("sim");
        }
        if self.n_kshort > schema::MAX_KSHORT {
            self.n_kshort = schema::MAX_KSHORT;
            clipped.push("kshort");
        }
        if self.n_phi > schema::MAX_PHI {
            self.n_phi = schema::MAX_PHI;
            clipped.push("phi");
        }
        self.gen.conform(self.n_gen, "gen")?;
        self.reco.conform(self.n_reco, "reco")?;
        self.sim.conform(self.n_sim, "sim")?;
        self.kshort.conform(self.n_kshort, "kshort")?;
        self.phi.conform(self.n_phi, "phi")?;
        Ok(clipped)
    }
}
