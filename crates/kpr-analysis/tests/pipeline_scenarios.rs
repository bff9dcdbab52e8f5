//! End-to-end pipeline scenarios: aggregation, overflow, unfolding,
//! degenerate calibration, determinism.

use approx::assert_relative_eq;
use kpr_analysis::{AnalysisArtifact, AnalysisConfig, Pipeline};
use kpr_record::{EventRecord, RecordFile};
use serde_json::json;
use tempfile::NamedTempFile;

/// Build a selected event with `n_kaon` kaon-tagged, `n_pion` pion-tagged
/// and `n_proton` proton-only tracks, all charged, all carrying `eff` as
/// their K/π calibration values.
fn make_event(n_kaon: usize, n_pion: usize, n_proton: usize, eff: (f64, f64, f64, f64)) -> EventRecord {
    let n = n_kaon + n_pion + n_proton;
    let mut event = EventRecord {
        nch: 10,
        thrust_z: 0.0,
        n_reco: n,
        ..EventRecord::default()
    };
    let mut pid_kaon = vec![2; n_kaon];
    pid_kaon.resize(n, 0);
    let mut pid_pion = vec![0; n_kaon];
    pid_pion.resize(n_kaon + n_pion, 2);
    pid_pion.resize(n, 0);
    let mut pid_proton = vec![0; n_kaon + n_pion];
    pid_proton.resize(n, 2);

    event.reco.px = vec![0.1; n];
    event.reco.py = vec![0.2; n];
    event.reco.pz = vec![0.5; n];
    event.reco.e = vec![50.0; n];
    event.reco.charge = vec![1.0; n];
    event.reco.pid_kaon = pid_kaon;
    event.reco.pid_pion = pid_pion;
    event.reco.pid_proton = pid_proton;
    event.reco.eff_k_as_k = vec![eff.0; n];
    event.reco.eff_k_as_pi = vec![eff.1; n];
    event.reco.eff_k_as_p = vec![0.05; n];
    event.reco.eff_pi_as_k = vec![eff.2; n];
    event.reco.eff_pi_as_pi = vec![eff.3; n];
    event.reco.eff_pi_as_p = vec![0.05; n];
    event.reco.eff_p_as_k = vec![0.05; n];
    event.reco.eff_p_as_pi = vec![0.05; n];
    event.reco.eff_p_as_p = vec![0.9; n];
    event
}

const NOMINAL_EFF: (f64, f64, f64, f64) = (0.9, 0.05, 0.05, 0.9);

fn scenario_events() -> Vec<EventRecord> {
    vec![
        // tag 3, one kaon, one pion
        make_event(1, 1, 1, NOMINAL_EFF),
        // tag 3, two kaons, one pion
        make_event(2, 1, 0, NOMINAL_EFF),
        // tag 70, overflow, no kaons or pions
        make_event(0, 0, 70, NOMINAL_EFF),
        // tag 5, one kaon, two pions
        make_event(1, 2, 2, NOMINAL_EFF),
    ]
}

#[test]
fn concrete_scenario_bins_and_ratio() {
    let mut pipeline = Pipeline::new(AnalysisConfig::default());
    for event in scenario_events() {
        pipeline.process_event(&event);
    }
    let results = pipeline.finalize();

    assert_eq!(results.raw_kaon.value(3), 3.0);
    assert_eq!(results.raw_kaon.value(60), 0.0);
    assert_eq!(results.raw_kaon.value(5), 1.0);
    assert_eq!(results.raw_pion.value(3), 2.0);

    assert_relative_eq!(results.raw_ratio.value(3), 1.5);
    // err² = (σk/π)² + (k·σπ/π²)² with σk² = 1² + 2² = 5, σπ² = 1 + 1 = 2
    let expected = ((5.0_f64.sqrt() / 2.0).powi(2) + (3.0 * 2.0_f64.sqrt() / 4.0).powi(2)).sqrt();
    assert_relative_eq!(results.raw_ratio.error(3), expected);
}

#[test]
fn overflow_goes_to_last_bin_and_nothing_is_dropped() {
    let events = vec![
        make_event(2, 1, 60, NOMINAL_EFF), // tag 63 -> bin 60
        make_event(1, 0, 65, NOMINAL_EFF), // tag 66 -> bin 60
        make_event(1, 1, 0, NOMINAL_EFF),  // tag 2
    ];
    let mut pipeline = Pipeline::new(AnalysisConfig::default());
    for event in &events {
        pipeline.process_event(event);
    }
    let results = pipeline.finalize();

    assert_eq!(results.raw_kaon.value(60), 3.0);
    assert_eq!(results.raw_pion.value(60), 1.0);

    // Brute-force totals over the input match the sums across all bins.
    let total_k: f64 = events
        .iter()
        .map(|e| e.reco.pid_kaon.iter().filter(|&&l| l >= 2).count() as f64)
        .sum();
    let total_pi: f64 = events
        .iter()
        .map(|e| e.reco.pid_pion.iter().filter(|&&l| l >= 2).count() as f64)
        .sum();
    assert_eq!(results.raw_kaon.total(), total_k);
    assert_eq!(results.raw_pion.total(), total_pi);
}

#[test]
fn raw_aggregation_is_order_independent() {
    let events = scenario_events();

    let mut forward = Pipeline::new(AnalysisConfig::default());
    for event in &events {
        forward.process_event(event);
    }
    let mut backward = Pipeline::new(AnalysisConfig::default());
    for event in events.iter().rev() {
        backward.process_event(event);
    }

    let forward = forward.finalize();
    let backward = backward.finalize();
    assert_eq!(forward.raw_kaon, backward.raw_kaon);
    assert_eq!(forward.raw_pion, backward.raw_pion);
}

#[test]
fn unfolding_recovers_true_yields() {
    // One event: 9 kaon-tagged and 1 pion-tagged charged tracks, all with
    // the nominal calibration matrix. Averages equal the per-track values
    // and the inversion maps (9, 1) back near (10, 0).
    let mut pipeline = Pipeline::new(AnalysisConfig::default());
    pipeline.process_event(&make_event(9, 1, 0, NOMINAL_EFF));
    let results = pipeline.finalize();

    assert_eq!(results.counters.calibration_tracks, 10);
    let corrected = results.corrected.expect("calibration is well-conditioned");
    assert_relative_eq!(corrected.matrix.k_as_k, 0.9);
    assert_relative_eq!(corrected.matrix.pi_as_pi, 0.9);

    let bin = 10; // multiplicity tag of the event
    assert_relative_eq!(corrected.kaon.value(bin), 10.0, epsilon = 0.1);
    assert!(corrected.pion.value(bin) < 0.6);
}

#[test]
fn corrected_yields_are_never_negative() {
    // Calibration engineered so the analytic inversion of the pion bin
    // would go negative before the floor.
    let mut pipeline = Pipeline::new(AnalysisConfig::default());
    pipeline.process_event(&make_event(12, 0, 0, (0.7, 0.3, 0.05, 0.9)));
    let results = pipeline.finalize();

    let corrected = results.corrected.expect("calibration is well-conditioned");
    for bin in 0..=60 {
        assert!(corrected.kaon.value(bin) >= 0.0);
        assert!(corrected.pion.value(bin) >= 0.0);
    }
}

#[test]
fn degenerate_determinant_leaves_corrected_empty() {
    // Identical rows: determinant is exactly zero.
    let mut pipeline = Pipeline::new(AnalysisConfig::default());
    pipeline.process_event(&make_event(2, 2, 0, (0.5, 0.5, 0.5, 0.5)));
    let results = pipeline.finalize();

    assert!(results.corrected.is_none());
    // Raw outputs are unaffected by the skipped correction.
    assert_eq!(results.raw_kaon.value(4), 2.0);
    assert_eq!(results.raw_pion.value(4), 2.0);
}

#[test]
fn no_calibration_tracks_leaves_corrected_empty() {
    // All tracks neutral: tagged yields fill but nothing is accumulated.
    let mut event = make_event(1, 1, 0, NOMINAL_EFF);
    event.reco.charge = vec![0.0; 2];

    let mut pipeline = Pipeline::new(AnalysisConfig::default());
    pipeline.process_event(&event);
    let results = pipeline.finalize();

    assert_eq!(results.counters.calibration_tracks, 0);
    assert!(results.corrected.is_none());
    assert_eq!(results.raw_kaon.value(2), 1.0);
}

#[test]
fn gen_level_counts_truth_and_skips_correction() {
    let mut event = make_event(1, 1, 0, NOMINAL_EFF);
    event.n_gen = 4;
    event.gen.px = vec![0.0; 4];
    event.gen.py = vec![0.0; 4];
    event.gen.pz = vec![0.0; 4];
    event.gen.e = vec![0.0; 4];
    event.gen.id = vec![321, -321, -211, 2212];
    event.gen.status = vec![1; 4];

    let config = AnalysisConfig {
        gen_level: true,
        ..AnalysisConfig::default()
    };
    let mut pipeline = Pipeline::new(config);
    pipeline.process_event(&event);
    let results = pipeline.finalize();

    // Multiplicity tag from the two reco-tagged tracks; counts from truth.
    assert_eq!(results.raw_kaon.value(2), 2.0);
    assert_eq!(results.raw_pion.value(2), 1.0);
    assert!(results.corrected.is_none());
    assert_eq!(results.counters.calibration_tracks, 0);
}

fn write_container(events: &[EventRecord]) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    let values: Vec<serde_json::Value> = events
        .iter()
        .map(|e| serde_json::to_value(e).unwrap())
        .collect();
    let container = json!({ "record_sets": { "events": values } });
    std::fs::write(file.path(), serde_json::to_string(&container).unwrap()).unwrap();
    file
}

fn run_from_container(file: &NamedTempFile, config: AnalysisConfig) -> AnalysisArtifact {
    let rf = RecordFile::open(file.path()).unwrap();
    let mut reader = rf.record_set("events").unwrap();
    let mut pipeline = Pipeline::new(config);
    pipeline.run(&mut reader).unwrap();
    AnalysisArtifact::from_results(&pipeline.finalize())
}

#[test]
fn identical_runs_are_bit_identical() {
    let file = write_container(&scenario_events());
    let first = run_from_container(&file, AnalysisConfig::default());
    let second = run_from_container(&file, AnalysisConfig::default());
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn event_cap_truncates_the_stream() {
    let file = write_container(&scenario_events());
    let config = AnalysisConfig {
        max_events: Some(2),
        ..AnalysisConfig::default()
    };
    let artifact = run_from_container(&file, config);
    assert_eq!(artifact.meta.events_read, 2);
    // Only the two tag-3 events were processed.
    assert_eq!(artifact.raw_kaon.values[3], 3.0);
    assert_eq!(artifact.raw_kaon.values[5], 0.0);
}

#[test]
fn unreadable_records_are_skipped_not_fatal() {
    let events = scenario_events();
    let file = NamedTempFile::new().unwrap();
    let mut values: Vec<serde_json::Value> = events
        .iter()
        .map(|e| serde_json::to_value(e).unwrap())
        .collect();
    // Corrupt the second record's reco block.
    values[1]["reco"]["e"] = json!([1.0]);
    let container = json!({ "record_sets": { "events": values } });
    std::fs::write(file.path(), serde_json::to_string(&container).unwrap()).unwrap();

    let rf = RecordFile::open(file.path()).unwrap();
    let mut reader = rf.record_set("events").unwrap();
    let mut pipeline = Pipeline::new(AnalysisConfig::default());
    pipeline.run(&mut reader).unwrap();
    let results = pipeline.finalize();

    assert_eq!(results.counters.events_read, 3);
    assert_eq!(results.counters.events_skipped, 1);
    // The corrupted tag-3 event is gone; the other one still filled.
    assert_eq!(results.raw_kaon.value(3), 1.0);
}
