//! Save/load round-trip: loading replays the stored samples through the full
//! ingestion pipeline, so a fresh engine ends up in the same live state the
//! original reached on the same input.

use std::f64::consts::TAU;

use approx::assert_relative_eq;
use spincal::{CalibrationEngine, EngineConfig, Pt3};

fn populated_engine() -> CalibrationEngine {
    let mut engine = CalibrationEngine::new(EngineConfig::default()).unwrap();
    for i in 0..10 {
        let theta = TAU * i as f64 / 10.0;
        engine.ingest(Pt3::new(
            10.0 * theta.cos(),
            10.0 * theta.sin(),
            0.02 * (i % 2) as f64,
        ));
    }
    engine.reset_calibrated_origin();
    engine
}

#[test]
fn json_round_trip_reproduces_live_state() {
    let original = populated_engine();
    let json = original.to_json().unwrap();

    let mut restored = CalibrationEngine::new(EngineConfig::default()).unwrap();
    restored.load_json(&json).unwrap();

    assert_eq!(restored.points().len(), original.points().len());
    for (a, b) in restored.points().iter().zip(original.points()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-12);
    }

    assert_relative_eq!(
        restored.calibrated_origin(),
        original.calibrated_origin(),
        epsilon = 1e-12
    );
    assert_relative_eq!(
        restored.current_angle(),
        original.current_angle(),
        epsilon = 1e-9
    );
    assert_relative_eq!(
        restored.calibrated_angle(),
        original.calibrated_angle(),
        epsilon = 1e-9
    );

    assert_relative_eq!(
        restored.range_in_sample_space().size(),
        original.range_in_sample_space().size(),
        epsilon = 1e-9
    );
    assert_relative_eq!(
        restored.range_in_local_space().size(),
        original.range_in_local_space().size(),
        epsilon = 1e-9
    );
}

#[test]
fn loading_replaces_previous_state() {
    let donor = populated_engine();
    let json = donor.to_json().unwrap();

    // The receiving engine already holds unrelated history.
    let mut engine = CalibrationEngine::new(EngineConfig::default()).unwrap();
    engine.ingest(Pt3::new(5.0, 5.0, 5.0));
    engine.ingest(Pt3::new(-5.0, 5.0, 5.0));

    engine.load_json(&json).unwrap();
    assert_eq!(engine.points().len(), donor.points().len());
    assert_relative_eq!(
        engine.calibrated_origin(),
        donor.calibrated_origin(),
        epsilon = 1e-12
    );
}

#[test]
fn empty_engine_round_trips() {
    let engine = CalibrationEngine::new(EngineConfig::default()).unwrap();
    let json = engine.to_json().unwrap();

    let mut restored = CalibrationEngine::new(EngineConfig::default()).unwrap();
    restored.load_json(&json).unwrap();
    assert!(restored.points().is_empty());
    assert_eq!(restored.calibrated_origin(), 0.0);
}
