//! Persistence of a calibration state as a structured document.
//!
//! The document stores only the calibration origin and the raw sample list,
//! oldest first. Loading replays every sample through [`CalibrationEngine::ingest`],
//! reconstructing the axis fit, the ranges, and the eviction state from
//! scratch rather than restoring derived values verbatim — a round trip
//! therefore reproduces the *live* state the engine would reach on the same
//! input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::CalibrationEngine;
use spincal_core::Pt3;
use spincal_core::Real;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("malformed calibration document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of a calibration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationDoc {
    /// Calibration zero reference, in radians.
    pub origin: Real,
    /// Retained samples, oldest to newest.
    pub points: Vec<[Real; 3]>,
}

impl CalibrationEngine {
    /// Snapshot the persistable state.
    pub fn to_doc(&self) -> CalibrationDoc {
        CalibrationDoc {
            origin: self.calibrated_origin(),
            points: self.points().iter().map(|p| [p.x, p.y, p.z]).collect(),
        }
    }

    /// Replace the live state with the document's contents.
    ///
    /// The origin is set directly (not derived from live data, as
    /// [`reset_calibrated_origin`](CalibrationEngine::reset_calibrated_origin)
    /// would do); every stored sample is then replayed through `ingest` in
    /// order.
    pub fn load_doc(&mut self, doc: &CalibrationDoc) {
        self.clear();
        self.origin = doc.origin;
        for p in &doc.points {
            self.ingest(Pt3::new(p[0], p[1], p[2]));
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(&self.to_doc())?)
    }

    /// Parse and load a JSON document.
    ///
    /// The document is fully parsed before any live state is touched, so a
    /// malformed input leaves the engine unchanged.
    pub fn load_json(&mut self, json: &str) -> Result<(), PersistError> {
        let doc: CalibrationDoc = serde_json::from_str(json)?;
        self.load_doc(&doc);
        Ok(())
    }
}
