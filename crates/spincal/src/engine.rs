//! The ingestion state machine tying the buffer, the fit, and the angle
//! readout together.
//!
//! Every `ingest` call runs to completion: append the sample, recompute the
//! bounding ranges, refine the axis (warm-started), rebalance the buffer
//! against the refreshed frame, then judge whether the fit is still
//! disc-shaped. Readers never observe a half-applied update. The engine is
//! single-threaded by design; callers using it from several threads must
//! serialize access themselves.

use std::time::{Duration, Instant};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use spincal_core::{AxisFrame, AxisParams, Mat4, PointCloudBuffer, Pt3, Range3, Real};
use spincal_optim::{solve_axis, SolveOptions};

/// Buffer occupancy above which the degeneracy check is armed.
const RESET_MIN_POINTS: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("capacity must be positive")]
    ZeroCapacity,
    #[error("sector count must be positive")]
    ZeroSectors,
    #[error("capacity {capacity} is below sector count {sectors}")]
    CapacityBelowSectors { capacity: usize, sectors: usize },
}

/// Tuning knobs for the calibration engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Target total number of retained samples.
    pub capacity: usize,
    /// Number of equal angular sectors used for eviction balancing.
    pub num_sectors: usize,
    /// Maximum local-space extent along the fitted axis before the sample set
    /// is judged not disc-shaped and the fit restarts.
    pub z_limit: Real,
    /// Minimum local-space XY spread (radius around the axis) for the
    /// reported angle to be considered meaningful.
    pub xy_threshold: Real,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            num_sectors: 8,
            z_limit: 7.0,
            xy_threshold: 5.0,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.num_sectors == 0 {
            return Err(ConfigError::ZeroSectors);
        }
        if self.capacity < self.num_sectors {
            return Err(ConfigError::CapacityBelowSectors {
                capacity: self.capacity,
                sectors: self.num_sectors,
            });
        }
        Ok(())
    }
}

/// Incremental, self-correcting rotary calibration engine.
///
/// Maintains a bounded 3D point cloud of color-space samples, keeps a line
/// fitted through it, and derives a stable rotation angle from the fit. The
/// fit self-heals: when the accumulated samples stop looking disc-shaped
/// (spread perpendicular to the axis, little spread along it) the whole
/// history is discarded and the fit restarts from scratch.
#[derive(Debug)]
pub struct CalibrationEngine {
    config: EngineConfig,
    solve_opts: SolveOptions,
    buffer: PointCloudBuffer,
    params: AxisParams,
    frame: AxisFrame,
    current: Pt3,
    pub(crate) origin: Real,
    range_sample: Range3,
    range_local: Range3,
    last_ingest: Instant,
}

impl CalibrationEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            solve_opts: SolveOptions::default(),
            buffer: PointCloudBuffer::new(config.capacity),
            params: AxisParams::default(),
            frame: AxisFrame::default(),
            current: Pt3::origin(),
            origin: 0.0,
            range_sample: Range3::default(),
            range_local: Range3::default(),
            last_ingest: Instant::now(),
        })
    }

    /// Feed one color-space sample through the full update pipeline.
    pub fn ingest(&mut self, sample: Pt3) {
        self.last_ingest = Instant::now();
        self.current = sample;
        self.buffer.push(sample);

        // Ranges are taken against the frame from the previous solve; the
        // degeneracy check below therefore judges the fit that produced the
        // current local coordinates.
        self.recompute_ranges();

        self.params = solve_axis(self.buffer.points(), self.params, &self.solve_opts);
        self.frame = AxisFrame::from_params(&self.params);

        self.buffer.balance(&self.frame, self.config.num_sectors);

        if self.buffer.len() > RESET_MIN_POINTS
            && self.range_local.size().z > self.config.z_limit
        {
            // Solution isn't disc-shaped enough; start over.
            debug!(
                "axial extent {:.2} exceeds limit {:.2} with {} samples; resetting fit",
                self.range_local.size().z,
                self.config.z_limit,
                self.buffer.len()
            );
            self.clear();
        }
    }

    /// Component-wise convenience for producers that hand over raw channels.
    pub fn ingest_components(&mut self, r: Real, g: Real, b: Real) {
        self.ingest(Pt3::new(r, g, b));
    }

    /// Discard the sample history and revert the fit to its defaults.
    ///
    /// The calibration origin and the most recent sample survive, so a
    /// consumer keeps a continuous (if momentarily unreliable) angle readout
    /// across the restart.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.params = AxisParams::default();
        self.frame = AxisFrame::default();
        self.range_sample = Range3::default();
        self.range_local = Range3::default();
    }

    /// Oldest-first view of the retained samples.
    pub fn points(&self) -> &[Pt3] {
        self.buffer.points()
    }

    /// The most recently ingested sample.
    pub fn current_point(&self) -> Pt3 {
        self.current
    }

    /// Rotational phase of the most recent sample around the fitted axis.
    pub fn current_angle(&self) -> Real {
        self.frame.angle_of(self.current)
    }

    /// Current angle relative to the user-set zero reference.
    pub fn calibrated_angle(&self) -> Real {
        self.current_angle() - self.origin
    }

    /// Arm a new zero reference at the current angle.
    pub fn reset_calibrated_origin(&mut self) {
        self.origin = self.current_angle();
    }

    /// Whether the samples spread wide enough around the axis for the angle
    /// to be meaningful; close to the axis, `atan2` is dominated by noise.
    pub fn is_angle_reliable(&self) -> bool {
        let size = self.range_local.size();
        let xy_sq = size.x * size.x + size.y * size.y;
        xy_sq >= self.config.xy_threshold * self.config.xy_threshold
    }

    /// Bounding range of the retained samples in sample space.
    pub fn range_in_sample_space(&self) -> &Range3 {
        &self.range_sample
    }

    /// Bounding range of the retained samples in the fitted local frame.
    pub fn range_in_local_space(&self) -> &Range3 {
        &self.range_local
    }

    pub fn local_to_world(&self) -> &Mat4 {
        self.frame.local_to_world()
    }

    pub fn world_to_local(&self) -> &Mat4 {
        self.frame.world_to_local()
    }

    /// Fitted axis parameters of the last solve.
    pub fn axis_params(&self) -> AxisParams {
        self.params
    }

    /// Zero reference for the calibrated angle, in radians.
    pub fn calibrated_origin(&self) -> Real {
        self.origin
    }

    /// Monotonic time elapsed since the last `ingest`.
    pub fn time_since_last_ingest(&self) -> Duration {
        self.last_ingest.elapsed()
    }

    fn recompute_ranges(&mut self) {
        let points = self.buffer.points();
        self.range_sample = Range3::from_points(points.iter().copied());
        self.range_local = Range3::from_points(points.iter().map(|p| self.frame.to_local(*p)));
    }
}
