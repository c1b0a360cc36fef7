//! Bounded sample history with angular-sector load balancing.
//!
//! `push` always appends; the buffer may transiently exceed its capacity
//! until the next [`PointCloudBuffer::balance`] pass. Balancing divides the
//! phase circle around the current axis into equal sectors and evicts the
//! oldest points of any sector holding more than its fair share, so stale,
//! over-represented orientations do not crowd out fresh ones as the subject
//! rotates.

use std::f64::consts::TAU;

use crate::axis::AxisFrame;
use crate::math::Pt3;

/// Ordered (oldest-first) sample history, bounded by sector balancing.
#[derive(Debug, Clone)]
pub struct PointCloudBuffer {
    points: Vec<Pt3>,
    capacity: usize,
}

impl PointCloudBuffer {
    /// `capacity` is the target total size enforced by `balance`.
    pub fn new(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest-first view of the surviving samples.
    pub fn points(&self) -> &[Pt3] {
        &self.points
    }

    /// Unconditional append; may exceed capacity until the next balance pass.
    pub fn push(&mut self, sample: Pt3) {
        self.points.push(sample);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Evict points so no angular sector keeps more than
    /// `capacity / num_sectors` of them, dropping the oldest members of each
    /// over-full sector first. Relative order of survivors is preserved
    /// across the whole sequence.
    pub fn balance(&mut self, frame: &AxisFrame, num_sectors: usize) {
        debug_assert!(num_sectors > 0);

        let max_per_sector = self.capacity / num_sectors;
        let step = TAU / num_sectors as f64;

        // Count up how many points are in each sector. Angles are computed
        // once per pass; the id is wrapped with Euclidean remainder so the
        // ±pi boundary can never index out of bounds.
        let mut counts = vec![0usize; num_sectors];
        let mut sector_ids = Vec::with_capacity(self.points.len());
        for p in &self.points {
            let mut id = (frame.angle_of(*p).rem_euclid(TAU) / step) as usize;
            if id >= num_sectors {
                id -= num_sectors;
            }
            sector_ids.push(id);
            counts[id] += 1;
        }

        // Second pass, clean up excess points. `counts[id]` holds the number
        // of not-yet-visited members of the sector (including the current
        // one), so the oldest `counts[id] - max_per_sector` entries are the
        // ones dropped.
        let mut dst = 0;
        for src in 0..self.points.len() {
            let id = sector_ids[src];
            let keep = counts[id] <= max_per_sector;
            counts[id] -= 1;
            if keep {
                self.points[dst] = self.points[src];
                dst += 1;
            }
        }
        self.points.truncate(dst);
    }
}
