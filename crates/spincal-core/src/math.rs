use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

pub type Real = f64;

pub type Vec3 = Vector3<Real>;
pub type Pt3 = Point3<Real>;
pub type Mat4 = Matrix4<Real>;

/// Axis-aligned bounding range over 3D points.
///
/// The empty range is represented as a zero-size box at the origin, matching
/// the behaviour consumers expect when no samples have been ingested yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range3 {
    min: Pt3,
    max: Pt3,
}

impl Default for Range3 {
    fn default() -> Self {
        Self {
            min: Pt3::origin(),
            max: Pt3::origin(),
        }
    }
}

impl Range3 {
    /// Degenerate range containing exactly one point.
    pub fn from_point(p: Pt3) -> Self {
        Self { min: p, max: p }
    }

    /// Grow the range to include `p`.
    pub fn include(&mut self, p: Pt3) {
        self.min = self.min.coords.inf(&p.coords).into();
        self.max = self.max.coords.sup(&p.coords).into();
    }

    /// Tight range over an iterator of points, or the default zero box when
    /// the iterator is empty.
    pub fn from_points<I: IntoIterator<Item = Pt3>>(points: I) -> Self {
        let mut iter = points.into_iter();
        match iter.next() {
            Some(first) => {
                let mut range = Self::from_point(first);
                for p in iter {
                    range.include(p);
                }
                range
            }
            None => Self::default(),
        }
    }

    pub fn min(&self) -> Pt3 {
        self.min
    }

    pub fn max(&self) -> Pt3 {
        self.max
    }

    /// Per-axis extent (`max - min`).
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}
