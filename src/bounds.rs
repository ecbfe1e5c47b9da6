//! Axis-aligned bounding boxes and overlap metrics.

use glam::Vec3;

/// Axis-aligned bounding box.
///
/// Plain `Copy` value - merging and indexing operate on copies, so callers
/// can never alias a box held by the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Box from its two corners.
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Per-axis extent.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Enclosed volume.
    #[must_use]
    pub fn volume(&self) -> f32 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Smallest box containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Overlap of `self` and `other`, collapsed to a zero-extent box along
    /// any axis where they are disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max).max(min);
        Self { min, max }
    }
}

/// Intersection-over-union volume ratio in [0, 1]; 0 when the boxes are
/// disjoint. Not used by the index itself - a general overlap metric for
/// consumers.
#[must_use]
pub fn iou(box1: &Aabb, box2: &Aabb) -> f32 {
    let union_volume = box1.union(box2).volume();
    if union_volume <= 0.0 {
        return 0.0;
    }
    box1.intersection(box2).volume() / union_volume
}
