//! Incremental bounding-volume index over axis-aligned boxes.
//!
//! A binary tree of immutable nodes: every insertion consumes the affected
//! path and rebuilds it, so a returned tree never shares mutable state with
//! an older one. Nearby boxes are merged into a single leaf when the union
//! stays within a fixed volume tolerance, which keeps the index at sector
//! granularity instead of one leaf per inserted box.

use crate::bounds::Aabb;

/// Merged-leaf tolerance: a union may grow either input's volume by at most
/// this factor.
const MERGE_VOLUME_LIMIT: f32 = 1.2;

fn can_merge(box1: &Aabb, box2: &Aabb) -> bool {
    let union_volume = box1.union(box2).volume();
    union_volume <= box1.volume() * MERGE_VOLUME_LIMIT
        || union_volume <= box2.volume() * MERGE_VOLUME_LIMIT
}

/// How far `aabb` protrudes beyond `bounds`: per-axis protrusion clamped to
/// zero, taken as a vector length.
fn extension(bounds: &Aabb, aabb: &Aabb) -> f32 {
    let below = (bounds.min - aabb.min).max(glam::Vec3::ZERO);
    let above = (aabb.max - bounds.max).max(glam::Vec3::ZERO);
    (below + above).length()
}

/// Incremental bounding-volume index.
#[derive(Debug, Clone, Default)]
pub struct RTree {
    root: Option<RTreeNode>,
}

impl RTree {
    /// Empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Insert a box, merging it into an existing leaf when the union stays
    /// within tolerance, otherwise splitting the least-extended subtree.
    pub fn insert(&mut self, aabb: Aabb) {
        self.root = Some(match self.root.take() {
            Some(root) => root.insert(aabb),
            None => RTreeNode::Leaf(aabb),
        });
    }

    /// All leaf boxes, collected depth-first. Recomputed on every call.
    #[must_use]
    pub fn boxes(&self) -> Vec<Aabb> {
        let mut result = Vec::new();
        if let Some(root) = &self.root {
            root.collect(&mut result);
        }
        result
    }

    /// Bounds of the whole index, if non-empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_ref().map(RTreeNode::bounds)
    }
}

/// A node owns either a single box (leaf) or exactly two children whose
/// union it caches - no other state is representable.
#[derive(Debug, Clone)]
enum RTreeNode {
    Leaf(Aabb),
    Branch {
        bounds: Aabb,
        children: Box<[RTreeNode; 2]>,
    },
}

impl RTreeNode {
    fn branch(first: Self, second: Self) -> Self {
        Self::Branch {
            bounds: first.bounds().union(&second.bounds()),
            children: Box::new([first, second]),
        }
    }

    fn bounds(&self) -> Aabb {
        match self {
            Self::Leaf(bounds) => *bounds,
            Self::Branch { bounds, .. } => *bounds,
        }
    }

    fn insert(self, aabb: Aabb) -> Self {
        match self {
            Self::Leaf(bounds) => {
                if can_merge(&bounds, &aabb) {
                    Self::Leaf(bounds.union(&aabb))
                } else {
                    Self::branch(Self::Leaf(bounds), Self::Leaf(aabb))
                }
            }
            Self::Branch { children, .. } => {
                let [first, second] = *children;
                // Ties go to the first child.
                if extension(&first.bounds(), &aabb)
                    <= extension(&second.bounds(), &aabb)
                {
                    Self::branch(first.insert(aabb), second)
                } else {
                    Self::branch(first, second.insert(aabb))
                }
            }
        }
    }

    fn collect(&self, result: &mut Vec<Aabb>) {
        match self {
            Self::Leaf(bounds) => result.push(*bounds),
            Self::Branch { children, .. } => {
                children[0].collect(result);
                children[1].collect(result);
            }
        }
    }
}
