//! Fixed record-size tables and the runtime attribute layout map.
//!
//! Input records are packed by the offline converter with the exact strides
//! in [`PrimitiveVariant::stride`]; output records use the strides in
//! [`OutputKind::stride`] but leave per-attribute byte offsets to the
//! consumer via [`AttributeLayout`], so the GPU attribute scheme can change
//! without touching transcoder logic.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Input primitive record variants.
///
/// A sector buffer holds a homogeneous sequence of one variant; every record
/// starts with a float32 tree index, a 4-byte color and an (unused) float32
/// diagonal before the variant-specific geometry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveVariant {
    /// Oriented box.
    Box,
    /// Flat disc.
    Circle,
    /// Cone with cap circles.
    ClosedCone,
    /// Cone without caps.
    OpenCone,
    /// Eccentric cone with cap circles.
    ClosedEccentricCone,
    /// Eccentric cone without caps.
    OpenEccentricCone,
    /// Partial-arc cone without caps.
    OpenGeneralCone,
    /// Partial-arc cone with cap rings.
    ClosedGeneralCone,
    /// Hollow-walled partial-arc cone, open ends.
    SolidOpenGeneralCone,
    /// Hollow-walled partial-arc cone, closed ends.
    SolidClosedGeneralCone,
    /// Cylinder without caps.
    OpenCylinder,
    /// Cylinder with cap circles.
    ClosedCylinder,
    /// Partial-arc cylinder with tilted caps, open.
    OpenGeneralCylinder,
    /// Partial-arc cylinder with tilted caps, closed.
    ClosedGeneralCylinder,
    /// Hollow-walled general cylinder, open ends.
    SolidOpenGeneralCylinder,
    /// Hollow-walled general cylinder, closed ends.
    SolidClosedGeneralCylinder,
    /// Full ellipsoid.
    Ellipsoid,
    /// Ellipsoid segment without a cap.
    OpenEllipsoidSegment,
    /// Ellipsoid segment with a cap circle.
    ClosedEllipsoidSegment,
    /// Full extruded ring (tube wall with cap rings).
    ExtrudedRing,
    /// Partial extruded ring, open ends.
    OpenExtrudedRingSegment,
    /// Partial extruded ring with end quads.
    ClosedExtrudedRingSegment,
    /// Hexagonal nut.
    Nut,
    /// Flat annulus.
    Ring,
    /// Full sphere.
    Sphere,
    /// Sphere segment without a cap.
    OpenSphericalSegment,
    /// Sphere segment with a cap circle.
    ClosedSphericalSegment,
    /// Full torus.
    Torus,
    /// Partial torus, open ends.
    OpenTorusSegment,
    /// Partial torus, closed ends.
    ClosedTorusSegment,
}

impl PrimitiveVariant {
    /// Exact byte size of one record of this variant.
    #[must_use]
    pub const fn stride(self) -> usize {
        match self {
            Self::Sphere => 28,
            Self::Circle => 40,
            Self::OpenCylinder
            | Self::ClosedCylinder
            | Self::Ring
            | Self::OpenSphericalSegment
            | Self::ClosedSphericalSegment
            | Self::Torus => 44,
            Self::ClosedCone
            | Self::OpenCone
            | Self::Ellipsoid
            | Self::OpenEllipsoidSegment
            | Self::ClosedEllipsoidSegment
            | Self::ExtrudedRing
            | Self::Nut => 48,
            Self::Box
            | Self::OpenTorusSegment
            | Self::ClosedTorusSegment => 52,
            Self::OpenExtrudedRingSegment
            | Self::ClosedExtrudedRingSegment => 56,
            Self::ClosedEccentricCone | Self::OpenEccentricCone => 60,
            Self::OpenGeneralCylinder | Self::ClosedGeneralCylinder => 68,
            Self::OpenGeneralCone
            | Self::ClosedGeneralCone
            | Self::SolidOpenGeneralCylinder
            | Self::SolidClosedGeneralCylinder => 72,
            Self::SolidOpenGeneralCone | Self::SolidClosedGeneralCone => 76,
        }
    }

    /// Variant name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Circle => "circle",
            Self::ClosedCone => "closed cone",
            Self::OpenCone => "open cone",
            Self::ClosedEccentricCone => "closed eccentric cone",
            Self::OpenEccentricCone => "open eccentric cone",
            Self::OpenGeneralCone => "open general cone",
            Self::ClosedGeneralCone => "closed general cone",
            Self::SolidOpenGeneralCone => "solid open general cone",
            Self::SolidClosedGeneralCone => "solid closed general cone",
            Self::OpenCylinder => "open cylinder",
            Self::ClosedCylinder => "closed cylinder",
            Self::OpenGeneralCylinder => "open general cylinder",
            Self::ClosedGeneralCylinder => "closed general cylinder",
            Self::SolidOpenGeneralCylinder => "solid open general cylinder",
            Self::SolidClosedGeneralCylinder => {
                "solid closed general cylinder"
            }
            Self::Ellipsoid => "ellipsoid",
            Self::OpenEllipsoidSegment => "open ellipsoid segment",
            Self::ClosedEllipsoidSegment => "closed ellipsoid segment",
            Self::ExtrudedRing => "extruded ring",
            Self::OpenExtrudedRingSegment => "open extruded ring segment",
            Self::ClosedExtrudedRingSegment => {
                "closed extruded ring segment"
            }
            Self::Nut => "nut",
            Self::Ring => "ring",
            Self::Sphere => "sphere",
            Self::OpenSphericalSegment => "open spherical segment",
            Self::ClosedSphericalSegment => "closed spherical segment",
            Self::Torus => "torus",
            Self::OpenTorusSegment => "open torus segment",
            Self::ClosedTorusSegment => "closed torus segment",
        }
    }
}

/// GPU-facing output record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// Box instance (tree index, color, instance matrix).
    Box,
    /// Disc instance.
    Circle,
    /// Cone/cylinder wall instance.
    Cone,
    /// Eccentric cone wall instance.
    EccentricCone,
    /// Ellipsoid segment instance.
    EllipsoidSegment,
    /// General cylinder wall with tilted cap planes.
    GeneralCylinder,
    /// Elliptical ring instance.
    GeneralRing,
    /// Nut instance.
    Nut,
    /// Quad instance.
    Quad,
    /// Spherical segment instance.
    SphericalSegment,
    /// Torus segment instance.
    TorusSegment,
    /// Four-vertex trapezium instance.
    Trapezium,
}

impl OutputKind {
    /// Exact byte size of one output record of this kind.
    #[must_use]
    pub const fn stride(self) -> usize {
        match self {
            Self::SphericalSegment => 40,
            Self::EllipsoidSegment => 44,
            Self::EccentricCone => 52,
            Self::Trapezium => 56,
            Self::Cone => 60,
            Self::Box | Self::Nut | Self::Quad => 72,
            Self::Circle => 84,
            Self::GeneralCylinder | Self::TorusSegment => 88,
            Self::GeneralRing => 96,
        }
    }

    /// Kind name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Circle => "circle",
            Self::Cone => "cone",
            Self::EccentricCone => "eccentric cone",
            Self::EllipsoidSegment => "ellipsoid segment",
            Self::GeneralCylinder => "general cylinder",
            Self::GeneralRing => "general ring",
            Self::Nut => "nut",
            Self::Quad => "quad",
            Self::SphericalSegment => "spherical segment",
            Self::TorusSegment => "torus segment",
            Self::Trapezium => "trapezium",
        }
    }

    /// Attribute names and byte sizes of this kind, in canonical order.
    fn attributes(self) -> &'static [(&'static str, usize)] {
        match self {
            Self::Box | Self::Nut | Self::Quad => {
                &[("treeIndex", 4), ("color", 4), ("instanceMatrix", 64)]
            }
            Self::Circle => &[
                ("treeIndex", 4),
                ("color", 4),
                ("normal", 12),
                ("instanceMatrix", 64),
            ],
            Self::Cone => &[
                ("treeIndex", 4),
                ("color", 4),
                ("centerA", 12),
                ("centerB", 12),
                ("radiusA", 4),
                ("radiusB", 4),
                ("angle", 4),
                ("arcAngle", 4),
                ("localXAxis", 12),
            ],
            Self::EccentricCone => &[
                ("treeIndex", 4),
                ("color", 4),
                ("centerA", 12),
                ("centerB", 12),
                ("radiusA", 4),
                ("radiusB", 4),
                ("normal", 12),
            ],
            Self::EllipsoidSegment => &[
                ("treeIndex", 4),
                ("color", 4),
                ("center", 12),
                ("normal", 12),
                ("horizontalRadius", 4),
                ("verticalRadius", 4),
                ("height", 4),
            ],
            Self::GeneralCylinder => &[
                ("treeIndex", 4),
                ("color", 4),
                ("centerA", 12),
                ("centerB", 12),
                ("radius", 4),
                ("angle", 4),
                ("planeA", 16),
                ("planeB", 16),
                ("arcAngle", 4),
                ("localXAxis", 12),
            ],
            Self::GeneralRing => &[
                ("treeIndex", 4),
                ("color", 4),
                ("normal", 12),
                ("thickness", 4),
                ("angle", 4),
                ("arcAngle", 4),
                ("instanceMatrix", 64),
            ],
            Self::SphericalSegment => &[
                ("treeIndex", 4),
                ("color", 4),
                ("center", 12),
                ("normal", 12),
                ("radius", 4),
                ("height", 4),
            ],
            Self::TorusSegment => &[
                ("treeIndex", 4),
                ("color", 4),
                ("radius", 4),
                ("tubeRadius", 4),
                ("angle", 4),
                ("arcAngle", 4),
                ("instanceMatrix", 64),
            ],
            Self::Trapezium => &[
                ("treeIndex", 4),
                ("color", 4),
                ("vertex1", 12),
                ("vertex2", 12),
                ("vertex3", 12),
                ("vertex4", 12),
            ],
        }
    }

    /// The canonical tightly-packed layout for this kind: attributes at
    /// sequential offsets in declaration order, summing to [`stride`].
    ///
    /// Consumers with a custom GPU attribute scheme build their own
    /// [`AttributeLayout`] instead.
    ///
    /// [`stride`]: OutputKind::stride
    #[must_use]
    pub fn packed_layout(self) -> AttributeLayout {
        let mut layout = AttributeLayout::default();
        let mut offset = 0;
        for &(name, size) in self.attributes() {
            layout.insert(name, offset);
            offset += size;
        }
        layout
    }
}

/// Runtime name-to-byte-offset map for one output kind.
///
/// Attribute names are the wire-contract camelCase identifiers (e.g.
/// `"treeIndex"`, `"instanceMatrix"`), matching what the consuming renderer
/// declares for its GPU attribute bindings. Serializable so hosts can ship
/// layouts across a worker boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeLayout {
    offsets: FxHashMap<String, usize>,
}

impl AttributeLayout {
    /// Empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the byte offset of `attribute`.
    pub fn insert(&mut self, attribute: &str, offset: usize) {
        let _ = self.offsets.insert(attribute.to_owned(), offset);
    }

    /// Builder-style [`insert`](AttributeLayout::insert).
    #[must_use]
    pub fn with(mut self, attribute: &str, offset: usize) -> Self {
        self.insert(attribute, offset);
        self
    }

    /// Byte offset of `attribute` within an output record, if present.
    #[must_use]
    pub fn offset_of(&self, attribute: &str) -> Option<usize> {
        self.offsets.get(attribute).copied()
    }

    /// Number of attributes in the layout.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True when no attributes have been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
