//! Exact output-buffer sizing from input byte lengths.
//!
//! Callers size each destination buffer exactly once before transcoding:
//! every estimator sums the record counts of the input variants that
//! contribute to its output kind (some variants emit two records per input
//! record) and multiplies by the output stride. All estimators are pure.

use crate::layout::{OutputKind, PrimitiveVariant};

/// Byte lengths of a sector's per-variant input buffers.
///
/// Absent variants stay at zero and contribute nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)] // field names mirror the variant names 1:1
pub struct SectorLengths {
    pub boxes: usize,
    pub circles: usize,
    pub closed_cones: usize,
    pub open_cones: usize,
    pub closed_eccentric_cones: usize,
    pub open_eccentric_cones: usize,
    pub open_general_cones: usize,
    pub closed_general_cones: usize,
    pub solid_open_general_cones: usize,
    pub solid_closed_general_cones: usize,
    pub open_cylinders: usize,
    pub closed_cylinders: usize,
    pub open_general_cylinders: usize,
    pub closed_general_cylinders: usize,
    pub solid_open_general_cylinders: usize,
    pub solid_closed_general_cylinders: usize,
    pub ellipsoids: usize,
    pub open_ellipsoid_segments: usize,
    pub closed_ellipsoid_segments: usize,
    pub extruded_rings: usize,
    pub open_extruded_ring_segments: usize,
    pub closed_extruded_ring_segments: usize,
    pub nuts: usize,
    pub rings: usize,
    pub spheres: usize,
    pub open_spherical_segments: usize,
    pub closed_spherical_segments: usize,
    pub tori: usize,
    pub open_torus_segments: usize,
    pub closed_torus_segments: usize,
}

/// Record count (possibly fractional for malformed lengths - the final
/// byte size is rounded to nearest, preserving the sizing contract).
fn records(length: usize, variant: PrimitiveVariant) -> f64 {
    length as f64 / variant.stride() as f64
}

fn to_bytes(records: f64, kind: OutputKind) -> usize {
    (records * kind.stride() as f64).round() as usize
}

impl SectorLengths {
    /// Bytes required for the box output buffer.
    #[must_use]
    pub fn box_output_size(&self) -> usize {
        to_bytes(records(self.boxes, PrimitiveVariant::Box), OutputKind::Box)
    }

    /// Bytes required for the circle output buffer. Closed cones, closed
    /// eccentric cones and closed cylinders emit two cap circles per
    /// record; closed ellipsoid and spherical segments emit one.
    #[must_use]
    pub fn circle_output_size(&self) -> usize {
        let count = records(self.circles, PrimitiveVariant::Circle)
            + 2.0 * records(self.closed_cones, PrimitiveVariant::ClosedCone)
            + 2.0
                * records(
                    self.closed_eccentric_cones,
                    PrimitiveVariant::ClosedEccentricCone,
                )
            + 2.0
                * records(
                    self.closed_cylinders,
                    PrimitiveVariant::ClosedCylinder,
                )
            + records(
                self.closed_ellipsoid_segments,
                PrimitiveVariant::ClosedEllipsoidSegment,
            )
            + records(
                self.closed_spherical_segments,
                PrimitiveVariant::ClosedSphericalSegment,
            );
        to_bytes(count, OutputKind::Circle)
    }

    /// Bytes required for the cone output buffer. Cylinders transcode to
    /// cones with equal cap radii; solid general cones and the extruded
    /// ring family emit outer and inner walls.
    #[must_use]
    pub fn cone_output_size(&self) -> usize {
        let count = records(self.closed_cones, PrimitiveVariant::ClosedCone)
            + records(self.open_cones, PrimitiveVariant::OpenCone)
            + records(
                self.open_general_cones,
                PrimitiveVariant::OpenGeneralCone,
            )
            + records(
                self.closed_general_cones,
                PrimitiveVariant::ClosedGeneralCone,
            )
            + 2.0
                * records(
                    self.solid_open_general_cones,
                    PrimitiveVariant::SolidOpenGeneralCone,
                )
            + 2.0
                * records(
                    self.solid_closed_general_cones,
                    PrimitiveVariant::SolidClosedGeneralCone,
                )
            + records(
                self.closed_cylinders,
                PrimitiveVariant::ClosedCylinder,
            )
            + records(self.open_cylinders, PrimitiveVariant::OpenCylinder)
            + 2.0
                * records(
                    self.closed_extruded_ring_segments,
                    PrimitiveVariant::ClosedExtrudedRingSegment,
                )
            + 2.0
                * records(
                    self.extruded_rings,
                    PrimitiveVariant::ExtrudedRing,
                )
            + 2.0
                * records(
                    self.open_extruded_ring_segments,
                    PrimitiveVariant::OpenExtrudedRingSegment,
                );
        to_bytes(count, OutputKind::Cone)
    }

    /// Bytes required for the eccentric cone output buffer.
    #[must_use]
    pub fn eccentric_cone_output_size(&self) -> usize {
        let count = records(
            self.closed_eccentric_cones,
            PrimitiveVariant::ClosedEccentricCone,
        ) + records(
            self.open_eccentric_cones,
            PrimitiveVariant::OpenEccentricCone,
        );
        to_bytes(count, OutputKind::EccentricCone)
    }

    /// Bytes required for the ellipsoid segment output buffer.
    #[must_use]
    pub fn ellipsoid_segment_output_size(&self) -> usize {
        let count = records(
            self.closed_ellipsoid_segments,
            PrimitiveVariant::ClosedEllipsoidSegment,
        ) + records(self.ellipsoids, PrimitiveVariant::Ellipsoid)
            + records(
                self.open_ellipsoid_segments,
                PrimitiveVariant::OpenEllipsoidSegment,
            );
        to_bytes(count, OutputKind::EllipsoidSegment)
    }

    /// Bytes required for the general cylinder output buffer. Solid
    /// variants emit outer and inner walls.
    #[must_use]
    pub fn general_cylinder_output_size(&self) -> usize {
        let count = records(
            self.open_general_cylinders,
            PrimitiveVariant::OpenGeneralCylinder,
        ) + records(
            self.closed_general_cylinders,
            PrimitiveVariant::ClosedGeneralCylinder,
        ) + 2.0
            * records(
                self.solid_open_general_cylinders,
                PrimitiveVariant::SolidOpenGeneralCylinder,
            )
            + 2.0
                * records(
                    self.solid_closed_general_cylinders,
                    PrimitiveVariant::SolidClosedGeneralCylinder,
                );
        to_bytes(count, OutputKind::GeneralCylinder)
    }

    /// Bytes required for the general ring output buffer: two cap rings per
    /// closed/solid general cone or cylinder and per extruded ring record,
    /// one per plain ring record.
    #[must_use]
    pub fn general_ring_output_size(&self) -> usize {
        let count = 2.0
            * records(
                self.closed_general_cones,
                PrimitiveVariant::ClosedGeneralCone,
            )
            + 2.0
                * records(
                    self.solid_open_general_cones,
                    PrimitiveVariant::SolidOpenGeneralCone,
                )
            + 2.0
                * records(
                    self.solid_closed_general_cones,
                    PrimitiveVariant::SolidClosedGeneralCone,
                )
            + 2.0
                * records(
                    self.closed_general_cylinders,
                    PrimitiveVariant::ClosedGeneralCylinder,
                )
            + 2.0
                * records(
                    self.solid_open_general_cylinders,
                    PrimitiveVariant::SolidOpenGeneralCylinder,
                )
            + 2.0
                * records(
                    self.solid_closed_general_cylinders,
                    PrimitiveVariant::SolidClosedGeneralCylinder,
                )
            + 2.0
                * records(
                    self.closed_extruded_ring_segments,
                    PrimitiveVariant::ClosedExtrudedRingSegment,
                )
            + 2.0
                * records(
                    self.extruded_rings,
                    PrimitiveVariant::ExtrudedRing,
                )
            + 2.0
                * records(
                    self.open_extruded_ring_segments,
                    PrimitiveVariant::OpenExtrudedRingSegment,
                )
            + records(self.rings, PrimitiveVariant::Ring);
        to_bytes(count, OutputKind::GeneralRing)
    }

    /// Bytes required for the nut output buffer.
    #[must_use]
    pub fn nut_output_size(&self) -> usize {
        to_bytes(records(self.nuts, PrimitiveVariant::Nut), OutputKind::Nut)
    }

    /// Bytes required for the quad output buffer: two end quads per closed
    /// extruded ring segment.
    #[must_use]
    pub fn quad_output_size(&self) -> usize {
        let count = 2.0
            * records(
                self.closed_extruded_ring_segments,
                PrimitiveVariant::ClosedExtrudedRingSegment,
            );
        to_bytes(count, OutputKind::Quad)
    }

    /// Bytes required for the spherical segment output buffer.
    #[must_use]
    pub fn spherical_segment_output_size(&self) -> usize {
        let count = records(
            self.open_spherical_segments,
            PrimitiveVariant::OpenSphericalSegment,
        ) + records(self.spheres, PrimitiveVariant::Sphere)
            + records(
                self.closed_spherical_segments,
                PrimitiveVariant::ClosedSphericalSegment,
            );
        to_bytes(count, OutputKind::SphericalSegment)
    }

    /// Bytes required for the torus segment output buffer.
    #[must_use]
    pub fn torus_segment_output_size(&self) -> usize {
        let count = records(self.tori, PrimitiveVariant::Torus)
            + records(
                self.closed_torus_segments,
                PrimitiveVariant::ClosedTorusSegment,
            )
            + records(
                self.open_torus_segments,
                PrimitiveVariant::OpenTorusSegment,
            );
        to_bytes(count, OutputKind::TorusSegment)
    }

    /// Bytes required for the trapezium output buffer: two arc-closing
    /// trapeziums per solid closed general cone or cylinder.
    #[must_use]
    pub fn trapezium_output_size(&self) -> usize {
        let count = 2.0
            * records(
                self.solid_closed_general_cones,
                PrimitiveVariant::SolidClosedGeneralCone,
            )
            + 2.0
                * records(
                    self.solid_closed_general_cylinders,
                    PrimitiveVariant::SolidClosedGeneralCylinder,
                );
        to_bytes(count, OutputKind::Trapezium)
    }

    /// All twelve output sizes at once, for allocating a full sector.
    #[must_use]
    pub fn output_sizes(&self) -> OutputSizes {
        OutputSizes {
            boxes: self.box_output_size(),
            circles: self.circle_output_size(),
            cones: self.cone_output_size(),
            eccentric_cones: self.eccentric_cone_output_size(),
            ellipsoid_segments: self.ellipsoid_segment_output_size(),
            general_cylinders: self.general_cylinder_output_size(),
            general_rings: self.general_ring_output_size(),
            nuts: self.nut_output_size(),
            quads: self.quad_output_size(),
            spherical_segments: self.spherical_segment_output_size(),
            torus_segments: self.torus_segment_output_size(),
            trapeziums: self.trapezium_output_size(),
        }
    }
}

/// Exact byte length required per output kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)] // field names mirror the output kinds 1:1
pub struct OutputSizes {
    pub boxes: usize,
    pub circles: usize,
    pub cones: usize,
    pub eccentric_cones: usize,
    pub ellipsoid_segments: usize,
    pub general_cylinders: usize,
    pub general_rings: usize,
    pub nuts: usize,
    pub quads: usize,
    pub spherical_segments: usize,
    pub torus_segments: usize,
    pub trapeziums: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_estimate_is_count_times_stride() {
        let lengths = SectorLengths {
            boxes: 3 * PrimitiveVariant::Box.stride(),
            ..SectorLengths::default()
        };
        assert_eq!(
            lengths.box_output_size(),
            3 * OutputKind::Box.stride()
        );
    }

    #[test]
    fn test_circle_estimate_counts_cap_multiplicities() {
        // 1 circle + 2 closed cones (2 caps each) + 1 closed spherical
        // segment (1 cap).
        let lengths = SectorLengths {
            circles: PrimitiveVariant::Circle.stride(),
            closed_cones: 2 * PrimitiveVariant::ClosedCone.stride(),
            closed_spherical_segments:
                PrimitiveVariant::ClosedSphericalSegment.stride(),
            ..SectorLengths::default()
        };
        assert_eq!(
            lengths.circle_output_size(),
            (1 + 4 + 1) * OutputKind::Circle.stride()
        );
    }

    #[test]
    fn test_cone_estimate_includes_cylinders_and_extruded_rings() {
        let lengths = SectorLengths {
            open_cylinders: 2 * PrimitiveVariant::OpenCylinder.stride(),
            extruded_rings: PrimitiveVariant::ExtrudedRing.stride(),
            solid_closed_general_cones:
                PrimitiveVariant::SolidClosedGeneralCone.stride(),
            ..SectorLengths::default()
        };
        // 2 cylinders + 2 walls per extruded ring + 2 walls per solid cone.
        assert_eq!(
            lengths.cone_output_size(),
            (2 + 2 + 2) * OutputKind::Cone.stride()
        );
    }

    #[test]
    fn test_trapezium_estimate_only_solid_closed_variants() {
        let lengths = SectorLengths {
            solid_closed_general_cones:
                2 * PrimitiveVariant::SolidClosedGeneralCone.stride(),
            solid_closed_general_cylinders:
                PrimitiveVariant::SolidClosedGeneralCylinder.stride(),
            solid_open_general_cones:
                PrimitiveVariant::SolidOpenGeneralCone.stride(),
            ..SectorLengths::default()
        };
        assert_eq!(
            lengths.trapezium_output_size(),
            (4 + 2) * OutputKind::Trapezium.stride()
        );
    }

    #[test]
    fn test_empty_sector_needs_no_output() {
        assert_eq!(
            SectorLengths::default().output_sizes(),
            OutputSizes::default()
        );
    }
}
