//! Ring and extruded ring transcoding.
//!
//! A plain ring is a flat annulus. An extruded ring is a tube wall: two
//! concentric cylinder walls (written as cones) closed by an annular ring
//! at each end; the closed segment variant also seals its two arc edges
//! with quads.

use std::f32::consts::TAU;

use glam::{Mat4, Vec3, Vec4};

use super::{local_x_axis, read_prefix, validate, Output};
use crate::error::CadreError;
use crate::layout::{AttributeLayout, OutputKind, PrimitiveVariant};
use crate::math;
use crate::output::{
    ConeInstance, ConeLayout, GeneralRingInstance, GeneralRingLayout,
    QuadInstance, QuadLayout,
};
use crate::wire::FieldReader;

/// Decode plain ring records, writing one general ring per record.
///
/// Returns the bytes written.
pub fn transcode_rings(
    input: &[u8],
    rings: &mut Output<'_>,
    ring_layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(PrimitiveVariant::Ring, input)?;
    let ring_layout = GeneralRingLayout::resolve(ring_layout)?;
    let start = rings.cursor();

    for record in input.chunks_exact(PrimitiveVariant::Ring.stride()) {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let normal = fields.vec3();
        let inner_radius = fields.f32();
        let outer_radius = fields.f32();

        GeneralRingInstance {
            tree_index,
            color,
            normal,
            thickness: (outer_radius - inner_radius) / outer_radius,
            angle: 0.0,
            arc_angle: TAU,
            instance_matrix: math::general_ring_matrix(
                center,
                normal,
                local_x_axis(normal),
                outer_radius,
                outer_radius,
            ),
        }
        .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;
    }

    Ok(rings.cursor() - start)
}

/// A decoded extruded ring record with its derived frame.
struct ExtrudedRing {
    tree_index: f32,
    color: [u8; 4],
    center: Vec3,
    center_a: Vec3,
    center_b: Vec3,
    axis: Vec3,
    normal: Vec3,
    local_x: Vec3,
    height: f32,
    inner_radius: f32,
    outer_radius: f32,
    rotation_angle: f32,
    arc_angle: f32,
}

impl ExtrudedRing {
    fn decode(record: &[u8], read_angles: bool) -> Self {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let axis = fields.vec3();
        let height = fields.f32();
        let inner_radius = fields.f32();
        let outer_radius = fields.f32();
        let (rotation_angle, arc_angle) = if read_angles {
            (fields.f32(), fields.f32())
        } else {
            (0.0, TAU)
        };

        let center_a = center + axis * (height / 2.0);
        let center_b = center - axis * (height / 2.0);
        let normal = (center_a - center_b).normalize();

        Self {
            tree_index,
            color,
            center,
            center_a,
            center_b,
            axis,
            normal,
            local_x: local_x_axis(normal),
            height,
            inner_radius,
            outer_radius,
            rotation_angle,
            arc_angle,
        }
    }

    fn wall(&self, radius: f32) -> ConeInstance {
        ConeInstance {
            tree_index: self.tree_index,
            color: self.color,
            center_a: self.center_a,
            center_b: self.center_b,
            radius_a: radius,
            radius_b: radius,
            angle: self.rotation_angle,
            arc_angle: self.arc_angle,
            local_x_axis: self.local_x,
        }
    }

    fn cap_ring(&self, center: Vec3, normal: Vec3) -> GeneralRingInstance {
        GeneralRingInstance {
            tree_index: self.tree_index,
            color: self.color,
            normal,
            thickness: (self.outer_radius - self.inner_radius)
                / self.outer_radius,
            angle: self.rotation_angle,
            arc_angle: self.arc_angle,
            instance_matrix: math::general_ring_matrix(
                center,
                self.normal,
                self.local_x,
                self.outer_radius,
                self.outer_radius,
            ),
        }
    }

    /// Quad sealing one arc edge: spans the annulus radially and the full
    /// height axially.
    fn edge_quad(&self, second: bool) -> QuadInstance {
        let angle =
            self.rotation_angle + if second { self.arc_angle } else { 0.0 };
        let radial = math::rotation_between_z(self.normal)
            .transform_vector3(Vec3::new(angle.cos(), angle.sin(), 0.0))
            .normalize();
        let quad_normal = radial.cross(self.axis);

        let basis = Mat4::from_cols(
            radial.extend(0.0),
            self.axis.extend(0.0),
            quad_normal.extend(0.0),
            Vec4::W,
        );
        let quad_center = self.center
            + radial * ((self.inner_radius + self.outer_radius) / 2.0);
        let instance_matrix = Mat4::from_translation(quad_center)
            * basis
            * Mat4::from_scale(Vec3::new(
                self.outer_radius - self.inner_radius,
                self.height,
                1.0,
            ));

        QuadInstance {
            tree_index: self.tree_index,
            color: self.color,
            instance_matrix,
        }
    }
}

fn transcode_extruded_ring_family(
    variant: PrimitiveVariant,
    read_angles: bool,
    input: &[u8],
    cones: &mut Output<'_>,
    rings: &mut Output<'_>,
    cone_layout: &ConeLayout,
    ring_layout: &GeneralRingLayout,
) -> Result<(), CadreError> {
    validate(variant, input)?;

    for record in input.chunks_exact(variant.stride()) {
        let ring = ExtrudedRing::decode(record, read_angles);

        ring.wall(ring.outer_radius)
            .write(cones.take(OutputKind::Cone)?, cone_layout)?;
        ring.wall(ring.inner_radius)
            .write(cones.take(OutputKind::Cone)?, cone_layout)?;

        ring.cap_ring(ring.center_a, ring.axis)
            .write(rings.take(OutputKind::GeneralRing)?, ring_layout)?;
        ring.cap_ring(ring.center_b, -ring.axis)
            .write(rings.take(OutputKind::GeneralRing)?, ring_layout)?;
    }

    Ok(())
}

/// Decode full extruded ring records, writing two cylinder walls (as
/// cones) and two annular cap rings per record.
///
/// Returns the bytes written to (cones, general rings).
pub fn transcode_extruded_rings(
    input: &[u8],
    cones: &mut Output<'_>,
    rings: &mut Output<'_>,
    cone_layout: &AttributeLayout,
    ring_layout: &AttributeLayout,
) -> Result<(usize, usize), CadreError> {
    let cone_layout = ConeLayout::resolve(cone_layout)?;
    let ring_layout = GeneralRingLayout::resolve(ring_layout)?;
    let cones_start = cones.cursor();
    let rings_start = rings.cursor();

    transcode_extruded_ring_family(
        PrimitiveVariant::ExtrudedRing,
        false,
        input,
        cones,
        rings,
        &cone_layout,
        &ring_layout,
    )?;

    Ok((cones.cursor() - cones_start, rings.cursor() - rings_start))
}

/// Decode open extruded ring segment records, writing two partial walls
/// and two cap rings per record.
///
/// Returns the bytes written to (cones, general rings).
pub fn transcode_open_extruded_ring_segments(
    input: &[u8],
    cones: &mut Output<'_>,
    rings: &mut Output<'_>,
    cone_layout: &AttributeLayout,
    ring_layout: &AttributeLayout,
) -> Result<(usize, usize), CadreError> {
    let cone_layout = ConeLayout::resolve(cone_layout)?;
    let ring_layout = GeneralRingLayout::resolve(ring_layout)?;
    let cones_start = cones.cursor();
    let rings_start = rings.cursor();

    transcode_extruded_ring_family(
        PrimitiveVariant::OpenExtrudedRingSegment,
        true,
        input,
        cones,
        rings,
        &cone_layout,
        &ring_layout,
    )?;

    Ok((cones.cursor() - cones_start, rings.cursor() - rings_start))
}

/// Decode closed extruded ring segment records, writing two partial walls,
/// two cap rings, and two edge quads per record.
///
/// Returns the bytes written to (cones, general rings, quads).
pub fn transcode_closed_extruded_ring_segments(
    input: &[u8],
    cones: &mut Output<'_>,
    rings: &mut Output<'_>,
    quads: &mut Output<'_>,
    cone_layout: &AttributeLayout,
    ring_layout: &AttributeLayout,
    quad_layout: &AttributeLayout,
) -> Result<(usize, usize, usize), CadreError> {
    let variant = PrimitiveVariant::ClosedExtrudedRingSegment;
    validate(variant, input)?;
    let cone_layout = ConeLayout::resolve(cone_layout)?;
    let ring_layout = GeneralRingLayout::resolve(ring_layout)?;
    let quad_layout = QuadLayout::resolve(quad_layout)?;
    let cones_start = cones.cursor();
    let rings_start = rings.cursor();
    let quads_start = quads.cursor();

    for record in input.chunks_exact(variant.stride()) {
        let ring = ExtrudedRing::decode(record, true);

        ring.wall(ring.outer_radius)
            .write(cones.take(OutputKind::Cone)?, &cone_layout)?;
        ring.wall(ring.inner_radius)
            .write(cones.take(OutputKind::Cone)?, &cone_layout)?;

        ring.cap_ring(ring.center_a, ring.axis)
            .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;
        ring.cap_ring(ring.center_b, -ring.axis)
            .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;

        for second in [false, true] {
            ring.edge_quad(second)
                .write(quads.take(OutputKind::Quad)?, &quad_layout)?;
        }
    }

    Ok((
        cones.cursor() - cones_start,
        rings.cursor() - rings_start,
        quads.cursor() - quads_start,
    ))
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn ring_record() -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(&1.0f32.to_le_bytes());
        record.extend_from_slice(&[0, 0, 0, 255]);
        record.extend_from_slice(&0.0f32.to_le_bytes());
        for v in [0.0f32, 0.0, 0.0] {
            record.extend_from_slice(&v.to_le_bytes()); // center
        }
        for v in [0.0f32, 0.0, 1.0] {
            record.extend_from_slice(&v.to_le_bytes()); // normal
        }
        record.extend_from_slice(&1.0f32.to_le_bytes()); // innerRadius
        record.extend_from_slice(&2.0f32.to_le_bytes()); // outerRadius
        record
    }

    fn extruded_record(angles: Option<(f32, f32)>) -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(&1.0f32.to_le_bytes());
        record.extend_from_slice(&[0, 0, 0, 255]);
        record.extend_from_slice(&0.0f32.to_le_bytes());
        for v in [0.0f32, 0.0, 0.0] {
            record.extend_from_slice(&v.to_le_bytes()); // center
        }
        for v in [0.0f32, 0.0, 1.0] {
            record.extend_from_slice(&v.to_le_bytes()); // axis
        }
        record.extend_from_slice(&2.0f32.to_le_bytes()); // height
        record.extend_from_slice(&1.0f32.to_le_bytes()); // innerRadius
        record.extend_from_slice(&2.0f32.to_le_bytes()); // outerRadius
        if let Some((angle, arc)) = angles {
            record.extend_from_slice(&angle.to_le_bytes());
            record.extend_from_slice(&arc.to_le_bytes());
        }
        record
    }

    fn f32_at(buffer: &[u8], at: usize) -> f32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&buffer[at..at + 4]);
        f32::from_le_bytes(bytes)
    }

    #[test]
    fn test_plain_ring_thickness_is_annulus_fraction() {
        let input = ring_record();
        assert_eq!(input.len(), PrimitiveVariant::Ring.stride());

        let mut buffer = vec![0u8; OutputKind::GeneralRing.stride()];
        let mut rings = Output::new(&mut buffer, 0);
        let _ = transcode_rings(
            &input,
            &mut rings,
            &OutputKind::GeneralRing.packed_layout(),
        )
        .unwrap();

        // thickness (outer - inner) / outer at packed offset 20.
        assert_eq!(f32_at(&buffer, 20), 0.5);
        assert_eq!(f32_at(&buffer, 28), TAU, "plain rings are full turns");
    }

    #[test]
    fn test_extruded_ring_emits_two_walls_and_two_caps() {
        let input = extruded_record(None);
        assert_eq!(input.len(), PrimitiveVariant::ExtrudedRing.stride());

        let mut cone_buffer = vec![0u8; 2 * OutputKind::Cone.stride()];
        let mut ring_buffer = vec![0u8; 2 * OutputKind::GeneralRing.stride()];
        let mut cones = Output::new(&mut cone_buffer, 0);
        let mut rings = Output::new(&mut ring_buffer, 0);

        let (cone_bytes, ring_bytes) = transcode_extruded_rings(
            &input,
            &mut cones,
            &mut rings,
            &OutputKind::Cone.packed_layout(),
            &OutputKind::GeneralRing.packed_layout(),
        )
        .unwrap();
        assert_eq!(cone_bytes, 2 * OutputKind::Cone.stride());
        assert_eq!(ring_bytes, 2 * OutputKind::GeneralRing.stride());

        // Outer wall radius 2, inner wall radius 1 (packed radiusA at 32).
        assert_eq!(f32_at(&cone_buffer, 32), 2.0);
        assert_eq!(f32_at(&cone_buffer, OutputKind::Cone.stride() + 32), 1.0);

        // Cap rings face +axis then -axis (packed normal at 8).
        assert_eq!(f32_at(&ring_buffer, 16), 1.0);
        assert_eq!(
            f32_at(&ring_buffer, OutputKind::GeneralRing.stride() + 16),
            -1.0
        );
    }

    #[test]
    fn test_closed_segment_edge_quad_geometry() {
        let input = extruded_record(Some((0.0, FRAC_PI_2)));
        assert_eq!(
            input.len(),
            PrimitiveVariant::ClosedExtrudedRingSegment.stride()
        );

        let mut cone_buffer = vec![0u8; 2 * OutputKind::Cone.stride()];
        let mut ring_buffer = vec![0u8; 2 * OutputKind::GeneralRing.stride()];
        let mut quad_buffer = vec![0u8; 2 * OutputKind::Quad.stride()];
        let mut cones = Output::new(&mut cone_buffer, 0);
        let mut rings = Output::new(&mut ring_buffer, 0);
        let mut quads = Output::new(&mut quad_buffer, 0);

        let (_, _, quad_bytes) = transcode_closed_extruded_ring_segments(
            &input,
            &mut cones,
            &mut rings,
            &mut quads,
            &OutputKind::Cone.packed_layout(),
            &OutputKind::GeneralRing.packed_layout(),
            &OutputKind::Quad.packed_layout(),
        )
        .unwrap();
        assert_eq!(quad_bytes, 2 * OutputKind::Quad.stride());

        // First quad (start angle 0): the unit quad corner (0.5, 0.5)
        // maps to the outer radius at the top cap.
        let matrix = Mat4::from_cols_array(&core::array::from_fn(|i| {
            f32_at(&quad_buffer, 8 + 4 * i)
        }));
        let corner = matrix.transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!(
            (corner - Vec3::new(2.0, 0.0, 1.0)).length() < 1e-5,
            "outer-top corner, got {corner}"
        );
        let inner = matrix.transform_point3(Vec3::new(-0.5, -0.5, 0.0));
        assert!((inner - Vec3::new(1.0, 0.0, -1.0)).length() < 1e-5);
    }
}
