//! Cone transcoding: plain, general (partial-arc) and solid
//! (hollow-walled) variants.
//!
//! Closed plain cones cap with circles; closed general cones cap with
//! full-disc general rings; solid variants add an inner wall offset by the
//! wall thickness, and the solid closed variant closes the two arc edges
//! with trapeziums.

use std::f32::consts::TAU;

use glam::Vec3;

use super::{local_x_axis, read_prefix, validate, Output};
use crate::error::CadreError;
use crate::layout::{AttributeLayout, OutputKind, PrimitiveVariant};
use crate::math;
use crate::output::{
    CircleInstance, CircleLayout, ConeInstance, ConeLayout,
    GeneralRingInstance, GeneralRingLayout, TrapeziumInstance,
    TrapeziumLayout,
};
use crate::wire::FieldReader;

/// Decode closed cone records, writing one cone wall and two cap circles
/// per record.
///
/// Returns the bytes written to (cones, circles).
pub fn transcode_closed_cones(
    input: &[u8],
    cones: &mut Output<'_>,
    circles: &mut Output<'_>,
    cone_layout: &AttributeLayout,
    circle_layout: &AttributeLayout,
) -> Result<(usize, usize), CadreError> {
    validate(PrimitiveVariant::ClosedCone, input)?;
    let cone_layout = ConeLayout::resolve(cone_layout)?;
    let circle_layout = CircleLayout::resolve(circle_layout)?;
    let cones_start = cones.cursor();
    let circles_start = circles.cursor();

    for record in input.chunks_exact(PrimitiveVariant::ClosedCone.stride())
    {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let axis = fields.vec3();
        let height = fields.f32();
        let radius_a = fields.f32();
        let radius_b = fields.f32();

        let center_a = center + axis * (height / 2.0);
        let center_b = center - axis * (height / 2.0);
        let normal = (center_a - center_b).normalize();

        ConeInstance {
            tree_index,
            color,
            center_a,
            center_b,
            radius_a,
            radius_b,
            angle: 0.0,
            arc_angle: TAU,
            local_x_axis: local_x_axis(normal),
        }
        .write(cones.take(OutputKind::Cone)?, &cone_layout)?;

        CircleInstance::from_parts(
            tree_index, color, center_a, axis, radius_a,
        )
        .write(circles.take(OutputKind::Circle)?, &circle_layout)?;
        CircleInstance::from_parts(
            tree_index, color, center_b, -axis, radius_b,
        )
        .write(circles.take(OutputKind::Circle)?, &circle_layout)?;
    }

    Ok((
        cones.cursor() - cones_start,
        circles.cursor() - circles_start,
    ))
}

/// Decode open cone records, writing one cone wall per record.
///
/// Returns the bytes written.
pub fn transcode_open_cones(
    input: &[u8],
    cones: &mut Output<'_>,
    cone_layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(PrimitiveVariant::OpenCone, input)?;
    let cone_layout = ConeLayout::resolve(cone_layout)?;
    let start = cones.cursor();

    for record in input.chunks_exact(PrimitiveVariant::OpenCone.stride()) {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let axis = fields.vec3();
        let height = fields.f32();
        let radius_a = fields.f32();
        let radius_b = fields.f32();

        let center_a = center + axis * (height / 2.0);
        let center_b = center - axis * (height / 2.0);
        let normal = (center_a - center_b).normalize();

        ConeInstance {
            tree_index,
            color,
            center_a,
            center_b,
            radius_a,
            radius_b,
            angle: 0.0,
            arc_angle: TAU,
            local_x_axis: local_x_axis(normal),
        }
        .write(cones.take(OutputKind::Cone)?, &cone_layout)?;
    }

    Ok(cones.cursor() - start)
}

/// A decoded general cone record with its derived frame.
struct GeneralCone {
    tree_index: f32,
    color: [u8; 4],
    center_a: Vec3,
    center_b: Vec3,
    normal: Vec3,
    local_x: Vec3,
    radius_a: f32,
    radius_b: f32,
    thickness: f32,
    rotation_angle: f32,
    arc_angle: f32,
}

impl GeneralCone {
    /// Decode one record; solid variants carry a thickness field before
    /// the angles. The trailing slope and z-angle fields do not affect any
    /// of the outputs and are left unread.
    fn decode(record: &[u8], solid: bool) -> Self {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let axis = fields.vec3();
        let height = fields.f32();
        let radius_a = fields.f32();
        let radius_b = fields.f32();
        let thickness = if solid { fields.f32() } else { 0.0 };
        let rotation_angle = fields.f32();
        let arc_angle = fields.f32();

        let center_a = center + axis * (height / 2.0);
        let center_b = center - axis * (height / 2.0);
        let normal = (center_a - center_b).normalize();

        Self {
            tree_index,
            color,
            center_a,
            center_b,
            normal,
            local_x: local_x_axis(normal),
            radius_a,
            radius_b,
            thickness,
            rotation_angle,
            arc_angle,
        }
    }

    /// Wall record with both radii shrunk by `inset` (0 for the outer
    /// wall, the wall thickness for the inner one).
    fn wall(&self, inset: f32) -> ConeInstance {
        ConeInstance {
            tree_index: self.tree_index,
            color: self.color,
            center_a: self.center_a,
            center_b: self.center_b,
            radius_a: self.radius_a - inset,
            radius_b: self.radius_b - inset,
            angle: self.rotation_angle,
            arc_angle: self.arc_angle,
            local_x_axis: self.local_x,
        }
    }

    /// Cap ring at one end. `thickness` is the radial wall fraction
    /// (1.0 = full disc) and `normal` the facing to encode.
    fn cap_ring(
        &self,
        center: Vec3,
        radius: f32,
        thickness: f32,
        normal: Vec3,
    ) -> GeneralRingInstance {
        GeneralRingInstance {
            tree_index: self.tree_index,
            color: self.color,
            normal,
            thickness,
            angle: self.rotation_angle,
            arc_angle: self.arc_angle,
            instance_matrix: math::general_ring_matrix(
                center,
                self.normal,
                self.local_x,
                radius,
                radius,
            ),
        }
    }

    /// Trapezium closing one arc edge, at the start (`second == false`) or
    /// end angle. The four vertices pair {far/near cap} with
    /// {outer/inner radius}; the first edge swaps the cap order so the
    /// winding faces outward.
    fn trapezium(&self, second: bool) -> TrapeziumInstance {
        let angle =
            self.rotation_angle + if second { self.arc_angle } else { 0.0 };
        let radial = math::rotation_between_z(self.normal)
            .transform_vector3(Vec3::new(angle.cos(), angle.sin(), 0.0))
            .normalize();

        let mut vertices = [Vec3::ZERO; 4];
        let mut vertex_index = 0;
        for is_a in [false, true] {
            let near_a = if second { is_a } else { !is_a };
            let (radius, center) = if near_a {
                (self.radius_a, self.center_a)
            } else {
                (self.radius_b, self.center_b)
            };
            for offset in [0.0, -self.thickness] {
                vertices[vertex_index] = center + radial * (radius + offset);
                vertex_index += 1;
            }
        }

        TrapeziumInstance {
            tree_index: self.tree_index,
            color: self.color,
            vertices,
        }
    }
}

/// Decode open general cone records, writing one partial-arc cone wall per
/// record.
///
/// Returns the bytes written.
pub fn transcode_open_general_cones(
    input: &[u8],
    cones: &mut Output<'_>,
    cone_layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(PrimitiveVariant::OpenGeneralCone, input)?;
    let cone_layout = ConeLayout::resolve(cone_layout)?;
    let start = cones.cursor();

    for record in
        input.chunks_exact(PrimitiveVariant::OpenGeneralCone.stride())
    {
        let cone = GeneralCone::decode(record, false);
        cone.wall(0.0)
            .write(cones.take(OutputKind::Cone)?, &cone_layout)?;
    }

    Ok(cones.cursor() - start)
}

/// Decode closed general cone records, writing one cone wall and two
/// full-disc cap rings per record.
///
/// Returns the bytes written to (cones, general rings).
pub fn transcode_closed_general_cones(
    input: &[u8],
    cones: &mut Output<'_>,
    rings: &mut Output<'_>,
    cone_layout: &AttributeLayout,
    ring_layout: &AttributeLayout,
) -> Result<(usize, usize), CadreError> {
    validate(PrimitiveVariant::ClosedGeneralCone, input)?;
    let cone_layout = ConeLayout::resolve(cone_layout)?;
    let ring_layout = GeneralRingLayout::resolve(ring_layout)?;
    let cones_start = cones.cursor();
    let rings_start = rings.cursor();

    for record in
        input.chunks_exact(PrimitiveVariant::ClosedGeneralCone.stride())
    {
        let cone = GeneralCone::decode(record, false);
        cone.wall(0.0)
            .write(cones.take(OutputKind::Cone)?, &cone_layout)?;

        cone.cap_ring(cone.center_a, cone.radius_a, 1.0, cone.normal)
            .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;
        cone.cap_ring(cone.center_b, cone.radius_b, 1.0, cone.normal)
            .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;
    }

    Ok((cones.cursor() - cones_start, rings.cursor() - rings_start))
}

/// Decode solid open general cone records, writing outer and inner cone
/// walls plus two cap rings per record.
///
/// Returns the bytes written to (cones, general rings).
pub fn transcode_solid_open_general_cones(
    input: &[u8],
    cones: &mut Output<'_>,
    rings: &mut Output<'_>,
    cone_layout: &AttributeLayout,
    ring_layout: &AttributeLayout,
) -> Result<(usize, usize), CadreError> {
    validate(PrimitiveVariant::SolidOpenGeneralCone, input)?;
    let cone_layout = ConeLayout::resolve(cone_layout)?;
    let ring_layout = GeneralRingLayout::resolve(ring_layout)?;
    let cones_start = cones.cursor();
    let rings_start = rings.cursor();

    for record in
        input.chunks_exact(PrimitiveVariant::SolidOpenGeneralCone.stride())
    {
        let cone = GeneralCone::decode(record, true);
        cone.wall(0.0)
            .write(cones.take(OutputKind::Cone)?, &cone_layout)?;
        cone.wall(cone.thickness)
            .write(cones.take(OutputKind::Cone)?, &cone_layout)?;

        cone.cap_ring(
            cone.center_a,
            cone.radius_a,
            cone.thickness / cone.radius_a,
            cone.normal,
        )
        .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;
        cone.cap_ring(
            cone.center_b,
            cone.radius_b,
            cone.thickness / cone.radius_b,
            cone.normal,
        )
        .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;
    }

    Ok((cones.cursor() - cones_start, rings.cursor() - rings_start))
}

/// Decode solid closed general cone records, writing outer and inner cone
/// walls, two cap rings, and two arc-edge trapeziums per record.
///
/// Returns the bytes written to (cones, general rings, trapeziums).
pub fn transcode_solid_closed_general_cones(
    input: &[u8],
    cones: &mut Output<'_>,
    rings: &mut Output<'_>,
    trapeziums: &mut Output<'_>,
    cone_layout: &AttributeLayout,
    ring_layout: &AttributeLayout,
    trapezium_layout: &AttributeLayout,
) -> Result<(usize, usize, usize), CadreError> {
    validate(PrimitiveVariant::SolidClosedGeneralCone, input)?;
    let cone_layout = ConeLayout::resolve(cone_layout)?;
    let ring_layout = GeneralRingLayout::resolve(ring_layout)?;
    let trapezium_layout = TrapeziumLayout::resolve(trapezium_layout)?;
    let cones_start = cones.cursor();
    let rings_start = rings.cursor();
    let trapeziums_start = trapeziums.cursor();

    for record in
        input.chunks_exact(PrimitiveVariant::SolidClosedGeneralCone.stride())
    {
        let cone = GeneralCone::decode(record, true);
        cone.wall(0.0)
            .write(cones.take(OutputKind::Cone)?, &cone_layout)?;
        cone.wall(cone.thickness)
            .write(cones.take(OutputKind::Cone)?, &cone_layout)?;

        cone.cap_ring(
            cone.center_a,
            cone.radius_a,
            cone.thickness / cone.radius_a,
            cone.normal,
        )
        .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;
        cone.cap_ring(
            cone.center_b,
            cone.radius_b,
            cone.thickness / cone.radius_b,
            -cone.normal,
        )
        .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;

        for second in [false, true] {
            cone.trapezium(second).write(
                trapeziums.take(OutputKind::Trapezium)?,
                &trapezium_layout,
            )?;
        }
    }

    Ok((
        cones.cursor() - cones_start,
        rings.cursor() - rings_start,
        trapeziums.cursor() - trapeziums_start,
    ))
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    fn general_cone_record(solid: bool) -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(&2.0f32.to_le_bytes()); // treeIndex
        record.extend_from_slice(&[100, 150, 200, 255]); // color
        record.extend_from_slice(&0.0f32.to_le_bytes()); // diagonal
        for v in [0.0f32, 0.0, 0.0] {
            record.extend_from_slice(&v.to_le_bytes()); // center
        }
        for v in [0.0f32, 0.0, 1.0] {
            record.extend_from_slice(&v.to_le_bytes()); // axis
        }
        record.extend_from_slice(&2.0f32.to_le_bytes()); // height
        record.extend_from_slice(&3.0f32.to_le_bytes()); // radiusA
        record.extend_from_slice(&2.0f32.to_le_bytes()); // radiusB
        if solid {
            record.extend_from_slice(&0.5f32.to_le_bytes()); // thickness
        }
        record.extend_from_slice(&0.0f32.to_le_bytes()); // rotationAngle
        record.extend_from_slice(&PI.to_le_bytes()); // arcAngle
        for _ in 0..4 {
            record.extend_from_slice(&0.0f32.to_le_bytes()); // slopes, z-angles
        }
        record
    }

    fn f32_at(buffer: &[u8], at: usize) -> f32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&buffer[at..at + 4]);
        f32::from_le_bytes(bytes)
    }

    #[test]
    fn test_open_general_cone_carries_record_angles() {
        let input = general_cone_record(false);
        assert_eq!(input.len(), PrimitiveVariant::OpenGeneralCone.stride());

        let mut buffer = vec![0u8; OutputKind::Cone.stride()];
        let mut cones = Output::new(&mut buffer, 0);
        let _ = transcode_open_general_cones(
            &input,
            &mut cones,
            &OutputKind::Cone.packed_layout(),
        )
        .unwrap();

        // Packed cone layout: angle at 40, arcAngle at 44.
        assert_eq!(f32_at(&buffer, 40), 0.0);
        assert_eq!(f32_at(&buffer, 44), PI);
    }

    #[test]
    fn test_solid_cone_emits_inner_wall_at_reduced_radius() {
        let input = general_cone_record(true);
        assert_eq!(
            input.len(),
            PrimitiveVariant::SolidOpenGeneralCone.stride()
        );

        let mut cone_buffer = vec![0u8; 2 * OutputKind::Cone.stride()];
        let mut ring_buffer = vec![0u8; 2 * OutputKind::GeneralRing.stride()];
        let mut cones = Output::new(&mut cone_buffer, 0);
        let mut rings = Output::new(&mut ring_buffer, 0);

        let (cone_bytes, ring_bytes) = transcode_solid_open_general_cones(
            &input,
            &mut cones,
            &mut rings,
            &OutputKind::Cone.packed_layout(),
            &OutputKind::GeneralRing.packed_layout(),
        )
        .unwrap();
        assert_eq!(cone_bytes, 2 * OutputKind::Cone.stride());
        assert_eq!(ring_bytes, 2 * OutputKind::GeneralRing.stride());

        // Outer wall radiusA 3.0, inner 3.0 - 0.5.
        assert_eq!(f32_at(&cone_buffer, 32), 3.0);
        assert_eq!(
            f32_at(&cone_buffer, OutputKind::Cone.stride() + 32),
            2.5
        );

        // Ring thickness is the normalized wall fraction.
        // Packed ring layout: thickness at 20.
        assert_eq!(f32_at(&ring_buffer, 20), 0.5 / 3.0);
        assert_eq!(
            f32_at(&ring_buffer, OutputKind::GeneralRing.stride() + 20),
            0.5 / 2.0
        );
    }

    #[test]
    fn test_solid_closed_cone_trapezium_vertices() {
        let input = general_cone_record(true);
        let mut cone_buffer = vec![0u8; 2 * OutputKind::Cone.stride()];
        let mut ring_buffer = vec![0u8; 2 * OutputKind::GeneralRing.stride()];
        let mut trapezium_buffer =
            vec![0u8; 2 * OutputKind::Trapezium.stride()];
        let mut cones = Output::new(&mut cone_buffer, 0);
        let mut rings = Output::new(&mut ring_buffer, 0);
        let mut trapeziums = Output::new(&mut trapezium_buffer, 0);

        let (_, _, trapezium_bytes) = transcode_solid_closed_general_cones(
            &input,
            &mut cones,
            &mut rings,
            &mut trapeziums,
            &OutputKind::Cone.packed_layout(),
            &OutputKind::GeneralRing.packed_layout(),
            &OutputKind::Trapezium.packed_layout(),
        )
        .unwrap();
        assert_eq!(trapezium_bytes, 2 * OutputKind::Trapezium.stride());

        // First trapezium sits at the start angle (0), so its vertices lie
        // in the XZ plane: vertex1 is cap A's outer corner (radiusA along
        // +X at z = +1).
        assert_eq!(f32_at(&trapezium_buffer, 8), 3.0); // x = radiusA
        assert_eq!(f32_at(&trapezium_buffer, 16), 1.0); // z = centerA.z
        // vertex2 steps inward by the wall thickness.
        assert_eq!(f32_at(&trapezium_buffer, 20), 2.5);
    }

    #[test]
    fn test_closed_general_cone_rings_are_full_discs() {
        let input = general_cone_record(false);
        let mut cone_buffer = vec![0u8; OutputKind::Cone.stride()];
        let mut ring_buffer = vec![0u8; 2 * OutputKind::GeneralRing.stride()];
        let mut cones = Output::new(&mut cone_buffer, 0);
        let mut rings = Output::new(&mut ring_buffer, 0);

        let _ = transcode_closed_general_cones(
            &input,
            &mut cones,
            &mut rings,
            &OutputKind::Cone.packed_layout(),
            &OutputKind::GeneralRing.packed_layout(),
        )
        .unwrap();

        assert_eq!(f32_at(&ring_buffer, 20), 1.0);
        assert_eq!(
            f32_at(&ring_buffer, OutputKind::GeneralRing.stride() + 20),
            1.0
        );
    }
}
