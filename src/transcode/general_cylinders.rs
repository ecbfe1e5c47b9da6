//! General cylinder transcoding.
//!
//! A general cylinder's caps are tilted: each cap is parameterized by a
//! slope angle (tilt away from the axis plane) and a z-rotation angle.
//! Every cap derives its own outward normal, plane equation, angular
//! offset and elliptical instance transform; closed and solid variants
//! emit the caps as general rings.

use glam::{Mat4, Vec3, Vec4};

use super::{read_prefix, validate, Output};
use crate::error::CadreError;
use crate::layout::{AttributeLayout, OutputKind, PrimitiveVariant};
use crate::math;
use crate::output::{
    GeneralCylinderInstance, GeneralCylinderLayout, GeneralRingInstance,
    GeneralRingLayout, TrapeziumInstance, TrapeziumLayout,
};
use crate::wire::FieldReader;

/// Shared cap-derivation inputs of one cylinder record.
struct CylinderFrame {
    /// Rotation mapping +Z onto the cylinder normal (the ext-point axis).
    rotation: Mat4,
    rotation_angle: f32,
    axis: Vec3,
    ext_a: Vec3,
    ext_b: Vec3,
    radius: f32,
    thickness: f32,
    arc_angle: f32,
}

/// One derived cap. Computed and consumed within a single transcoding
/// call; the ring record for a closed cap is built directly from it.
struct CylinderCap {
    tree_index: f32,
    color: [u8; 4],
    normal: Vec3,
    thickness: f32,
    angle: f32,
    arc_angle: f32,
    instance_matrix: Mat4,
    plane: Vec4,
    center: Vec3,
}

fn cylinder_cap(
    tree_index: f32,
    color: [u8; 4],
    frame: &CylinderFrame,
    center: Vec3,
    slope: f32,
    z_angle: f32,
    height: f32,
    invert_normal: bool,
) -> CylinderCap {
    // The cap's local frame: slope tilt around Y, then the z rotation.
    let rotation = Mat4::from_rotation_z(z_angle)
        * Mat4::from_axis_angle(Vec3::Y, slope);
    let local_x = rotation.transform_vector3(Vec3::X);
    let local_z = rotation.transform_vector3(Vec3::Z);
    let normal = if invert_normal { -local_z } else { local_z };

    // Plane height is measured along the cylinder normal from the far ext
    // point.
    let plane = normal.extend(height);
    let cap_x = math::rotation_between_z(frame.axis)
        .transform_vector3(local_x)
        .normalize();
    let cap_z = frame.rotation.transform_vector3(normal).normalize();

    // The tilted cap cuts the wall in an ellipse: stretched along the
    // slope direction, the wall radius across it.
    let cap_radius_x = frame.radius / slope.cos().abs();
    let cap_radius_y = frame.radius;

    // Angular offset: intersect the arc-start line (running the length of
    // the cylinder, offset to the rim) with the cap plane, then measure
    // the signed angle from the intersection direction to the cap X axis.
    let line_point = frame
        .rotation
        .transform_vector3(Vec3::new(
            frame.rotation_angle.cos(),
            frame.rotation_angle.sin(),
            0.0,
        ))
        .normalize();
    let line_start = frame.ext_b - frame.axis + line_point;
    let line_end = frame.ext_a + frame.axis + line_point;
    let intersection = math::intersect_ray_plane(
        line_end - line_start,
        line_start,
        cap_z,
        center,
    );
    let cap_angle_axis = (intersection - center).normalize();
    let angle = math::signed_angle_between(cap_angle_axis, cap_x, cap_z);

    CylinderCap {
        tree_index,
        color,
        normal,
        thickness: frame.thickness / frame.radius,
        angle,
        arc_angle: frame.arc_angle,
        instance_matrix: math::general_ring_matrix(
            center,
            cap_z,
            cap_x,
            cap_radius_x,
            cap_radius_y,
        ),
        plane,
        center,
    }
}

/// A decoded general cylinder record with both caps derived.
struct GeneralCylinder {
    tree_index: f32,
    color: [u8; 4],
    center_a: Vec3,
    center_b: Vec3,
    radius: f32,
    thickness: f32,
    rotation_angle: f32,
    arc_angle: f32,
    normal: Vec3,
    local_x: Vec3,
    cap_a: CylinderCap,
    cap_b: CylinderCap,
}

impl GeneralCylinder {
    /// Decode one record; solid variants carry a thickness field after the
    /// radius. Non-solid caps are full discs (normalized thickness 1).
    fn decode(record: &[u8], solid: bool) -> Self {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let axis = fields.vec3();
        let height = fields.f32();
        let radius = fields.f32();
        let thickness = if solid { fields.f32() } else { radius };
        let rotation_angle = fields.f32();
        let arc_angle = fields.f32();
        let slope_a = fields.f32();
        let slope_b = fields.f32();
        let z_angle_a = fields.f32();
        let z_angle_b = fields.f32();

        let center_a = center + axis * (height / 2.0);
        let center_b = center - axis * (height / 2.0);

        // The tilted caps extend the cylinder beyond its cap centers; the
        // ext points span the full extent along the axis.
        let dist_a = radius + slope_a.tan();
        let dist_b = radius + slope_b.tan();
        let height_a = dist_b + height;
        let height_b = dist_b;
        let ext_a = center_a + axis * dist_a;
        let ext_b = center_b - axis * dist_b;

        let normal = (ext_a - ext_b).normalize();
        let rotation = math::rotation_between_z(normal);
        let local_x = rotation.transform_vector3(Vec3::X);

        let frame = CylinderFrame {
            rotation,
            rotation_angle,
            axis,
            ext_a,
            ext_b,
            radius,
            thickness,
            arc_angle,
        };
        let cap_a = cylinder_cap(
            tree_index, color, &frame, center_a, slope_a, z_angle_a,
            height_a, false,
        );
        let cap_b = cylinder_cap(
            tree_index, color, &frame, center_b, slope_b, z_angle_b,
            height_b, true,
        );

        Self {
            tree_index,
            color,
            center_a,
            center_b,
            radius,
            thickness,
            rotation_angle,
            arc_angle,
            normal,
            local_x,
            cap_a,
            cap_b,
        }
    }

    /// Wall record at `radius` (outer wall, or inner wall for solid
    /// variants). Both walls share the cap planes.
    fn wall(&self, radius: f32) -> GeneralCylinderInstance {
        GeneralCylinderInstance {
            tree_index: self.tree_index,
            color: self.color,
            center_a: self.center_a,
            center_b: self.center_b,
            radius,
            angle: self.rotation_angle,
            plane_a: self.cap_a.plane,
            plane_b: self.cap_b.plane,
            arc_angle: self.arc_angle,
            local_x_axis: self.local_x,
        }
    }

    /// Trapezium closing one arc edge of a solid closed cylinder.
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
            let center = if near_a { self.center_a } else { self.center_b };
            for offset in [0.0, -self.thickness] {
                vertices[vertex_index] =
                    center + radial * (self.radius + offset);
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

fn cap_ring(cap: &CylinderCap) -> GeneralRingInstance {
    GeneralRingInstance {
        tree_index: cap.tree_index,
        color: cap.color,
        normal: cap.normal,
        thickness: cap.thickness,
        angle: cap.angle,
        arc_angle: cap.arc_angle,
        instance_matrix: cap.instance_matrix,
    }
}

/// Decode open general cylinder records, writing one wall per record.
///
/// Returns the bytes written.
pub fn transcode_open_general_cylinders(
    input: &[u8],
    cylinders: &mut Output<'_>,
    cylinder_layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(PrimitiveVariant::OpenGeneralCylinder, input)?;
    let cylinder_layout = GeneralCylinderLayout::resolve(cylinder_layout)?;
    let start = cylinders.cursor();

    for record in
        input.chunks_exact(PrimitiveVariant::OpenGeneralCylinder.stride())
    {
        let cylinder = GeneralCylinder::decode(record, false);
        cylinder.wall(cylinder.radius).write(
            cylinders.take(OutputKind::GeneralCylinder)?,
            &cylinder_layout,
        )?;
    }

    Ok(cylinders.cursor() - start)
}

/// Decode closed general cylinder records, writing one wall and its two
/// cap rings per record.
///
/// Returns the bytes written to (general cylinders, general rings).
pub fn transcode_closed_general_cylinders(
    input: &[u8],
    cylinders: &mut Output<'_>,
    rings: &mut Output<'_>,
    cylinder_layout: &AttributeLayout,
    ring_layout: &AttributeLayout,
) -> Result<(usize, usize), CadreError> {
    validate(PrimitiveVariant::ClosedGeneralCylinder, input)?;
    let cylinder_layout = GeneralCylinderLayout::resolve(cylinder_layout)?;
    let ring_layout = GeneralRingLayout::resolve(ring_layout)?;
    let cylinders_start = cylinders.cursor();
    let rings_start = rings.cursor();

    for record in
        input.chunks_exact(PrimitiveVariant::ClosedGeneralCylinder.stride())
    {
        let cylinder = GeneralCylinder::decode(record, false);
        cylinder.wall(cylinder.radius).write(
            cylinders.take(OutputKind::GeneralCylinder)?,
            &cylinder_layout,
        )?;

        cap_ring(&cylinder.cap_a)
            .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;
        cap_ring(&cylinder.cap_b)
            .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;
    }

    Ok((
        cylinders.cursor() - cylinders_start,
        rings.cursor() - rings_start,
    ))
}

/// Decode solid open general cylinder records, writing outer and inner
/// walls plus two cap rings per record.
///
/// Returns the bytes written to (general cylinders, general rings).
pub fn transcode_solid_open_general_cylinders(
    input: &[u8],
    cylinders: &mut Output<'_>,
    rings: &mut Output<'_>,
    cylinder_layout: &AttributeLayout,
    ring_layout: &AttributeLayout,
) -> Result<(usize, usize), CadreError> {
    validate(PrimitiveVariant::SolidOpenGeneralCylinder, input)?;
    let cylinder_layout = GeneralCylinderLayout::resolve(cylinder_layout)?;
    let ring_layout = GeneralRingLayout::resolve(ring_layout)?;
    let cylinders_start = cylinders.cursor();
    let rings_start = rings.cursor();

    for record in input
        .chunks_exact(PrimitiveVariant::SolidOpenGeneralCylinder.stride())
    {
        let cylinder = GeneralCylinder::decode(record, true);
        cylinder.wall(cylinder.radius).write(
            cylinders.take(OutputKind::GeneralCylinder)?,
            &cylinder_layout,
        )?;
        cylinder.wall(cylinder.radius - cylinder.thickness).write(
            cylinders.take(OutputKind::GeneralCylinder)?,
            &cylinder_layout,
        )?;

        cap_ring(&cylinder.cap_a)
            .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;
        cap_ring(&cylinder.cap_b)
            .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;
    }

    Ok((
        cylinders.cursor() - cylinders_start,
        rings.cursor() - rings_start,
    ))
}

/// Decode solid closed general cylinder records, writing outer and inner
/// walls, two cap rings, and two arc-edge trapeziums per record.
///
/// Returns the bytes written to (general cylinders, general rings,
/// trapeziums).
pub fn transcode_solid_closed_general_cylinders(
    input: &[u8],
    cylinders: &mut Output<'_>,
    rings: &mut Output<'_>,
    trapeziums: &mut Output<'_>,
    cylinder_layout: &AttributeLayout,
    ring_layout: &AttributeLayout,
    trapezium_layout: &AttributeLayout,
) -> Result<(usize, usize, usize), CadreError> {
    validate(PrimitiveVariant::SolidClosedGeneralCylinder, input)?;
    let cylinder_layout = GeneralCylinderLayout::resolve(cylinder_layout)?;
    let ring_layout = GeneralRingLayout::resolve(ring_layout)?;
    let trapezium_layout = TrapeziumLayout::resolve(trapezium_layout)?;
    let cylinders_start = cylinders.cursor();
    let rings_start = rings.cursor();
    let trapeziums_start = trapeziums.cursor();

    for record in input
        .chunks_exact(PrimitiveVariant::SolidClosedGeneralCylinder.stride())
    {
        let cylinder = GeneralCylinder::decode(record, true);
        cylinder.wall(cylinder.radius).write(
            cylinders.take(OutputKind::GeneralCylinder)?,
            &cylinder_layout,
        )?;
        cylinder.wall(cylinder.radius - cylinder.thickness).write(
            cylinders.take(OutputKind::GeneralCylinder)?,
            &cylinder_layout,
        )?;

        cap_ring(&cylinder.cap_a)
            .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;
        cap_ring(&cylinder.cap_b)
            .write(rings.take(OutputKind::GeneralRing)?, &ring_layout)?;

        for second in [false, true] {
            cylinder.trapezium(second).write(
                trapeziums.take(OutputKind::Trapezium)?,
                &trapezium_layout,
            )?;
        }
    }

    Ok((
        cylinders.cursor() - cylinders_start,
        rings.cursor() - rings_start,
        trapeziums.cursor() - trapeziums_start,
    ))
}
