//! Plain cylinder transcoding.
//!
//! Cylinders transcode to cone wall records with equal cap radii; closed
//! cylinders additionally emit their two cap discs.

use std::f32::consts::TAU;

use super::{local_x_axis, read_prefix, validate, Output};
use crate::error::CadreError;
use crate::layout::{AttributeLayout, OutputKind, PrimitiveVariant};
use crate::output::{CircleInstance, CircleLayout, ConeInstance, ConeLayout};
use crate::wire::FieldReader;

/// Decode closed cylinder records, writing one cone wall and two cap
/// circles per record.
///
/// Returns the bytes written to (cones, circles).
pub fn transcode_closed_cylinders(
    input: &[u8],
    cones: &mut Output<'_>,
    circles: &mut Output<'_>,
    cone_layout: &AttributeLayout,
    circle_layout: &AttributeLayout,
) -> Result<(usize, usize), CadreError> {
    validate(PrimitiveVariant::ClosedCylinder, input)?;
    let cone_layout = ConeLayout::resolve(cone_layout)?;
    let circle_layout = CircleLayout::resolve(circle_layout)?;
    let cones_start = cones.cursor();
    let circles_start = circles.cursor();

    for record in
        input.chunks_exact(PrimitiveVariant::ClosedCylinder.stride())
    {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let axis = fields.vec3();
        let height = fields.f32();
        let radius = fields.f32();

        let center_a = center + axis * (height / 2.0);
        let center_b = center - axis * (height / 2.0);
        let normal = (center_a - center_b).normalize();

        ConeInstance {
            tree_index,
            color,
            center_a,
            center_b,
            radius_a: radius,
            radius_b: radius,
            angle: 0.0,
            arc_angle: TAU,
            local_x_axis: local_x_axis(normal),
        }
        .write(cones.take(OutputKind::Cone)?, &cone_layout)?;

        CircleInstance::from_parts(tree_index, color, center_a, axis, radius)
            .write(circles.take(OutputKind::Circle)?, &circle_layout)?;
        CircleInstance::from_parts(
            tree_index, color, center_b, -axis, radius,
        )
        .write(circles.take(OutputKind::Circle)?, &circle_layout)?;
    }

    Ok((
        cones.cursor() - cones_start,
        circles.cursor() - circles_start,
    ))
}

/// Decode open cylinder records, writing one cone wall per record.
///
/// Returns the bytes written.
pub fn transcode_open_cylinders(
    input: &[u8],
    cones: &mut Output<'_>,
    cone_layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(PrimitiveVariant::OpenCylinder, input)?;
    let cone_layout = ConeLayout::resolve(cone_layout)?;
    let start = cones.cursor();

    for record in input.chunks_exact(PrimitiveVariant::OpenCylinder.stride())
    {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let axis = fields.vec3();
        let height = fields.f32();
        let radius = fields.f32();

        let center_a = center + axis * (height / 2.0);
        let center_b = center - axis * (height / 2.0);
        let normal = (center_a - center_b).normalize();

        ConeInstance {
            tree_index,
            color,
            center_a,
            center_b,
            radius_a: radius,
            radius_b: radius,
            angle: 0.0,
            arc_angle: TAU,
            local_x_axis: local_x_axis(normal),
        }
        .write(cones.take(OutputKind::Cone)?, &cone_layout)?;
    }

    Ok(cones.cursor() - start)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn cylinder_record(
        center: [f32; 3],
        axis: [f32; 3],
        height: f32,
        radius: f32,
    ) -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(&7.0f32.to_le_bytes());
        record.extend_from_slice(&[1, 2, 3, 4]);
        record.extend_from_slice(&0.0f32.to_le_bytes());
        for v in center {
            record.extend_from_slice(&v.to_le_bytes());
        }
        for v in axis {
            record.extend_from_slice(&v.to_le_bytes());
        }
        record.extend_from_slice(&height.to_le_bytes());
        record.extend_from_slice(&radius.to_le_bytes());
        record
    }

    fn f32_at(buffer: &[u8], at: usize) -> f32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&buffer[at..at + 4]);
        f32::from_le_bytes(bytes)
    }

    fn vec3_at(buffer: &[u8], at: usize) -> Vec3 {
        Vec3::new(
            f32_at(buffer, at),
            f32_at(buffer, at + 4),
            f32_at(buffer, at + 8),
        )
    }

    #[test]
    fn test_unit_cylinder_round_trip() {
        // The canonical check: center origin, axis +Z, height 2, radius 1.
        let input = cylinder_record([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], 2.0, 1.0);
        let mut cone_buffer = vec![0u8; OutputKind::Cone.stride()];
        let mut circle_buffer = vec![0u8; 2 * OutputKind::Circle.stride()];
        let mut cones = Output::new(&mut cone_buffer, 0);
        let mut circles = Output::new(&mut circle_buffer, 0);

        let (cone_bytes, circle_bytes) = transcode_closed_cylinders(
            &input,
            &mut cones,
            &mut circles,
            &OutputKind::Cone.packed_layout(),
            &OutputKind::Circle.packed_layout(),
        )
        .unwrap();
        assert_eq!(cone_bytes, OutputKind::Cone.stride());
        assert_eq!(circle_bytes, 2 * OutputKind::Circle.stride());

        // Packed cone layout: centerA at 8, centerB at 20, radii at 32/36,
        // arcAngle at 44.
        assert_eq!(vec3_at(&cone_buffer, 8), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(vec3_at(&cone_buffer, 20), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(f32_at(&cone_buffer, 32), 1.0);
        assert_eq!(f32_at(&cone_buffer, 36), 1.0);
        assert_eq!(f32_at(&cone_buffer, 44), TAU);

        // Cap circles face +axis and -axis at the same radius.
        let stride = OutputKind::Circle.stride();
        assert_eq!(vec3_at(&circle_buffer, 8), Vec3::Z);
        assert_eq!(vec3_at(&circle_buffer, stride + 8), -Vec3::Z);
    }

    #[test]
    fn test_open_cylinder_emits_no_circles() {
        let input = cylinder_record([0.0; 3], [0.0, 0.0, 1.0], 2.0, 1.0);
        let mut cone_buffer = vec![0u8; OutputKind::Cone.stride()];
        let mut cones = Output::new(&mut cone_buffer, 0);

        let written = transcode_open_cylinders(
            &input,
            &mut cones,
            &OutputKind::Cone.packed_layout(),
        )
        .unwrap();
        assert_eq!(written, OutputKind::Cone.stride());
    }
}
