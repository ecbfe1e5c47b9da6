//! Eccentric cone transcoding.
//!
//! Eccentric cones carry an explicit cap normal that need not align with
//! the center axis; a converter may emit it facing either way, so the
//! decoder flips it when it opposes the axis direction.

use glam::Vec3;

use super::{read_prefix, validate, Output};
use crate::error::CadreError;
use crate::layout::{AttributeLayout, OutputKind, PrimitiveVariant};
use crate::output::{
    CircleInstance, CircleLayout, EccentricConeInstance, EccentricConeLayout,
};
use crate::wire::FieldReader;

struct EccentricCone {
    tree_index: f32,
    color: [u8; 4],
    center_a: Vec3,
    center_b: Vec3,
    axis: Vec3,
    radius_a: f32,
    radius_b: f32,
    cap_normal: Vec3,
}

impl EccentricCone {
    fn decode(record: &[u8]) -> Self {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let axis = fields.vec3();
        let height = fields.f32();
        let radius_a = fields.f32();
        let radius_b = fields.f32();
        let mut cap_normal = fields.vec3();

        let center_a = center + axis * (height / 2.0);
        let center_b = center - axis * (height / 2.0);

        // Guarantee a consistent outward orientation.
        if cap_normal.dot(center_a - center_b) < 0.0 {
            cap_normal = -cap_normal;
        }

        Self {
            tree_index,
            color,
            center_a,
            center_b,
            axis,
            radius_a,
            radius_b,
            cap_normal,
        }
    }

    fn instance(&self) -> EccentricConeInstance {
        EccentricConeInstance {
            tree_index: self.tree_index,
            color: self.color,
            center_a: self.center_a,
            center_b: self.center_b,
            radius_a: self.radius_a,
            radius_b: self.radius_b,
            normal: self.cap_normal,
        }
    }
}

/// Decode closed eccentric cone records, writing one eccentric cone and
/// two cap circles per record. Both circles face the axis direction.
///
/// Returns the bytes written to (eccentric cones, circles).
pub fn transcode_closed_eccentric_cones(
    input: &[u8],
    eccentric_cones: &mut Output<'_>,
    circles: &mut Output<'_>,
    eccentric_cone_layout: &AttributeLayout,
    circle_layout: &AttributeLayout,
) -> Result<(usize, usize), CadreError> {
    validate(PrimitiveVariant::ClosedEccentricCone, input)?;
    let eccentric_cone_layout =
        EccentricConeLayout::resolve(eccentric_cone_layout)?;
    let circle_layout = CircleLayout::resolve(circle_layout)?;
    let cones_start = eccentric_cones.cursor();
    let circles_start = circles.cursor();

    for record in
        input.chunks_exact(PrimitiveVariant::ClosedEccentricCone.stride())
    {
        let cone = EccentricCone::decode(record);
        cone.instance().write(
            eccentric_cones.take(OutputKind::EccentricCone)?,
            &eccentric_cone_layout,
        )?;

        CircleInstance::from_parts(
            cone.tree_index,
            cone.color,
            cone.center_a,
            cone.axis,
            cone.radius_a,
        )
        .write(circles.take(OutputKind::Circle)?, &circle_layout)?;
        CircleInstance::from_parts(
            cone.tree_index,
            cone.color,
            cone.center_b,
            cone.axis,
            cone.radius_b,
        )
        .write(circles.take(OutputKind::Circle)?, &circle_layout)?;
    }

    Ok((
        eccentric_cones.cursor() - cones_start,
        circles.cursor() - circles_start,
    ))
}

/// Decode open eccentric cone records, writing one eccentric cone per
/// record.
///
/// Returns the bytes written.
pub fn transcode_open_eccentric_cones(
    input: &[u8],
    eccentric_cones: &mut Output<'_>,
    eccentric_cone_layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(PrimitiveVariant::OpenEccentricCone, input)?;
    let eccentric_cone_layout =
        EccentricConeLayout::resolve(eccentric_cone_layout)?;
    let start = eccentric_cones.cursor();

    for record in
        input.chunks_exact(PrimitiveVariant::OpenEccentricCone.stride())
    {
        let cone = EccentricCone::decode(record);
        cone.instance().write(
            eccentric_cones.take(OutputKind::EccentricCone)?,
            &eccentric_cone_layout,
        )?;
    }

    Ok(eccentric_cones.cursor() - start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eccentric_cone_record(cap_normal: [f32; 3]) -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(&5.0f32.to_le_bytes());
        record.extend_from_slice(&[0, 0, 0, 255]);
        record.extend_from_slice(&0.0f32.to_le_bytes());
        for v in [0.0f32, 0.0, 0.0] {
            record.extend_from_slice(&v.to_le_bytes()); // center
        }
        for v in [0.0f32, 0.0, 1.0] {
            record.extend_from_slice(&v.to_le_bytes()); // axis
        }
        record.extend_from_slice(&2.0f32.to_le_bytes()); // height
        record.extend_from_slice(&1.0f32.to_le_bytes()); // radiusA
        record.extend_from_slice(&0.5f32.to_le_bytes()); // radiusB
        for v in cap_normal {
            record.extend_from_slice(&v.to_le_bytes());
        }
        record
    }

    fn vec3_at(buffer: &[u8], at: usize) -> Vec3 {
        let mut out = [0.0f32; 3];
        for (i, v) in out.iter_mut().enumerate() {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(&buffer[at + 4 * i..at + 4 * i + 4]);
            *v = f32::from_le_bytes(bytes);
        }
        Vec3::from_array(out)
    }

    #[test]
    fn test_opposing_cap_normal_is_negated() {
        let input = eccentric_cone_record([0.0, 0.0, -1.0]);
        assert_eq!(
            input.len(),
            PrimitiveVariant::OpenEccentricCone.stride()
        );

        let mut buffer = vec![0u8; OutputKind::EccentricCone.stride()];
        let mut out = Output::new(&mut buffer, 0);
        let _ = transcode_open_eccentric_cones(
            &input,
            &mut out,
            &OutputKind::EccentricCone.packed_layout(),
        )
        .unwrap();

        // Packed layout: normal at 40. The stored -Z flips to +Z.
        assert_eq!(vec3_at(&buffer, 40), Vec3::Z);
    }

    #[test]
    fn test_aligned_cap_normal_passes_through() {
        let tilted = [0.6f32, 0.0, 0.8];
        let input = eccentric_cone_record(tilted);
        let mut buffer = vec![0u8; OutputKind::EccentricCone.stride()];
        let mut out = Output::new(&mut buffer, 0);
        let _ = transcode_open_eccentric_cones(
            &input,
            &mut out,
            &OutputKind::EccentricCone.packed_layout(),
        )
        .unwrap();
        assert_eq!(vec3_at(&buffer, 40), Vec3::from_array(tilted));
    }

    #[test]
    fn test_closed_variant_caps_face_the_axis() {
        let input = eccentric_cone_record([0.0, 0.0, 1.0]);
        let mut cone_buffer = vec![0u8; OutputKind::EccentricCone.stride()];
        let mut circle_buffer = vec![0u8; 2 * OutputKind::Circle.stride()];
        let mut cones = Output::new(&mut cone_buffer, 0);
        let mut circles = Output::new(&mut circle_buffer, 0);

        let (_, circle_bytes) = transcode_closed_eccentric_cones(
            &input,
            &mut cones,
            &mut circles,
            &OutputKind::EccentricCone.packed_layout(),
            &OutputKind::Circle.packed_layout(),
        )
        .unwrap();
        assert_eq!(circle_bytes, 2 * OutputKind::Circle.stride());

        // Unlike closed cylinders, both cap circles face +axis.
        let stride = OutputKind::Circle.stride();
        assert_eq!(vec3_at(&circle_buffer, 8), Vec3::Z);
        assert_eq!(vec3_at(&circle_buffer, stride + 8), Vec3::Z);
    }
}
