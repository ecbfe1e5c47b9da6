//! Circle transcoding.

use super::{read_prefix, validate, Output};
use crate::error::CadreError;
use crate::layout::{AttributeLayout, OutputKind, PrimitiveVariant};
use crate::output::{CircleInstance, CircleLayout};
use crate::wire::FieldReader;

/// Decode circle records and write one disc instance per record.
///
/// Returns the bytes written.
pub fn transcode_circles(
    input: &[u8],
    out: &mut Output<'_>,
    layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(PrimitiveVariant::Circle, input)?;
    let layout = CircleLayout::resolve(layout)?;
    let start = out.cursor();

    for record in input.chunks_exact(PrimitiveVariant::Circle.stride()) {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let normal = fields.vec3();
        let radius = fields.f32();

        CircleInstance::from_parts(tree_index, color, center, normal, radius)
            .write(out.take(OutputKind::Circle)?, &layout)?;
    }

    Ok(out.cursor() - start)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn circle_record(
        center: [f32; 3],
        normal: [f32; 3],
        radius: f32,
    ) -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(&3.0f32.to_le_bytes());
        record.extend_from_slice(&[10, 20, 30, 40]);
        record.extend_from_slice(&0.0f32.to_le_bytes());
        for v in center {
            record.extend_from_slice(&v.to_le_bytes());
        }
        for v in normal {
            record.extend_from_slice(&v.to_le_bytes());
        }
        record.extend_from_slice(&radius.to_le_bytes());
        record
    }

    #[test]
    fn test_circle_normal_and_color_pass_through() {
        let input = circle_record([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], 2.0);
        let mut buffer = vec![0u8; OutputKind::Circle.stride()];
        let mut out = Output::new(&mut buffer, 0);

        let written = transcode_circles(
            &input,
            &mut out,
            &OutputKind::Circle.packed_layout(),
        )
        .unwrap();
        assert_eq!(written, OutputKind::Circle.stride());

        // Packed layout: color at 4 (B,G,R,A), normal at 8.
        assert_eq!(&buffer[4..8], &[30, 20, 10, 40]);
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&buffer[12..16]);
        assert_eq!(f32::from_le_bytes(bytes), 1.0, "normal.y");
    }

    #[test]
    fn test_two_records_pack_back_to_back() {
        let mut input = circle_record([0.0; 3], [0.0, 0.0, 1.0], 1.0);
        input.extend(circle_record([1.0; 3], [0.0, 0.0, 1.0], 2.0));
        let mut buffer = vec![0u8; 2 * OutputKind::Circle.stride()];
        let mut out = Output::new(&mut buffer, 0);

        let written = transcode_circles(
            &input,
            &mut out,
            &OutputKind::Circle.packed_layout(),
        )
        .unwrap();
        assert_eq!(written, 2 * OutputKind::Circle.stride());
    }

    #[test]
    fn test_from_parts_scales_unit_disc_by_diameter() {
        let circle = CircleInstance::from_parts(
            0.0,
            [0, 0, 0, 255],
            Vec3::ZERO,
            Vec3::Z,
            3.0,
        );
        let rim =
            circle.instance_matrix.transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert!((rim - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }
}
