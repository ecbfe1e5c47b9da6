//! Box transcoding.

use glam::Mat4;

use super::{read_prefix, validate, Output};
use crate::error::CadreError;
use crate::layout::{AttributeLayout, OutputKind, PrimitiveVariant};
use crate::math;
use crate::output::{BoxInstance, BoxLayout};
use crate::wire::FieldReader;

/// Decode box records and write one box instance per record.
///
/// Returns the bytes written.
pub fn transcode_boxes(
    input: &[u8],
    out: &mut Output<'_>,
    layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(PrimitiveVariant::Box, input)?;
    let layout = BoxLayout::resolve(layout)?;
    let start = out.cursor();

    for record in input.chunks_exact(PrimitiveVariant::Box.stride()) {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let normal = fields.vec3();
        let delta = fields.vec3();
        let rotation_angle = fields.f32();

        let instance_matrix = Mat4::from_translation(center)
            * Mat4::from_rotation_z(rotation_angle)
            * math::rotation_between_z(normal)
            * Mat4::from_scale(delta);

        BoxInstance {
            tree_index,
            color,
            instance_matrix,
        }
        .write(out.take(OutputKind::Box)?, &layout)?;
    }

    Ok(out.cursor() - start)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn box_record(center: [f32; 3], delta: [f32; 3]) -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(&1.0f32.to_le_bytes()); // treeIndex
        record.extend_from_slice(&[255, 0, 0, 255]); // color
        record.extend_from_slice(&0.0f32.to_le_bytes()); // diagonal
        for v in center {
            record.extend_from_slice(&v.to_le_bytes());
        }
        for v in [0.0f32, 0.0, 1.0] {
            record.extend_from_slice(&v.to_le_bytes()); // normal +Z
        }
        for v in delta {
            record.extend_from_slice(&v.to_le_bytes());
        }
        record.extend_from_slice(&0.0f32.to_le_bytes()); // rotationAngle
        record
    }

    fn f32_at(buffer: &[u8], at: usize) -> f32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&buffer[at..at + 4]);
        f32::from_le_bytes(bytes)
    }

    #[test]
    fn test_axis_aligned_box_matrix_is_translate_scale() {
        let input = box_record([1.0, 2.0, 3.0], [2.0, 4.0, 6.0]);
        let mut buffer = vec![0u8; OutputKind::Box.stride()];
        let mut out = Output::new(&mut buffer, 0);

        let written = transcode_boxes(
            &input,
            &mut out,
            &OutputKind::Box.packed_layout(),
        )
        .unwrap();
        assert_eq!(written, OutputKind::Box.stride());

        // Packed layout: instanceMatrix at 8, column-major.
        let matrix_at = 8;
        let corner = Mat4::from_cols_array(&core::array::from_fn(|i| {
            f32_at(&buffer, matrix_at + 4 * i)
        }))
        .transform_point3(Vec3::splat(0.5));
        assert!(
            (corner - Vec3::new(2.0, 4.0, 6.0)).length() < 1e-5,
            "unit-cube corner must land at center + delta/2, got {corner}"
        );
    }

    #[test]
    fn test_invalid_length_fails_before_writing() {
        let mut buffer = vec![0u8; OutputKind::Box.stride()];
        let mut out = Output::new(&mut buffer, 0);
        let err = transcode_boxes(
            &[0u8; 10],
            &mut out,
            &OutputKind::Box.packed_layout(),
        )
        .unwrap_err();
        assert!(matches!(err, CadreError::InvalidBufferLength { .. }));
        assert_eq!(out.cursor(), 0);
    }

    #[test]
    fn test_transcoding_is_idempotent() {
        let mut input = box_record([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        input.extend(box_record([5.0, 5.0, 5.0], [2.0, 2.0, 2.0]));
        let layout = OutputKind::Box.packed_layout();

        let mut first = vec![0u8; 2 * OutputKind::Box.stride()];
        let mut second = vec![0u8; 2 * OutputKind::Box.stride()];
        let _ =
            transcode_boxes(&input, &mut Output::new(&mut first, 0), &layout)
                .unwrap();
        let _ = transcode_boxes(
            &input,
            &mut Output::new(&mut second, 0),
            &layout,
        )
        .unwrap();
        assert_eq!(first, second);
    }
}
