//! Torus and torus segment transcoding.

use std::f32::consts::TAU;

use glam::Mat4;

use super::{read_prefix, validate, Output};
use crate::error::CadreError;
use crate::layout::{AttributeLayout, OutputKind, PrimitiveVariant};
use crate::math;
use crate::output::{TorusSegmentInstance, TorusSegmentLayout};
use crate::wire::FieldReader;

fn transcode_torus_family(
    variant: PrimitiveVariant,
    read_angles: bool,
    input: &[u8],
    out: &mut Output<'_>,
    layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(variant, input)?;
    let layout = TorusSegmentLayout::resolve(layout)?;
    let start = out.cursor();

    for record in input.chunks_exact(variant.stride()) {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let normal = fields.vec3();
        let radius = fields.f32();
        let tube_radius = fields.f32();
        let (angle, arc_angle) = if read_angles {
            (fields.f32(), fields.f32())
        } else {
            (0.0, TAU)
        };

        let instance_matrix = Mat4::from_translation(center)
            * math::rotation_between_z(normal);

        TorusSegmentInstance {
            tree_index,
            color,
            radius,
            tube_radius,
            angle,
            arc_angle,
            instance_matrix,
        }
        .write(out.take(OutputKind::TorusSegment)?, &layout)?;
    }

    Ok(out.cursor() - start)
}

/// Decode full torus records, writing one full-revolution torus segment
/// per record.
///
/// Returns the bytes written.
pub fn transcode_tori(
    input: &[u8],
    out: &mut Output<'_>,
    layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    transcode_torus_family(PrimitiveVariant::Torus, false, input, out, layout)
}

/// Decode open torus segment records, writing one torus segment per
/// record.
///
/// Returns the bytes written.
pub fn transcode_open_torus_segments(
    input: &[u8],
    out: &mut Output<'_>,
    layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    transcode_torus_family(
        PrimitiveVariant::OpenTorusSegment,
        true,
        input,
        out,
        layout,
    )
}

/// Decode closed torus segment records, writing one torus segment per
/// record.
///
/// Returns the bytes written.
pub fn transcode_closed_torus_segments(
    input: &[u8],
    out: &mut Output<'_>,
    layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    transcode_torus_family(
        PrimitiveVariant::ClosedTorusSegment,
        true,
        input,
        out,
        layout,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torus_record(angles: Option<(f32, f32)>) -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(&8.0f32.to_le_bytes());
        record.extend_from_slice(&[0, 0, 0, 255]);
        record.extend_from_slice(&0.0f32.to_le_bytes());
        for v in [1.0f32, 0.0, 0.0] {
            record.extend_from_slice(&v.to_le_bytes()); // center
        }
        for v in [0.0f32, 0.0, 1.0] {
            record.extend_from_slice(&v.to_le_bytes()); // normal
        }
        record.extend_from_slice(&3.0f32.to_le_bytes()); // radius
        record.extend_from_slice(&0.25f32.to_le_bytes()); // tubeRadius
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
    fn test_full_torus_defaults_to_full_turn() {
        let input = torus_record(None);
        assert_eq!(input.len(), PrimitiveVariant::Torus.stride());

        let mut buffer = vec![0u8; OutputKind::TorusSegment.stride()];
        let mut out = Output::new(&mut buffer, 0);
        let _ = transcode_tori(
            &input,
            &mut out,
            &OutputKind::TorusSegment.packed_layout(),
        )
        .unwrap();

        // Packed layout: radius 8, tubeRadius 12, angle 16, arcAngle 20.
        assert_eq!(f32_at(&buffer, 8), 3.0);
        assert_eq!(f32_at(&buffer, 12), 0.25);
        assert_eq!(f32_at(&buffer, 16), 0.0);
        assert_eq!(f32_at(&buffer, 20), TAU);

        // Translation column of the instance matrix carries the center.
        assert_eq!(f32_at(&buffer, 24 + 48), 1.0);
    }

    #[test]
    fn test_segment_carries_record_angles() {
        let input = torus_record(Some((0.5, 1.5)));
        assert_eq!(input.len(), PrimitiveVariant::OpenTorusSegment.stride());

        let mut buffer = vec![0u8; OutputKind::TorusSegment.stride()];
        let mut out = Output::new(&mut buffer, 0);
        let _ = transcode_open_torus_segments(
            &input,
            &mut out,
            &OutputKind::TorusSegment.packed_layout(),
        )
        .unwrap();

        assert_eq!(f32_at(&buffer, 16), 0.5);
        assert_eq!(f32_at(&buffer, 20), 1.5);
    }
}
