//! Nut transcoding.

use glam::{Mat4, Vec3};

use super::{read_prefix, validate, Output};
use crate::error::CadreError;
use crate::layout::{AttributeLayout, OutputKind, PrimitiveVariant};
use crate::math;
use crate::output::{NutInstance, NutLayout};
use crate::wire::FieldReader;

/// Decode nut records and write one nut instance per record. The instance
/// matrix places a unit hexagonal nut: diameter scaled to 2·radius, length
/// to the record height, spun by the rotation angle around its axis.
///
/// Returns the bytes written.
pub fn transcode_nuts(
    input: &[u8],
    out: &mut Output<'_>,
    layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(PrimitiveVariant::Nut, input)?;
    let layout = NutLayout::resolve(layout)?;
    let start = out.cursor();

    for record in input.chunks_exact(PrimitiveVariant::Nut.stride()) {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let axis = fields.vec3();
        let height = fields.f32();
        let radius = fields.f32();
        let rotation_angle = fields.f32();

        let instance_matrix = Mat4::from_translation(center)
            * math::rotation_between_z(axis)
            * Mat4::from_rotation_z(rotation_angle)
            * Mat4::from_scale(Vec3::new(
                2.0 * radius,
                2.0 * radius,
                height,
            ));

        NutInstance {
            tree_index,
            color,
            instance_matrix,
        }
        .write(out.take(OutputKind::Nut)?, &layout)?;
    }

    Ok(out.cursor() - start)
}
