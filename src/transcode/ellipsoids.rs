//! Ellipsoid and ellipsoid segment transcoding.
//!
//! All three variants share one record layout; a full ellipsoid stores
//! height = 2·vertical radius. A closed segment caps the cut plane with a
//! circle whose radius is the ellipse cross-section at the cut height.

use glam::Vec3;

use super::{read_prefix, validate, Output};
use crate::error::CadreError;
use crate::layout::{AttributeLayout, OutputKind, PrimitiveVariant};
use crate::output::{
    CircleInstance, CircleLayout, EllipsoidSegmentInstance,
    EllipsoidSegmentLayout,
};
use crate::wire::FieldReader;

struct EllipsoidSegment {
    tree_index: f32,
    color: [u8; 4],
    center: Vec3,
    normal: Vec3,
    horizontal_radius: f32,
    vertical_radius: f32,
    height: f32,
}

impl EllipsoidSegment {
    fn decode(record: &[u8]) -> Self {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let normal = fields.vec3();
        let horizontal_radius = fields.f32();
        let vertical_radius = fields.f32();
        let height = fields.f32();

        Self {
            tree_index,
            color,
            center,
            normal,
            horizontal_radius,
            vertical_radius,
            height,
        }
    }

    fn instance(&self) -> EllipsoidSegmentInstance {
        EllipsoidSegmentInstance {
            tree_index: self.tree_index,
            color: self.color,
            center: self.center,
            normal: self.normal,
            horizontal_radius: self.horizontal_radius,
            vertical_radius: self.vertical_radius,
            height: self.height,
        }
    }

    /// The cap disc at the cut plane: the segment spans `height` down from
    /// the pole, so the cut sits `vertical_radius - height` above center.
    fn cap(&self) -> CircleInstance {
        let cut = self.vertical_radius - self.height;
        let ratio = cut / self.vertical_radius;
        let cap_radius =
            self.horizontal_radius * (1.0 - ratio * ratio).max(0.0).sqrt();
        CircleInstance::from_parts(
            self.tree_index,
            self.color,
            self.center + self.normal * cut,
            self.normal,
            cap_radius,
        )
    }
}

fn transcode_segments(
    variant: PrimitiveVariant,
    input: &[u8],
    segments: &mut Output<'_>,
    segment_layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(variant, input)?;
    let segment_layout = EllipsoidSegmentLayout::resolve(segment_layout)?;
    let start = segments.cursor();

    for record in input.chunks_exact(variant.stride()) {
        EllipsoidSegment::decode(record).instance().write(
            segments.take(OutputKind::EllipsoidSegment)?,
            &segment_layout,
        )?;
    }

    Ok(segments.cursor() - start)
}

/// Decode full ellipsoid records, writing one segment instance per record.
///
/// Returns the bytes written.
pub fn transcode_ellipsoids(
    input: &[u8],
    segments: &mut Output<'_>,
    segment_layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    transcode_segments(
        PrimitiveVariant::Ellipsoid,
        input,
        segments,
        segment_layout,
    )
}

/// Decode open ellipsoid segment records, writing one segment instance per
/// record.
///
/// Returns the bytes written.
pub fn transcode_open_ellipsoid_segments(
    input: &[u8],
    segments: &mut Output<'_>,
    segment_layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    transcode_segments(
        PrimitiveVariant::OpenEllipsoidSegment,
        input,
        segments,
        segment_layout,
    )
}

/// Decode closed ellipsoid segment records, writing one segment instance
/// and its cap circle per record.
///
/// Returns the bytes written to (ellipsoid segments, circles).
pub fn transcode_closed_ellipsoid_segments(
    input: &[u8],
    segments: &mut Output<'_>,
    circles: &mut Output<'_>,
    segment_layout: &AttributeLayout,
    circle_layout: &AttributeLayout,
) -> Result<(usize, usize), CadreError> {
    validate(PrimitiveVariant::ClosedEllipsoidSegment, input)?;
    let segment_layout = EllipsoidSegmentLayout::resolve(segment_layout)?;
    let circle_layout = CircleLayout::resolve(circle_layout)?;
    let segments_start = segments.cursor();
    let circles_start = circles.cursor();

    for record in
        input.chunks_exact(PrimitiveVariant::ClosedEllipsoidSegment.stride())
    {
        let segment = EllipsoidSegment::decode(record);
        segment.instance().write(
            segments.take(OutputKind::EllipsoidSegment)?,
            &segment_layout,
        )?;
        segment
            .cap()
            .write(circles.take(OutputKind::Circle)?, &circle_layout)?;
    }

    Ok((
        segments.cursor() - segments_start,
        circles.cursor() - circles_start,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment_record(
        horizontal_radius: f32,
        vertical_radius: f32,
        height: f32,
    ) -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(&4.0f32.to_le_bytes());
        record.extend_from_slice(&[0, 0, 0, 255]);
        record.extend_from_slice(&0.0f32.to_le_bytes());
        for v in [0.0f32, 0.0, 0.0] {
            record.extend_from_slice(&v.to_le_bytes()); // center
        }
        for v in [0.0f32, 0.0, 1.0] {
            record.extend_from_slice(&v.to_le_bytes()); // normal
        }
        record.extend_from_slice(&horizontal_radius.to_le_bytes());
        record.extend_from_slice(&vertical_radius.to_le_bytes());
        record.extend_from_slice(&height.to_le_bytes());
        record
    }

    fn f32_at(buffer: &[u8], at: usize) -> f32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&buffer[at..at + 4]);
        f32::from_le_bytes(bytes)
    }

    #[test]
    fn test_segment_fields_pass_through() {
        let input = segment_record(2.0, 1.0, 0.5);
        assert_eq!(input.len(), PrimitiveVariant::Ellipsoid.stride());

        let mut buffer = vec![0u8; OutputKind::EllipsoidSegment.stride()];
        let mut out = Output::new(&mut buffer, 0);
        let _ = transcode_open_ellipsoid_segments(
            &input,
            &mut out,
            &OutputKind::EllipsoidSegment.packed_layout(),
        )
        .unwrap();

        // Packed layout: horizontalRadius 32, verticalRadius 36, height 40.
        assert_eq!(f32_at(&buffer, 32), 2.0);
        assert_eq!(f32_at(&buffer, 36), 1.0);
        assert_eq!(f32_at(&buffer, 40), 0.5);
    }

    #[test]
    fn test_half_ellipsoid_cap_is_the_equator() {
        // height == vertical radius cuts exactly at the equator: the cap
        // has the full horizontal radius and sits at the center.
        let segment =
            EllipsoidSegment::decode(&segment_record(2.0, 1.0, 1.0));
        let cap = segment.cap();
        let rim = cap
            .instance_matrix
            .transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert!((rim - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_shallow_cap_radius_follows_the_ellipse() {
        let segment =
            EllipsoidSegment::decode(&segment_record(2.0, 1.0, 0.5));
        // Cut at z = 0.5: cross-section radius 2·sqrt(1 - 0.25).
        let expected = 2.0 * (1.0f32 - 0.25).sqrt();
        let cap = segment.cap();
        let rim = cap
            .instance_matrix
            .transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert!(
            (rim.length()
                - (expected * expected + 0.25).sqrt())
                .abs()
                < 1e-4,
            "rim sits at the cut height on the ellipse"
        );
    }
}
