//! Sphere and spherical segment transcoding.
//!
//! A full sphere is a spherical segment of height 2·radius with a +Z polar
//! axis. A closed segment caps the cut plane with a circle.

use glam::Vec3;

use super::{read_prefix, validate, Output};
use crate::error::CadreError;
use crate::layout::{AttributeLayout, OutputKind, PrimitiveVariant};
use crate::output::{
    CircleInstance, CircleLayout, SphericalSegmentInstance,
    SphericalSegmentLayout,
};
use crate::wire::FieldReader;

struct SphericalSegment {
    tree_index: f32,
    color: [u8; 4],
    center: Vec3,
    normal: Vec3,
    radius: f32,
    height: f32,
}

impl SphericalSegment {
    fn decode(record: &[u8]) -> Self {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let normal = fields.vec3();
        let radius = fields.f32();
        let height = fields.f32();

        Self {
            tree_index,
            color,
            center,
            normal,
            radius,
            height,
        }
    }

    fn instance(&self) -> SphericalSegmentInstance {
        SphericalSegmentInstance {
            tree_index: self.tree_index,
            color: self.color,
            center: self.center,
            normal: self.normal,
            radius: self.radius,
            height: self.height,
        }
    }

    /// Cap disc at the cut plane, `radius - height` above center along the
    /// polar axis.
    fn cap(&self) -> CircleInstance {
        let cut = self.radius - self.height;
        let cap_radius =
            (self.radius * self.radius - cut * cut).max(0.0).sqrt();
        CircleInstance::from_parts(
            self.tree_index,
            self.color,
            self.center + self.normal * cut,
            self.normal,
            cap_radius,
        )
    }
}

/// Decode sphere records, writing one full spherical segment per record.
///
/// Returns the bytes written.
pub fn transcode_spheres(
    input: &[u8],
    segments: &mut Output<'_>,
    segment_layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(PrimitiveVariant::Sphere, input)?;
    let segment_layout = SphericalSegmentLayout::resolve(segment_layout)?;
    let start = segments.cursor();

    for record in input.chunks_exact(PrimitiveVariant::Sphere.stride()) {
        let mut fields = FieldReader::new(record);
        let (tree_index, color) = read_prefix(&mut fields);
        let center = fields.vec3();
        let radius = fields.f32();

        SphericalSegmentInstance {
            tree_index,
            color,
            center,
            normal: Vec3::Z,
            radius,
            height: 2.0 * radius,
        }
        .write(
            segments.take(OutputKind::SphericalSegment)?,
            &segment_layout,
        )?;
    }

    Ok(segments.cursor() - start)
}

/// Decode open spherical segment records, writing one segment instance per
/// record.
///
/// Returns the bytes written.
pub fn transcode_open_spherical_segments(
    input: &[u8],
    segments: &mut Output<'_>,
    segment_layout: &AttributeLayout,
) -> Result<usize, CadreError> {
    validate(PrimitiveVariant::OpenSphericalSegment, input)?;
    let segment_layout = SphericalSegmentLayout::resolve(segment_layout)?;
    let start = segments.cursor();

    for record in
        input.chunks_exact(PrimitiveVariant::OpenSphericalSegment.stride())
    {
        SphericalSegment::decode(record).instance().write(
            segments.take(OutputKind::SphericalSegment)?,
            &segment_layout,
        )?;
    }

    Ok(segments.cursor() - start)
}

/// Decode closed spherical segment records, writing one segment instance
/// and its cap circle per record.
///
/// Returns the bytes written to (spherical segments, circles).
pub fn transcode_closed_spherical_segments(
    input: &[u8],
    segments: &mut Output<'_>,
    circles: &mut Output<'_>,
    segment_layout: &AttributeLayout,
    circle_layout: &AttributeLayout,
) -> Result<(usize, usize), CadreError> {
    validate(PrimitiveVariant::ClosedSphericalSegment, input)?;
    let segment_layout = SphericalSegmentLayout::resolve(segment_layout)?;
    let circle_layout = CircleLayout::resolve(circle_layout)?;
    let segments_start = segments.cursor();
    let circles_start = circles.cursor();

    for record in input
        .chunks_exact(PrimitiveVariant::ClosedSphericalSegment.stride())
    {
        let segment = SphericalSegment::decode(record);
        segment.instance().write(
            segments.take(OutputKind::SphericalSegment)?,
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
