//! Primitive transcoders: one per input variant.
//!
//! Each transcoder takes one homogeneous input buffer, validates its length
//! against the variant stride, decodes records sequentially, reconstructs
//! the derived geometry and writes fixed-stride output records through an
//! [`Output`] destination. Transcoders return the bytes written per
//! destination so successive calls chain into shared buffers at increasing
//! offsets; [`transcode_sector`] does exactly that for a whole sector.

mod boxes;
mod circles;
mod cones;
mod cylinders;
mod eccentric_cones;
mod ellipsoids;
mod general_cylinders;
mod nuts;
mod rings;
mod spheres;
mod tori;

use glam::Vec3;

pub use boxes::transcode_boxes;
pub use circles::transcode_circles;
pub use cones::{
    transcode_closed_cones, transcode_closed_general_cones,
    transcode_open_cones, transcode_open_general_cones,
    transcode_solid_closed_general_cones,
    transcode_solid_open_general_cones,
};
pub use cylinders::{transcode_closed_cylinders, transcode_open_cylinders};
pub use eccentric_cones::{
    transcode_closed_eccentric_cones, transcode_open_eccentric_cones,
};
pub use ellipsoids::{
    transcode_closed_ellipsoid_segments, transcode_ellipsoids,
    transcode_open_ellipsoid_segments,
};
pub use general_cylinders::{
    transcode_closed_general_cylinders, transcode_open_general_cylinders,
    transcode_solid_closed_general_cylinders,
    transcode_solid_open_general_cylinders,
};
pub use nuts::transcode_nuts;
pub use rings::{
    transcode_closed_extruded_ring_segments, transcode_extruded_rings,
    transcode_open_extruded_ring_segments, transcode_rings,
};
pub use spheres::{
    transcode_closed_spherical_segments, transcode_open_spherical_segments,
    transcode_spheres,
};
pub use tori::{
    transcode_closed_torus_segments, transcode_open_torus_segments,
    transcode_tori,
};

use crate::error::CadreError;
use crate::estimate::SectorLengths;
use crate::layout::{AttributeLayout, OutputKind, PrimitiveVariant};
use crate::math;
use crate::wire::FieldReader;

/// Destination buffer with an advancing write cursor.
///
/// The cursor starts at a caller-supplied offset, so several transcoder
/// invocations can pack records into one shared buffer back to back.
#[derive(Debug)]
pub struct Output<'a> {
    data: &'a mut [u8],
    cursor: usize,
}

impl<'a> Output<'a> {
    /// Wrap `data`, writing from `offset` onwards.
    #[must_use]
    pub fn new(data: &'a mut [u8], offset: usize) -> Self {
        Self {
            data,
            cursor: offset,
        }
    }

    /// Current write position in bytes.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Hand out the next record slot for `kind`, advancing the cursor.
    pub(crate) fn take(
        &mut self,
        kind: OutputKind,
    ) -> Result<&mut [u8], CadreError> {
        let start = self.cursor;
        let end = start + kind.stride();
        let Some(slot) = self.data.get_mut(start..end) else {
            return Err(CadreError::OutputOverflow { kind: kind.name() });
        };
        self.cursor = end;
        Ok(slot)
    }
}

/// Reject input buffers whose length is not an exact record multiple,
/// before any decoding happens.
pub(crate) fn validate(
    variant: PrimitiveVariant,
    input: &[u8],
) -> Result<(), CadreError> {
    let stride = variant.stride();
    if input.len() % stride == 0 {
        Ok(())
    } else {
        Err(CadreError::InvalidBufferLength {
            variant: variant.name(),
            length: input.len(),
            stride,
        })
    }
}

/// Common record prefix: tree index, color, and the unused diagonal field.
pub(crate) fn read_prefix(fields: &mut FieldReader<'_>) -> (f32, [u8; 4]) {
    let tree_index = fields.f32();
    let color = fields.color();
    fields.skip(4); // diagonal, not part of the output contract
    (tree_index, color)
}

/// Local X axis of the rotation frame that maps world +Z onto `normal`.
pub(crate) fn local_x_axis(normal: Vec3) -> Vec3 {
    math::rotation_between_z(normal).transform_vector3(Vec3::X)
}

/// A sector's per-variant input buffers. Absent variants stay empty.
#[derive(Debug, Clone, Copy, Default)]
#[allow(missing_docs)] // field names mirror the variant names 1:1
pub struct SectorBuffers<'a> {
    pub boxes: &'a [u8],
    pub circles: &'a [u8],
    pub closed_cones: &'a [u8],
    pub open_cones: &'a [u8],
    pub closed_eccentric_cones: &'a [u8],
    pub open_eccentric_cones: &'a [u8],
    pub open_general_cones: &'a [u8],
    pub closed_general_cones: &'a [u8],
    pub solid_open_general_cones: &'a [u8],
    pub solid_closed_general_cones: &'a [u8],
    pub open_cylinders: &'a [u8],
    pub closed_cylinders: &'a [u8],
    pub open_general_cylinders: &'a [u8],
    pub closed_general_cylinders: &'a [u8],
    pub solid_open_general_cylinders: &'a [u8],
    pub solid_closed_general_cylinders: &'a [u8],
    pub ellipsoids: &'a [u8],
    pub open_ellipsoid_segments: &'a [u8],
    pub closed_ellipsoid_segments: &'a [u8],
    pub extruded_rings: &'a [u8],
    pub open_extruded_ring_segments: &'a [u8],
    pub closed_extruded_ring_segments: &'a [u8],
    pub nuts: &'a [u8],
    pub rings: &'a [u8],
    pub spheres: &'a [u8],
    pub open_spherical_segments: &'a [u8],
    pub closed_spherical_segments: &'a [u8],
    pub tori: &'a [u8],
    pub open_torus_segments: &'a [u8],
    pub closed_torus_segments: &'a [u8],
}

impl SectorBuffers<'_> {
    /// Byte lengths of every buffer, for the output-size estimators.
    #[must_use]
    pub fn lengths(&self) -> SectorLengths {
        SectorLengths {
            boxes: self.boxes.len(),
            circles: self.circles.len(),
            closed_cones: self.closed_cones.len(),
            open_cones: self.open_cones.len(),
            closed_eccentric_cones: self.closed_eccentric_cones.len(),
            open_eccentric_cones: self.open_eccentric_cones.len(),
            open_general_cones: self.open_general_cones.len(),
            closed_general_cones: self.closed_general_cones.len(),
            solid_open_general_cones: self.solid_open_general_cones.len(),
            solid_closed_general_cones: self
                .solid_closed_general_cones
                .len(),
            open_cylinders: self.open_cylinders.len(),
            closed_cylinders: self.closed_cylinders.len(),
            open_general_cylinders: self.open_general_cylinders.len(),
            closed_general_cylinders: self.closed_general_cylinders.len(),
            solid_open_general_cylinders: self
                .solid_open_general_cylinders
                .len(),
            solid_closed_general_cylinders: self
                .solid_closed_general_cylinders
                .len(),
            ellipsoids: self.ellipsoids.len(),
            open_ellipsoid_segments: self.open_ellipsoid_segments.len(),
            closed_ellipsoid_segments: self.closed_ellipsoid_segments.len(),
            extruded_rings: self.extruded_rings.len(),
            open_extruded_ring_segments: self
                .open_extruded_ring_segments
                .len(),
            closed_extruded_ring_segments: self
                .closed_extruded_ring_segments
                .len(),
            nuts: self.nuts.len(),
            rings: self.rings.len(),
            spheres: self.spheres.len(),
            open_spherical_segments: self.open_spherical_segments.len(),
            closed_spherical_segments: self.closed_spherical_segments.len(),
            tori: self.tori.len(),
            open_torus_segments: self.open_torus_segments.len(),
            closed_torus_segments: self.closed_torus_segments.len(),
        }
    }
}

/// One attribute layout per output kind.
#[derive(Debug, Clone)]
#[allow(missing_docs)] // field names mirror the output kinds 1:1
pub struct LayoutSet {
    pub boxes: AttributeLayout,
    pub circles: AttributeLayout,
    pub cones: AttributeLayout,
    pub eccentric_cones: AttributeLayout,
    pub ellipsoid_segments: AttributeLayout,
    pub general_cylinders: AttributeLayout,
    pub general_rings: AttributeLayout,
    pub nuts: AttributeLayout,
    pub quads: AttributeLayout,
    pub spherical_segments: AttributeLayout,
    pub torus_segments: AttributeLayout,
    pub trapeziums: AttributeLayout,
}

impl Default for LayoutSet {
    /// The canonical packed layout for every kind.
    fn default() -> Self {
        Self {
            boxes: OutputKind::Box.packed_layout(),
            circles: OutputKind::Circle.packed_layout(),
            cones: OutputKind::Cone.packed_layout(),
            eccentric_cones: OutputKind::EccentricCone.packed_layout(),
            ellipsoid_segments: OutputKind::EllipsoidSegment.packed_layout(),
            general_cylinders: OutputKind::GeneralCylinder.packed_layout(),
            general_rings: OutputKind::GeneralRing.packed_layout(),
            nuts: OutputKind::Nut.packed_layout(),
            quads: OutputKind::Quad.packed_layout(),
            spherical_segments: OutputKind::SphericalSegment.packed_layout(),
            torus_segments: OutputKind::TorusSegment.packed_layout(),
            trapeziums: OutputKind::Trapezium.packed_layout(),
        }
    }
}

/// Transcoded output buffers of one sector, one per kind.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)] // field names mirror the output kinds 1:1
pub struct SectorOutput {
    pub boxes: Vec<u8>,
    pub circles: Vec<u8>,
    pub cones: Vec<u8>,
    pub eccentric_cones: Vec<u8>,
    pub ellipsoid_segments: Vec<u8>,
    pub general_cylinders: Vec<u8>,
    pub general_rings: Vec<u8>,
    pub nuts: Vec<u8>,
    pub quads: Vec<u8>,
    pub spherical_segments: Vec<u8>,
    pub torus_segments: Vec<u8>,
    pub trapeziums: Vec<u8>,
}

/// Transcode every buffer of a sector into freshly allocated output
/// buffers, sized exactly once via the estimators and filled back to back
/// in a fixed variant order.
///
/// # Errors
///
/// Any transcoder failure (bad input length, incomplete layout) aborts the
/// whole sector.
pub fn transcode_sector(
    sector: &SectorBuffers<'_>,
    layouts: &LayoutSet,
) -> Result<SectorOutput, CadreError> {
    let sizes = sector.lengths().output_sizes();
    let mut out = SectorOutput {
        boxes: vec![0; sizes.boxes],
        circles: vec![0; sizes.circles],
        cones: vec![0; sizes.cones],
        eccentric_cones: vec![0; sizes.eccentric_cones],
        ellipsoid_segments: vec![0; sizes.ellipsoid_segments],
        general_cylinders: vec![0; sizes.general_cylinders],
        general_rings: vec![0; sizes.general_rings],
        nuts: vec![0; sizes.nuts],
        quads: vec![0; sizes.quads],
        spherical_segments: vec![0; sizes.spherical_segments],
        torus_segments: vec![0; sizes.torus_segments],
        trapeziums: vec![0; sizes.trapeziums],
    };

    let mut boxes = Output::new(&mut out.boxes, 0);
    let mut circles = Output::new(&mut out.circles, 0);
    let mut cones = Output::new(&mut out.cones, 0);
    let mut eccentric_cones = Output::new(&mut out.eccentric_cones, 0);
    let mut ellipsoid_segments = Output::new(&mut out.ellipsoid_segments, 0);
    let mut general_cylinders = Output::new(&mut out.general_cylinders, 0);
    let mut general_rings = Output::new(&mut out.general_rings, 0);
    let mut nuts = Output::new(&mut out.nuts, 0);
    let mut quads = Output::new(&mut out.quads, 0);
    let mut spherical_segments =
        Output::new(&mut out.spherical_segments, 0);
    let mut torus_segments = Output::new(&mut out.torus_segments, 0);
    let mut trapeziums = Output::new(&mut out.trapeziums, 0);

    let _ = transcode_boxes(sector.boxes, &mut boxes, &layouts.boxes)?;
    let _ =
        transcode_circles(sector.circles, &mut circles, &layouts.circles)?;
    let _ = transcode_closed_cones(
        sector.closed_cones,
        &mut cones,
        &mut circles,
        &layouts.cones,
        &layouts.circles,
    )?;
    let _ = transcode_open_cones(
        sector.open_cones,
        &mut cones,
        &layouts.cones,
    )?;
    let _ = transcode_closed_eccentric_cones(
        sector.closed_eccentric_cones,
        &mut eccentric_cones,
        &mut circles,
        &layouts.eccentric_cones,
        &layouts.circles,
    )?;
    let _ = transcode_open_eccentric_cones(
        sector.open_eccentric_cones,
        &mut eccentric_cones,
        &layouts.eccentric_cones,
    )?;
    let _ = transcode_open_general_cones(
        sector.open_general_cones,
        &mut cones,
        &layouts.cones,
    )?;
    let _ = transcode_closed_general_cones(
        sector.closed_general_cones,
        &mut cones,
        &mut general_rings,
        &layouts.cones,
        &layouts.general_rings,
    )?;
    let _ = transcode_solid_open_general_cones(
        sector.solid_open_general_cones,
        &mut cones,
        &mut general_rings,
        &layouts.cones,
        &layouts.general_rings,
    )?;
    let _ = transcode_solid_closed_general_cones(
        sector.solid_closed_general_cones,
        &mut cones,
        &mut general_rings,
        &mut trapeziums,
        &layouts.cones,
        &layouts.general_rings,
        &layouts.trapeziums,
    )?;
    let _ = transcode_open_cylinders(
        sector.open_cylinders,
        &mut cones,
        &layouts.cones,
    )?;
    let _ = transcode_closed_cylinders(
        sector.closed_cylinders,
        &mut cones,
        &mut circles,
        &layouts.cones,
        &layouts.circles,
    )?;
    let _ = transcode_open_general_cylinders(
        sector.open_general_cylinders,
        &mut general_cylinders,
        &layouts.general_cylinders,
    )?;
    let _ = transcode_closed_general_cylinders(
        sector.closed_general_cylinders,
        &mut general_cylinders,
        &mut general_rings,
        &layouts.general_cylinders,
        &layouts.general_rings,
    )?;
    let _ = transcode_solid_open_general_cylinders(
        sector.solid_open_general_cylinders,
        &mut general_cylinders,
        &mut general_rings,
        &layouts.general_cylinders,
        &layouts.general_rings,
    )?;
    let _ = transcode_solid_closed_general_cylinders(
        sector.solid_closed_general_cylinders,
        &mut general_cylinders,
        &mut general_rings,
        &mut trapeziums,
        &layouts.general_cylinders,
        &layouts.general_rings,
        &layouts.trapeziums,
    )?;
    let _ = transcode_ellipsoids(
        sector.ellipsoids,
        &mut ellipsoid_segments,
        &layouts.ellipsoid_segments,
    )?;
    let _ = transcode_open_ellipsoid_segments(
        sector.open_ellipsoid_segments,
        &mut ellipsoid_segments,
        &layouts.ellipsoid_segments,
    )?;
    let _ = transcode_closed_ellipsoid_segments(
        sector.closed_ellipsoid_segments,
        &mut ellipsoid_segments,
        &mut circles,
        &layouts.ellipsoid_segments,
        &layouts.circles,
    )?;
    let _ = transcode_extruded_rings(
        sector.extruded_rings,
        &mut cones,
        &mut general_rings,
        &layouts.cones,
        &layouts.general_rings,
    )?;
    let _ = transcode_open_extruded_ring_segments(
        sector.open_extruded_ring_segments,
        &mut cones,
        &mut general_rings,
        &layouts.cones,
        &layouts.general_rings,
    )?;
    let _ = transcode_closed_extruded_ring_segments(
        sector.closed_extruded_ring_segments,
        &mut cones,
        &mut general_rings,
        &mut quads,
        &layouts.cones,
        &layouts.general_rings,
        &layouts.quads,
    )?;
    let _ = transcode_nuts(sector.nuts, &mut nuts, &layouts.nuts)?;
    let _ = transcode_rings(
        sector.rings,
        &mut general_rings,
        &layouts.general_rings,
    )?;
    let _ = transcode_spheres(
        sector.spheres,
        &mut spherical_segments,
        &layouts.spherical_segments,
    )?;
    let _ = transcode_open_spherical_segments(
        sector.open_spherical_segments,
        &mut spherical_segments,
        &layouts.spherical_segments,
    )?;
    let _ = transcode_closed_spherical_segments(
        sector.closed_spherical_segments,
        &mut spherical_segments,
        &mut circles,
        &layouts.spherical_segments,
        &layouts.circles,
    )?;
    let _ = transcode_tori(
        sector.tori,
        &mut torus_segments,
        &layouts.torus_segments,
    )?;
    let _ = transcode_open_torus_segments(
        sector.open_torus_segments,
        &mut torus_segments,
        &layouts.torus_segments,
    )?;
    let _ = transcode_closed_torus_segments(
        sector.closed_torus_segments,
        &mut torus_segments,
        &layouts.torus_segments,
    )?;

    debug_assert_eq!(cones.cursor(), sizes.cones);
    debug_assert_eq!(circles.cursor(), sizes.circles);
    debug_assert_eq!(general_rings.cursor(), sizes.general_rings);

    log::debug!(
        "transcoded sector: {} cone, {} circle, {} general ring bytes",
        sizes.cones,
        sizes.circles,
        sizes.general_rings
    );

    Ok(out)
}
