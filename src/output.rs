//! GPU-facing output records and their resolved attribute layouts.
//!
//! Each output kind pairs an instance struct (the computed record) with a
//! layout struct holding the byte offsets resolved once per transcoder call
//! from the consumer's [`AttributeLayout`] - hash lookups stay out of the
//! per-record loop, and a missing attribute fails before any decoding.
//!
//! All writes respect the resolved offsets; floats are little-endian
//! float32, colors are written B, G, R, A.

use glam::{Mat4, Vec3, Vec4};

use crate::error::CadreError;
use crate::layout::{AttributeLayout, OutputKind};
use crate::wire::{
    put_color, put_f32, put_mat4, put_vec3, put_vec4, Overflow,
};

fn require(
    layout: &AttributeLayout,
    kind: OutputKind,
    attribute: &str,
) -> Result<usize, CadreError> {
    layout.offset_of(attribute).ok_or_else(|| {
        CadreError::MissingAttribute {
            kind: kind.name(),
            attribute: attribute.to_owned(),
        }
    })
}

fn overflow(kind: OutputKind) -> CadreError {
    CadreError::OutputOverflow { kind: kind.name() }
}

/// Resolved offsets for box records.
#[derive(Debug, Clone, Copy)]
pub struct BoxLayout {
    tree_index: usize,
    color: usize,
    instance_matrix: usize,
}

impl BoxLayout {
    /// Resolve the required attributes from `layout`.
    pub fn resolve(layout: &AttributeLayout) -> Result<Self, CadreError> {
        let kind = OutputKind::Box;
        Ok(Self {
            tree_index: require(layout, kind, "treeIndex")?,
            color: require(layout, kind, "color")?,
            instance_matrix: require(layout, kind, "instanceMatrix")?,
        })
    }
}

/// One box instance record.
#[derive(Debug, Clone, Copy)]
pub struct BoxInstance {
    /// Node tree index, carried as float32 on the wire.
    pub tree_index: f32,
    /// R, G, B, A color bytes.
    pub color: [u8; 4],
    /// World transform of a unit cube.
    pub instance_matrix: Mat4,
}

impl BoxInstance {
    /// Write the record into `slot` at the resolved offsets.
    pub fn write(
        &self,
        slot: &mut [u8],
        layout: &BoxLayout,
    ) -> Result<(), CadreError> {
        self.put(slot, layout).map_err(|_| overflow(OutputKind::Box))
    }

    fn put(
        &self,
        slot: &mut [u8],
        layout: &BoxLayout,
    ) -> Result<(), Overflow> {
        put_f32(slot, layout.tree_index, self.tree_index)?;
        put_color(slot, layout.color, self.color)?;
        put_mat4(slot, layout.instance_matrix, &self.instance_matrix)
    }
}

/// Resolved offsets for circle records.
#[derive(Debug, Clone, Copy)]
pub struct CircleLayout {
    tree_index: usize,
    color: usize,
    normal: usize,
    instance_matrix: usize,
}

impl CircleLayout {
    /// Resolve the required attributes from `layout`.
    pub fn resolve(layout: &AttributeLayout) -> Result<Self, CadreError> {
        let kind = OutputKind::Circle;
        Ok(Self {
            tree_index: require(layout, kind, "treeIndex")?,
            color: require(layout, kind, "color")?,
            normal: require(layout, kind, "normal")?,
            instance_matrix: require(layout, kind, "instanceMatrix")?,
        })
    }
}

/// One disc instance record.
#[derive(Debug, Clone, Copy)]
pub struct CircleInstance {
    /// Node tree index.
    pub tree_index: f32,
    /// R, G, B, A color bytes.
    pub color: [u8; 4],
    /// Facing direction.
    pub normal: Vec3,
    /// World transform of a unit disc.
    pub instance_matrix: Mat4,
}

impl CircleInstance {
    /// Build a disc record from center/normal/radius; the instance matrix
    /// maps the unit disc onto the circle's plane.
    #[must_use]
    pub fn from_parts(
        tree_index: f32,
        color: [u8; 4],
        center: Vec3,
        normal: Vec3,
        radius: f32,
    ) -> Self {
        let instance_matrix = Mat4::from_translation(center)
            * crate::math::rotation_between_z(normal)
            * Mat4::from_scale(Vec3::new(2.0 * radius, 2.0 * radius, 1.0));
        Self {
            tree_index,
            color,
            normal,
            instance_matrix,
        }
    }

    /// Write the record into `slot` at the resolved offsets.
    pub fn write(
        &self,
        slot: &mut [u8],
        layout: &CircleLayout,
    ) -> Result<(), CadreError> {
        self.put(slot, layout)
            .map_err(|_| overflow(OutputKind::Circle))
    }

    fn put(
        &self,
        slot: &mut [u8],
        layout: &CircleLayout,
    ) -> Result<(), Overflow> {
        put_f32(slot, layout.tree_index, self.tree_index)?;
        put_color(slot, layout.color, self.color)?;
        put_vec3(slot, layout.normal, self.normal)?;
        put_mat4(slot, layout.instance_matrix, &self.instance_matrix)
    }
}

/// Resolved offsets for cone records.
#[derive(Debug, Clone, Copy)]
pub struct ConeLayout {
    tree_index: usize,
    color: usize,
    center_a: usize,
    center_b: usize,
    radius_a: usize,
    radius_b: usize,
    angle: usize,
    arc_angle: usize,
    local_x_axis: usize,
}

impl ConeLayout {
    /// Resolve the required attributes from `layout`.
    pub fn resolve(layout: &AttributeLayout) -> Result<Self, CadreError> {
        let kind = OutputKind::Cone;
        Ok(Self {
            tree_index: require(layout, kind, "treeIndex")?,
            color: require(layout, kind, "color")?,
            center_a: require(layout, kind, "centerA")?,
            center_b: require(layout, kind, "centerB")?,
            radius_a: require(layout, kind, "radiusA")?,
            radius_b: require(layout, kind, "radiusB")?,
            angle: require(layout, kind, "angle")?,
            arc_angle: require(layout, kind, "arcAngle")?,
            local_x_axis: require(layout, kind, "localXAxis")?,
        })
    }
}

/// One cone (or cylinder) wall instance record.
#[derive(Debug, Clone, Copy)]
pub struct ConeInstance {
    /// Node tree index.
    pub tree_index: f32,
    /// R, G, B, A color bytes.
    pub color: [u8; 4],
    /// Top cap center.
    pub center_a: Vec3,
    /// Bottom cap center.
    pub center_b: Vec3,
    /// Radius at the top cap.
    pub radius_a: f32,
    /// Radius at the bottom cap.
    pub radius_b: f32,
    /// Rotation angle of the arc start, radians.
    pub angle: f32,
    /// Arc sweep, radians (2π for full revolution).
    pub arc_angle: f32,
    /// Local X axis of the cone's rotation frame.
    pub local_x_axis: Vec3,
}

impl ConeInstance {
    /// Write the record into `slot` at the resolved offsets.
    pub fn write(
        &self,
        slot: &mut [u8],
        layout: &ConeLayout,
    ) -> Result<(), CadreError> {
        self.put(slot, layout).map_err(|_| overflow(OutputKind::Cone))
    }

    fn put(
        &self,
        slot: &mut [u8],
        layout: &ConeLayout,
    ) -> Result<(), Overflow> {
        put_f32(slot, layout.tree_index, self.tree_index)?;
        put_color(slot, layout.color, self.color)?;
        put_vec3(slot, layout.center_a, self.center_a)?;
        put_vec3(slot, layout.center_b, self.center_b)?;
        put_f32(slot, layout.radius_a, self.radius_a)?;
        put_f32(slot, layout.radius_b, self.radius_b)?;
        put_f32(slot, layout.angle, self.angle)?;
        put_f32(slot, layout.arc_angle, self.arc_angle)?;
        put_vec3(slot, layout.local_x_axis, self.local_x_axis)
    }
}

/// Resolved offsets for eccentric cone records.
#[derive(Debug, Clone, Copy)]
pub struct EccentricConeLayout {
    tree_index: usize,
    color: usize,
    center_a: usize,
    center_b: usize,
    radius_a: usize,
    radius_b: usize,
    normal: usize,
}

impl EccentricConeLayout {
    /// Resolve the required attributes from `layout`.
    pub fn resolve(layout: &AttributeLayout) -> Result<Self, CadreError> {
        let kind = OutputKind::EccentricCone;
        Ok(Self {
            tree_index: require(layout, kind, "treeIndex")?,
            color: require(layout, kind, "color")?,
            center_a: require(layout, kind, "centerA")?,
            center_b: require(layout, kind, "centerB")?,
            radius_a: require(layout, kind, "radiusA")?,
            radius_b: require(layout, kind, "radiusB")?,
            normal: require(layout, kind, "normal")?,
        })
    }
}

/// One eccentric cone instance record. The cap normal is not aligned with
/// the center axis.
#[derive(Debug, Clone, Copy)]
pub struct EccentricConeInstance {
    /// Node tree index.
    pub tree_index: f32,
    /// R, G, B, A color bytes.
    pub color: [u8; 4],
    /// Top cap center.
    pub center_a: Vec3,
    /// Bottom cap center.
    pub center_b: Vec3,
    /// Radius at the top cap.
    pub radius_a: f32,
    /// Radius at the bottom cap.
    pub radius_b: f32,
    /// Cap normal, oriented along the center axis.
    pub normal: Vec3,
}

impl EccentricConeInstance {
    /// Write the record into `slot` at the resolved offsets.
    pub fn write(
        &self,
        slot: &mut [u8],
        layout: &EccentricConeLayout,
    ) -> Result<(), CadreError> {
        self.put(slot, layout)
            .map_err(|_| overflow(OutputKind::EccentricCone))
    }

    fn put(
        &self,
        slot: &mut [u8],
        layout: &EccentricConeLayout,
    ) -> Result<(), Overflow> {
        put_f32(slot, layout.tree_index, self.tree_index)?;
        put_color(slot, layout.color, self.color)?;
        put_vec3(slot, layout.center_a, self.center_a)?;
        put_vec3(slot, layout.center_b, self.center_b)?;
        put_f32(slot, layout.radius_a, self.radius_a)?;
        put_f32(slot, layout.radius_b, self.radius_b)?;
        put_vec3(slot, layout.normal, self.normal)
    }
}

/// Resolved offsets for ellipsoid segment records.
#[derive(Debug, Clone, Copy)]
pub struct EllipsoidSegmentLayout {
    tree_index: usize,
    color: usize,
    center: usize,
    normal: usize,
    horizontal_radius: usize,
    vertical_radius: usize,
    height: usize,
}

impl EllipsoidSegmentLayout {
    /// Resolve the required attributes from `layout`.
    pub fn resolve(layout: &AttributeLayout) -> Result<Self, CadreError> {
        let kind = OutputKind::EllipsoidSegment;
        Ok(Self {
            tree_index: require(layout, kind, "treeIndex")?,
            color: require(layout, kind, "color")?,
            center: require(layout, kind, "center")?,
            normal: require(layout, kind, "normal")?,
            horizontal_radius: require(layout, kind, "horizontalRadius")?,
            vertical_radius: require(layout, kind, "verticalRadius")?,
            height: require(layout, kind, "height")?,
        })
    }
}

/// One ellipsoid segment instance record.
#[derive(Debug, Clone, Copy)]
pub struct EllipsoidSegmentInstance {
    /// Node tree index.
    pub tree_index: f32,
    /// R, G, B, A color bytes.
    pub color: [u8; 4],
    /// Ellipsoid center.
    pub center: Vec3,
    /// Vertical (polar) axis direction.
    pub normal: Vec3,
    /// Equatorial semi-axis.
    pub horizontal_radius: f32,
    /// Polar semi-axis.
    pub vertical_radius: f32,
    /// Segment height measured from the pole (2·vertical for full).
    pub height: f32,
}

impl EllipsoidSegmentInstance {
    /// Write the record into `slot` at the resolved offsets.
    pub fn write(
        &self,
        slot: &mut [u8],
        layout: &EllipsoidSegmentLayout,
    ) -> Result<(), CadreError> {
        self.put(slot, layout)
            .map_err(|_| overflow(OutputKind::EllipsoidSegment))
    }

    fn put(
        &self,
        slot: &mut [u8],
        layout: &EllipsoidSegmentLayout,
    ) -> Result<(), Overflow> {
        put_f32(slot, layout.tree_index, self.tree_index)?;
        put_color(slot, layout.color, self.color)?;
        put_vec3(slot, layout.center, self.center)?;
        put_vec3(slot, layout.normal, self.normal)?;
        put_f32(slot, layout.horizontal_radius, self.horizontal_radius)?;
        put_f32(slot, layout.vertical_radius, self.vertical_radius)?;
        put_f32(slot, layout.height, self.height)
    }
}

/// Resolved offsets for general cylinder records.
#[derive(Debug, Clone, Copy)]
pub struct GeneralCylinderLayout {
    tree_index: usize,
    color: usize,
    center_a: usize,
    center_b: usize,
    radius: usize,
    angle: usize,
    plane_a: usize,
    plane_b: usize,
    arc_angle: usize,
    local_x_axis: usize,
}

impl GeneralCylinderLayout {
    /// Resolve the required attributes from `layout`.
    pub fn resolve(layout: &AttributeLayout) -> Result<Self, CadreError> {
        let kind = OutputKind::GeneralCylinder;
        Ok(Self {
            tree_index: require(layout, kind, "treeIndex")?,
            color: require(layout, kind, "color")?,
            center_a: require(layout, kind, "centerA")?,
            center_b: require(layout, kind, "centerB")?,
            radius: require(layout, kind, "radius")?,
            angle: require(layout, kind, "angle")?,
            plane_a: require(layout, kind, "planeA")?,
            plane_b: require(layout, kind, "planeB")?,
            arc_angle: require(layout, kind, "arcAngle")?,
            local_x_axis: require(layout, kind, "localXAxis")?,
        })
    }
}

/// One general cylinder wall instance record, bounded by two tilted cap
/// planes.
#[derive(Debug, Clone, Copy)]
pub struct GeneralCylinderInstance {
    /// Node tree index.
    pub tree_index: f32,
    /// R, G, B, A color bytes.
    pub color: [u8; 4],
    /// Top cap center.
    pub center_a: Vec3,
    /// Bottom cap center.
    pub center_b: Vec3,
    /// Wall radius.
    pub radius: f32,
    /// Rotation angle of the arc start, radians.
    pub angle: f32,
    /// Top cap plane (normal xyz, height w).
    pub plane_a: Vec4,
    /// Bottom cap plane (normal xyz, height w).
    pub plane_b: Vec4,
    /// Arc sweep, radians.
    pub arc_angle: f32,
    /// Local X axis of the cylinder's rotation frame.
    pub local_x_axis: Vec3,
}

impl GeneralCylinderInstance {
    /// Write the record into `slot` at the resolved offsets.
    pub fn write(
        &self,
        slot: &mut [u8],
        layout: &GeneralCylinderLayout,
    ) -> Result<(), CadreError> {
        self.put(slot, layout)
            .map_err(|_| overflow(OutputKind::GeneralCylinder))
    }

    fn put(
        &self,
        slot: &mut [u8],
        layout: &GeneralCylinderLayout,
    ) -> Result<(), Overflow> {
        put_f32(slot, layout.tree_index, self.tree_index)?;
        put_color(slot, layout.color, self.color)?;
        put_vec3(slot, layout.center_a, self.center_a)?;
        put_vec3(slot, layout.center_b, self.center_b)?;
        put_f32(slot, layout.radius, self.radius)?;
        put_f32(slot, layout.angle, self.angle)?;
        put_vec4(slot, layout.plane_a, self.plane_a)?;
        put_vec4(slot, layout.plane_b, self.plane_b)?;
        put_f32(slot, layout.arc_angle, self.arc_angle)?;
        put_vec3(slot, layout.local_x_axis, self.local_x_axis)
    }
}

/// Resolved offsets for general ring records.
#[derive(Debug, Clone, Copy)]
pub struct GeneralRingLayout {
    tree_index: usize,
    color: usize,
    normal: usize,
    thickness: usize,
    angle: usize,
    arc_angle: usize,
    instance_matrix: usize,
}

impl GeneralRingLayout {
    /// Resolve the required attributes from `layout`.
    pub fn resolve(layout: &AttributeLayout) -> Result<Self, CadreError> {
        let kind = OutputKind::GeneralRing;
        Ok(Self {
            tree_index: require(layout, kind, "treeIndex")?,
            color: require(layout, kind, "color")?,
            normal: require(layout, kind, "normal")?,
            thickness: require(layout, kind, "thickness")?,
            angle: require(layout, kind, "angle")?,
            arc_angle: require(layout, kind, "arcAngle")?,
            instance_matrix: require(layout, kind, "instanceMatrix")?,
        })
    }
}

/// One elliptical ring instance record.
#[derive(Debug, Clone, Copy)]
pub struct GeneralRingInstance {
    /// Node tree index.
    pub tree_index: f32,
    /// R, G, B, A color bytes.
    pub color: [u8; 4],
    /// Facing direction.
    pub normal: Vec3,
    /// Radial wall fraction in (0, 1]; 1 is a full disc.
    pub thickness: f32,
    /// Rotation angle of the arc start, radians.
    pub angle: f32,
    /// Arc sweep, radians.
    pub arc_angle: f32,
    /// World transform of the unit disc onto the ring's ellipse.
    pub instance_matrix: Mat4,
}

impl GeneralRingInstance {
    /// Write the record into `slot` at the resolved offsets.
    pub fn write(
        &self,
        slot: &mut [u8],
        layout: &GeneralRingLayout,
    ) -> Result<(), CadreError> {
        self.put(slot, layout)
            .map_err(|_| overflow(OutputKind::GeneralRing))
    }

    fn put(
        &self,
        slot: &mut [u8],
        layout: &GeneralRingLayout,
    ) -> Result<(), Overflow> {
        put_f32(slot, layout.tree_index, self.tree_index)?;
        put_color(slot, layout.color, self.color)?;
        put_vec3(slot, layout.normal, self.normal)?;
        put_f32(slot, layout.thickness, self.thickness)?;
        put_f32(slot, layout.angle, self.angle)?;
        put_f32(slot, layout.arc_angle, self.arc_angle)?;
        put_mat4(slot, layout.instance_matrix, &self.instance_matrix)
    }
}

/// Resolved offsets for nut records.
#[derive(Debug, Clone, Copy)]
pub struct NutLayout {
    tree_index: usize,
    color: usize,
    instance_matrix: usize,
}

impl NutLayout {
    /// Resolve the required attributes from `layout`.
    pub fn resolve(layout: &AttributeLayout) -> Result<Self, CadreError> {
        let kind = OutputKind::Nut;
        Ok(Self {
            tree_index: require(layout, kind, "treeIndex")?,
            color: require(layout, kind, "color")?,
            instance_matrix: require(layout, kind, "instanceMatrix")?,
        })
    }
}

/// One hexagonal nut instance record.
#[derive(Debug, Clone, Copy)]
pub struct NutInstance {
    /// Node tree index.
    pub tree_index: f32,
    /// R, G, B, A color bytes.
    pub color: [u8; 4],
    /// World transform of the unit nut mesh.
    pub instance_matrix: Mat4,
}

impl NutInstance {
    /// Write the record into `slot` at the resolved offsets.
    pub fn write(
        &self,
        slot: &mut [u8],
        layout: &NutLayout,
    ) -> Result<(), CadreError> {
        self.put(slot, layout).map_err(|_| overflow(OutputKind::Nut))
    }

    fn put(
        &self,
        slot: &mut [u8],
        layout: &NutLayout,
    ) -> Result<(), Overflow> {
        put_f32(slot, layout.tree_index, self.tree_index)?;
        put_color(slot, layout.color, self.color)?;
        put_mat4(slot, layout.instance_matrix, &self.instance_matrix)
    }
}

/// Resolved offsets for quad records.
#[derive(Debug, Clone, Copy)]
pub struct QuadLayout {
    tree_index: usize,
    color: usize,
    instance_matrix: usize,
}

impl QuadLayout {
    /// Resolve the required attributes from `layout`.
    pub fn resolve(layout: &AttributeLayout) -> Result<Self, CadreError> {
        let kind = OutputKind::Quad;
        Ok(Self {
            tree_index: require(layout, kind, "treeIndex")?,
            color: require(layout, kind, "color")?,
            instance_matrix: require(layout, kind, "instanceMatrix")?,
        })
    }
}

/// One quad instance record.
#[derive(Debug, Clone, Copy)]
pub struct QuadInstance {
    /// Node tree index.
    pub tree_index: f32,
    /// R, G, B, A color bytes.
    pub color: [u8; 4],
    /// World transform of the unit quad.
    pub instance_matrix: Mat4,
}

impl QuadInstance {
    /// Write the record into `slot` at the resolved offsets.
    pub fn write(
        &self,
        slot: &mut [u8],
        layout: &QuadLayout,
    ) -> Result<(), CadreError> {
        self.put(slot, layout).map_err(|_| overflow(OutputKind::Quad))
    }

    fn put(
        &self,
        slot: &mut [u8],
        layout: &QuadLayout,
    ) -> Result<(), Overflow> {
        put_f32(slot, layout.tree_index, self.tree_index)?;
        put_color(slot, layout.color, self.color)?;
        put_mat4(slot, layout.instance_matrix, &self.instance_matrix)
    }
}

/// Resolved offsets for spherical segment records.
#[derive(Debug, Clone, Copy)]
pub struct SphericalSegmentLayout {
    tree_index: usize,
    color: usize,
    center: usize,
    normal: usize,
    radius: usize,
    height: usize,
}

impl SphericalSegmentLayout {
    /// Resolve the required attributes from `layout`.
    pub fn resolve(layout: &AttributeLayout) -> Result<Self, CadreError> {
        let kind = OutputKind::SphericalSegment;
        Ok(Self {
            tree_index: require(layout, kind, "treeIndex")?,
            color: require(layout, kind, "color")?,
            center: require(layout, kind, "center")?,
            normal: require(layout, kind, "normal")?,
            radius: require(layout, kind, "radius")?,
            height: require(layout, kind, "height")?,
        })
    }
}

/// One spherical segment instance record.
#[derive(Debug, Clone, Copy)]
pub struct SphericalSegmentInstance {
    /// Node tree index.
    pub tree_index: f32,
    /// R, G, B, A color bytes.
    pub color: [u8; 4],
    /// Sphere center.
    pub center: Vec3,
    /// Polar axis direction.
    pub normal: Vec3,
    /// Sphere radius.
    pub radius: f32,
    /// Segment height from the pole (2·radius for a full sphere).
    pub height: f32,
}

impl SphericalSegmentInstance {
    /// Write the record into `slot` at the resolved offsets.
    pub fn write(
        &self,
        slot: &mut [u8],
        layout: &SphericalSegmentLayout,
    ) -> Result<(), CadreError> {
        self.put(slot, layout)
            .map_err(|_| overflow(OutputKind::SphericalSegment))
    }

    fn put(
        &self,
        slot: &mut [u8],
        layout: &SphericalSegmentLayout,
    ) -> Result<(), Overflow> {
        put_f32(slot, layout.tree_index, self.tree_index)?;
        put_color(slot, layout.color, self.color)?;
        put_vec3(slot, layout.center, self.center)?;
        put_vec3(slot, layout.normal, self.normal)?;
        put_f32(slot, layout.radius, self.radius)?;
        put_f32(slot, layout.height, self.height)
    }
}

/// Resolved offsets for torus segment records.
#[derive(Debug, Clone, Copy)]
pub struct TorusSegmentLayout {
    tree_index: usize,
    color: usize,
    radius: usize,
    tube_radius: usize,
    angle: usize,
    arc_angle: usize,
    instance_matrix: usize,
}

impl TorusSegmentLayout {
    /// Resolve the required attributes from `layout`.
    pub fn resolve(layout: &AttributeLayout) -> Result<Self, CadreError> {
        let kind = OutputKind::TorusSegment;
        Ok(Self {
            tree_index: require(layout, kind, "treeIndex")?,
            color: require(layout, kind, "color")?,
            radius: require(layout, kind, "radius")?,
            tube_radius: require(layout, kind, "tubeRadius")?,
            angle: require(layout, kind, "angle")?,
            arc_angle: require(layout, kind, "arcAngle")?,
            instance_matrix: require(layout, kind, "instanceMatrix")?,
        })
    }
}

/// One torus segment instance record.
#[derive(Debug, Clone, Copy)]
pub struct TorusSegmentInstance {
    /// Node tree index.
    pub tree_index: f32,
    /// R, G, B, A color bytes.
    pub color: [u8; 4],
    /// Major (ring) radius.
    pub radius: f32,
    /// Minor (tube) radius.
    pub tube_radius: f32,
    /// Rotation angle of the arc start, radians.
    pub angle: f32,
    /// Arc sweep, radians.
    pub arc_angle: f32,
    /// World transform positioning the torus plane.
    pub instance_matrix: Mat4,
}

impl TorusSegmentInstance {
    /// Write the record into `slot` at the resolved offsets.
    pub fn write(
        &self,
        slot: &mut [u8],
        layout: &TorusSegmentLayout,
    ) -> Result<(), CadreError> {
        self.put(slot, layout)
            .map_err(|_| overflow(OutputKind::TorusSegment))
    }

    fn put(
        &self,
        slot: &mut [u8],
        layout: &TorusSegmentLayout,
    ) -> Result<(), Overflow> {
        put_f32(slot, layout.tree_index, self.tree_index)?;
        put_color(slot, layout.color, self.color)?;
        put_f32(slot, layout.radius, self.radius)?;
        put_f32(slot, layout.tube_radius, self.tube_radius)?;
        put_f32(slot, layout.angle, self.angle)?;
        put_f32(slot, layout.arc_angle, self.arc_angle)?;
        put_mat4(slot, layout.instance_matrix, &self.instance_matrix)
    }
}

/// Resolved offsets for trapezium records.
#[derive(Debug, Clone, Copy)]
pub struct TrapeziumLayout {
    tree_index: usize,
    color: usize,
    vertices: [usize; 4],
}

impl TrapeziumLayout {
    /// Resolve the required attributes from `layout`.
    pub fn resolve(layout: &AttributeLayout) -> Result<Self, CadreError> {
        let kind = OutputKind::Trapezium;
        Ok(Self {
            tree_index: require(layout, kind, "treeIndex")?,
            color: require(layout, kind, "color")?,
            vertices: [
                require(layout, kind, "vertex1")?,
                require(layout, kind, "vertex2")?,
                require(layout, kind, "vertex3")?,
                require(layout, kind, "vertex4")?,
            ],
        })
    }
}

/// One four-vertex trapezium instance record.
#[derive(Debug, Clone, Copy)]
pub struct TrapeziumInstance {
    /// Node tree index.
    pub tree_index: f32,
    /// R, G, B, A color bytes.
    pub color: [u8; 4],
    /// The four corners, in winding order.
    pub vertices: [Vec3; 4],
}

impl TrapeziumInstance {
    /// Write the record into `slot` at the resolved offsets.
    pub fn write(
        &self,
        slot: &mut [u8],
        layout: &TrapeziumLayout,
    ) -> Result<(), CadreError> {
        self.put(slot, layout)
            .map_err(|_| overflow(OutputKind::Trapezium))
    }

    fn put(
        &self,
        slot: &mut [u8],
        layout: &TrapeziumLayout,
    ) -> Result<(), Overflow> {
        put_f32(slot, layout.tree_index, self.tree_index)?;
        put_color(slot, layout.color, self.color)?;
        for (vertex, at) in self.vertices.iter().zip(layout.vertices) {
            put_vec3(slot, at, *vertex)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attribute_names_the_culprit() {
        let layout = AttributeLayout::new().with("treeIndex", 0);
        let err = BoxLayout::resolve(&layout).unwrap_err();
        assert_eq!(
            err,
            CadreError::MissingAttribute {
                kind: "box",
                attribute: "color".to_owned()
            }
        );
    }

    #[test]
    fn test_box_write_lands_at_layout_offsets() {
        let packed = OutputKind::Box.packed_layout();
        let layout = BoxLayout::resolve(&packed).unwrap();
        let mut slot = vec![0u8; OutputKind::Box.stride()];

        let record = BoxInstance {
            tree_index: 42.0,
            color: [1, 2, 3, 4],
            instance_matrix: Mat4::IDENTITY,
        };
        record.write(&mut slot, &layout).unwrap();

        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&slot[0..4]);
        assert_eq!(f32::from_le_bytes(bytes), 42.0);
        assert_eq!(&slot[4..8], &[3, 2, 1, 4], "color must be B,G,R,A");
    }

    #[test]
    fn test_write_into_undersized_slot_overflows() {
        let packed = OutputKind::Circle.packed_layout();
        let layout = CircleLayout::resolve(&packed).unwrap();
        let mut slot = vec![0u8; OutputKind::Circle.stride() - 1];

        let record = CircleInstance::from_parts(
            1.0,
            [0, 0, 0, 255],
            Vec3::ZERO,
            Vec3::Z,
            1.0,
        );
        assert_eq!(
            record.write(&mut slot, &layout).unwrap_err(),
            CadreError::OutputOverflow { kind: "circle" }
        );
    }
}
