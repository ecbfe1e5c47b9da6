//! Geometry helpers shared by the primitive transcoders.
//!
//! Only constructions glam has no direct equivalent for live here;
//! translations, scales and axis-angle rotations use `Mat4::from_*` at the
//! call sites.

use glam::{Mat4, Quat, Vec3, Vec4};

/// Rotation mapping the world +Z axis onto `normal`.
///
/// `normal` must be a unit vector; this is the canonical rotation frame all
/// transcoders derive their local X axis from.
pub fn rotation_between_z(normal: Vec3) -> Mat4 {
    Mat4::from_quat(Quat::from_rotation_arc(Vec3::Z, normal))
}

/// Instance transform for an elliptical ring lying in the plane spanned by
/// `local_x` and `normal × local_x`: translation to `center`, rotation into
/// the local frame, then a non-uniform scale by (2·`radius_a`, 2·`radius_b`, 1)
/// so a unit disc maps onto the ring's bounding ellipse.
pub fn general_ring_matrix(
    center: Vec3,
    normal: Vec3,
    local_x: Vec3,
    radius_a: f32,
    radius_b: f32,
) -> Mat4 {
    let local_y = normal.cross(local_x);
    let rotation = Mat4::from_cols(
        local_x.extend(0.0),
        local_y.extend(0.0),
        normal.extend(0.0),
        Vec4::W,
    );
    Mat4::from_translation(center)
        * rotation
        * Mat4::from_scale(Vec3::new(2.0 * radius_a, 2.0 * radius_b, 1.0))
}

/// Intersection of the line through `ray_point` with direction `ray_dir`
/// and the plane through `plane_point` with normal `plane_normal`.
///
/// The line is assumed not to be parallel to the plane.
pub fn intersect_ray_plane(
    ray_dir: Vec3,
    ray_point: Vec3,
    plane_normal: Vec3,
    plane_point: Vec3,
) -> Vec3 {
    let diff = ray_point - plane_point;
    let t = diff.dot(plane_normal) / ray_dir.dot(plane_normal);
    ray_point - ray_dir * t
}

/// Angle from `v1` to `v2` in [0, 2π), measured around `up`.
///
/// The unsigned angle flips to `2π − angle` when `v2` falls on the negative
/// side of `right = v1 × up`.
pub fn signed_angle_between(v1: Vec3, v2: Vec3, up: Vec3) -> f32 {
    let angle = v1.angle_between(v2);
    let right = v1.cross(up);
    if right.dot(v2) < 0.0 {
        2.0 * std::f32::consts::PI - angle
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_rotation_between_z_maps_z_to_normal() {
        let normal = Vec3::new(1.0, 0.0, 0.0);
        let rotated = rotation_between_z(normal).transform_vector3(Vec3::Z);
        assert!(
            (rotated - normal).length() < EPS,
            "expected {normal}, got {rotated}"
        );
    }

    #[test]
    fn test_rotation_between_z_identity_for_z() {
        let rotated = rotation_between_z(Vec3::Z).transform_vector3(Vec3::X);
        assert!((rotated - Vec3::X).length() < EPS);
    }

    #[test]
    fn test_general_ring_matrix_scales_unit_disc() {
        let center = Vec3::new(1.0, 2.0, 3.0);
        let matrix =
            general_ring_matrix(center, Vec3::Z, Vec3::X, 2.0, 3.0);

        // The unit disc's rim point (0.5, 0, 0) lands radius_a along local X.
        let rim = matrix.transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert!((rim - (center + Vec3::X * 2.0)).length() < EPS);

        let rim_y = matrix.transform_point3(Vec3::new(0.0, 0.5, 0.0));
        assert!((rim_y - (center + Vec3::Y * 3.0)).length() < EPS);
    }

    #[test]
    fn test_intersect_ray_plane() {
        // Line along -Z from above the XY plane.
        let hit = intersect_ray_plane(
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::new(1.0, 1.0, 4.0),
            Vec3::Z,
            Vec3::ZERO,
        );
        assert!((hit - Vec3::new(1.0, 1.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_signed_angle_quadrants() {
        let quarter = signed_angle_between(Vec3::X, Vec3::Y, Vec3::Z);
        assert!((quarter - std::f32::consts::FRAC_PI_2).abs() < EPS);

        // Clockwise from X lands in the 3π/2 branch.
        let three_quarters = signed_angle_between(Vec3::X, -Vec3::Y, Vec3::Z);
        assert!(
            (three_quarters - 3.0 * std::f32::consts::FRAC_PI_2).abs() < EPS,
            "expected 3π/2, got {three_quarters}"
        );
    }
}
