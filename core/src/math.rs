//! Math type aliases and transform helpers.
//!
//! Scene nodes carry a 3D position, a quaternion rotation and a 2D scale
//! (the z scale is always 1). World transforms are composed as 4x4 TRS
//! matrices through the ancestor chain.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
/// Use [`quat_from_xyzw`] or `Quaternion::new(w, x, y, z)` to construct.
pub type Quat = nalgebra::Quaternion<f32>;

/// Local transform of a scene node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec2::new(1.0, 1.0),
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Homogeneous matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        mat4_from_scale_rotation_translation(
            Vec3::new(self.scale.x, self.scale.y, 1.0),
            self.rotation,
            self.position,
        )
    }
}

/// Build a 4x4 TRS matrix from scale, rotation (quaternion), and translation.
pub fn mat4_from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Mat4 {
    let r = nalgebra::UnitQuaternion::new_normalize(rotation);
    let rm = r.to_rotation_matrix();
    let rm = rm.matrix();
    #[rustfmt::skip]
    let result = Mat4::new(
        rm[(0, 0)] * scale.x, rm[(0, 1)] * scale.y, rm[(0, 2)] * scale.z, translation.x,
        rm[(1, 0)] * scale.x, rm[(1, 1)] * scale.y, rm[(1, 2)] * scale.z, translation.y,
        rm[(2, 0)] * scale.x, rm[(2, 1)] * scale.y, rm[(2, 2)] * scale.z, translation.z,
        0.0,                  0.0,                  0.0,                  1.0,
    );
    result
}

/// Transform a point by a homogeneous matrix.
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    m.transform_point(&nalgebra::Point3::from(p)).coords
}

/// Length of the matrix's x and y basis vectors (the 2D world scale).
pub fn matrix_scale_2d(m: &Mat4) -> Vec2 {
    let sx = Vec3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]).norm();
    let sy = Vec3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]).norm();
    Vec2::new(sx, sy)
}

/// Decompose a 4x4 matrix into (scale, rotation, translation).
pub fn to_scale_rotation_translation(m: &Mat4) -> (Vec3, Quat, Vec3) {
    let translation = Vec3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
    let col0 = Vec3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]);
    let col1 = Vec3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]);
    let col2 = Vec3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]);
    let scale = Vec3::new(col0.norm(), col1.norm(), col2.norm());
    if scale.x == 0.0 || scale.y == 0.0 || scale.z == 0.0 {
        return (scale, Quat::identity(), translation);
    }
    let rot_mat = nalgebra::Matrix3::from_columns(&[col0 / scale.x, col1 / scale.y, col2 / scale.z]);
    let rotation =
        nalgebra::UnitQuaternion::from_rotation_matrix(&nalgebra::Rotation3::from_matrix_unchecked(rot_mat))
            .into_inner();
    (scale, rotation, translation)
}

/// Create a quaternion from x, y, z, w components.
pub fn quat_from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Quat {
    nalgebra::Quaternion::new(w, x, y, z)
}

/// Create a quaternion from a `[x, y, z, w]` array.
pub fn quat_from_array(a: [f32; 4]) -> Quat {
    nalgebra::Quaternion::new(a[3], a[0], a[1], a[2])
}

/// Convert a quaternion to a `[x, y, z, w]` array.
pub fn quat_to_array(q: Quat) -> [f32; 4] {
    [q.coords.x, q.coords.y, q.coords.z, q.coords.w]
}

/// Create a quaternion from rotation around the Z axis.
pub fn quat_from_rotation_z(angle: f32) -> Quat {
    nalgebra::UnitQuaternion::from_axis_angle(&nalgebra::Vector3::z_axis(), angle).into_inner()
}

/// Round to `digits` decimal places. Negative zero is normalized to zero.
pub fn round_to(value: f32, digits: u32) -> f32 {
    let factor = 10f32.powi(digits as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn identity_transform_matrix() {
        let m = Transform::identity().to_matrix();
        assert!((m - Mat4::identity()).norm() < 1e-6);
    }

    #[test]
    fn transform_point_applies_trs() {
        let t = Transform::default()
            .with_position(Vec3::new(10.0, 0.0, 0.0))
            .with_rotation(quat_from_rotation_z(FRAC_PI_2))
            .with_scale(Vec2::new(2.0, 2.0));
        let p = transform_point(&t.to_matrix(), Vec3::new(1.0, 0.0, 0.0));
        assert!((p - Vec3::new(10.0, 2.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn scale_2d_ignores_rotation() {
        let t = Transform::default()
            .with_rotation(quat_from_rotation_z(0.7))
            .with_scale(Vec2::new(3.0, 0.5));
        let s = matrix_scale_2d(&t.to_matrix());
        assert!((s - Vec2::new(3.0, 0.5)).norm() < 1e-5);
    }

    #[test]
    fn quat_xyzw_roundtrip() {
        let q = quat_from_array([0.1, 0.2, 0.3, 0.9]);
        let arr = quat_to_array(q);
        assert!((arr[0] - 0.1).abs() < 1e-6);
        assert!((arr[3] - 0.9).abs() < 1e-6);
        assert_eq!(quat_from_xyzw(0.1, 0.2, 0.3, 0.9), q);
    }

    #[test]
    fn decompose_trs_roundtrip() {
        let s = Vec3::new(2.0, 3.0, 1.0);
        let r = quat_from_rotation_z(1.0);
        let t = Vec3::new(5.0, 6.0, 7.0);
        let m = mat4_from_scale_rotation_translation(s, r, t);
        let (s2, r2, t2) = to_scale_rotation_translation(&m);
        assert!((s - s2).norm() < 1e-5);
        assert!((t - t2).norm() < 1e-5);
        let probe = Vec3::new(1.0, 0.0, 0.0);
        let a = nalgebra::UnitQuaternion::new_normalize(r) * probe;
        let b = nalgebra::UnitQuaternion::new_normalize(r2) * probe;
        assert!((a - b).norm() < 1e-5);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(-0.00001, 4), 0.0);
        assert!(round_to(-0.00001, 4).is_sign_positive());
    }
}
