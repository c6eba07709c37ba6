//! Math utilities and types
//!
//! Rigid transforms and the rotation conversions every other module goes
//! through. Nothing outside this file builds rotation matrices by hand.
//!
//! ## Euler convention
//!
//! Euler angles are `(x, y, z)` in degrees. A vector is rotated about the
//! X axis first, then about Y, then about Z, so the combined rotation is
//! `R = Rz * Ry * Rx`. This is the convention of
//! [`UnitQuaternion::from_euler_angles`] and [`UnitQuaternion::euler_angles`].

pub use nalgebra::{Matrix3, Matrix4, Rotation3, Unit, UnitQuaternion, Vector3};
use thiserror::Error;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Below this length a direction or cross product counts as zero.
const BASIS_EPSILON: f32 = 1.0e-6;

/// Below this `cos(pitch)` the X and Z axes coincide
const GIMBAL_LOCK_EPSILON: f64 = 1.0e-6;

/// Errors raised while building rotations
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TransformError {
    /// Direction and up vector are colinear (or one of them is zero), so
    /// they do not fix an orientation.
    #[error("degenerate basis: direction {direction:?} and up {up:?} are colinear or zero")]
    DegenerateBasis {
        /// Requested facing direction
        direction: Vec3,
        /// Requested up vector
        up: Vec3,
    },
}

/// Rigid transform: rotation followed by translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in the parent space
    pub position: Vec3,

    /// Rotation relative to the parent space
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Convert to a homogeneous transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position) * self.rotation.to_homogeneous()
    }

    /// Create a transform from a rigid transformation matrix
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);
        let rotation_matrix: Mat3 = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        Self {
            position,
            rotation: Quat::from_matrix(&rotation_matrix),
        }
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    /// Apply this transform to a direction (rotation only)
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    /// Combine this transform with a child transform expressed in its space
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * other.position,
            rotation: self.rotation * other.rotation,
        }
    }

    /// Get the inverse transform
    pub fn inverse(&self) -> Transform {
        let inv_rotation = self.rotation.inverse();
        Transform {
            position: inv_rotation * -self.position,
            rotation: inv_rotation,
        }
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

/// Convert Euler angles in degrees to a quaternion (X, then Y, then Z).
pub fn euler_degrees_to_quaternion(euler: Vec3) -> Quat {
    Quat::from_euler_angles(
        utils::deg_to_rad(euler.x),
        utils::deg_to_rad(euler.y),
        utils::deg_to_rad(euler.z),
    )
}

/// Convert a quaternion to Euler angles in degrees (X, then Y, then Z).
pub fn quaternion_to_euler_degrees(rotation: &Quat) -> Vec3 {
    rotation_block_to_euler_degrees(rotation.to_rotation_matrix().matrix())
}

/// Recover Euler angles in degrees from the rotation part of a matrix.
///
/// The upper 3x3 block is re-orthonormalized first, so matrices that picked
/// up drift from repeated multiplication still decompose cleanly.
pub fn matrix_to_euler_degrees(matrix: &Mat4) -> Vec3 {
    let block: Mat3 = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    rotation_block_to_euler_degrees(Rotation3::from_matrix(&block).matrix())
}

/// Split `R = Rz * Ry * Rx` into its three angles.
///
/// Works in `f64` and takes Y from `atan2` rather than `asin`, so pitches
/// of ±90° come back exact. X is solved from the large entries once Z is
/// known, so the three angles always rebuild `R`. At gimbal lock Z is zero
/// and X carries the whole roll.
fn rotation_block_to_euler_degrees(block: &Mat3) -> Vec3 {
    let m = block.cast::<f64>();
    let cos_y = m[(0, 0)].hypot(m[(1, 0)]);
    let y = (-m[(2, 0)]).atan2(cos_y);

    let z = if cos_y > GIMBAL_LOCK_EPSILON {
        m[(1, 0)].atan2(m[(0, 0)])
    } else {
        0.0
    };
    let (sin_z, cos_z) = z.sin_cos();
    let x = (sin_z * m[(0, 2)] - cos_z * m[(1, 2)]).atan2(cos_z * m[(1, 1)] - sin_z * m[(0, 1)]);

    Vec3::new(x.to_degrees() as f32, y.to_degrees() as f32, z.to_degrees() as f32)
}

/// Euler angles equivalent to rotating by `first` composed with `second`,
/// i.e. `quat(first) * quat(second)`.
pub fn compose_euler_degrees(first: Vec3, second: Vec3) -> Vec3 {
    let composed = euler_degrees_to_quaternion(first) * euler_degrees_to_quaternion(second);
    quaternion_to_euler_degrees(&composed)
}

/// Orthonormal frame looking along `direction` with `up` fixing the roll.
///
/// The columns are `(right, up', direction)`: the frame's local +Z maps to
/// `direction` and local +Y to `up` made orthogonal to it.
pub fn orthonormal_basis(direction: Vec3, up: Vec3) -> Result<Rotation3<f32>, TransformError> {
    let degenerate = TransformError::DegenerateBasis { direction, up };

    let forward = direction.try_normalize(BASIS_EPSILON).ok_or(degenerate)?;
    let up = up.try_normalize(BASIS_EPSILON).ok_or(degenerate)?;
    let right = up.cross(&forward).try_normalize(BASIS_EPSILON).ok_or(degenerate)?;
    let true_up = forward.cross(&right);

    Ok(Rotation3::from_matrix_unchecked(Mat3::from_columns(&[
        right, true_up, forward,
    ])))
}

/// Rotation taking the frame `(from_dir, from_up)` onto `(to_dir, to_up)`.
///
/// `R * from_dir` is parallel to `to_dir`, and `R * from_up` lands on the
/// component of `to_up` orthogonal to `to_dir`. Callers wanting two frames
/// to face each other pass a negated target direction.
pub fn alignment_rotation(
    from_dir: Vec3,
    from_up: Vec3,
    to_dir: Vec3,
    to_up: Vec3,
) -> Result<Quat, TransformError> {
    let from = orthonormal_basis(from_dir, from_up)?;
    let to = orthonormal_basis(to_dir, to_up)?;
    Ok(Quat::from_rotation_matrix(&(to * from.inverse())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_euler_axis_order() {
        // X first sends +Y to +Z, then Y sends +Z to +X.
        let rotation = euler_degrees_to_quaternion(Vec3::new(90.0, 90.0, 0.0));
        let rotated = rotation * Vec3::new(0.0, 1.0, 0.0);
        assert_relative_eq!(rotated, Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_euler_roundtrip() {
        let euler = Vec3::new(12.5, -40.0, 170.0);
        let back = quaternion_to_euler_degrees(&euler_degrees_to_quaternion(euler));
        assert_relative_eq!(back, euler, epsilon = 1e-3);
    }

    #[test]
    fn test_euler_roundtrip_at_gimbal_lock() {
        for euler in [Vec3::new(0.0, 90.0, 0.0), Vec3::new(30.0, -90.0, 0.0), Vec3::new(-45.0, 90.0, 0.0)] {
            let back = quaternion_to_euler_degrees(&euler_degrees_to_quaternion(euler));
            assert_relative_eq!(back, euler, epsilon = 1e-3);
        }

        // Roll split between X and Z still describes the same rotation.
        for euler in [Vec3::new(10.0, 90.0, 25.0), Vec3::new(20.0, 89.9999, 35.0), Vec3::new(-60.0, -89.99, 5.0)] {
            let rotation = euler_degrees_to_quaternion(euler);
            let back = euler_degrees_to_quaternion(quaternion_to_euler_degrees(&rotation));
            for axis in [Vec3::x(), Vec3::y(), Vec3::z()] {
                assert_relative_eq!(back * axis, rotation * axis, epsilon = EPSILON);
            }
        }
    }

    #[test]
    fn test_compose_matches_quaternion_product() {
        let a = Vec3::new(30.0, 10.0, -45.0);
        let b = Vec3::new(-15.0, 60.0, 5.0);
        let c = Vec3::new(80.0, -20.0, 33.0);

        let product = euler_degrees_to_quaternion(a) * euler_degrees_to_quaternion(b);
        let composed = euler_degrees_to_quaternion(compose_euler_degrees(a, b));
        assert!(product.angle_to(&composed) < 1e-4);

        // (a*b)*c and a*(b*c) agree after going through Euler angles.
        let left = compose_euler_degrees(compose_euler_degrees(a, b), c);
        let right = compose_euler_degrees(a, compose_euler_degrees(b, c));
        let left_q = euler_degrees_to_quaternion(left);
        let right_q = euler_degrees_to_quaternion(right);
        assert!(left_q.angle_to(&right_q) < 1e-4);
    }

    #[test]
    fn test_matrix_to_euler() {
        let euler = Vec3::new(-20.0, 35.0, 110.0);
        let transform = Transform::from_position_rotation(
            Vec3::new(4.0, 5.0, 6.0),
            euler_degrees_to_quaternion(euler),
        );
        let recovered = matrix_to_euler_degrees(&transform.to_matrix());
        assert_relative_eq!(recovered, euler, epsilon = 1e-3);

        let upright = Transform::from_position_rotation(
            Vec3::zeros(),
            euler_degrees_to_quaternion(Vec3::new(0.0, -90.0, 0.0)),
        );
        let recovered = matrix_to_euler_degrees(&upright.to_matrix());
        assert_relative_eq!(recovered, Vec3::new(0.0, -90.0, 0.0), epsilon = 1e-3);
    }

    #[test]
    fn test_alignment_rotation_maps_frames() {
        let from_dir = Vec3::new(0.0, 0.0, 1.0);
        let from_up = Vec3::new(0.0, 1.0, 0.0);
        let to_dir = Vec3::new(1.0, 1.0, 0.0).normalize();
        let to_up = Vec3::new(0.0, 0.0, 1.0);

        let rotation = alignment_rotation(from_dir, from_up, to_dir, to_up).unwrap();
        assert_relative_eq!(rotation * from_dir, to_dir, epsilon = EPSILON);
        assert_relative_eq!(rotation * from_up, to_up, epsilon = EPSILON);
    }

    #[test]
    fn test_alignment_rotation_orthogonalizes_up() {
        let to_dir = Vec3::new(1.0, 0.0, 0.0);
        let skewed_up = Vec3::new(0.5, 1.0, 0.0);
        let rotation =
            alignment_rotation(Vec3::z(), Vec3::y(), to_dir, skewed_up).unwrap();
        assert_relative_eq!(rotation * Vec3::z(), to_dir, epsilon = EPSILON);
        assert_relative_eq!(rotation * Vec3::y(), Vec3::y(), epsilon = EPSILON);
    }

    #[test]
    fn test_degenerate_basis_is_rejected() {
        let result = alignment_rotation(
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::x(),
            Vec3::y(),
        );
        assert!(matches!(result, Err(TransformError::DegenerateBasis { .. })));

        let zero = orthonormal_basis(Vec3::zeros(), Vec3::y());
        assert!(zero.is_err());
    }

    #[test]
    fn test_transform_combination_validation() {
        let parent = Transform::from_position_rotation(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), constants::PI / 2.0),
        );
        let child = Transform::from_position(Vec3::new(0.0, 0.0, 1.0));

        // (0,0,1) rotated 90 degrees about Y is (1,0,0), then translated.
        let combined = parent.combine(&child);
        assert_relative_eq!(combined.position, Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_inverse_transform_validation() {
        let original = Transform::from_position_rotation(
            Vec3::new(2.0, 3.0, 1.0),
            Quat::from_axis_angle(&Unit::new_normalize(Vec3::new(1.0, 1.0, 0.0)), 0.785),
        );
        let identity = original.combine(&original.inverse());

        assert_relative_eq!(identity.position, Vec3::zeros(), epsilon = EPSILON);
        assert!(identity.rotation.angle() < 1e-5);
    }

    #[test]
    fn test_matrix_roundtrip_consistency() {
        let original = Transform::from_position_rotation(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_axis_angle(&Unit::new_normalize(Vec3::new(1.0, 1.0, 1.0)), 0.5),
        );
        let rebuilt = Transform::from_matrix(&original.to_matrix());

        assert_relative_eq!(rebuilt.position, original.position, epsilon = EPSILON);
        assert!(rebuilt.rotation.angle_to(&original.rotation) < 1e-4);
    }
}
