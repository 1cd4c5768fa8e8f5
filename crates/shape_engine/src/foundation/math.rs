//! Math utilities and types
//!
//! Thin layer over `nalgebra` providing the matrix/vector types used by the
//! geometry, render and physics modules, plus the model matrix composition
//! shared by every transformable entity.

pub use nalgebra::{Matrix4, Unit, Vector3, Vector4};

use crate::error::{EngineError, EngineResult};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Smallest axis length accepted for an axis-angle rotation
    pub const AXIS_EPSILON: f32 = 1e-6;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}

/// Extension trait for Mat4 with the constructors used by entity transforms
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Create a rotation of `degrees` around an arbitrary axis
    ///
    /// The axis is normalized first. A zero-length axis is rejected.
    fn rotation_axis_degrees(degrees: f32, axis: &Vec3) -> EngineResult<Mat4>;

    /// Compose a model matrix from placement accumulators
    ///
    /// The result is `T * S * Rx * Ry * Rz`, so a vertex is rotated around Z,
    /// then Y, then X, then scaled, then translated.
    fn model(translation: &Vec3, rotation_degrees: &Vec3, scale: &Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn rotation_axis_degrees(degrees: f32, axis: &Vec3) -> EngineResult<Mat4> {
        let axis = Unit::try_new(*axis, constants::AXIS_EPSILON).ok_or_else(|| {
            EngineError::InvalidArgument(format!(
                "Rotation axis must have a non-zero length, got {:?}",
                axis.as_slice()
            ))
        })?;
        Ok(Mat4::from_axis_angle(&axis, utils::deg_to_rad(degrees)))
    }

    fn model(translation: &Vec3, rotation_degrees: &Vec3, scale: &Vec3) -> Mat4 {
        Mat4::new_translation(translation)
            * Mat4::new_nonuniform_scaling(scale)
            * Mat4::rotation_x(utils::deg_to_rad(rotation_degrees.x))
            * Mat4::rotation_y(utils::deg_to_rad(rotation_degrees.y))
            * Mat4::rotation_z(utils::deg_to_rad(rotation_degrees.z))
    }
}

/// Reject vectors carrying NaN or infinite components
///
/// `what` names the argument in the error message.
pub fn ensure_finite(vector: &Vec3, what: &str) -> EngineResult<()> {
    if vector.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(EngineError::InvalidArgument(format!(
            "{what} must have finite components, got {:?}",
            vector.as_slice()
        )))
    }
}

/// Flatten a matrix into column-major order for uniform upload
pub fn matrix4_to_flat_array(m: &Mat4) -> [f32; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(m.as_slice());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_model_matrix_identity_for_defaults() {
        let m = Mat4::model(&Vec3::zeros(), &Vec3::zeros(), &Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(m, Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_model_matrix_scales_before_translating() {
        let m = Mat4::model(
            &Vec3::new(10.0, 0.0, 0.0),
            &Vec3::zeros(),
            &Vec3::new(2.0, 2.0, 2.0),
        );
        let p = m * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert_relative_eq!(p, Vec4::new(12.0, 2.0, 0.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_model_matrix_rotates_before_scaling() {
        // 90 degrees around Z turns +X into +Y, then Y is scaled by 3
        let m = Mat4::model(
            &Vec3::zeros(),
            &Vec3::new(0.0, 0.0, 90.0),
            &Vec3::new(1.0, 3.0, 1.0),
        );
        let p = m * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p, Vec4::new(0.0, 3.0, 0.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_axis_normalizes() {
        let m = Mat4::rotation_axis_degrees(180.0, &Vec3::new(0.0, 0.0, 5.0)).unwrap();
        let p = m * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p, Vec4::new(-1.0, 0.0, 0.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_axis_rejects_zero_axis() {
        let result = Mat4::rotation_axis_degrees(45.0, &Vec3::zeros());
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite(&Vec3::new(1.0, 2.0, 3.0), "v").is_ok());
        assert!(ensure_finite(&Vec3::new(f32::NAN, 0.0, 0.0), "v").is_err());
        assert!(ensure_finite(&Vec3::new(0.0, f32::INFINITY, 0.0), "v").is_err());
    }

    #[test]
    fn test_flat_array_is_column_major() {
        let m = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let flat = matrix4_to_flat_array(&m);
        assert_eq!(&flat[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(flat[15], 1.0);
    }
}
