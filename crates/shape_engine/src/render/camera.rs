//! Fixed orthographic camera

use crate::foundation::math::{matrix4_to_flat_array, Mat4, Vec3, Vec4};
use crate::render::backend::{GraphicsBackend, ProgramHandle};

/// Distance the view is pushed back along -z
pub const VIEW_DEPTH: f32 = 10.0;
/// Near clipping plane
pub const Z_NEAR: f32 = 0.1;
/// Far clipping plane
pub const Z_FAR: f32 = 100.0;

/// View and projection matrices mapping canvas pixels to clip space
///
/// x runs from 0 at the left edge to the canvas width, y from 0 at the
/// bottom to the canvas height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoCamera {
    /// World to view
    pub view: Mat4,
    /// View to clip
    pub projection: Mat4,
}

impl OrthoCamera {
    /// Camera covering a `width` x `height` canvas
    pub fn for_canvas(width: u32, height: u32) -> Self {
        Self {
            view: Mat4::new_translation(&Vec3::new(0.0, 0.0, -VIEW_DEPTH)),
            projection: Mat4::new_orthographic(0.0, width as f32, 0.0, height as f32, Z_NEAR, Z_FAR),
        }
    }

    /// Upload both matrices to `program`; names it lacks are skipped
    pub fn upload(
        &self,
        backend: &mut dyn GraphicsBackend,
        program: ProgramHandle,
        view_uniform: &str,
        projection_uniform: &str,
    ) {
        if let Some(location) = backend.uniform_location(program, view_uniform) {
            backend.uniform_matrix4(location, &matrix4_to_flat_array(&self.view));
        }
        if let Some(location) = backend.uniform_location(program, projection_uniform) {
            backend.uniform_matrix4(location, &matrix4_to_flat_array(&self.projection));
        }
    }

    /// Clip-space position of `point` placed by `model`
    pub fn project(&self, model: &Mat4, point: &Vec3) -> Vec3 {
        let clip = self.projection * self.view * model * Vec4::new(point.x, point.y, point.z, 1.0);
        clip.xyz() / clip.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::{BackendCommand, HeadlessBackend};
    use approx::assert_relative_eq;

    #[test]
    fn test_canvas_corners_map_to_clip_edges() {
        let camera = OrthoCamera::for_canvas(720, 960);
        let identity = Mat4::identity();

        let center = camera.project(&identity, &Vec3::new(360.0, 480.0, 0.0));
        assert_relative_eq!(center.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-6);

        let top_right = camera.project(&identity, &Vec3::new(720.0, 960.0, 0.0));
        assert_relative_eq!(top_right.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(top_right.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_upload_skips_unknown_uniforms() {
        let mut backend = HeadlessBackend::new();
        let program = backend.register_program(&[], &["uProjectionMatrix"]);
        OrthoCamera::for_canvas(100, 100).upload(&mut backend, program, "uViewMatrix", "uProjectionMatrix");

        let uploads = backend
            .commands()
            .iter()
            .filter(|c| matches!(c, BackendCommand::UniformMatrix4 { .. }))
            .count();
        assert_eq!(uploads, 1);
    }
}
