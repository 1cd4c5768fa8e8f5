//! Transformable entity: baked local geometry plus composable placement
//!
//! Two separate operation sets act on an entity:
//!
//! - **Local** operations (`apply_local_transform`, `translate_local`,
//!   `rotate_local`, `scale_local`) bake a matrix into the stored vertices.
//!   The previous vertices are gone afterwards.
//! - **Global** operations (`translate`, `rotate`, `scale` and the `set_*`
//!   variants) only update placement accumulators and rebuild the model
//!   matrix. Local vertices are never touched.
//!
//! After either kind of operation the origin is recomputed from the global
//! vertices.

use log::trace;

use crate::error::EngineResult;
use crate::foundation::math::{ensure_finite, Mat4, Mat4Ext, Vec3};
use crate::geometry::vertex_buffer::{VertexArity, VertexBuffer};

/// Vertex data with a translation/rotation/scale placement
#[derive(Debug, Clone)]
pub struct TransformableEntity {
    local_vertices: VertexBuffer,
    translation: Vec3,
    rotation_degrees: Vec3,
    scale: Vec3,
    model_matrix: Mat4,
    origin: Vec3,
}

impl TransformableEntity {
    /// Create an entity from flat vertex data with `arity` items per vertex
    ///
    /// Fails with an invalid-argument error when `arity` is not 3 or 4, or
    /// when the data length is not a multiple of `arity`.
    pub fn new(vertices: Vec<f32>, arity: usize) -> EngineResult<Self> {
        let arity = VertexArity::try_from(arity)?;
        Ok(Self::from_buffer(VertexBuffer::new(vertices, arity)?))
    }

    /// Create an entity from an already validated buffer
    pub fn from_buffer(local_vertices: VertexBuffer) -> Self {
        let origin = local_vertices.centroid();
        Self {
            local_vertices,
            translation: Vec3::zeros(),
            rotation_degrees: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            model_matrix: Mat4::identity(),
            origin,
        }
    }

    // Local (destructive) operations

    /// Bake `matrix` into the local vertices
    pub fn apply_local_transform(&mut self, matrix: &Mat4) {
        trace!("Baking local transform into {} vertices", self.local_vertices.vertex_count());
        self.local_vertices = self.local_vertices.transformed(matrix);
        self.recalculate_origin();
    }

    /// Bake a translation into the local vertices
    pub fn translate_local(&mut self, translation: &Vec3) -> EngineResult<()> {
        ensure_finite(translation, "Translation vector")?;
        self.apply_local_transform(&Mat4::new_translation(translation));
        Ok(())
    }

    /// Bake a rotation of `degrees` around `axis` into the local vertices
    pub fn rotate_local(&mut self, degrees: f32, axis: &Vec3) -> EngineResult<()> {
        ensure_finite(axis, "Rotation axis vector")?;
        let rotation = Mat4::rotation_axis_degrees(degrees, axis)?;
        self.apply_local_transform(&rotation);
        Ok(())
    }

    /// Bake a per-axis scale into the local vertices
    pub fn scale_local(&mut self, scale: &Vec3) -> EngineResult<()> {
        ensure_finite(scale, "Scaling vector")?;
        self.apply_local_transform(&Mat4::new_nonuniform_scaling(scale));
        Ok(())
    }

    // Global (placement) operations

    /// Add `translation` to the placement translation
    pub fn translate(&mut self, translation: &Vec3) -> EngineResult<()> {
        ensure_finite(translation, "Translation vector")?;
        self.translation += translation;
        self.recalculate_model_matrix();
        Ok(())
    }

    /// Add `degrees` to every rotation axis whose component in `axis` is exactly 1.0
    ///
    /// Drive each axis with its own call, e.g. `rotate(90.0, &Vec3::z())`.
    #[allow(clippy::float_cmp)]
    pub fn rotate(&mut self, degrees: f32, axis: &Vec3) -> EngineResult<()> {
        ensure_finite(axis, "Rotation axis vector")?;
        for i in 0..3 {
            if axis[i] == 1.0 {
                self.rotation_degrees[i] += degrees;
            }
        }
        self.recalculate_model_matrix();
        Ok(())
    }

    /// Add `scale` to the placement scale
    ///
    /// The scale accumulator starts at (1, 1, 1) and is summed, not
    /// multiplied: `scale(&Vec3::new(1.0, 1.0, 0.0))` doubles x and y.
    pub fn scale(&mut self, scale: &Vec3) -> EngineResult<()> {
        ensure_finite(scale, "Scaling vector")?;
        self.scale += scale;
        self.recalculate_model_matrix();
        Ok(())
    }

    /// Replace the placement translation
    pub fn set_translation(&mut self, translation: Vec3) -> EngineResult<()> {
        ensure_finite(&translation, "Translation vector")?;
        self.translation = translation;
        self.recalculate_model_matrix();
        Ok(())
    }

    /// Replace the per-axis placement rotation, in degrees
    pub fn set_rotation(&mut self, rotation_degrees: Vec3) -> EngineResult<()> {
        ensure_finite(&rotation_degrees, "Rotation vector")?;
        self.rotation_degrees = rotation_degrees;
        self.recalculate_model_matrix();
        Ok(())
    }

    /// Replace the placement scale
    pub fn set_scale(&mut self, scale: Vec3) -> EngineResult<()> {
        ensure_finite(&scale, "Scale vector")?;
        self.scale = scale;
        self.recalculate_model_matrix();
        Ok(())
    }

    // Accessors

    /// Local vertices, unchanged by placement
    pub fn local_vertices(&self) -> &VertexBuffer {
        &self.local_vertices
    }

    /// A new buffer holding every local vertex transformed by the model matrix
    pub fn global_vertices(&self) -> VertexBuffer {
        self.local_vertices.transformed(&self.model_matrix)
    }

    /// Items per vertex
    pub fn arity(&self) -> VertexArity {
        self.local_vertices.arity()
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.local_vertices.vertex_count()
    }

    /// Current model matrix
    pub fn model_matrix(&self) -> &Mat4 {
        &self.model_matrix
    }

    /// Centroid of the global vertices
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Accumulated placement translation
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Accumulated per-axis rotation, in degrees
    pub fn rotation_degrees(&self) -> Vec3 {
        self.rotation_degrees
    }

    /// Accumulated placement scale
    pub fn scale_factors(&self) -> Vec3 {
        self.scale
    }

    fn recalculate_model_matrix(&mut self) {
        self.model_matrix = Mat4::model(&self.translation, &self.rotation_degrees, &self.scale);
        self.recalculate_origin();
    }

    fn recalculate_origin(&mut self) {
        self.origin = self.global_vertices().centroid();
    }
}

/// Shared transform surface for types built around a [`TransformableEntity`]
///
/// Implementors expose their entity and may hook local geometry changes, e.g.
/// to mark GPU vertex data for re-upload.
pub trait Transformable {
    /// The wrapped entity
    fn entity(&self) -> &TransformableEntity;

    /// The wrapped entity, mutably
    fn entity_mut(&mut self) -> &mut TransformableEntity;

    /// Called after local vertices were baked
    fn local_geometry_changed(&mut self) {}

    /// Bake `matrix` into the local vertices
    fn apply_local_transform(&mut self, matrix: &Mat4) {
        self.entity_mut().apply_local_transform(matrix);
        self.local_geometry_changed();
    }

    /// Bake a translation into the local vertices
    fn translate_local(&mut self, translation: &Vec3) -> EngineResult<()> {
        self.entity_mut().translate_local(translation)?;
        self.local_geometry_changed();
        Ok(())
    }

    /// Bake a rotation into the local vertices
    fn rotate_local(&mut self, degrees: f32, axis: &Vec3) -> EngineResult<()> {
        self.entity_mut().rotate_local(degrees, axis)?;
        self.local_geometry_changed();
        Ok(())
    }

    /// Bake a scale into the local vertices
    fn scale_local(&mut self, scale: &Vec3) -> EngineResult<()> {
        self.entity_mut().scale_local(scale)?;
        self.local_geometry_changed();
        Ok(())
    }

    /// Add to the placement translation
    fn translate(&mut self, translation: &Vec3) -> EngineResult<()> {
        self.entity_mut().translate(translation)
    }

    /// Add to the placement rotation of the axes set to 1.0 in `axis`
    fn rotate(&mut self, degrees: f32, axis: &Vec3) -> EngineResult<()> {
        self.entity_mut().rotate(degrees, axis)
    }

    /// Add to the placement scale
    fn scale(&mut self, scale: &Vec3) -> EngineResult<()> {
        self.entity_mut().scale(scale)
    }

    /// Replace the placement translation
    fn set_translation(&mut self, translation: Vec3) -> EngineResult<()> {
        self.entity_mut().set_translation(translation)
    }

    /// Replace the placement rotation
    fn set_rotation(&mut self, rotation_degrees: Vec3) -> EngineResult<()> {
        self.entity_mut().set_rotation(rotation_degrees)
    }

    /// Replace the placement scale
    fn set_scale(&mut self, scale: Vec3) -> EngineResult<()> {
        self.entity_mut().set_scale(scale)
    }

    /// Centroid of the global vertices
    fn origin(&self) -> Vec3 {
        self.entity().origin()
    }

    /// Current model matrix
    fn model_matrix(&self) -> &Mat4 {
        self.entity().model_matrix()
    }
}
