//! Scene entry pairing a drawable shape with its collider

use crate::error::EngineResult;
use crate::foundation::math::Vec3;
use crate::geometry::Transformable;
use crate::physics::AreaCollider;
use crate::render::RenderableShape;

/// An object in the scene
///
/// Both parts are optional. Placement calls on the object reach both
/// parts, so shape and collider stay aligned.
#[derive(Debug, Default)]
pub struct GameObject {
    name: String,
    shape: Option<RenderableShape>,
    collider: Option<AreaCollider>,
    velocity: Vec3,
}

impl GameObject {
    /// Empty object
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach a shape
    pub fn with_shape(mut self, shape: RenderableShape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Attach a collider
    pub fn with_collider(mut self, collider: AreaCollider) -> Self {
        self.collider = Some(collider);
        self
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drawable part
    pub fn shape(&self) -> Option<&RenderableShape> {
        self.shape.as_ref()
    }

    /// Drawable part, mutably
    pub fn shape_mut(&mut self) -> Option<&mut RenderableShape> {
        self.shape.as_mut()
    }

    /// Collision part
    pub fn collider(&self) -> Option<&AreaCollider> {
        self.collider.as_ref()
    }

    /// Collision part, mutably
    pub fn collider_mut(&mut self) -> Option<&mut AreaCollider> {
        self.collider.as_mut()
    }

    /// Units per time unit applied by the movement step
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Replace the velocity
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Move shape and collider together
    pub fn translate(&mut self, translation: &Vec3) -> EngineResult<()> {
        self.for_each_part(|part| part.translate(translation))
    }

    /// Grow shape and collider together
    pub fn scale(&mut self, scale: &Vec3) -> EngineResult<()> {
        self.for_each_part(|part| part.scale(scale))
    }

    /// Place shape and collider at `translation`
    pub fn set_translation(&mut self, translation: Vec3) -> EngineResult<()> {
        self.for_each_part(|part| part.set_translation(translation))
    }

    /// Set shape and collider scale
    pub fn set_scale(&mut self, scale: Vec3) -> EngineResult<()> {
        self.for_each_part(|part| part.set_scale(scale))
    }

    /// Collider origin, else shape origin
    pub fn origin(&self) -> Option<Vec3> {
        match (&self.collider, &self.shape) {
            (Some(collider), _) => Some(collider.origin()),
            (None, Some(shape)) => Some(shape.origin()),
            (None, None) => None,
        }
    }

    fn for_each_part<F>(&mut self, mut op: F) -> EngineResult<()>
    where
        F: FnMut(&mut dyn Transformable) -> EngineResult<()>,
    {
        if let Some(shape) = &mut self.shape {
            op(shape as &mut dyn Transformable)?;
        }
        if let Some(collider) = &mut self.collider {
            op(collider as &mut dyn Transformable)?;
        }
        Ok(())
    }
}
