//! Geometry module - vertex storage and the local/global transform model

pub mod primitives;
pub mod transformable;
pub mod vertex_buffer;

pub use transformable::{Transformable, TransformableEntity};
pub use vertex_buffer::{VertexArity, VertexBuffer};
