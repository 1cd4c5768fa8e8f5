//! Rendering module
//!
//! The engine does not talk to a GPU API directly. Every GPU call goes
//! through the [`GraphicsBackend`] trait, which a platform layer implements
//! (WebGL, OpenGL, ...). [`HeadlessBackend`] records the calls instead of
//! executing them and is what tests and the headless demo use.
//!
//! [`RenderableShape`] is the only type that crosses into the backend during
//! a frame, through [`RenderableShape::render`].

pub mod backend;
pub mod camera;
pub mod headless;
pub mod shape;
pub mod texture;
pub mod vertex_array;

pub use backend::{
    AttribLocation, BackendResult, BufferHandle, BufferTarget, BufferUsage, GraphicsBackend,
    ProgramHandle, TextureHandle, UniformLocation,
};
pub use camera::OrthoCamera;
pub use headless::{BackendCommand, HeadlessBackend};
pub use shape::{DirtyFlags, RenderableShape, ShaderBindings};
pub use texture::{TextureImage, TextureMinFilter, TextureParams, TextureWrap};
pub use vertex_array::{AttributeLocations, BindingContext, ShapeBuffers, TextureBinding, VertexArray};

use thiserror::Error;

/// Errors that can occur during rendering operations
#[derive(Error, Debug)]
pub enum RenderError {
    /// A rendering operation failed during execution
    ///
    /// Indicates failure during drawing, e.g. a draw issued with no bound
    /// program or an invalid buffer binding.
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Resource creation or management failed
    ///
    /// Occurs when GPU resources (buffers, textures) cannot be created,
    /// typically due to memory constraints or invalid data.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific error occurred
    ///
    /// Wraps backend-specific errors in a generic form for consistent error
    /// handling across different graphics backends.
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Texture image could not be read or decoded
    #[error("Texture load failed: {0}")]
    TextureLoad(String),
}
