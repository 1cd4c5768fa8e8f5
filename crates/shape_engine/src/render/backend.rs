//! Backend abstraction traits for the rendering system
//!
//! This module defines the trait that graphics backends implement. The call
//! surface mirrors a WebGL-style immediate API: buffers are bound to a target
//! and then filled, attributes are looked up by name on a shader program,
//! and triangles are drawn from the bound element buffer.

use crate::render::texture::{TextureImage, TextureParams};
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a GPU buffer owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Handle to a texture owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Location of a vertex attribute in a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribLocation(pub u32);

/// Location of a uniform in a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Binding point a buffer is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data
    Array,
    /// Triangle indices
    ElementArray,
}

/// Expected update frequency of buffer contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Written once, drawn many times
    StaticDraw,
    /// Rewritten repeatedly
    DynamicDraw,
}

/// Size in bytes of one `f32` attribute component
pub const FLOAT_SIZE: usize = std::mem::size_of::<f32>();

/// Graphics backend trait
///
/// Only [`RenderableShape`](crate::render::RenderableShape) construction,
/// texture setup and rendering call into this trait.
pub trait GraphicsBackend {
    /// Allocate a new, empty buffer
    fn create_buffer(&mut self) -> BackendResult<BufferHandle>;

    /// Attach `buffer` to `target`
    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferHandle);

    /// Replace the contents of the buffer bound to `target`
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> BackendResult<()>;

    /// Look up an attribute by name; `None` if the program has no such active attribute
    fn attrib_location(&mut self, program: ProgramHandle, name: &str) -> Option<AttribLocation>;

    /// Look up a uniform by name; `None` if the program has no such active uniform
    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Describe the layout of `location` inside the bound array buffer
    ///
    /// `components` floats per vertex, `stride` and `offset` in bytes.
    fn vertex_attrib_pointer(&mut self, location: AttribLocation, components: usize, stride: usize, offset: usize);

    /// Enable reading `location` from its array buffer
    fn enable_vertex_attrib_array(&mut self, location: AttribLocation);

    /// Upload a column-major 4x4 matrix
    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]);

    /// Create a texture from decoded RGBA8 pixels
    fn create_texture(&mut self, image: &TextureImage, params: &TextureParams) -> BackendResult<TextureHandle>;

    /// Replace the pixels of an existing texture
    fn update_texture(
        &mut self,
        texture: TextureHandle,
        image: &TextureImage,
        params: &TextureParams,
    ) -> BackendResult<()>;

    /// Bind `texture` for sampling
    fn bind_texture(&mut self, texture: TextureHandle);

    /// Clear the color and depth buffers to `color` and `depth`
    fn clear(&mut self, color: [f32; 4], depth: f32);

    /// Draw `index_count` `u16` indices from the bound element buffer as triangles
    fn draw_elements(&mut self, index_count: usize) -> BackendResult<()>;
}
