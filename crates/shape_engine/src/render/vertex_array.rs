//! Deferred attribute binding for a shape
//!
//! A [`VertexArray`] holds the procedure that binds a shape's buffers and
//! attributes right before its draw call. The standard procedure uploads any
//! dirty buffer and points each resolved attribute at its data. Shapes with
//! an unusual layout can swap it for their own closure.

use std::fmt;

use crate::geometry::VertexBuffer;
use crate::render::backend::{
    AttribLocation, BackendResult, BufferHandle, BufferTarget, BufferUsage, GraphicsBackend,
    TextureHandle, FLOAT_SIZE,
};
use crate::render::shape::DirtyFlags;

/// Backend buffers owned by one shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeBuffers {
    /// Local vertex positions
    pub vertex: BufferHandle,
    /// Per-vertex colors
    pub color: BufferHandle,
    /// Triangle indices
    pub element: BufferHandle,
}

/// Attribute locations resolved for the current draw
///
/// `None` means the program does not use that attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeLocations {
    /// Vertex position attribute
    pub position: Option<AttribLocation>,
    /// Vertex color attribute
    pub color: Option<AttribLocation>,
    /// Texture coordinate attribute, only resolved when a texture is set
    pub tex_coord: Option<AttribLocation>,
}

/// Texture attached to a shape
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    /// Texture to sample
    pub texture: TextureHandle,
    /// Buffer holding the 2-component coordinates
    pub coord_buffer: BufferHandle,
    /// The coordinates, one pair per vertex
    pub coords: Vec<f32>,
    /// Attribute name the coordinates feed
    pub attribute: String,
}

/// Everything a binding procedure may touch
pub struct BindingContext<'a> {
    /// Local vertices, uploaded as-is; placement goes through the model matrix
    pub vertices: &'a VertexBuffer,
    /// Colors, one per vertex
    pub colors: &'a VertexBuffer,
    /// Triangle indices
    pub elements: &'a [u16],
    /// Target buffers
    pub buffers: &'a ShapeBuffers,
    /// Resolved attribute locations
    pub attributes: &'a AttributeLocations,
    /// Optional texture
    pub texture: Option<&'a TextureBinding>,
    /// Buffers needing upload; a procedure clears what it uploads
    pub dirty: &'a mut DirtyFlags,
}

/// Signature of a binding procedure
pub type BindingProcedure = dyn Fn(&mut dyn GraphicsBackend, &mut BindingContext<'_>) -> BackendResult<()>;

/// Stored binding procedure
pub struct VertexArray {
    procedure: Box<BindingProcedure>,
}

impl VertexArray {
    /// Wrap a custom procedure
    pub fn new<F>(procedure: F) -> Self
    where
        F: Fn(&mut dyn GraphicsBackend, &mut BindingContext<'_>) -> BackendResult<()> + 'static,
    {
        Self {
            procedure: Box::new(procedure),
        }
    }

    /// The standard position/color/texture/element binding
    pub fn standard() -> Self {
        Self::new(bind_standard)
    }

    /// Run the procedure
    pub fn bind(&self, backend: &mut dyn GraphicsBackend, ctx: &mut BindingContext<'_>) -> BackendResult<()> {
        (self.procedure)(backend, ctx)
    }
}

impl Default for VertexArray {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for VertexArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexArray").finish_non_exhaustive()
    }
}

fn bind_attribute(backend: &mut dyn GraphicsBackend, location: Option<AttribLocation>, components: usize) {
    if let Some(location) = location {
        backend.vertex_attrib_pointer(location, components, components * FLOAT_SIZE, 0);
        backend.enable_vertex_attrib_array(location);
    }
}

/// Standard binding procedure
///
/// Vertices upload as dynamic data, colors and indices as static data. Each
/// upload only happens when the matching dirty flag is set.
pub fn bind_standard(backend: &mut dyn GraphicsBackend, ctx: &mut BindingContext<'_>) -> BackendResult<()> {
    backend.bind_buffer(BufferTarget::Array, ctx.buffers.vertex);
    if ctx.dirty.contains(DirtyFlags::VERTICES) {
        backend.buffer_data(
            BufferTarget::Array,
            bytemuck::cast_slice(ctx.vertices.as_slice()),
            BufferUsage::DynamicDraw,
        )?;
        ctx.dirty.remove(DirtyFlags::VERTICES);
    }
    bind_attribute(backend, ctx.attributes.position, ctx.vertices.arity().components());

    backend.bind_buffer(BufferTarget::Array, ctx.buffers.color);
    if ctx.dirty.contains(DirtyFlags::COLORS) {
        backend.buffer_data(
            BufferTarget::Array,
            bytemuck::cast_slice(ctx.colors.as_slice()),
            BufferUsage::StaticDraw,
        )?;
        ctx.dirty.remove(DirtyFlags::COLORS);
    }
    bind_attribute(backend, ctx.attributes.color, ctx.colors.arity().components());

    if let Some(texture) = ctx.texture {
        backend.bind_texture(texture.texture);
        backend.bind_buffer(BufferTarget::Array, texture.coord_buffer);
        bind_attribute(backend, ctx.attributes.tex_coord, 2);
    }

    backend.bind_buffer(BufferTarget::ElementArray, ctx.buffers.element);
    if ctx.dirty.contains(DirtyFlags::ELEMENTS) {
        backend.buffer_data(
            BufferTarget::ElementArray,
            bytemuck::cast_slice(ctx.elements),
            BufferUsage::StaticDraw,
        )?;
        ctx.dirty.remove(DirtyFlags::ELEMENTS);
    }
    Ok(())
}
