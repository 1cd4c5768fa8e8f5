//! Colored, optionally textured polygon drawn through a [`GraphicsBackend`]

use bitflags::bitflags;
use log::{debug, trace};

use crate::error::{EngineError, EngineResult};
use crate::foundation::math::matrix4_to_flat_array;
use crate::geometry::primitives::{
    SQUARE_DEFAULT_COLORS, SQUARE_INDICES, SQUARE_VERTICES, TRIANGLE_DEFAULT_COLORS, TRIANGLE_INDICES,
    TRIANGLE_VERTICES,
};
use crate::geometry::{Transformable, TransformableEntity, VertexArity, VertexBuffer};
use crate::render::backend::{BufferTarget, BufferUsage, GraphicsBackend, ProgramHandle};
use crate::render::texture::TextureImage;
use crate::render::vertex_array::{
    AttributeLocations, BindingContext, ShapeBuffers, TextureBinding, VertexArray,
};

bitflags! {
    /// Buffers whose CPU copy changed since the last upload
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// Local vertex positions
        const VERTICES = 1;
        /// Per-vertex colors
        const COLORS = 1 << 1;
        /// Triangle indices
        const ELEMENTS = 1 << 2;
    }
}

/// Shader input names used while drawing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBindings {
    /// Model matrix uniform
    pub model_matrix: String,
    /// Vertex position attribute
    pub vertex_position: String,
    /// Vertex color attribute
    pub vertex_color: String,
}

impl Default for ShaderBindings {
    fn default() -> Self {
        Self {
            model_matrix: "uModelMatrix".to_string(),
            vertex_position: "aVertexPosition".to_string(),
            vertex_color: "aVertexColor".to_string(),
        }
    }
}

/// A transformable polygon with colors, indices and backend buffers
#[derive(Debug)]
pub struct RenderableShape {
    entity: TransformableEntity,
    colors: VertexBuffer,
    elements: Vec<u16>,
    buffers: ShapeBuffers,
    dirty: DirtyFlags,
    vertex_array: VertexArray,
    texture: Option<TextureBinding>,
}

impl RenderableShape {
    /// Create a shape and allocate its vertex, color and element buffers
    ///
    /// Fails with an invalid-argument error when either arity is not 3 or 4,
    /// when a data length does not divide by its arity, when the color count
    /// differs from the vertex count, or when an index is out of range.
    pub fn new(
        backend: &mut dyn GraphicsBackend,
        vertices: Vec<f32>,
        vertex_arity: usize,
        colors: Vec<f32>,
        color_arity: usize,
        elements: Vec<u16>,
    ) -> EngineResult<Self> {
        let entity = TransformableEntity::new(vertices, vertex_arity)?;
        let colors = color_buffer(colors, color_arity, entity.vertex_count())?;
        check_elements(&elements, entity.vertex_count())?;

        let buffers = ShapeBuffers {
            vertex: backend.create_buffer()?,
            color: backend.create_buffer()?,
            element: backend.create_buffer()?,
        };
        debug!(
            "Created shape with {} vertices and {} indices",
            entity.vertex_count(),
            elements.len()
        );

        Ok(Self {
            entity,
            colors,
            elements,
            buffers,
            dirty: DirtyFlags::all(),
            vertex_array: VertexArray::standard(),
            texture: None,
        })
    }

    /// Unit square with white corners
    pub fn square(backend: &mut dyn GraphicsBackend) -> EngineResult<Self> {
        Self::new(
            backend,
            SQUARE_VERTICES.to_vec(),
            3,
            SQUARE_DEFAULT_COLORS.to_vec(),
            3,
            SQUARE_INDICES.to_vec(),
        )
    }

    /// Unit triangle with white corners
    pub fn triangle(backend: &mut dyn GraphicsBackend) -> EngineResult<Self> {
        Self::new(
            backend,
            TRIANGLE_VERTICES.to_vec(),
            3,
            TRIANGLE_DEFAULT_COLORS.to_vec(),
            3,
            TRIANGLE_INDICES.to_vec(),
        )
    }

    /// Replace the per-vertex colors
    pub fn set_color_data(&mut self, colors: Vec<f32>, color_arity: usize) -> EngineResult<()> {
        self.colors = color_buffer(colors, color_arity, self.entity.vertex_count())?;
        self.dirty.insert(DirtyFlags::COLORS);
        Ok(())
    }

    /// Replace the triangle indices
    pub fn set_element_data(&mut self, elements: Vec<u16>) -> EngineResult<()> {
        check_elements(&elements, self.entity.vertex_count())?;
        self.elements = elements;
        self.dirty.insert(DirtyFlags::ELEMENTS);
        Ok(())
    }

    /// Replace the binding procedure run before each draw
    pub fn configure_vertex_array(&mut self, vertex_array: VertexArray) {
        self.vertex_array = vertex_array;
    }

    /// Sample `image` through 2-component `tex_coords` fed to `attribute`
    ///
    /// The coordinates are uploaded immediately to a buffer of their own.
    /// Any previous texture is replaced.
    pub fn set_texture(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        image: &TextureImage,
        tex_coords: Vec<f32>,
        attribute: impl Into<String>,
    ) -> EngineResult<()> {
        let expected = self.entity.vertex_count() * 2;
        if tex_coords.len() != expected {
            return Err(EngineError::InvalidArgument(format!(
                "Expected {} texture coordinates for {} vertices, got {}",
                expected,
                self.entity.vertex_count(),
                tex_coords.len()
            )));
        }

        let texture = backend.create_texture(image, &image.params())?;
        let coord_buffer = backend.create_buffer()?;
        backend.bind_buffer(BufferTarget::Array, coord_buffer);
        backend.buffer_data(
            BufferTarget::Array,
            bytemuck::cast_slice(&tex_coords),
            BufferUsage::StaticDraw,
        )?;

        self.texture = Some(TextureBinding {
            texture,
            coord_buffer,
            coords: tex_coords,
            attribute: attribute.into(),
        });
        Ok(())
    }

    /// Swap the pixels of the current texture, e.g. once a real image replaces the placeholder
    pub fn update_texture_image(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        image: &TextureImage,
    ) -> EngineResult<()> {
        let binding = self
            .texture
            .as_ref()
            .ok_or_else(|| EngineError::IllegalState("Shape has no texture to update".to_string()))?;
        backend.update_texture(binding.texture, image, &image.params())?;
        Ok(())
    }

    /// Stop sampling the texture
    pub fn remove_texture(&mut self) {
        self.texture = None;
    }

    /// Current texture, if any
    pub fn texture(&self) -> Option<&TextureBinding> {
        self.texture.as_ref()
    }

    /// Colors, one per vertex
    pub fn colors(&self) -> &VertexBuffer {
        &self.colors
    }

    /// Triangle indices
    pub fn elements(&self) -> &[u16] {
        &self.elements
    }

    /// Backend buffers
    pub fn buffers(&self) -> &ShapeBuffers {
        &self.buffers
    }

    /// Buffers awaiting upload
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Draw the shape with `program`
    ///
    /// Resolves locations by name, uploads the model matrix, runs the binding
    /// procedure and draws every index as triangles. Names the program does
    /// not expose are skipped.
    pub fn render(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        program: ProgramHandle,
        names: &ShaderBindings,
    ) -> EngineResult<()> {
        let attributes = AttributeLocations {
            position: backend.attrib_location(program, &names.vertex_position),
            color: backend.attrib_location(program, &names.vertex_color),
            tex_coord: match &self.texture {
                Some(texture) => backend.attrib_location(program, &texture.attribute),
                None => None,
            },
        };

        match backend.uniform_location(program, &names.model_matrix) {
            Some(location) => {
                backend.uniform_matrix4(location, &matrix4_to_flat_array(self.entity.model_matrix()));
            }
            None => trace!("Program has no {} uniform", names.model_matrix),
        }

        let mut ctx = BindingContext {
            vertices: self.entity.local_vertices(),
            colors: &self.colors,
            elements: &self.elements,
            buffers: &self.buffers,
            attributes: &attributes,
            texture: self.texture.as_ref(),
            dirty: &mut self.dirty,
        };
        self.vertex_array.bind(backend, &mut ctx)?;

        backend.draw_elements(self.elements.len())?;
        Ok(())
    }
}

impl Transformable for RenderableShape {
    fn entity(&self) -> &TransformableEntity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut TransformableEntity {
        &mut self.entity
    }

    fn local_geometry_changed(&mut self) {
        self.dirty.insert(DirtyFlags::VERTICES);
    }
}

fn color_buffer(colors: Vec<f32>, color_arity: usize, vertex_count: usize) -> EngineResult<VertexBuffer> {
    let arity = match color_arity {
        3 => VertexArity::Three,
        4 => VertexArity::Four,
        other => {
            return Err(EngineError::InvalidArgument(format!(
                "Colors must either be 3 or 4 items each, {{r,g,b}} or {{r,g,b,a}}, got {}",
                other
            )))
        }
    };
    let colors = VertexBuffer::new(colors, arity)?;
    if colors.vertex_count() != vertex_count {
        return Err(EngineError::InvalidArgument(format!(
            "{} colors given for {} vertices",
            colors.vertex_count(),
            vertex_count
        )));
    }
    Ok(colors)
}

fn check_elements(elements: &[u16], vertex_count: usize) -> EngineResult<()> {
    match elements.iter().find(|&&i| usize::from(i) >= vertex_count) {
        Some(index) => Err(EngineError::InvalidArgument(format!(
            "Index {} out of range for {} vertices",
            index, vertex_count
        ))),
        None => Ok(()),
    }
}
