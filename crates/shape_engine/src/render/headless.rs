//! Command-recording backend
//!
//! [`HeadlessBackend`] executes nothing. Every call is appended to a command
//! list that tests and the headless demo inspect afterwards. Programs are
//! registered up front with the attribute and uniform names they expose, and
//! lookups of any other name come back as `None`, like an inactive
//! attribute on a real driver.

use std::collections::HashMap;

use crate::render::backend::{
    AttribLocation, BackendResult, BufferHandle, BufferTarget, BufferUsage, GraphicsBackend,
    ProgramHandle, TextureHandle, UniformLocation,
};
use crate::render::texture::{pixel_count, TextureImage, TextureParams};
use crate::render::RenderError;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    /// `create_buffer`
    CreateBuffer(BufferHandle),
    /// `bind_buffer`
    BindBuffer {
        /// Binding point
        target: BufferTarget,
        /// Bound buffer
        buffer: BufferHandle,
    },
    /// `buffer_data`, resolved to the buffer bound at the time
    BufferData {
        /// Binding point
        target: BufferTarget,
        /// Buffer that received the data
        buffer: BufferHandle,
        /// Uploaded bytes
        data: Vec<u8>,
        /// Usage hint
        usage: BufferUsage,
    },
    /// `vertex_attrib_pointer`
    AttribPointer {
        /// Attribute
        location: AttribLocation,
        /// Floats per vertex
        components: usize,
        /// Byte stride
        stride: usize,
        /// Byte offset
        offset: usize,
    },
    /// `enable_vertex_attrib_array`
    EnableAttrib(AttribLocation),
    /// `uniform_matrix4`
    UniformMatrix4 {
        /// Uniform
        location: UniformLocation,
        /// Column-major matrix
        matrix: [f32; 16],
    },
    /// `create_texture` or `update_texture`
    TextureImage {
        /// Texture
        texture: TextureHandle,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
        /// Sampling parameters
        params: TextureParams,
    },
    /// `bind_texture`
    BindTexture(TextureHandle),
    /// `clear`
    Clear {
        /// RGBA clear color
        color: [f32; 4],
        /// Clear depth
        depth: f32,
    },
    /// `draw_elements`
    DrawElements {
        /// Number of indices
        count: usize,
    },
}

#[derive(Debug, Default)]
struct ProgramInterface {
    attributes: HashMap<String, AttribLocation>,
    uniforms: HashMap<String, UniformLocation>,
}

/// Backend that records calls instead of issuing them
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    commands: Vec<BackendCommand>,
    programs: HashMap<ProgramHandle, ProgramInterface>,
    bound: HashMap<BufferTarget, BufferHandle>,
    next_handle: u64,
    buffer_limit: Option<usize>,
    buffers_created: usize,
}

impl HeadlessBackend {
    /// Empty backend with no programs
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `create_buffer` once `limit` buffers exist
    pub fn with_buffer_limit(limit: usize) -> Self {
        Self {
            buffer_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Register a program exposing the given attribute and uniform names
    ///
    /// Locations are assigned in the order the names are given.
    pub fn register_program(&mut self, attributes: &[&str], uniforms: &[&str]) -> ProgramHandle {
        let handle = ProgramHandle(self.allocate_handle());
        let interface = ProgramInterface {
            attributes: attributes
                .iter()
                .enumerate()
                .map(|(i, name)| (name.to_string(), AttribLocation(i as u32)))
                .collect(),
            uniforms: uniforms
                .iter()
                .enumerate()
                .map(|(i, name)| (name.to_string(), UniformLocation(i as u32)))
                .collect(),
        };
        self.programs.insert(handle, interface);
        handle
    }

    /// Everything recorded so far
    pub fn commands(&self) -> &[BackendCommand] {
        &self.commands
    }

    /// Forget recorded commands, keeping programs and bindings
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of draw calls recorded
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, BackendCommand::DrawElements { .. }))
            .count()
    }

    /// Number of uploads that went to `buffer`
    pub fn upload_count(&self, buffer: BufferHandle) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, BackendCommand::BufferData { buffer: b, .. } if *b == buffer))
            .count()
    }

    /// Most recent upload to `buffer`, reinterpreted as `f32`
    pub fn last_upload_f32(&self, buffer: BufferHandle) -> Option<Vec<f32>> {
        self.last_upload(buffer).map(bytemuck::pod_collect_to_vec)
    }

    /// Most recent upload to `buffer`, reinterpreted as `u16`
    pub fn last_upload_u16(&self, buffer: BufferHandle) -> Option<Vec<u16>> {
        self.last_upload(buffer).map(bytemuck::pod_collect_to_vec)
    }

    /// Whether `location` was enabled since the last [`clear_commands`](Self::clear_commands)
    pub fn attrib_enabled(&self, location: AttribLocation) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, BackendCommand::EnableAttrib(l) if *l == location))
    }

    fn last_upload(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.commands.iter().rev().find_map(|c| match c {
            BackendCommand::BufferData { buffer: b, data, .. } if *b == buffer => Some(data.as_slice()),
            _ => None,
        })
    }

    fn allocate_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn create_buffer(&mut self) -> BackendResult<BufferHandle> {
        if let Some(limit) = self.buffer_limit {
            if self.buffers_created >= limit {
                return Err(RenderError::ResourceCreationFailed(format!(
                    "buffer limit of {} reached",
                    limit
                )));
            }
        }
        self.buffers_created += 1;
        let handle = BufferHandle(self.allocate_handle());
        log::trace!("create_buffer -> {:?}", handle);
        self.commands.push(BackendCommand::CreateBuffer(handle));
        Ok(handle)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferHandle) {
        self.bound.insert(target, buffer);
        self.commands.push(BackendCommand::BindBuffer { target, buffer });
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> BackendResult<()> {
        let buffer = *self
            .bound
            .get(&target)
            .ok_or_else(|| RenderError::BackendError(format!("no buffer bound to {:?}", target)))?;
        log::trace!("buffer_data {:?} {} bytes into {:?}", target, data.len(), buffer);
        self.commands.push(BackendCommand::BufferData {
            target,
            buffer,
            data: data.to_vec(),
            usage,
        });
        Ok(())
    }

    fn attrib_location(&mut self, program: ProgramHandle, name: &str) -> Option<AttribLocation> {
        self.programs.get(&program)?.attributes.get(name).copied()
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.programs.get(&program)?.uniforms.get(name).copied()
    }

    fn vertex_attrib_pointer(&mut self, location: AttribLocation, components: usize, stride: usize, offset: usize) {
        self.commands.push(BackendCommand::AttribPointer {
            location,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&mut self, location: AttribLocation) {
        self.commands.push(BackendCommand::EnableAttrib(location));
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]) {
        self.commands.push(BackendCommand::UniformMatrix4 {
            location,
            matrix: *matrix,
        });
    }

    fn create_texture(&mut self, image: &TextureImage, params: &TextureParams) -> BackendResult<TextureHandle> {
        let texture = TextureHandle(self.allocate_handle());
        self.update_texture(texture, image, params)?;
        Ok(texture)
    }

    fn update_texture(
        &mut self,
        texture: TextureHandle,
        image: &TextureImage,
        params: &TextureParams,
    ) -> BackendResult<()> {
        let expected = pixel_count(image.width, image.height) * 4;
        if image.data.len() != expected {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture data is {} bytes, {}x{} RGBA needs {}",
                image.data.len(),
                image.width,
                image.height,
                expected
            )));
        }
        log::trace!("texture {:?} <- {}x{}", texture, image.width, image.height);
        self.commands.push(BackendCommand::TextureImage {
            texture,
            width: image.width,
            height: image.height,
            params: *params,
        });
        Ok(())
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.commands.push(BackendCommand::BindTexture(texture));
    }

    fn clear(&mut self, color: [f32; 4], depth: f32) {
        self.commands.push(BackendCommand::Clear { color, depth });
    }

    fn draw_elements(&mut self, index_count: usize) -> BackendResult<()> {
        if !self.bound.contains_key(&BufferTarget::ElementArray) {
            return Err(RenderError::RenderingFailed("draw with no element buffer bound".to_string()));
        }
        self.commands.push(BackendCommand::DrawElements { count: index_count });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_goes_to_bound_buffer() {
        let mut backend = HeadlessBackend::new();
        let a = backend.create_buffer().unwrap();
        let b = backend.create_buffer().unwrap();
        assert_ne!(a, b);

        backend.bind_buffer(BufferTarget::Array, b);
        backend
            .buffer_data(BufferTarget::Array, bytemuck::cast_slice(&[1.0f32, 2.0]), BufferUsage::StaticDraw)
            .unwrap();

        assert_eq!(backend.upload_count(a), 0);
        assert_eq!(backend.upload_count(b), 1);
        assert_eq!(backend.last_upload_f32(b), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn test_upload_without_binding_fails() {
        let mut backend = HeadlessBackend::new();
        let result = backend.buffer_data(BufferTarget::ElementArray, &[0, 0], BufferUsage::StaticDraw);
        assert!(matches!(result, Err(RenderError::BackendError(_))));
    }

    #[test]
    fn test_program_lookup() {
        let mut backend = HeadlessBackend::new();
        let program = backend.register_program(&["aVertexPosition", "aVertexColor"], &["uModelMatrix"]);

        assert_eq!(backend.attrib_location(program, "aVertexColor"), Some(AttribLocation(1)));
        assert_eq!(backend.attrib_location(program, "aTexCoord"), None);
        assert_eq!(backend.uniform_location(program, "uModelMatrix"), Some(UniformLocation(0)));
        assert_eq!(backend.attrib_location(ProgramHandle(999), "aVertexColor"), None);
    }

    #[test]
    fn test_buffer_limit() {
        let mut backend = HeadlessBackend::with_buffer_limit(1);
        assert!(backend.create_buffer().is_ok());
        assert!(matches!(
            backend.create_buffer(),
            Err(RenderError::ResourceCreationFailed(_))
        ));
    }

    #[test]
    fn test_draw_requires_element_buffer() {
        let mut backend = HeadlessBackend::new();
        assert!(matches!(backend.draw_elements(3), Err(RenderError::RenderingFailed(_))));

        let elements = backend.create_buffer().unwrap();
        backend.bind_buffer(BufferTarget::ElementArray, elements);
        backend.draw_elements(3).unwrap();
        assert_eq!(backend.draw_count(), 1);
    }

    #[test]
    fn test_texture_size_checked() {
        let mut backend = HeadlessBackend::new();
        let mut image = TextureImage::placeholder();
        image.data.pop();
        let result = backend.create_texture(&image, &image.params());
        assert!(matches!(result, Err(RenderError::ResourceCreationFailed(_))));
    }
}
