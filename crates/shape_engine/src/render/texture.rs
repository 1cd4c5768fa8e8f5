//! Texture image decoding and sampling parameters
//!
//! Images are decoded through the `image` crate into tightly packed RGBA8.
//! Until a real image is available a shape can sample a single opaque blue
//! pixel, see [`TextureImage::placeholder`].

use std::path::Path;

use crate::render::RenderError;

/// Placeholder pixel shown while no image is loaded
pub const PLACEHOLDER_PIXEL: [u8; 4] = [0, 0, 255, 255];

/// Decoded RGBA8 pixels ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    /// Row-major RGBA pixel data
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl TextureImage {
    /// Decode an image file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RenderError> {
        let path = path.as_ref();
        log::debug!("Loading texture from {:?}", path);

        let img = image::open(path)
            .map_err(|e| RenderError::TextureLoad(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_rgba(img.to_rgba8()))
    }

    /// Decode an in-memory encoded image (PNG, ...)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RenderError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| RenderError::TextureLoad(format!("in-memory image: {}", e)))?;
        Ok(Self::from_rgba(img.to_rgba8()))
    }

    /// Decode `path`, falling back to the placeholder when it cannot be read
    pub fn from_file_or_placeholder<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(&path) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("{}, using placeholder texture", e);
                Self::placeholder()
            }
        }
    }

    /// Single opaque blue pixel
    pub fn placeholder() -> Self {
        Self::solid_color(1, 1, PLACEHOLDER_PIXEL)
    }

    /// Image filled with one color
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            data: color.repeat(pixel_count(width, height)),
            width,
            height,
        }
    }

    /// Both dimensions are powers of two
    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }

    /// Sampling parameters appropriate for this image's dimensions
    pub fn params(&self) -> TextureParams {
        TextureParams::for_dimensions(self.width, self.height)
    }

    fn from_rgba(rgba: image::RgbaImage) -> Self {
        let (width, height) = rgba.dimensions();
        log::debug!("Decoded texture {}x{}", width, height);
        Self {
            data: rgba.into_raw(),
            width,
            height,
        }
    }
}

/// Pixels in a `width` x `height` image, computed in `usize`
pub(crate) fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Texture coordinate wrapping mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    /// Tile the image
    Repeat,
    /// Clamp coordinates to the edge texels
    ClampToEdge,
}

/// Minification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureMinFilter {
    /// Nearest texel
    Nearest,
}

/// How a texture is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureParams {
    /// Generate a mipmap chain after upload
    pub generate_mipmaps: bool,
    /// Wrap along S
    pub wrap_s: TextureWrap,
    /// Wrap along T
    pub wrap_t: TextureWrap,
    /// Minification filter
    pub min_filter: TextureMinFilter,
}

impl TextureParams {
    /// Power-of-two images get mipmaps, anything else is clamped to edge
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        if width.is_power_of_two() && height.is_power_of_two() {
            Self {
                generate_mipmaps: true,
                wrap_s: TextureWrap::Repeat,
                wrap_t: TextureWrap::Repeat,
                min_filter: TextureMinFilter::Nearest,
            }
        } else {
            Self {
                generate_mipmaps: false,
                wrap_s: TextureWrap::ClampToEdge,
                wrap_t: TextureWrap::ClampToEdge,
                min_filter: TextureMinFilter::Nearest,
            }
        }
    }
}
