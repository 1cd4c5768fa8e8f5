//! Canonical polygon data shared by shapes and colliders
//!
//! All primitives are arity 3 and lie in the z = 0 plane with their lower-left
//! corner at the local origin.

/// Unit square corners, counter-clockwise from the origin
pub const SQUARE_VERTICES: [f32; 12] = [
    0.0, 0.0, 0.0,
    1.0, 0.0, 0.0,
    1.0, 1.0, 0.0,
    0.0, 1.0, 0.0,
];

/// Two triangles covering the unit square
pub const SQUARE_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// White for every square corner
pub const SQUARE_DEFAULT_COLORS: [f32; 12] = [1.0; 12];

/// Texture coordinates mapping the full image onto the unit square
pub const SQUARE_DEFAULT_TEX_COORDS: [f32; 8] = [
    0.0, 0.0,
    1.0, 0.0,
    1.0, 1.0,
    0.0, 1.0,
];

/// Isosceles triangle inscribed in the unit square
pub const TRIANGLE_VERTICES: [f32; 9] = [
    0.0, 0.0, 0.0,
    1.0, 0.0, 0.0,
    0.5, 1.0, 0.0,
];

/// Single triangle winding
pub const TRIANGLE_INDICES: [u16; 3] = [0, 1, 2];

/// White for every triangle corner
pub const TRIANGLE_DEFAULT_COLORS: [f32; 9] = [1.0; 9];
