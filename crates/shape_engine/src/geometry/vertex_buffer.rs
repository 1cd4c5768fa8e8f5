//! Flat vertex storage grouped by arity

use crate::error::{EngineError, EngineResult};
use crate::foundation::math::{Mat4, Vec3, Vec4};

/// Number of components stored per vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexArity {
    /// `{x, y, z}`
    Three = 3,
    /// `{x, y, z, w}`
    Four = 4,
}

impl VertexArity {
    /// Components per vertex
    pub const fn components(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for VertexArity {
    type Error = EngineError;

    fn try_from(value: usize) -> EngineResult<Self> {
        match value {
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            other => Err(EngineError::InvalidArgument(format!(
                "Vertices must either be 3 or 4 items each, {{x,y,z}} or {{x,y,z,w}}, got {other}"
            ))),
        }
    }
}

/// Ordered `f32` data grouped into fixed-size vertex tuples
///
/// The length is always a multiple of the arity.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBuffer {
    data: Vec<f32>,
    arity: VertexArity,
}

impl VertexBuffer {
    /// Wrap raw vertex data, validating it against `arity`
    pub fn new(data: Vec<f32>, arity: VertexArity) -> EngineResult<Self> {
        if data.len() % arity.components() != 0 {
            return Err(EngineError::InvalidArgument(format!(
                "Vertex data length {} is not divisible by {} items per vertex",
                data.len(),
                arity.components()
            )));
        }
        Ok(Self { data, arity })
    }

    /// Build an arity 3 buffer from positions
    pub fn from_positions(positions: impl IntoIterator<Item = Vec3>) -> Self {
        let data = positions.into_iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        Self { data, arity: VertexArity::Three }
    }

    /// Items per vertex
    pub fn arity(&self) -> VertexArity {
        self.arity
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.data.len() / self.arity.components()
    }

    /// Raw flat data
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consume into the raw flat data
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    /// Iterate the xyz part of every vertex
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.data
            .chunks_exact(self.arity.components())
            .map(|v| Vec3::new(v[0], v[1], v[2]))
    }

    /// Return a new buffer with `matrix` applied to every vertex
    ///
    /// Arity 3 vertices are lifted with `w = 1` and truncated back to xyz.
    /// Arity 4 vertices keep their own `w` and all four output components.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let arity = self.arity.components();
        let mut data = Vec::with_capacity(self.data.len());
        for v in self.data.chunks_exact(arity) {
            let w = if arity == 4 { v[3] } else { 1.0 };
            let out = matrix * Vec4::new(v[0], v[1], v[2], w);
            data.extend_from_slice(&out.as_slice()[..arity]);
        }
        Self { data, arity: self.arity }
    }

    /// Component-wise mean of the vertex positions
    ///
    /// An empty buffer has its centroid at the origin.
    pub fn centroid(&self) -> Vec3 {
        let count = self.vertex_count();
        if count == 0 {
            return Vec3::zeros();
        }
        let sum = self.positions().fold(Vec3::zeros(), |acc, p| acc + p);
        sum / count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arity_from_usize() {
        assert_eq!(VertexArity::try_from(3).unwrap(), VertexArity::Three);
        assert_eq!(VertexArity::try_from(4).unwrap(), VertexArity::Four);
        assert!(matches!(VertexArity::try_from(5), Err(EngineError::InvalidArgument(_))));
        assert!(matches!(VertexArity::try_from(0), Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_ragged_data() {
        let result = VertexBuffer::new(vec![0.0; 7], VertexArity::Three);
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn test_transform_keeps_w_for_arity_four() {
        let buffer = VertexBuffer::new(vec![1.0, 2.0, 3.0, 0.0], VertexArity::Four).unwrap();
        let moved = buffer.transformed(&Mat4::new_translation(&Vec3::new(5.0, 5.0, 5.0)));
        // w = 0 is a direction, translation does not apply
        assert_eq!(moved.as_slice(), &[1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_transform_lifts_arity_three() {
        let buffer = VertexBuffer::new(vec![1.0, 2.0, 3.0], VertexArity::Three).unwrap();
        let moved = buffer.transformed(&Mat4::new_translation(&Vec3::new(1.0, 1.0, 1.0)));
        assert_eq!(moved.as_slice(), &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_centroid() {
        let buffer = VertexBuffer::new(
            vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 2.0, 4.0, 3.0],
            VertexArity::Three,
        )
        .unwrap();
        assert_relative_eq!(buffer.centroid(), Vec3::new(4.0 / 3.0, 4.0 / 3.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_empty_centroid_is_zero() {
        let buffer = VertexBuffer::new(Vec::new(), VertexArity::Three).unwrap();
        assert_eq!(buffer.vertex_count(), 0);
        assert_eq!(buffer.centroid(), Vec3::zeros());
    }
}
