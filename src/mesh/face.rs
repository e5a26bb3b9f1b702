use crate::float_types::Real;
use crate::mesh::{plane::Plane, projection::Projection};
use nalgebra::Vector3;

/// A planar polygon described by a loop of half-edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// First half-edge of the loop
    pub edge: usize,
    pub n_edges: usize,
    /// Position of the face in the soup it was stitched from
    pub id: usize,
    pub plane: Plane,
    pub projection: Projection,
    /// The loop has no usable area; `plane` is a fallback and carries no orientation
    pub degenerate: bool,
}

impl Face {
    #[inline]
    pub const fn n_edges(&self) -> usize {
        self.n_edges
    }

    /// A face has as many vertices as edges.
    #[inline]
    pub const fn n_vertices(&self) -> usize {
        self.n_edges
    }

    #[inline]
    pub const fn normal(&self) -> Vector3<Real> {
        self.plane.normal
    }
}
