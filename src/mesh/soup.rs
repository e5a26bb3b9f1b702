//! Unstitched input for the face stitcher.

use crate::errors::TopologyError;
use crate::float_types::Real;
use crate::mesh::{halfedge::HalfEdges, vertex::Vertex};
use nalgebra::Point3;

/// A vertex pool plus faces whose half-edges are not yet paired.
///
/// This is what a CSG kernel produces after classifying and splitting polygons:
/// every face carries its own loop, and adjacency is unknown until the soup is
/// handed to a [`FaceStitcher`](crate::stitch::FaceStitcher).
#[derive(Debug, Clone, Default)]
pub struct FaceSoup {
    pub vertices: Vec<Vertex>,
    pub halfedges: HalfEdges,
}

impl FaceSoup {
    pub const fn new(vertices: Vec<Vertex>) -> Self {
        FaceSoup {
            vertices,
            halfedges: HalfEdges::new(),
        }
    }

    pub fn from_points(points: &[Point3<Real>]) -> Self {
        FaceSoup::new(points.iter().copied().map(Vertex::new).collect())
    }

    /// Build a soup from a point list and faces given as index loops.
    ///
    /// # Example
    /// ```rust
    /// # use nalgebra::Point3;
    /// # use csgrs_topology::mesh::soup::FaceSoup;
    /// let points = [
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ];
    /// let soup = FaceSoup::from_indexed_faces(&points, [[0, 1, 2]]).unwrap();
    /// assert_eq!(soup.n_faces(), 1);
    /// ```
    pub fn from_indexed_faces<I>(points: &[Point3<Real>], faces: I) -> Result<Self, TopologyError>
    where
        I: IntoIterator,
        I::Item: AsRef<[usize]>,
    {
        let mut soup = FaceSoup::from_points(points);
        for face in faces {
            soup.add_face(face.as_ref())?;
        }
        Ok(soup)
    }

    /// Add a face looping over the given vertex indices. Returns the face index.
    pub fn add_face(&mut self, verts: &[usize]) -> Result<usize, TopologyError> {
        self.halfedges.add_face(verts, &self.vertices)
    }

    /// Add a face looping over the given vertex indices in reverse order.
    pub fn add_face_rev(&mut self, verts: &[usize]) -> Result<usize, TopologyError> {
        self.halfedges.add_face_rev(verts, &self.vertices)
    }

    pub fn n_faces(&self) -> usize {
        self.halfedges.n_faces()
    }
}
