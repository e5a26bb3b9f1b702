//! `Mesh`: a connected group of faces produced by the stitcher, and the types it is built from.

use crate::errors::TopologyError;
use crate::float_types::{
    Real,
    parry3d::bounding_volume::{Aabb, BoundingVolume},
};
use crate::geom3d::points_aabb;
use crate::stitch::FaceStitcher;
use std::sync::Arc;

pub mod edge;
pub mod face;
pub mod halfedge;
pub mod meshset;
pub mod plane;
pub mod projection;
pub mod soup;
pub mod triangulate;
pub mod vertex;

use face::Face;
use halfedge::HalfEdges;
use soup::FaceSoup;
use vertex::Vertex;

/// Where the vertex indices stored in a mesh's edges point to.
#[derive(Debug, Clone)]
pub enum VertexBinding {
    /// A pool shared with the other meshes stitched from the same soup
    Unbound(Arc<Vec<Vertex>>),
    /// The `vertex_storage` of the [`MeshSet`](meshset::MeshSet) that adopted the mesh
    Bound,
}

/// A maximal set of faces connected through paired half-edges.
///
/// A mesh is closed when every half-edge has a `rev`; otherwise its unpaired
/// half-edges are listed in `open_edges`. `closed_edges` holds one half-edge per
/// paired couple.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub halfedges: HalfEdges,
    pub open_edges: Vec<usize>,
    pub closed_edges: Vec<usize>,
    is_negative: bool,
    binding: VertexBinding,
}

impl Mesh {
    /// Stitch a face soup with default settings and return the resulting meshes.
    ///
    /// # Example
    /// ```rust
    /// # use nalgebra::Point3;
    /// # use csgrs_topology::mesh::{Mesh, soup::FaceSoup};
    /// let points = [
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    ///     Point3::new(0.0, 0.0, 1.0),
    /// ];
    /// let soup = FaceSoup::from_indexed_faces(&points, [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]]).unwrap();
    /// let meshes = Mesh::create(soup).unwrap();
    /// assert_eq!(meshes.len(), 1);
    /// assert!(meshes[0].is_closed());
    /// assert!(!meshes[0].is_negative());
    /// ```
    pub fn create(soup: FaceSoup) -> Result<Vec<Mesh>, TopologyError> {
        Ok(FaceStitcher::new().stitch(soup)?.meshes)
    }

    /// Wrap a stitched arena whose vertex indices point into `pool`.
    pub(crate) fn from_halfedges(halfedges: HalfEdges, pool: Arc<Vec<Vertex>>) -> Self {
        let mut mesh = Mesh {
            halfedges,
            open_edges: Vec::new(),
            closed_edges: Vec::new(),
            is_negative: false,
            binding: VertexBinding::Bound,
        };
        mesh.refresh_edge_sets();
        mesh.is_negative = mesh.is_closed() && mesh.signed_volume(&pool) < 0.0;
        mesh.binding = VertexBinding::Unbound(pool);
        mesh
    }

    /// Rebuild `open_edges` and `closed_edges` from the `rev` links.
    pub(crate) fn refresh_edge_sets(&mut self) {
        self.open_edges.clear();
        self.closed_edges.clear();
        for f in 0..self.halfedges.faces.len() {
            for e in self.halfedges.face_edges(f) {
                let edge = &self.halfedges.edges[e];
                if edge.is_open() {
                    self.open_edges.push(e);
                } else if edge.rev.is_some_and(|r| e < r) {
                    self.closed_edges.push(e);
                }
            }
        }
    }

    pub(crate) fn bind(&mut self) {
        self.binding = VertexBinding::Bound;
    }

    pub const fn binding(&self) -> &VertexBinding {
        &self.binding
    }

    pub const fn is_bound(&self) -> bool {
        matches!(self.binding, VertexBinding::Bound)
    }

    /// The shared pool of an unbound mesh.
    pub const fn unbound_vertices(&self) -> Option<&Arc<Vec<Vertex>>> {
        match &self.binding {
            VertexBinding::Unbound(pool) => Some(pool),
            VertexBinding::Bound => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.open_edges.is_empty()
    }

    /// `true` for a closed mesh enclosing negative volume (its faces point inwards).
    /// Open meshes are never negative.
    pub const fn is_negative(&self) -> bool {
        self.is_negative
    }

    pub fn faces(&self) -> &[Face] {
        &self.halfedges.faces
    }

    pub fn n_faces(&self) -> usize {
        self.halfedges.faces.len()
    }

    /// Signed enclosed volume by the divergence theorem, fanning each face from its first vertex.
    pub fn signed_volume(&self, vertices: &[Vertex]) -> Real {
        let mut six_volume = 0.0;
        for f in 0..self.halfedges.faces.len() {
            let points = self.halfedges.face_points(f, vertices);
            let Some(p0) = points.first() else {
                continue;
            };
            for w in points[1..].windows(2) {
                six_volume += p0.coords.dot(&w[0].coords.cross(&w[1].coords));
            }
        }
        six_volume / 6.0
    }

    /// Union of the face boxes. A mesh without faces yields a zero-size box at the origin.
    pub fn bounding_box(&self, vertices: &[Vertex]) -> Aabb {
        (0..self.halfedges.faces.len())
            .map(|f| self.halfedges.face_bounding_box(f, vertices))
            .reduce(|a, b| a.merged(&b))
            .unwrap_or_else(|| points_aabb(std::iter::empty()))
    }

    /// Boundary loops formed by the open edges, each listed in walking order.
    ///
    /// Open edges that do not close up into a loop end up in a trailing partial chain.
    pub fn boundary_loops(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.halfedges.edges.len()];
        let mut loops = Vec::new();
        for &start in &self.open_edges {
            if visited[start] {
                continue;
            }
            let mut chain = Vec::new();
            let mut e = start;
            loop {
                visited[e] = true;
                chain.push(e);
                match self.halfedges.perimeter_next(e) {
                    Some(next) if next != start && !visited[next] => e = next,
                    _ => break,
                }
            }
            loops.push(chain);
        }
        loops
    }

    /// Check arena consistency against the pool `vertices`.
    pub fn validate(&self, vertices: &[Vertex]) -> Result<(), TopologyError> {
        self.halfedges.validate(vertices.len())
    }
}
