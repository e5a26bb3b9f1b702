//! Arena storage for faces and their half-edge loops.
//!
//! Faces and edges live in two flat vectors and refer to one another by index, which
//! keeps the cyclic `prev`/`next`/`rev` graph free of reference counting. Vertex
//! positions are never stored here; operations that need geometry take the vertex
//! pool as an argument.

use crate::errors::TopologyError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::geom3d::{newell_normal, points_aabb};
use crate::mesh::{
    edge::Edge, face::Face, plane::Plane, projection::Projection, vertex::Vertex,
};
use nalgebra::{Point2, Point3, Vector3};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HalfEdges {
    pub edges: Vec<Edge>,
    pub faces: Vec<Face>,
}

/// Walks an edge loop once, starting from a given edge.
#[derive(Debug, Clone)]
pub struct LoopIter<'a> {
    edges: &'a [Edge],
    start: usize,
    current: Option<usize>,
    remaining: usize,
}

impl Iterator for LoopIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let e = self.current?;
        self.remaining = self.remaining.saturating_sub(1);
        let next = self.edges[e].next;
        self.current = if next == self.start || self.remaining == 0 {
            None
        } else {
            Some(next)
        };
        Some(e)
    }
}

impl HalfEdges {
    pub const fn new() -> Self {
        HalfEdges {
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Add a face whose loop visits `verts` in order. The plane and projection are
    /// computed from the positions in `vertices`.
    ///
    /// A loop without usable area still becomes a face, marked `degenerate`, so its
    /// edges take part in stitching. Fewer than three vertices, or indices outside
    /// `vertices`, are rejected.
    pub fn add_face(
        &mut self,
        verts: &[usize],
        vertices: &[Vertex],
    ) -> Result<usize, TopologyError> {
        let points = loop_points(verts, vertices)?;
        let (plane, projection, degenerate) = fit_plane(&points);
        let face = self.push_loop(verts, plane, projection);
        if degenerate {
            log::debug!(
                "face {} near {} has no usable area; keeping it with a fallback plane",
                face,
                self.centroid(face, vertices)
            );
            self.faces[face].degenerate = true;
        }
        Ok(face)
    }

    /// Add a face whose loop visits `verts` in reverse order.
    pub fn add_face_rev(
        &mut self,
        verts: &[usize],
        vertices: &[Vertex],
    ) -> Result<usize, TopologyError> {
        let reversed: Vec<usize> = verts.iter().rev().copied().collect();
        self.add_face(&reversed, vertices)
    }

    /// Append a loop without computing geometry.
    pub(crate) fn push_loop(&mut self, verts: &[usize], plane: Plane, projection: Projection) -> usize {
        let face = self.faces.len();
        let first = self.edges.len();
        let n = verts.len();
        for (i, &vert) in verts.iter().enumerate() {
            self.edges.push(Edge {
                vert,
                face,
                prev: first + (i + n - 1) % n,
                next: first + (i + 1) % n,
                rev: None,
            });
        }
        self.faces.push(Face {
            edge: first,
            n_edges: n,
            id: face,
            plane,
            projection,
            degenerate: false,
        });
        face
    }

    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// Half-edges of `face` in loop order, starting at its first edge.
    pub fn face_edges(&self, face: usize) -> LoopIter<'_> {
        self.edge_loop(self.faces[face].edge)
    }

    /// The loop containing `edge`, starting at `edge`.
    pub fn edge_loop(&self, edge: usize) -> LoopIter<'_> {
        LoopIter {
            edges: &self.edges,
            start: edge,
            current: Some(edge),
            remaining: self.edges.len(),
        }
    }

    /// Vertex indices of `face` in loop order.
    pub fn face_vertices(&self, face: usize) -> impl Iterator<Item = usize> + '_ {
        self.face_edges(face).map(move |e| self.edges[e].vert)
    }

    /// Start vertex of `edge`.
    #[inline]
    pub fn v1(&self, edge: usize) -> usize {
        self.edges[edge].vert
    }

    /// End vertex of `edge`.
    #[inline]
    pub fn v2(&self, edge: usize) -> usize {
        self.edges[self.edges[edge].next].vert
    }

    pub fn loop_size(&self, edge: usize) -> usize {
        self.edge_loop(edge).count()
    }

    /// Next open edge along the boundary, turning around the end vertex of `edge`
    /// through paired edges. `None` if `edge` is paired or the walk does not end.
    pub fn perimeter_next(&self, edge: usize) -> Option<usize> {
        if self.edges[edge].rev.is_some() {
            return None;
        }
        let mut e = self.edges[edge].next;
        for _ in 0..self.edges.len() {
            match self.edges[e].rev {
                Some(r) => e = self.edges[r].next,
                None => return Some(e),
            }
        }
        None
    }

    /// Previous open edge along the boundary; inverse of [`HalfEdges::perimeter_next`].
    pub fn perimeter_prev(&self, edge: usize) -> Option<usize> {
        if self.edges[edge].rev.is_some() {
            return None;
        }
        let mut e = self.edges[edge].prev;
        for _ in 0..self.edges.len() {
            match self.edges[e].rev {
                Some(r) => e = self.edges[r].prev,
                None => return Some(e),
            }
        }
        None
    }

    /// Link `a` and `b` as each other's `rev`, dropping any previous partners.
    pub fn pair(&mut self, a: usize, b: usize) {
        debug_assert_eq!(self.v1(a), self.v2(b));
        debug_assert_eq!(self.v2(a), self.v1(b));
        self.unpair(a);
        self.unpair(b);
        self.edges[a].rev = Some(b);
        self.edges[b].rev = Some(a);
    }

    /// Clear the `rev` link of `edge` and of its partner. Returns the old partner.
    pub fn unpair(&mut self, edge: usize) -> Option<usize> {
        let partner = self.edges[edge].rev.take()?;
        if self.edges[partner].rev == Some(edge) {
            self.edges[partner].rev = None;
        }
        Some(partner)
    }

    /// `true` if every edge of `face` is paired.
    pub fn is_face_enclosed(&self, face: usize) -> bool {
        self.face_edges(face).all(|e| self.edges[e].rev.is_some())
    }

    pub fn face_points(&self, face: usize, vertices: &[Vertex]) -> Vec<Point3<Real>> {
        self.face_vertices(face).map(|v| vertices[v].pos).collect()
    }

    /// Recompute plane and projection of `face` from the current vertex positions.
    ///
    /// A loop that lost its area gets a fallback plane, is marked `degenerate` and
    /// reported as [`TopologyError::DegenerateProjection`].
    pub fn recalc_face(&mut self, face: usize, vertices: &[Vertex]) -> Result<(), TopologyError> {
        let verts: Vec<usize> = self.face_vertices(face).collect();
        let points = loop_points(&verts, vertices)?;
        let (plane, projection, degenerate) = fit_plane(&points);
        let target = &mut self.faces[face];
        target.plane = plane;
        target.projection = projection;
        target.degenerate = degenerate;
        if degenerate {
            return Err(TopologyError::DegenerateProjection {
                area: newell_normal(&points).norm() * 0.5,
            });
        }
        Ok(())
    }

    /// Vertices of `face` projected with its own projection.
    pub fn projected_vertices(&self, face: usize, vertices: &[Vertex]) -> Vec<Point2<Real>> {
        let projection = self.faces[face].projection;
        self.face_vertices(face)
            .map(|v| projection.project(&vertices[v].pos))
            .collect()
    }

    pub fn centroid(&self, face: usize, vertices: &[Vertex]) -> Point3<Real> {
        let points = self.face_points(face, vertices);
        let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / points.len().max(1) as Real)
    }

    pub fn face_bounding_box(&self, face: usize, vertices: &[Vertex]) -> Aabb {
        points_aabb(self.face_vertices(face).map(|v| &vertices[v].pos))
    }

    /// Check loop links, `rev` symmetry and vertex indices against a pool of `n_vertices`.
    pub fn validate(&self, n_vertices: usize) -> Result<(), TopologyError> {
        for (e, edge) in self.edges.iter().enumerate() {
            if edge.next >= self.edges.len()
                || edge.prev >= self.edges.len()
                || self.edges[edge.next].prev != e
                || self.edges[edge.prev].next != e
                || self.edges[edge.next].face != edge.face
            {
                return Err(TopologyError::CorruptLoop { edge: e });
            }
            if edge.vert >= n_vertices {
                return Err(TopologyError::VertexOutOfRange {
                    index: edge.vert,
                    len: n_vertices,
                });
            }
            if let Some(r) = edge.rev {
                if r >= self.edges.len()
                    || self.edges[r].rev != Some(e)
                    || self.v1(r) != self.v2(e)
                    || self.v2(r) != self.v1(e)
                {
                    return Err(TopologyError::AsymmetricPair { edge: e });
                }
            }
        }
        for face in &self.faces {
            if face.edge >= self.edges.len() || self.loop_size(face.edge) != face.n_edges {
                return Err(TopologyError::CorruptLoop { edge: face.edge });
            }
        }
        Ok(())
    }
}

fn loop_points(verts: &[usize], vertices: &[Vertex]) -> Result<Vec<Point3<Real>>, TopologyError> {
    if verts.len() < 3 {
        return Err(TopologyError::TooFewVertices { count: verts.len() });
    }
    verts
        .iter()
        .map(|&v| {
            vertices
                .get(v)
                .map(|vertex| vertex.pos)
                .ok_or(TopologyError::VertexOutOfRange {
                    index: v,
                    len: vertices.len(),
                })
        })
        .collect()
}

/// Plane and projection of a loop, and whether the plane is only a fallback.
fn fit_plane(points: &[Point3<Real>]) -> (Plane, Projection, bool) {
    match Plane::fit(points) {
        Some(plane) => (plane, Projection::for_plane(&plane), false),
        None => {
            let plane = Plane::fallback(points);
            (plane, Projection::for_plane(&plane), true)
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn quad_pool() -> Vec<Vertex> {
        vec![
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::from_coords(1.0, 0.0, 0.0),
            Vertex::from_coords(1.0, 1.0, 0.0),
            Vertex::from_coords(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_add_face_links_loop() {
        let pool = quad_pool();
        let mut he = HalfEdges::new();
        let f = he.add_face(&[0, 1, 2, 3], &pool).unwrap();
        assert_eq!(he.faces[f].n_edges, 4);
        assert_eq!(he.face_vertices(f).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(he.v1(0), 0);
        assert_eq!(he.v2(3), 0);
        assert_eq!(he.loop_size(2), 4);
        assert!(he.validate(pool.len()).is_ok());
        assert!(!he.is_face_enclosed(f));
    }

    #[test]
    fn test_add_face_rev_flips_normal() {
        let pool = quad_pool();
        let mut he = HalfEdges::new();
        let a = he.add_face(&[0, 1, 2, 3], &pool).unwrap();
        let b = he.add_face_rev(&[0, 1, 2, 3], &pool).unwrap();
        assert_eq!(he.faces[a].normal(), -he.faces[b].normal());
        assert_eq!(he.face_vertices(b).collect::<Vec<_>>(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_rejects_bad_faces() {
        let pool = quad_pool();
        let mut he = HalfEdges::new();
        assert_eq!(
            he.add_face(&[0, 1], &pool),
            Err(TopologyError::TooFewVertices { count: 2 })
        );
        assert_eq!(
            he.add_face(&[0, 1, 9], &pool),
            Err(TopologyError::VertexOutOfRange { index: 9, len: 4 })
        );
        let collinear = vec![
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::from_coords(1.0, 0.0, 0.0),
            Vertex::from_coords(2.0, 0.0, 0.0),
        ];
        assert!(he.faces.is_empty());

        // Collinear loops are kept, flagged
        let f = he.add_face(&[0, 1, 2], &collinear).unwrap();
        assert!(he.faces[f].degenerate);
        assert_eq!(he.loop_size(he.faces[f].edge), 3);
        assert!(he.validate(collinear.len()).is_ok());
    }

    #[test]
    fn test_pair_unpair_and_perimeter() {
        let pool = quad_pool();
        let mut he = HalfEdges::new();
        // Two triangles sharing the diagonal 0-2
        he.add_face(&[0, 1, 2], &pool).unwrap();
        he.add_face(&[0, 2, 3], &pool).unwrap();
        // Edge 2 is 2->0, edge 3 is 0->2
        he.pair(2, 3);
        assert_eq!(he.edges[2].rev, Some(3));
        assert!(he.validate(pool.len()).is_ok());

        // Boundary walk 0->1, 1->2, 2->3, 3->0
        assert_eq!(he.perimeter_next(0), Some(1));
        assert_eq!(he.perimeter_next(1), Some(4));
        assert_eq!(he.perimeter_next(4), Some(5));
        assert_eq!(he.perimeter_next(5), Some(0));
        assert_eq!(he.perimeter_prev(4), Some(1));
        assert_eq!(he.perimeter_next(2), None);

        assert_eq!(he.unpair(3), Some(2));
        assert_eq!(he.edges[2].rev, None);
    }

    #[test]
    fn test_validate_catches_asymmetric_rev() {
        let pool = quad_pool();
        let mut he = HalfEdges::new();
        he.add_face(&[0, 1, 2], &pool).unwrap();
        he.add_face(&[0, 2, 3], &pool).unwrap();
        he.edges[2].rev = Some(3);
        assert_eq!(he.validate(pool.len()), Err(TopologyError::AsymmetricPair { edge: 2 }));
    }

    #[test]
    fn test_recalc_face_follows_moved_vertices() {
        let mut pool = quad_pool();
        let mut he = HalfEdges::new();
        let f = he.add_face(&[0, 1, 2, 3], &pool).unwrap();
        assert_eq!(he.faces[f].projection.axis, 2);

        // Stand the square up in the xz plane
        for v in &mut pool {
            v.pos = nalgebra::Point3::new(v.pos.x, 0.0, v.pos.y);
        }
        he.recalc_face(f, &pool).unwrap();
        assert_eq!(he.faces[f].projection.axis, 1);
        assert!((he.faces[f].normal().y + 1.0).abs() < 1e-12);

        for v in &mut pool {
            v.pos.z = 0.0;
        }
        assert!(matches!(
            he.recalc_face(f, &pool),
            Err(TopologyError::DegenerateProjection { .. })
        ));
        assert!(he.faces[f].degenerate);
    }

    #[test]
    fn test_centroid_and_face_bounding_box() {
        let pool = quad_pool();
        let mut he = HalfEdges::new();
        let f = he.add_face(&[0, 1, 2, 3], &pool).unwrap();
        assert_eq!(he.centroid(f, &pool), Point3::new(0.5, 0.5, 0.0));
        let bb = he.face_bounding_box(f, &pool);
        assert_eq!(bb.mins, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bb.maxs, Point3::new(1.0, 1.0, 0.0));
    }
}
