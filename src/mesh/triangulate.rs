//! In-place triangulation of a stitched mesh, keeping adjacency intact.

use crate::errors::TopologyError;
use crate::float_types::Real;
use crate::geom3d::newell_normal;
use crate::mesh::{Mesh, halfedge::HalfEdges, projection::Projection, vertex::Vertex};
use crate::triangulate::triangulate_polygon;
use hashbrown::HashMap;
use nalgebra::Point2;
use std::sync::Arc;

impl Mesh {
    /// Replace every face with more than three edges by its ear-clipped triangles.
    ///
    /// Paired boundary edges stay paired with the same neighbours and the new
    /// interior diagonals are paired with each other, so a closed mesh stays closed.
    /// Triangles inherit plane, projection and `id` of the face they came from.
    /// Faces that cannot be triangulated are kept unchanged and reported as
    /// `(face index, error)`.
    pub fn triangulate(&mut self, vertices: &[Vertex]) -> Vec<(usize, TopologyError)> {
        let old = std::mem::take(&mut self.halfedges);
        let mut out = HalfEdges::new();
        // old half-edge -> new half-edge carrying the same directed segment
        let mut edge_map = vec![usize::MAX; old.edges.len()];
        let mut failures = Vec::new();

        for (f, face) in old.faces.iter().enumerate() {
            let loop_edges: Vec<usize> = old.face_edges(f).collect();
            let verts: Vec<usize> = loop_edges.iter().map(|&e| old.edges[e].vert).collect();

            let triangles = if verts.len() <= 3 {
                None
            } else if face.degenerate {
                let points: Vec<_> = verts.iter().filter_map(|&v| vertices.get(v)).map(|v| v.pos).collect();
                let error = TopologyError::DegenerateProjection {
                    area: newell_normal(&points).norm() * 0.5,
                };
                log::warn!("keeping face {} untriangulated: {}", f, error);
                failures.push((f, error));
                None
            } else {
                match project_loop(&verts, vertices, face.projection)
                    .and_then(|projected| triangulate_polygon(&projected))
                {
                    Ok(triangles) => Some(triangles),
                    Err(error) => {
                        log::warn!("keeping face {} untriangulated: {}", f, error);
                        failures.push((f, error));
                        None
                    },
                }
            };

            let Some(triangles) = triangles else {
                let first = out.edges.len();
                let nf = out.push_loop(&verts, face.plane, face.projection);
                out.faces[nf].id = face.id;
                out.faces[nf].degenerate = face.degenerate;
                for (i, &e) in loop_edges.iter().enumerate() {
                    edge_map[e] = first + i;
                }
                continue;
            };

            let n = verts.len();
            let mut diagonals: HashMap<(usize, usize), usize> = HashMap::new();
            for tri in triangles {
                let first = out.edges.len();
                let nf = out.push_loop(
                    &[verts[tri[0]], verts[tri[1]], verts[tri[2]]],
                    face.plane,
                    face.projection,
                );
                out.faces[nf].id = face.id;
                for k in 0..3 {
                    let (i, j) = (tri[k], tri[(k + 1) % 3]);
                    let e = first + k;
                    if j == (i + 1) % n {
                        edge_map[loop_edges[i]] = e;
                    } else if let Some(partner) = diagonals.remove(&(j, i)) {
                        out.pair(e, partner);
                    } else {
                        diagonals.insert((i, j), e);
                    }
                }
            }
        }

        for (e, edge) in old.edges.iter().enumerate() {
            let Some(r) = edge.rev else {
                continue;
            };
            let (a, b) = (edge_map[e], edge_map[r]);
            if a != usize::MAX && b != usize::MAX && out.edges[a].rev.is_none() {
                out.pair(a, b);
            }
        }

        log::debug!(
            "triangulated {} faces into {} ({} kept)",
            old.faces.len(),
            out.faces.len(),
            failures.len()
        );

        self.halfedges = out;
        self.refresh_edge_sets();
        failures
    }

    /// Triangulate an unbound mesh against its own shared pool.
    /// Bound meshes are triangulated through their [`MeshSet`](crate::mesh::meshset::MeshSet).
    pub fn triangulate_unbound(&mut self) -> Option<Vec<(usize, TopologyError)>> {
        let pool = Arc::clone(self.unbound_vertices()?);
        Some(self.triangulate(&pool))
    }
}

fn project_loop(
    verts: &[usize],
    vertices: &[Vertex],
    projection: Projection,
) -> Result<Vec<Point2<Real>>, TopologyError> {
    verts
        .iter()
        .map(|&v| {
            vertices
                .get(v)
                .map(|vertex| projection.project(&vertex.pos))
                .ok_or(TopologyError::VertexOutOfRange {
                    index: v,
                    len: vertices.len(),
                })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use crate::errors::TopologyError;
    use crate::mesh::{Mesh, soup::FaceSoup};
    use nalgebra::Point3;

    #[test]
    fn test_cube_triangulation_stays_closed() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [3, 7, 6, 2],
            [0, 4, 7, 3],
            [1, 2, 6, 5],
        ];
        let soup = FaceSoup::from_indexed_faces(&points, faces).unwrap();
        let mut meshes = Mesh::create(soup).unwrap();
        let mut cube = meshes.remove(0);
        let before = cube.signed_volume(cube.unbound_vertices().unwrap());

        let failures = cube.triangulate_unbound().unwrap();
        assert!(failures.is_empty());
        assert_eq!(cube.n_faces(), 12);
        assert!(cube.is_closed());
        assert_eq!(cube.closed_edges.len(), 18);
        let pool = cube.unbound_vertices().unwrap().clone();
        assert!(cube.validate(&pool).is_ok());
        assert!((cube.signed_volume(&pool) - before).abs() < 1e-12);
        // Every source face contributes two triangles
        for id in 0..6 {
            assert_eq!(cube.faces().iter().filter(|f| f.id == id).count(), 2);
        }
    }

    #[test]
    fn test_degenerate_quad_is_kept_and_reported() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ];
        let soup = FaceSoup::from_indexed_faces(&points, [[0, 1, 2, 3]]).unwrap();
        let mut mesh = Mesh::create(soup).unwrap().remove(0);
        assert!(mesh.faces()[0].degenerate);

        let failures = mesh.triangulate_unbound().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], (0, TopologyError::DegenerateProjection { .. })));
        assert_eq!(mesh.n_faces(), 1);
        assert!(mesh.faces()[0].degenerate);
        assert_eq!(mesh.open_edges.len(), 4);
    }
}
