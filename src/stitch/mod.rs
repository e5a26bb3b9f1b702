//! `FaceStitcher`: recovers adjacency in a face soup and splits it into meshes.
//!
//! Stitching runs in four passes:
//!
//! 1. bucket every half-edge by its directed vertex pair `(v1, v2)`;
//! 2. pair undirected edges used exactly once in each direction;
//! 3. order the half-edges of every remaining shared edge by angle and pair each
//!    forward half-edge with the reverse one that follows it;
//! 4. collect what is still unpaired into open boundaries, one set per mesh.
//!
//! Faces joined by a pairing are merged with a [`DisjointSet`]; each final set
//! becomes one [`Mesh`]. Degenerate faces take part in simple pairing but are left
//! out of angular ordering, since their normal points nowhere in particular.

use crate::errors::TopologyError;
use crate::float_types::{Real, tolerance};
use crate::mesh::{Mesh, halfedge::HalfEdges, soup::FaceSoup, vertex::Vertex};
use crate::union_find::DisjointSet;
use hashbrown::HashMap;
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

mod open_edges;
mod ordering;

use open_edges::OpenEdgeGraph;
use ordering::{EdgeOrderCmp, EdgeOrderData, match_ordered_edges};

/// Counters describing one stitching run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StitchStats {
    pub faces: usize,
    pub half_edges: usize,
    /// Faces kept with a fallback plane
    pub degenerate_faces: usize,
    /// Undirected edges used once in each direction
    pub simple_pairs: usize,
    /// Undirected edges that needed angular ordering
    pub complex_edges: usize,
    /// Pairs formed around complex edges
    pub complex_pairs: usize,
    /// Complex edges left open because no consistent order exists
    pub ambiguous_edges: usize,
    pub open_edges: usize,
    pub meshes: usize,
}

/// Unpaired edges of one mesh that form a connected boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBoundary {
    /// Index into [`StitchResult::meshes`]
    pub mesh: usize,
    /// Vertex chains into the soup's vertex pool. A closed loop repeats its first
    /// vertex at the end; chains of one boundary meet at shared vertices.
    pub paths: Vec<Vec<usize>>,
}

/// Output of [`FaceStitcher::stitch`].
#[derive(Debug, Clone)]
pub struct StitchResult {
    /// One mesh per connected group, ordered by their lowest input face
    pub meshes: Vec<Mesh>,
    /// The soup's vertices, shared by every emitted mesh until it is adopted
    pub vertices: Arc<Vec<Vertex>>,
    /// Open boundaries, grouped by mesh and ordered by mesh index
    pub open_boundaries: Vec<OpenBoundary>,
    /// Recoverable problems, such as edges with an ambiguous angular order
    pub diagnostics: Vec<TopologyError>,
    pub stats: StitchStats,
}

/// Turns a face soup into meshes by pairing half-edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceStitcher {
    angle_tolerance: Real,
}

impl Default for FaceStitcher {
    fn default() -> Self {
        FaceStitcher::new()
    }
}

impl FaceStitcher {
    /// A stitcher whose angle tolerance is the crate-wide [`tolerance`].
    pub fn new() -> Self {
        FaceStitcher {
            angle_tolerance: tolerance(),
        }
    }

    /// Faces around a shared edge whose directions differ by no more than `radians`
    /// are treated as coincident when ordering.
    pub const fn with_angle_tolerance(mut self, radians: Real) -> Self {
        self.angle_tolerance = radians;
        self
    }

    pub const fn angle_tolerance(&self) -> Real {
        self.angle_tolerance
    }

    /// Pair the half-edges of `soup` and emit one mesh per connected group of faces.
    ///
    /// Fails with [`TopologyError::EdgeAlreadyPaired`] if any input half-edge already
    /// has a `rev`. Unpairable edges are not an error: they stay open.
    pub fn stitch(&self, soup: FaceSoup) -> Result<StitchResult, TopologyError> {
        let FaceSoup {
            vertices,
            mut halfedges,
        } = soup;

        let mut state = StitchState::init(&mut halfedges, &vertices)?;
        state.match_simple_edges();
        state.resolve_complex_edges(self.angle_tolerance);
        let StitchState {
            mut face_groups,
            mut stats,
            diagnostics,
            ..
        } = state;

        stats.open_edges = halfedges.edges.iter().filter(|e| e.is_open()).count();

        let (index_set, set_size) = face_groups.index_to_set();
        let pool = Arc::new(vertices);
        let meshes = emit_meshes(&halfedges, &index_set, &set_size, &pool);
        stats.meshes = meshes.len();

        let open_boundaries: Vec<OpenBoundary> = meshes
            .iter()
            .enumerate()
            .filter(|(_, mesh)| !mesh.is_closed())
            .flat_map(|(m, mesh)| {
                OpenEdgeGraph::build(&mesh.halfedges)
                    .into_boundaries()
                    .into_iter()
                    .map(move |paths| OpenBoundary { mesh: m, paths })
            })
            .collect();

        log::debug!(
            "stitched {} faces ({} degenerate) into {} meshes: {} simple pairs, {} complex edges ({} pairs, {} ambiguous), {} open edges in {} boundaries",
            stats.faces,
            stats.degenerate_faces,
            stats.meshes,
            stats.simple_pairs,
            stats.complex_edges,
            stats.complex_pairs,
            stats.ambiguous_edges,
            stats.open_edges,
            open_boundaries.len()
        );

        Ok(StitchResult {
            meshes,
            vertices: pool,
            open_boundaries,
            diagnostics,
            stats,
        })
    }

    /// Stitch independent soups, in parallel with the `parallel` feature.
    #[cfg(not(feature = "parallel"))]
    pub fn stitch_many(&self, soups: Vec<FaceSoup>) -> Vec<Result<StitchResult, TopologyError>> {
        soups.into_iter().map(|soup| self.stitch(soup)).collect()
    }

    /// Stitch independent soups, in parallel with the `parallel` feature.
    #[cfg(feature = "parallel")]
    pub fn stitch_many(&self, soups: Vec<FaceSoup>) -> Vec<Result<StitchResult, TopologyError>> {
        soups.into_par_iter().map(|soup| self.stitch(soup)).collect()
    }
}

struct StitchState<'a> {
    halfedges: &'a mut HalfEdges,
    vertices: &'a [Vertex],
    /// Directed `(v1, v2)` -> half-edges, in input order
    buckets: HashMap<(usize, usize), Vec<usize>>,
    /// Undirected `(low, high)` keys still waiting for angular resolution
    complex: Vec<(usize, usize)>,
    face_groups: DisjointSet,
    diagnostics: Vec<TopologyError>,
    stats: StitchStats,
}

impl<'a> StitchState<'a> {
    fn init(halfedges: &'a mut HalfEdges, vertices: &'a [Vertex]) -> Result<Self, TopologyError> {
        if let Some((e, edge)) = halfedges.edges.iter().enumerate().find(|(_, edge)| edge.rev.is_some()) {
            return Err(TopologyError::EdgeAlreadyPaired {
                face: edge.face,
                edge: e,
            });
        }
        halfedges.validate(vertices.len())?;

        let mut buckets: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for f in 0..halfedges.faces.len() {
            halfedges.faces[f].id = f;
            for e in halfedges.face_edges(f) {
                let key = (halfedges.v1(e), halfedges.v2(e));
                // Zero-length edges never pair
                if key.0 != key.1 {
                    buckets.entry(key).or_default().push(e);
                }
            }
        }

        let stats = StitchStats {
            faces: halfedges.faces.len(),
            half_edges: halfedges.edges.len(),
            degenerate_faces: halfedges.faces.iter().filter(|f| f.degenerate).count(),
            ..StitchStats::default()
        };
        Ok(StitchState {
            face_groups: DisjointSet::new(halfedges.faces.len()),
            halfedges,
            vertices,
            buckets,
            complex: Vec::new(),
            diagnostics: Vec::new(),
            stats,
        })
    }

    fn bucket(&self, key: (usize, usize)) -> &[usize] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn fuse(&mut self, fwd: usize, rev: usize) {
        self.halfedges.pair(fwd, rev);
        let (fa, fb) = (self.halfedges.edges[fwd].face, self.halfedges.edges[rev].face);
        self.face_groups.union(fa, fb);
    }

    fn match_simple_edges(&mut self) {
        let mut keys: Vec<(usize, usize)> = self
            .buckets
            .keys()
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();
        keys.sort_unstable();
        keys.dedup();

        for (a, b) in keys {
            let (fwd, rev) = (self.bucket((a, b)), self.bucket((b, a)));
            match (fwd, rev) {
                // Only one direction: nothing to pair with, stays open
                ([], _) | (_, []) => {},
                (&[f], &[r]) => {
                    self.fuse(f, r);
                    self.stats.simple_pairs += 1;
                },
                _ => self.complex.push((a, b)),
            }
        }
    }

    fn resolve_complex_edges(&mut self, angle_tolerance: Real) {
        let complex = std::mem::take(&mut self.complex);
        self.stats.complex_edges = complex.len();

        for (a, b) in complex {
            let edge_dir = self.vertices[b].pos - self.vertices[a].pos;
            let incident: Vec<(usize, bool)> = self
                .bucket((a, b))
                .iter()
                .map(|&e| (e, false))
                .chain(self.bucket((b, a)).iter().map(|&e| (e, true)))
                .filter(|&(e, _)| !self.halfedges.faces[self.halfedges.edges[e].face].degenerate)
                .collect();
            // Without both directions there is nothing to pair
            if incident.iter().all(|&(_, r)| r) || incident.iter().all(|&(_, r)| !r) {
                continue;
            }

            let mut entries = Vec::with_capacity(incident.len());
            for (e, is_reversed) in incident {
                let face = self.halfedges.edges[e].face;
                let group_id = self.face_groups.find(face);
                let normal = self.halfedges.faces[face].plane.normal;
                entries.push(EdgeOrderData::new(e, group_id, is_reversed, normal));
            }

            let base_dir = entries[0].face_dir;
            let Some(ring) = EdgeOrderCmp::new(edge_dir, base_dir, angle_tolerance).sort(entries)
            else {
                log::warn!(
                    "no consistent face order around edge ({}, {}); leaving it open",
                    a,
                    b
                );
                self.stats.ambiguous_edges += 1;
                self.diagnostics
                    .push(TopologyError::AmbiguousOrdering { v1: a, v2: b });
                continue;
            };

            for (fwd, rev) in match_ordered_edges(&ring) {
                self.fuse(fwd, rev);
                self.stats.complex_pairs += 1;
            }
        }
    }
}

/// Copy each face group into its own arena, remapping edge ids and `rev` links.
fn emit_meshes(
    halfedges: &HalfEdges,
    index_set: &[usize],
    set_size: &[usize],
    pool: &Arc<Vec<Vertex>>,
) -> Vec<Mesh> {
    let mut groups: Vec<Vec<usize>> = set_size.iter().map(|&n| Vec::with_capacity(n)).collect();
    for (face, &set) in index_set.iter().enumerate() {
        groups[set].push(face);
    }

    let mut edge_map = vec![usize::MAX; halfedges.edges.len()];
    groups
        .into_iter()
        .map(|faces| {
            let mut local = HalfEdges::new();
            for &f in &faces {
                let face = &halfedges.faces[f];
                let loop_edges: Vec<usize> = halfedges.face_edges(f).collect();
                let verts: Vec<usize> = loop_edges.iter().map(|&e| halfedges.edges[e].vert).collect();
                let first = local.edges.len();
                let nf = local.push_loop(&verts, face.plane, face.projection);
                local.faces[nf].id = face.id;
                local.faces[nf].degenerate = face.degenerate;
                for (i, &e) in loop_edges.iter().enumerate() {
                    edge_map[e] = first + i;
                }
            }
            for &f in &faces {
                for e in halfedges.face_edges(f) {
                    if let Some(r) = halfedges.edges[e].rev {
                        debug_assert_ne!(edge_map[r], usize::MAX, "paired across groups");
                        local.edges[edge_map[e]].rev = Some(edge_map[r]);
                    }
                }
            }
            Mesh::from_halfedges(local, Arc::clone(pool))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Point3;

    fn quad_strip() -> FaceSoup {
        // Two unit squares sharing the edge 1-4
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        FaceSoup::from_indexed_faces(&points, [[0, 1, 4, 3], [1, 2, 5, 4]]).unwrap()
    }

    #[test]
    fn test_simple_edge_pairs() {
        let result = FaceStitcher::new().stitch(quad_strip()).unwrap();
        assert_eq!(result.stats.simple_pairs, 1);
        assert_eq!(result.stats.complex_edges, 0);
        assert_eq!(result.stats.open_edges, 6);
        assert_eq!(result.meshes.len(), 1);
        let mesh = &result.meshes[0];
        assert_eq!(mesh.closed_edges.len(), 1);
        assert_eq!(mesh.open_edges.len(), 6);
        assert_eq!(mesh.boundary_loops().len(), 1);
        assert_eq!(
            result.open_boundaries,
            vec![OpenBoundary {
                mesh: 0,
                paths: vec![vec![0, 1, 2, 5, 4, 3, 0]],
            }]
        );
    }

    #[test]
    fn test_same_direction_duplicates_stay_open() {
        let mut soup = quad_strip();
        soup.add_face(&[0, 1, 4, 3]).unwrap();
        let result = FaceStitcher::new().stitch(soup).unwrap();
        // Edge 1-4 is used twice forward and once reversed: resolved angularly
        assert_eq!(result.stats.complex_edges, 1);
        assert_eq!(result.stats.complex_pairs, 1);
        assert_eq!(result.meshes.len(), 2);
    }

    #[test]
    fn test_prepaired_input_is_rejected() {
        let mut soup = quad_strip();
        soup.halfedges.pair(1, 7);
        assert_eq!(
            FaceStitcher::new().stitch(soup).unwrap_err(),
            TopologyError::EdgeAlreadyPaired { face: 0, edge: 1 }
        );
    }
}
