//! `MeshSet`: meshes sharing one owned vertex storage.

use crate::errors::TopologyError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::geom3d::points_aabb;
use crate::mesh::{
    Mesh, VertexBinding, face::Face, soup::FaceSoup, vertex::Vertex,
};
use crate::stitch::FaceStitcher;
use hashbrown::HashMap;
use nalgebra::Point3;
use std::sync::Arc;

/// A collection of meshes that owns the vertex storage all of them refer to.
///
/// Every edge vertex index of every mesh points into `vertex_storage`.
#[derive(Debug, Clone, Default)]
pub struct MeshSet {
    pub vertex_storage: Vec<Vertex>,
    pub meshes: Vec<Mesh>,
}

impl MeshSet {
    /// Adopt unbound meshes, copying only the vertices they reference into a fresh
    /// storage in first-seen order.
    ///
    /// Fails with [`TopologyError::MeshAlreadyOwned`] if any mesh is already bound.
    pub fn new(mut meshes: Vec<Mesh>) -> Result<Self, TopologyError> {
        let pools: Vec<Arc<Vec<Vertex>>> = meshes
            .iter()
            .enumerate()
            .map(|(m, mesh)| match mesh.binding() {
                VertexBinding::Unbound(pool) => Ok(Arc::clone(pool)),
                VertexBinding::Bound => Err(TopologyError::MeshAlreadyOwned { mesh: m }),
            })
            .collect::<Result<_, _>>()?;

        // Keyed by (pool identity, index in pool)
        let mut vert_idx: HashMap<(usize, usize), usize> = HashMap::new();
        let mut vertex_storage = Vec::new();

        for (mesh, pool) in meshes.iter_mut().zip(&pools) {
            let pool_id = Arc::as_ptr(pool) as usize;
            for f in 0..mesh.halfedges.faces.len() {
                let loop_edges: Vec<usize> = mesh.halfedges.face_edges(f).collect();
                for e in loop_edges {
                    let old = mesh.halfedges.edges[e].vert;
                    let vertex = pool.get(old).ok_or(TopologyError::VertexOutOfRange {
                        index: old,
                        len: pool.len(),
                    })?;
                    let new = *vert_idx.entry((pool_id, old)).or_insert_with(|| {
                        vertex_storage.push(*vertex);
                        vertex_storage.len() - 1
                    });
                    mesh.halfedges.edges[e].vert = new;
                }
            }
            mesh.bind();
        }

        log::debug!(
            "adopted {} meshes sharing {} vertices",
            meshes.len(),
            vertex_storage.len()
        );

        Ok(MeshSet {
            vertex_storage,
            meshes,
        })
    }

    /// Stitch a soup and adopt the result.
    pub fn from_soup(soup: FaceSoup) -> Result<Self, TopologyError> {
        MeshSet::new(FaceStitcher::new().stitch(soup)?.meshes)
    }

    /// Build from a point list and faces given as index loops.
    ///
    /// # Example
    /// ```rust
    /// # use nalgebra::Point3;
    /// # use csgrs_topology::MeshSet;
    /// let points = [
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    ///     Point3::new(9.0, 9.0, 9.0), // unreferenced
    /// ];
    /// let set = MeshSet::from_indexed_faces(&points, [[0, 1, 2]]).unwrap();
    /// assert_eq!(set.meshes.len(), 1);
    /// assert_eq!(set.vertex_storage.len(), 3);
    /// ```
    pub fn from_indexed_faces<I>(points: &[Point3<Real>], faces: I) -> Result<Self, TopologyError>
    where
        I: IntoIterator,
        I::Item: AsRef<[usize]>,
    {
        MeshSet::from_soup(FaceSoup::from_indexed_faces(points, faces)?)
    }

    /// Drop unreferenced vertices and renumber the rest in first-use order
    /// (meshes, then faces, then loop order). Running it twice changes nothing.
    pub fn consolidate(&mut self) {
        let mut remap = vec![usize::MAX; self.vertex_storage.len()];
        let mut storage = Vec::new();
        for mesh in &mut self.meshes {
            for f in 0..mesh.halfedges.faces.len() {
                let loop_edges: Vec<usize> = mesh.halfedges.face_edges(f).collect();
                for e in loop_edges {
                    let old = mesh.halfedges.edges[e].vert;
                    if remap[old] == usize::MAX {
                        remap[old] = storage.len();
                        storage.push(self.vertex_storage[old]);
                    }
                    mesh.halfedges.edges[e].vert = remap[old];
                }
            }
        }
        log::debug!(
            "consolidated vertex storage from {} to {} vertices",
            self.vertex_storage.len(),
            storage.len()
        );
        self.vertex_storage = storage;
    }

    /// All faces of all meshes as `(mesh index, face)`, in mesh order.
    pub fn faces(&self) -> impl Iterator<Item = (usize, &Face)> + '_ {
        self.meshes
            .iter()
            .enumerate()
            .flat_map(|(m, mesh)| mesh.halfedges.faces.iter().map(move |f| (m, f)))
    }

    pub fn n_faces(&self) -> usize {
        self.meshes.iter().map(Mesh::n_faces).sum()
    }

    /// Start vertex of `edge` in mesh `mesh`.
    pub fn edge_vertex(&self, mesh: usize, edge: usize) -> &Vertex {
        &self.vertex_storage[self.meshes[mesh].halfedges.edges[edge].vert]
    }

    /// Index of `vertex` in the storage, if it is a reference into it.
    pub fn vertex_index(&self, vertex: &Vertex) -> Option<usize> {
        self.vertex_storage
            .iter()
            .position(|v| std::ptr::eq(v, vertex))
    }

    /// Box around every vertex referenced by any mesh.
    pub fn bounding_box(&self) -> Aabb {
        points_aabb(self.meshes.iter().flat_map(|mesh| {
            mesh.halfedges
                .edges
                .iter()
                .map(move |e| &self.vertex_storage[e.vert].pos)
        }))
    }

    pub fn mesh_bounding_box(&self, mesh: usize) -> Aabb {
        self.meshes[mesh].bounding_box(&self.vertex_storage)
    }

    /// Signed volume of every mesh.
    pub fn volumes(&self) -> Vec<Real> {
        self.meshes
            .iter()
            .map(|mesh| mesh.signed_volume(&self.vertex_storage))
            .collect()
    }

    /// Triangulate every face of every mesh in place.
    /// Returns `(mesh, face, error)` for faces kept as they were.
    pub fn triangulate(&mut self) -> Vec<(usize, usize, TopologyError)> {
        let vertex_storage = &self.vertex_storage;
        let mut failures = Vec::new();
        for (m, mesh) in self.meshes.iter_mut().enumerate() {
            failures.extend(
                mesh.triangulate(vertex_storage)
                    .into_iter()
                    .map(|(f, error)| (m, f, error)),
            );
        }
        failures
    }

    /// Check every mesh against the shared storage.
    pub fn validate(&self) -> Result<(), TopologyError> {
        self.meshes
            .iter()
            .try_for_each(|mesh| mesh.validate(&self.vertex_storage))
    }

    /// Give up ownership of storage and meshes. The meshes stay bound and cannot
    /// be adopted by another set.
    pub fn into_parts(self) -> (Vec<Vertex>, Vec<Mesh>) {
        (self.vertex_storage, self.meshes)
    }
}
