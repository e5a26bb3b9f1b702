//! Directed half-edges.

/// A directed half-edge starting at `vert`, owned by `face`.
///
/// `prev` and `next` walk the face loop; `rev` is the opposite half-edge on an
/// adjacent face, or `None` while the edge is open. All links are indices into the
/// `edges` arena of the owning [`HalfEdges`](crate::mesh::halfedge::HalfEdges).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub vert: usize,
    pub face: usize,
    pub prev: usize,
    pub next: usize,
    pub rev: Option<usize>,
}

impl Edge {
    #[inline]
    pub const fn is_open(&self) -> bool {
        self.rev.is_none()
    }
}
