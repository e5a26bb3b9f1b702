//! Topology errors

use crate::float_types::Real;
use std::fmt::Display;

/// All the possible problems we might run into while stitching faces, adopting meshes
/// into a [`MeshSet`](crate::mesh::meshset::MeshSet) or triangulating output polygons.
///
/// Variants fall into two families: contract breaches by the caller (see
/// [`TopologyError::is_invariant_violation`]) which abort the current operation, and
/// degenerate geometry (see [`TopologyError::is_degenerate_input`]) which is reported
/// per face. Open boundaries are never an error; they show up as open edges.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    /// (EdgeAlreadyPaired) A face handed to the stitcher already has a `rev` link
    EdgeAlreadyPaired { face: usize, edge: usize },
    /// (MeshAlreadyOwned) A mesh was adopted while already bound to a collection
    MeshAlreadyOwned { mesh: usize },
    /// (VertexOutOfRange) A face refers to a vertex outside of its pool
    VertexOutOfRange { index: usize, len: usize },
    /// (CorruptLoop) `next`/`prev` links of an edge loop disagree
    CorruptLoop { edge: usize },
    /// (AsymmetricPair) `rev` links of two half-edges disagree or do not share endpoints
    AsymmetricPair { edge: usize },
    /// (TooFewVertices) A face has fewer than 3 vertices
    TooFewVertices { count: usize },
    /// (DegenerateProjection) A polygon has (near) zero area
    DegenerateProjection { area: Real },
    /// (IncompleteTriangulation) Ear clipping could not cover the polygon
    IncompleteTriangulation { expected: usize, produced: usize },
    /// (AmbiguousOrdering) Faces around a non-manifold edge admit no consistent angular order
    AmbiguousOrdering { v1: usize, v2: usize },
    /// In general, anything else
    Other(String),
}

impl TopologyError {
    /// `true` for errors that signal a broken caller contract rather than bad geometry.
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            TopologyError::EdgeAlreadyPaired { .. }
                | TopologyError::MeshAlreadyOwned { .. }
                | TopologyError::VertexOutOfRange { .. }
                | TopologyError::CorruptLoop { .. }
                | TopologyError::AsymmetricPair { .. }
        )
    }

    /// `true` for errors caused by degenerate input geometry.
    pub const fn is_degenerate_input(&self) -> bool {
        matches!(
            self,
            TopologyError::TooFewVertices { .. }
                | TopologyError::DegenerateProjection { .. }
                | TopologyError::IncompleteTriangulation { .. }
                | TopologyError::AmbiguousOrdering { .. }
        )
    }
}

impl Display for TopologyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyError::EdgeAlreadyPaired { face, edge } => write!(f, "(EdgeAlreadyPaired) Edge {} of face {} already has a rev link", edge, face),
            TopologyError::MeshAlreadyOwned { mesh } => write!(f, "(MeshAlreadyOwned) Mesh {} is already bound to a mesh set", mesh),
            TopologyError::VertexOutOfRange { index, len } => write!(f, "(VertexOutOfRange) Vertex index {} is out of range (pool len = {})", index, len),
            TopologyError::CorruptLoop { edge } => write!(f, "(CorruptLoop) The loop links of edge {} are inconsistent", edge),
            TopologyError::AsymmetricPair { edge } => write!(f, "(AsymmetricPair) The rev link of edge {} is not mirrored", edge),
            TopologyError::TooFewVertices { count } => write!(f, "(TooFewVertices) A face needs at least 3 vertices, got {}", count),
            TopologyError::DegenerateProjection { area } => write!(f, "(DegenerateProjection) The polygon has degenerate area {}", area),
            TopologyError::IncompleteTriangulation { expected, produced } => write!(f, "(IncompleteTriangulation) Expected {} triangles, produced {}", expected, produced),
            TopologyError::AmbiguousOrdering { v1, v2 } => write!(f, "(AmbiguousOrdering) Faces around edge ({}, {}) have no consistent angular order", v1, v2),
            TopologyError::Other(str) => write!(f, "{}", str),
        }
    }
}
