//! Test support library
//! Builders for face soups and helpers to inspect stitching results.
#![allow(dead_code)]

use csgrs_topology::{FaceSoup, Mesh, float_types::Real};
use nalgebra::Point3;
use std::collections::BTreeSet;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Collects points and faces, merging points with identical coordinates.
#[derive(Debug, Clone, Default)]
pub struct SoupBuilder {
    pub points: Vec<Point3<Real>>,
    pub faces: Vec<Vec<usize>>,
}

impl SoupBuilder {
    pub fn new() -> Self {
        SoupBuilder::default()
    }

    pub fn vertex(&mut self, p: Point3<Real>) -> usize {
        if let Some(i) = self.points.iter().position(|q| *q == p) {
            return i;
        }
        self.points.push(p);
        self.points.len() - 1
    }

    pub fn face(&mut self, loop_points: &[Point3<Real>]) -> usize {
        let face: Vec<usize> = loop_points.iter().map(|&p| self.vertex(p)).collect();
        self.faces.push(face);
        self.faces.len() - 1
    }

    /// Axis-aligned cube with outward-facing, anticlockwise faces.
    pub fn cube(&mut self, min: Point3<Real>, size: Real) -> &mut Self {
        let corners = cube_corners(min, size);
        for quad in CUBE_FACES {
            let pts: Vec<Point3<Real>> = quad.iter().map(|&i| corners[i]).collect();
            self.face(&pts);
        }
        self
    }

    /// Double-sided pages hinged on the z axis between z = 0 and z = 1, one per angle.
    /// Page `i` adds a front face (id `2i`) whose hinge edge runs up the axis and a
    /// back face (id `2i + 1`) whose hinge edge runs down.
    pub fn book(&mut self, angles: &[Real]) -> &mut Self {
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let p1 = Point3::new(0.0, 0.0, 1.0);
        for &t in angles {
            let q0 = Point3::new(t.cos(), t.sin(), 0.0);
            let q1 = Point3::new(t.cos(), t.sin(), 1.0);
            self.face(&[p0, p1, q1, q0]);
            self.face(&[p1, p0, q0, q1]);
        }
        self
    }

    pub fn build(&self) -> FaceSoup {
        FaceSoup::from_indexed_faces(&self.points, &self.faces).unwrap()
    }

    /// Build with faces added in the order `order` (a permutation of face ids).
    pub fn build_ordered(&self, order: &[usize]) -> FaceSoup {
        FaceSoup::from_indexed_faces(&self.points, order.iter().map(|&f| &self.faces[f])).unwrap()
    }

    /// Same faces, every loop reversed.
    pub fn inverted(&self) -> SoupBuilder {
        SoupBuilder {
            points: self.points.clone(),
            faces: self
                .faces
                .iter()
                .map(|f| f.iter().rev().copied().collect())
                .collect(),
        }
    }
}

pub const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [3, 7, 6, 2],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
];

/// Corners in the numbering [`CUBE_FACES`] indexes: bottom ring anticlockwise from
/// `min`, then the top ring above it.
pub fn cube_corners(min: Point3<Real>, size: Real) -> [Point3<Real>; 8] {
    let c = |i: Real, j: Real, k: Real| min + nalgebra::Vector3::new(i, j, k) * size;
    [
        c(0.0, 0.0, 0.0),
        c(1.0, 0.0, 0.0),
        c(1.0, 1.0, 0.0),
        c(0.0, 1.0, 0.0),
        c(0.0, 0.0, 1.0),
        c(1.0, 0.0, 1.0),
        c(1.0, 1.0, 1.0),
        c(0.0, 1.0, 1.0),
    ]
}

pub fn cube_soup() -> FaceSoup {
    SoupBuilder::new().cube(Point3::origin(), 1.0).build()
}

/// Every pairing as `((face, slot), (face, slot))`, with face ids translated through
/// `order` back to the builder's numbering. `slot` is the edge's position in its loop.
pub fn pairing_signature(meshes: &[Mesh], order: &[usize]) -> BTreeSet<((usize, usize), (usize, usize))> {
    let mut signature = BTreeSet::new();
    for mesh in meshes {
        let he = &mesh.halfedges;
        let slot_of = |e: usize| {
            let f = he.edges[e].face;
            let slot = he.face_edges(f).position(|x| x == e).unwrap();
            (order[he.faces[f].id], slot)
        };
        for (e, edge) in he.edges.iter().enumerate() {
            if let Some(r) = edge.rev {
                signature.insert((slot_of(e), slot_of(r)));
            }
        }
    }
    signature
}

/// The id of the face on the other side of the edge `v1 -> v2` of face `face_id`.
pub fn neighbour_across(meshes: &[Mesh], face_id: usize, v1: usize, v2: usize) -> Option<usize> {
    for mesh in meshes {
        let he = &mesh.halfedges;
        for (f, face) in he.faces.iter().enumerate() {
            if face.id != face_id {
                continue;
            }
            for e in he.face_edges(f) {
                if he.v1(e) == v1 && he.v2(e) == v2 {
                    return he.edges[e].rev.map(|r| he.faces[he.edges[r].face].id);
                }
            }
        }
    }
    None
}
