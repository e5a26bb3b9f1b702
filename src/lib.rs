//! Half-edge **topology reconstruction** for Constructive Solid Geometry (CSG) kernels.
//!
//! After a Boolean operation has classified and split polygons, what is left is a
//! soup of faces that share vertices but know nothing about each other. This crate
//! turns such a [`FaceSoup`] into connected [`Mesh`]es by pairing opposite
//! half-edges, including edges shared by more than two faces, and gathers the
//! result into a [`MeshSet`] owning one vertex storage. Output polygons can be
//! post-processed with the [triangulation hooks](triangulate).
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon to stitch independent soups concurrently
//!
//! # Example
//! ```rust
//! # use nalgebra::Point3;
//! # use csgrs_topology::MeshSet;
//! let points = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//! let tetrahedron = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]];
//! let set = MeshSet::from_indexed_faces(&points, tetrahedron).unwrap();
//! assert_eq!(set.meshes.len(), 1);
//! assert!(set.meshes[0].is_closed());
//! assert_eq!(set.meshes[0].closed_edges.len(), 6);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod geom3d;
pub mod mesh;
pub mod stitch;
pub mod triangulate;
pub mod union_find;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use errors::TopologyError;
pub use mesh::{Mesh, meshset::MeshSet, soup::FaceSoup, vertex::Vertex};
pub use stitch::{FaceStitcher, OpenBoundary, StitchResult, StitchStats};
pub use triangulate::{FaceProcessor, HookChain, HookReport, PolygonFace};
