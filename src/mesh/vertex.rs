//! Struct and functions for working with `Vertex`s referenced by half-edges.

use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use nalgebra::Point3;

/// A point in space. Half-edges refer to vertices by index into a pool, so a
/// vertex carries nothing but its position.
#[derive(Debug, Clone, PartialEq, Copy)]
pub struct Vertex {
    pub pos: Point3<Real>,
}

impl Vertex {
    /// Create a new [`Vertex`]. Non-finite coordinates are replaced by `0.0`.
    ///
    /// # Example
    /// ```rust
    /// # use nalgebra::Point3;
    /// # use csgrs_topology::mesh::vertex::Vertex;
    /// let v = Vertex::new(Point3::new(1.0, f64::NAN, 3.0));
    /// assert_eq!(v.pos, Point3::new(1.0, 0.0, 3.0));
    /// ```
    #[inline]
    pub fn new(mut pos: Point3<Real>) -> Self {
        for c in pos.coords.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }
        Vertex { pos }
    }

    pub fn from_coords(x: Real, y: Real, z: Real) -> Self {
        Vertex::new(Point3::new(x, y, z))
    }

    /// Zero-size box at the vertex position.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::new(self.pos, self.pos)
    }
}

impl From<Point3<Real>> for Vertex {
    fn from(pos: Point3<Real>) -> Self {
        Vertex::new(pos)
    }
}
