//! Axis-aligned projection of a face plane to 2D.

use crate::float_types::Real;
use crate::geom3d::largest_axis;
use crate::mesh::plane::Plane;
use nalgebra::{Point2, Point3};

/// Drops the dominant axis of a plane normal. The two kept axes are ordered so that
/// a loop winding anticlockwise about the normal in 3D stays anticlockwise in 2D.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    /// Dropped axis (0 = x, 1 = y, 2 = z)
    pub axis: usize,
    /// Whether the normal points along the positive dropped axis
    pub positive_facing: bool,
}

impl Projection {
    pub fn for_plane(plane: &Plane) -> Self {
        let axis = largest_axis(&plane.normal);
        Projection {
            axis,
            positive_facing: plane.normal[axis] >= 0.0,
        }
    }

    /// The kept axes as `(u, v)`.
    #[inline]
    pub const fn axes(&self) -> (usize, usize) {
        let u = (self.axis + 1) % 3;
        let v = (self.axis + 2) % 3;
        if self.positive_facing { (u, v) } else { (v, u) }
    }

    #[inline]
    pub fn project(&self, p: &Point3<Real>) -> Point2<Real> {
        let (u, v) = self.axes();
        Point2::new(p[u], p[v])
    }

    /// Lift a projected point back onto `plane`.
    pub fn unproject(&self, p: &Point2<Real>, plane: &Plane) -> Point3<Real> {
        let (u, v) = self.axes();
        let n = &plane.normal;
        let mut out = Point3::origin();
        out[u] = p.x;
        out[v] = p.y;
        out[self.axis] = (plane.w - n[u] * p.x - n[v] * p.y) / n[self.axis];
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom3d::signed_area;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn square(normal: Vector3<Real>) -> Vec<Point3<Real>> {
        // Build an anticlockwise unit square around `normal`
        let (t, b) = if normal.x.abs() > 0.5 {
            (Vector3::y(), normal.cross(&Vector3::y()))
        } else {
            (Vector3::x(), normal.cross(&Vector3::x()))
        };
        [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(s, r)| Point3::from(t * s + b * r + normal))
            .collect()
    }

    #[test]
    fn test_projection_preserves_winding_for_all_axes() {
        for normal in [
            Vector3::x(),
            -Vector3::x(),
            Vector3::y(),
            -Vector3::y(),
            Vector3::z(),
            -Vector3::z(),
        ] {
            let pts = square(normal);
            let plane = Plane::fit(&pts).unwrap();
            assert_relative_eq!(plane.normal, normal, epsilon = 1e-9);
            let projection = Projection::for_plane(&plane);
            let projected: Vec<_> = pts.iter().map(|p| projection.project(p)).collect();
            assert!(signed_area(&projected) > 0.0, "{normal:?}");
        }
    }

    #[test]
    fn test_unproject_round_trips_on_tilted_plane() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(2.0, 2.0, 1.5),
            Point3::new(0.0, 2.0, 0.5),
        ];
        let plane = Plane::fit(&pts[..3]).unwrap();
        let projection = Projection::for_plane(&plane);
        for p in &pts[..3] {
            let back = projection.unproject(&projection.project(p), &plane);
            assert_relative_eq!(back, *p, epsilon = 1e-9);
        }
    }
}
