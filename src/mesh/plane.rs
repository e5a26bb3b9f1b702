//! Plane equations attached to faces.

use crate::float_types::{Real, tolerance};
use crate::geom3d::{newell_normal, points_aabb};
use nalgebra::{Point3, Vector3};

/// A plane `normal · p = w` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<Real>,
    pub w: Real,
}

impl Plane {
    /// Build a plane from an arbitrary (non-zero) normal and offset, normalizing both.
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Self {
        let len = normal.norm();
        if len == 0.0 {
            return Plane { normal, w };
        }
        Plane {
            normal: normal / len,
            w: w / len,
        }
    }

    /// Plane through three points, oriented by the right-hand rule.
    /// `None` if the points are (nearly) collinear.
    pub fn from_points(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Option<Self> {
        Plane::fit(&[*a, *b, *c])
    }

    /// Best-fit plane of a polygon loop (Newell normal through the centroid).
    ///
    /// `None` if the loop has no usable area: its area is at most [`tolerance`] times
    /// the squared diagonal of its bounding box, so the test holds at any scale.
    pub fn fit(points: &[Point3<Real>]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let normal = newell_normal(points);
        let extent = points_aabb(points.iter()).extents().norm_squared();
        if normal.norm() * 0.5 <= tolerance() * extent {
            return None;
        }
        let normal = normal.normalize();
        Some(Plane {
            normal,
            w: normal.dot(&centroid(points)),
        })
    }

    /// Plane through the centroid of a loop that [`Plane::fit`] rejects, along the
    /// Newell direction if there is one and `+z` otherwise.
    pub fn fallback(points: &[Point3<Real>]) -> Self {
        let normal = newell_normal(points)
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::z);
        Plane {
            normal,
            w: normal.dot(&centroid(points)),
        }
    }

    #[inline]
    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            w: -self.w,
        }
    }

    pub fn signed_distance(&self, p: &Point3<Real>) -> Real {
        self.normal.dot(&p.coords) - self.w
    }
}

fn centroid(points: &[Point3<Real>]) -> Vector3<Real> {
    points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / points.len().max(1) as Real
}
