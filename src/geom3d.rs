//! Small geometric helpers shared by the stitcher and the triangulation hooks.

use crate::float_types::{Real, TAU, parry3d::bounding_volume::Aabb};
use nalgebra::{Point2, Point3, Vector3};

/// Unnormalized polygon normal by Newell's method. Its length is twice the polygon area.
pub fn newell_normal(points: &[Point3<Real>]) -> Vector3<Real> {
    let mut normal = Vector3::zeros();
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

/// Axis-aligned box around `points`. An empty input yields a zero-size box at the origin.
pub fn points_aabb<'a>(points: impl IntoIterator<Item = &'a Point3<Real>>) -> Aabb {
    let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
    let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
    let mut any = false;
    for p in points {
        any = true;
        mins = mins.inf(p);
        maxs = maxs.sup(p);
    }
    if !any {
        return Aabb::new(Point3::origin(), Point3::origin());
    }
    Aabb::new(mins, maxs)
}

/// Index of the component of `v` with the largest magnitude (ties prefer x, then y).
pub fn largest_axis(v: &Vector3<Real>) -> usize {
    let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());
    if ax >= ay && ax >= az {
        0
    } else if ay >= az {
        1
    } else {
        2
    }
}

/// Shoelace area, positive for anticlockwise loops.
pub fn signed_area(points: &[Point2<Real>]) -> Real {
    let mut twice = 0.0;
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        twice += current.x * next.y - next.x * current.y;
    }
    twice * 0.5
}

/// Signed area of the 2D triangle `a, b, c`.
pub fn triangle_area(a: &Point2<Real>, b: &Point2<Real>, c: &Point2<Real>) -> Real {
    (b - a).perp(&(c - a)) * 0.5
}

/// Smallest interior angle of the 2D triangle `a, b, c` in radians.
pub fn min_angle(a: &Point2<Real>, b: &Point2<Real>, c: &Point2<Real>) -> Real {
    let corner = |p: &Point2<Real>, q: &Point2<Real>, r: &Point2<Real>| {
        let (u, v) = (q - p, r - p);
        u.perp(&v).abs().atan2(u.dot(&v))
    };
    corner(a, b, c).min(corner(b, c, a)).min(corner(c, a, b))
}

fn flatten(v: &Vector3<Real>, axis: &Vector3<Real>) -> Vector3<Real> {
    v - axis * axis.dot(v)
}

/// Angle in `[0, 2π)` swept anticlockwise (right-hand rule) about `axis` from `from` to `to`.
///
/// Both vectors are flattened onto the plane perpendicular to `axis` first.
/// Returns NaN when `axis` or either flattened vector vanishes.
pub fn anticlockwise_angle(from: &Vector3<Real>, to: &Vector3<Real>, axis: &Vector3<Real>) -> Real {
    let Some(axis) = axis.try_normalize(0.0) else {
        return Real::NAN;
    };
    let (a, b) = (flatten(from, &axis), flatten(to, &axis));
    let sin = a.cross(&b).dot(&axis);
    let cos = a.dot(&b);
    if sin == 0.0 && cos == 0.0 {
        return Real::NAN;
    }
    let angle = sin.atan2(cos);
    let angle = if angle < 0.0 { angle + TAU } else { angle };
    if angle >= TAU { 0.0 } else { angle }
}
