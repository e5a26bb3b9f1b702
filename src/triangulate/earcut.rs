//! Ear-clipping of a single projected polygon.

use crate::errors::TopologyError;
use crate::float_types::{Real, tolerance};
use crate::geom3d::{signed_area, triangle_area};
use geo::{Coord, LineString, Polygon as GeoPolygon, TriangulateEarcut};
use nalgebra::Point2;

/// Triangulate a simple polygon given as a 2D loop.
///
/// Returns triangles as indices into `projected`, wound the same way as the loop.
/// A loop whose area is at most [`tolerance`] times its squared extent is
/// [`TopologyError::DegenerateProjection`]. A simple `n`-gon always yields `n - 2`
/// triangles; anything else is reported as [`TopologyError::IncompleteTriangulation`].
///
/// # Example
/// ```rust
/// # use nalgebra::Point2;
/// # use csgrs_topology::triangulate::triangulate_polygon;
/// let square = [
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(1.0, 1.0),
///     Point2::new(0.0, 1.0),
/// ];
/// assert_eq!(triangulate_polygon(&square).unwrap().len(), 2);
/// ```
pub fn triangulate_polygon(projected: &[Point2<Real>]) -> Result<Vec<[usize; 3]>, TopologyError> {
    let n = projected.len();
    if n < 3 {
        return Err(TopologyError::TooFewVertices { count: n });
    }
    let area = signed_area(projected);
    if area.abs() <= tolerance() * squared_extent(projected) {
        return Err(TopologyError::DegenerateProjection { area });
    }
    if n == 3 {
        return Ok(vec![[0, 1, 2]]);
    }

    let coords: Vec<Coord<Real>> = projected.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    let triangulation = GeoPolygon::new(LineString::new(coords), Vec::new()).earcut_triangles_raw();

    let mut triangles = Vec::with_capacity(n - 2);
    for tri_chunk in triangulation.triangle_indices.chunks_exact(3) {
        // The closing coordinate of the ring aliases vertex 0
        let mut tri = [tri_chunk[0] % n, tri_chunk[1] % n, tri_chunk[2] % n];
        if tri[0] == tri[1] || tri[1] == tri[2] || tri[2] == tri[0] {
            continue;
        }
        let tri_area = triangle_area(&projected[tri[0]], &projected[tri[1]], &projected[tri[2]]);
        if (tri_area > 0.0) != (area > 0.0) {
            tri.swap(1, 2);
        }
        triangles.push(tri);
    }

    if triangles.len() != n - 2 {
        return Err(TopologyError::IncompleteTriangulation {
            expected: n - 2,
            produced: triangles.len(),
        });
    }
    Ok(triangles)
}

/// Squared diagonal of the 2D bounding box.
fn squared_extent(points: &[Point2<Real>]) -> Real {
    let (mut lo, mut hi) = (points[0], points[0]);
    for p in &points[1..] {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    (hi - lo).norm_squared()
}
