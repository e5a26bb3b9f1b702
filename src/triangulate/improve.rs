//! Local edge flips that raise the minimum angle of a 2D triangulation.

use crate::float_types::{Real, tolerance};
use crate::geom3d::{min_angle, triangle_area};
use hashbrown::HashMap;
use nalgebra::Point2;

/// Improve `triangles` (anticlockwise index triples into `projected`) in place.
///
/// An interior edge shared by exactly two triangles is flipped when the quad they
/// form is strictly convex and the flip raises the smaller of the two minimum
/// angles. Passes repeat until nothing flips or the pass cap is hit. Returns the
/// number of flips.
pub fn improve(projected: &[Point2<Real>], triangles: &mut [[usize; 3]]) -> usize {
    improve_with_cap(projected, triangles, default_pass_cap(triangles.len()))
}

pub(crate) const fn default_pass_cap(n_triangles: usize) -> usize {
    2 * n_triangles + 8
}

/// [`improve`] with an explicit cap on the number of passes.
pub fn improve_with_cap(
    projected: &[Point2<Real>],
    triangles: &mut [[usize; 3]],
    max_passes: usize,
) -> usize {
    let threshold = tolerance();
    let mut flips = 0;

    for pass in 0..max_passes {
        // directed edge -> (triangle, slot of its start vertex)
        let mut edge_tris: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();
        for (t, tri) in triangles.iter().enumerate() {
            for k in 0..3 {
                edge_tris
                    .entry((tri[k], tri[(k + 1) % 3]))
                    .or_default()
                    .push((t, k));
            }
        }
        let mut keys: Vec<(usize, usize)> =
            edge_tris.keys().copied().filter(|&(a, b)| a < b).collect();
        keys.sort_unstable();

        let mut dirty = vec![false; triangles.len()];
        let mut flipped = 0;
        for (p, q) in keys {
            let (Some(fwd), Some(rev)) = (edge_tris.get(&(p, q)), edge_tris.get(&(q, p))) else {
                continue;
            };
            if fwd.len() != 1 || rev.len() != 1 {
                continue;
            }
            let ((t1, k1), (t2, k2)) = (fwd[0], rev[0]);
            if t1 == t2 || dirty[t1] || dirty[t2] {
                continue;
            }
            let r1 = triangles[t1][(k1 + 2) % 3];
            let r2 = triangles[t2][(k2 + 2) % 3];
            if r1 == r2 {
                continue;
            }
            if let Some((n1, n2)) = flip_gain(projected, p, q, r1, r2, threshold) {
                log::trace!("flipping edge ({p}, {q}) to ({r1}, {r2})");
                triangles[t1] = n1;
                triangles[t2] = n2;
                dirty[t1] = true;
                dirty[t2] = true;
                flipped += 1;
            }
        }

        flips += flipped;
        if flipped == 0 {
            log::debug!("triangulation settled after {} passes, {} flips", pass + 1, flips);
            return flips;
        }
    }

    log::debug!("flip pass cap {} reached after {} flips", max_passes, flips);
    flips
}

/// Triangles `(p, q, r1)` and `(q, p, r2)` share edge `p-q`. Returns the two
/// triangles over diagonal `r1-r2` if that flip is valid and worth it.
fn flip_gain(
    pts: &[Point2<Real>],
    p: usize,
    q: usize,
    r1: usize,
    r2: usize,
    threshold: Real,
) -> Option<([usize; 3], [usize; 3])> {
    let area_eps = threshold * threshold;
    let (pp, pq, p1, p2) = (&pts[p], &pts[q], &pts[r1], &pts[r2]);
    if triangle_area(pp, pq, p1) <= area_eps || triangle_area(pq, pp, p2) <= area_eps {
        return None;
    }
    // Quad p, r2, q, r1 is strictly convex iff both new triangles are anticlockwise
    if triangle_area(pp, p2, p1) <= area_eps || triangle_area(p2, pq, p1) <= area_eps {
        return None;
    }
    let before = min_angle(pp, pq, p1).min(min_angle(pq, pp, p2));
    let after = min_angle(pp, p2, p1).min(min_angle(p2, pq, p1));
    (after > before + threshold).then_some(([p, r2, r1], [r2, q, r1]))
}
