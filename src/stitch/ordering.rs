//! Angular ordering of the half-edges around a non-manifold edge.
//!
//! Every half-edge incident to the undirected edge `(v1, v2)` contributes the
//! direction its face sweeps away from the edge: the face normal for half-edges
//! running `v1 -> v2`, the negated normal for those running `v2 -> v1`. These
//! directions are ordered anticlockwise about the axis pointing from `v2` to `v1`,
//! which places each forward half-edge directly before the reverse half-edge that
//! bounds the same solid wedge.

use crate::float_types::{PI, Real, TAU};
use crate::geom3d::anticlockwise_angle;
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EdgeOrderData {
    pub edge: usize,
    /// Face group the edge belonged to when ordering started
    pub group_id: usize,
    /// `true` for half-edges running `v2 -> v1`
    pub is_reversed: bool,
    pub face_dir: Vector3<Real>,
}

impl EdgeOrderData {
    pub fn new(edge: usize, group_id: usize, is_reversed: bool, normal: Vector3<Real>) -> Self {
        EdgeOrderData {
            edge,
            group_id,
            is_reversed,
            face_dir: if is_reversed { -normal } else { normal },
        }
    }
}

/// Sorts [`EdgeOrderData`] around the edge direction `v2 - v1`, starting from `base_dir`.
pub(crate) struct EdgeOrderCmp {
    axis: Vector3<Real>,
    base_dir: Vector3<Real>,
    tolerance: Real,
}

impl EdgeOrderCmp {
    pub fn new(edge_dir: Vector3<Real>, base_dir: Vector3<Real>, tolerance: Real) -> Self {
        EdgeOrderCmp {
            axis: -edge_dir,
            base_dir,
            tolerance,
        }
    }

    /// Angle of `dir` from the base direction, snapped to 0 near a full turn.
    fn angle(&self, dir: &Vector3<Real>) -> Real {
        let angle = anticlockwise_angle(&self.base_dir, dir, &self.axis);
        if angle >= TAU - self.tolerance { 0.0 } else { angle }
    }

    /// The turn from `a` to `b` about the axis must agree with the measured angular gap.
    /// Gaps within tolerance of half a turn carry no usable sign.
    fn consistent_step(&self, gap: Real, a: &Vector3<Real>, b: &Vector3<Real>) -> bool {
        if (gap - PI).abs() <= self.tolerance {
            return true;
        }
        let turn = a.cross(b).dot(&self.axis);
        if gap < PI { turn > 0.0 } else { turn < 0.0 }
    }

    /// Order `entries` cyclically. Directions closer than the tolerance tie, and ties
    /// put reversed half-edges first, then lower group ids, then lower edge ids.
    ///
    /// Returns `None` when no consistent order exists: a direction is undefined, or
    /// a measured angle contradicts the orientation of its neighbours.
    pub fn sort(&self, entries: Vec<EdgeOrderData>) -> Option<Vec<EdgeOrderData>> {
        let mut keyed: Vec<(Real, EdgeOrderData)> = entries
            .into_iter()
            .map(|entry| (self.angle(&entry.face_dir), entry))
            .collect();
        if keyed.iter().any(|(angle, _)| !angle.is_finite()) {
            return None;
        }
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Cluster angles within tolerance into ranks
        let mut ranked: Vec<(usize, EdgeOrderData)> = Vec::with_capacity(keyed.len());
        let mut rank = 0;
        for i in 0..keyed.len() {
            let gap = if i > 0 { keyed[i].0 - keyed[i - 1].0 } else { 0.0 };
            if gap > self.tolerance {
                rank += 1;
                if !self.consistent_step(gap, &keyed[i - 1].1.face_dir, &keyed[i].1.face_dir) {
                    return None;
                }
            }
            ranked.push((rank, keyed[i].1));
        }

        ranked.sort_by(|(ra, a), (rb, b)| {
            ra.cmp(rb)
                .then(b.is_reversed.cmp(&a.is_reversed))
                .then(a.group_id.cmp(&b.group_id))
                .then(a.edge.cmp(&b.edge))
        });
        Some(ranked.into_iter().map(|(_, entry)| entry).collect())
    }
}

/// Pair forward half-edges with the reverse half-edge that follows them in the
/// cyclic order. Matched couples are removed and the remainder is scanned again
/// until no forward half-edge is followed by a reverse one.
///
/// Returns `(forward edge, reverse edge)` pairs.
pub(crate) fn match_ordered_edges(ring: &[EdgeOrderData]) -> Vec<(usize, usize)> {
    let mut ring = ring.to_vec();
    let mut pairs = Vec::new();
    loop {
        let n = ring.len();
        if n < 2 {
            break;
        }
        let mut matched = vec![false; n];
        let mut found = false;
        for i in 0..n {
            let j = (i + 1) % n;
            if !ring[i].is_reversed && ring[j].is_reversed && !matched[i] && !matched[j] {
                pairs.push((ring[i].edge, ring[j].edge));
                matched[i] = true;
                matched[j] = true;
                found = true;
            }
        }
        if !found {
            break;
        }
        ring = ring
            .into_iter()
            .zip(matched)
            .filter_map(|(entry, m)| (!m).then_some(entry))
            .collect();
    }
    pairs
}
