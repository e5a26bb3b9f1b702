//! Open boundary extraction for half-edges the stitcher could not pair.

use crate::mesh::halfedge::HalfEdges;
use crate::union_find::DisjointSet;
use hashbrown::HashMap;
use std::collections::{BTreeMap, BTreeSet};

/// Undirected adjacency between the vertices of unpaired half-edges.
///
/// Kept in ordered maps so paths come out in the same order on every run.
#[derive(Debug, Clone, Default)]
pub(crate) struct OpenEdgeGraph {
    adjacency: BTreeMap<usize, BTreeSet<usize>>,
}

impl OpenEdgeGraph {
    pub fn build(halfedges: &HalfEdges) -> Self {
        let mut graph = OpenEdgeGraph::default();
        for (e, edge) in halfedges.edges.iter().enumerate() {
            if !edge.is_open() {
                continue;
            }
            let (a, b) = (halfedges.v1(e), halfedges.v2(e));
            if a == b {
                continue;
            }
            graph.adjacency.entry(a).or_default().insert(b);
            graph.adjacency.entry(b).or_default().insert(a);
        }
        graph
    }

    fn other_neighbour(&self, vert: usize, not: usize) -> usize {
        self.adjacency[&vert]
            .iter()
            .copied()
            .find(|&v| v != not)
            .unwrap_or(not)
    }

    /// The maximal chain through degree-2 vertices that contains the lowest vertex.
    /// A closed loop repeats its first vertex at the end.
    fn extract_path(&self) -> Option<Vec<usize>> {
        let (&init, neighbours) = self.adjacency.iter().next()?;
        let mut vert = init;
        let mut next = *neighbours.iter().next()?;

        // Walk backwards to an end of the chain
        loop {
            if self.adjacency[&vert].len() != 2 {
                break;
            }
            let prev = self.other_neighbour(vert, next);
            next = vert;
            vert = prev;
            if vert == init {
                break;
            }
        }

        let start = vert;
        let mut path = vec![vert, next];
        let (mut prev, mut vert) = (start, next);
        while vert != start && self.adjacency[&vert].len() == 2 {
            let following = self.other_neighbour(vert, prev);
            path.push(following);
            prev = vert;
            vert = following;
        }
        Some(path)
    }

    fn remove_path(&mut self, path: &[usize]) {
        for w in path.windows(2) {
            for (a, b) in [(w[0], w[1]), (w[1], w[0])] {
                if let Some(set) = self.adjacency.get_mut(&a) {
                    set.remove(&b);
                    if set.is_empty() {
                        self.adjacency.remove(&a);
                    }
                }
            }
        }
    }

    /// Decompose the graph into vertex chains, consuming it.
    pub fn into_paths(mut self) -> Vec<Vec<usize>> {
        let mut paths = Vec::new();
        while let Some(path) = self.extract_path() {
            self.remove_path(&path);
            paths.push(path);
        }
        paths
    }

    /// Decompose the graph into paths and group the paths that touch at a vertex.
    /// Each group is one boundary, listed in the order its first path was found.
    pub fn into_boundaries(self) -> Vec<Vec<Vec<usize>>> {
        let paths = self.into_paths();
        let mut touching = DisjointSet::new(paths.len());
        let mut owner: HashMap<usize, usize> = HashMap::new();
        for (i, path) in paths.iter().enumerate() {
            for &v in path {
                let first = *owner.entry(v).or_insert(i);
                touching.union(first, i);
            }
        }

        let mut slot: HashMap<usize, usize> = HashMap::new();
        let mut boundaries: Vec<Vec<Vec<usize>>> = Vec::new();
        for (i, path) in paths.into_iter().enumerate() {
            let root = touching.find(i);
            let next = boundaries.len();
            let b = *slot.entry(root).or_insert(next);
            if b == next {
                boundaries.push(Vec::new());
            }
            boundaries[b].push(path);
        }
        boundaries
    }
}
