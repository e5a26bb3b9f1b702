//! Disjoint-set forest over dense `usize` ids.
//!
//! The stitcher keeps one element per input face and merges two faces whenever one
//! of their half-edges is paired; the final partition becomes the output meshes.

/// Union-find with path halving and union by rank.
#[derive(Debug, Clone, Default)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    sets: usize,
}

impl DisjointSet {
    /// `len` singleton sets, one per id in `0..len`.
    pub fn new(len: usize) -> Self {
        DisjointSet {
            parent: (0..len).collect(),
            rank: vec![0; len],
            sets: len,
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint sets.
    pub const fn count(&self) -> usize {
        self.sets
    }

    /// Representative of the set containing `a`.
    pub fn find(&mut self, mut a: usize) -> usize {
        while self.parent[a] != a {
            self.parent[a] = self.parent[self.parent[a]];
            a = self.parent[a];
        }
        a
    }

    pub fn same_set(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Merge the sets containing `a` and `b`. Returns `false` if they were already one set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            },
        }
        self.sets -= 1;
        true
    }

    /// Dense set numbering.
    ///
    /// Returns `(index_set, set_size)`: `index_set[i]` is the set number of element `i`
    /// and `set_size[s]` the number of elements in set `s`. Sets are numbered in order
    /// of their lowest element.
    pub fn index_to_set(&mut self) -> (Vec<usize>, Vec<usize>) {
        let n = self.len();
        let mut root_to_set = vec![usize::MAX; n];
        let mut index_set = Vec::with_capacity(n);
        let mut set_size = Vec::with_capacity(self.sets);

        for i in 0..n {
            let root = self.find(i);
            if root_to_set[root] == usize::MAX {
                root_to_set[root] = set_size.len();
                set_size.push(0);
            }
            let set = root_to_set[root];
            index_set.push(set);
            set_size[set] += 1;
        }

        (index_set, set_size)
    }
}
