//! Dense reachability index: transitive closure of the model's edge set.

/// `reachable(i, j)` is true iff a directed path of length >= 1 leads from
/// ordinal `i` to ordinal `j`. The diagonal is set only for nodes on a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityIndex {
    size: usize,
    matrix: Vec<bool>,
}

impl ReachabilityIndex {
    /// Build the closure of `edges` (pairs of ordinals) over `size` nodes.
    ///
    /// Equivalent to OR-ing the boolean powers A^1..A^size of the adjacency
    /// matrix; computed with Warshall's algorithm in O(size^3).
    pub fn build(size: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut matrix = vec![false; size * size];
        for (src, dest) in edges {
            if src < size && dest < size {
                matrix[src * size + dest] = true;
            }
        }

        for k in 0..size {
            for i in 0..size {
                if !matrix[i * size + k] {
                    continue;
                }
                for j in 0..size {
                    if matrix[k * size + j] {
                        matrix[i * size + j] = true;
                    }
                }
            }
        }

        Self { size, matrix }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// O(1) lookup. Out-of-range ordinals are unreachable.
    pub fn reachable(&self, src: usize, dest: usize) -> bool {
        src < self.size && dest < self.size && self.matrix[src * self.size + dest]
    }

    /// `reachable(a, b) && !reachable(b, a)`: acyclic upstream influence.
    pub fn strict_cause(&self, cause: usize, effect: usize) -> bool {
        self.reachable(cause, effect) && !self.reachable(effect, cause)
    }
}
