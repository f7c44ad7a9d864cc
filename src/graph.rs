//! Complete undirected weighted graph stored as a dense symmetric matrix.

use crate::error::{Result, TspError};

pub type NodeId = usize;
pub type Weight = u32;

/// Immutable complete graph on nodes `0..n`.
///
/// Every pair of distinct nodes has a strictly positive weight and
/// `weight(u, v) == weight(v, u)`. The diagonal is zero and never read by
/// the solvers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Graph {
    n: usize,
    weights: Vec<Weight>,
}

impl Graph {
    /// Builds a graph from its lower triangle: `rows[k][j]` is the weight of
    /// edge `(j, k)` for `j < k`.
    pub(crate) fn from_lower_triangle(rows: &[Vec<Weight>]) -> Self {
        let n = rows.len();
        let mut weights = vec![0; n * n];
        for (k, row) in rows.iter().enumerate() {
            for (j, &w) in row.iter().enumerate() {
                weights[k * n + j] = w;
                weights[j * n + k] = w;
            }
        }
        Self { n, weights }
    }

    /// Builds a graph from a full square matrix, checking symmetry and
    /// positivity. The diagonal is ignored.
    pub fn from_matrix(matrix: &[Vec<Weight>]) -> Result<Self> {
        let n = matrix.len();
        if let Some((u, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(TspError::InvalidConfig(format!(
                "row {u} has {} entries, expected {n}",
                row.len()
            )));
        }
        let mut weights = vec![0; n * n];
        for (u, row) in matrix.iter().enumerate() {
            for (v, &w) in row.iter().enumerate() {
                if u == v {
                    continue;
                }
                if w == 0 {
                    return Err(TspError::InvalidConfig(format!(
                        "edge ({u}, {v}) has zero weight"
                    )));
                }
                if matrix[v][u] != w {
                    return Err(TspError::InvalidConfig(format!(
                        "edge ({u}, {v}) is not symmetric: {w} vs {}",
                        matrix[v][u]
                    )));
                }
                weights[u * n + v] = w;
            }
        }
        Ok(Self { n, weights })
    }

    /// Builds a graph on `n` nodes from an undirected edge list. Every
    /// unordered pair must appear exactly once.
    pub fn from_edges(n: usize, edges: &[(NodeId, NodeId, Weight)]) -> Result<Self> {
        let mut weights = vec![0; n * n];
        for &(u, v, w) in edges {
            if u >= n || v >= n || u == v {
                return Err(TspError::InvalidConfig(format!(
                    "edge ({u}, {v}) is not a pair of distinct nodes below {n}"
                )));
            }
            if w == 0 {
                return Err(TspError::InvalidConfig(format!(
                    "edge ({u}, {v}) has zero weight"
                )));
            }
            if weights[u * n + v] != 0 {
                return Err(TspError::InvalidConfig(format!(
                    "edge ({u}, {v}) given twice"
                )));
            }
            weights[u * n + v] = w;
            weights[v * n + u] = w;
        }
        for u in 0..n {
            for v in (u + 1)..n {
                if weights[u * n + v] == 0 {
                    return Err(TspError::InvalidConfig(format!(
                        "edge ({u}, {v}) is missing"
                    )));
                }
            }
        }
        Ok(Self { n, weights })
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn nodes(&self) -> std::ops::Range<NodeId> {
        0..self.n
    }

    /// Weight of edge `(u, v)`. Panics if either node is out of range.
    #[inline]
    pub fn weight(&self, u: NodeId, v: NodeId) -> Weight {
        assert!(u < self.n && v < self.n, "node out of range");
        self.weights[u * self.n + v]
    }

    /// Neighbours of `u` with their edge weights, in ascending node id order.
    pub fn neighbours(&self, u: NodeId) -> impl Iterator<Item = (NodeId, Weight)> + '_ {
        let row = &self.weights[u * self.n..(u + 1) * self.n];
        row.iter()
            .enumerate()
            .filter(move |&(v, _)| v != u)
            .map(|(v, &w)| (v, w))
    }

    /// Weight of the closed cycle through `cycle`, including the edge from
    /// the last node back to the first. `cycle` must not repeat its start.
    pub fn cycle_weight(&self, cycle: &[NodeId]) -> u64 {
        if cycle.len() < 2 {
            return 0;
        }
        let open: u64 = cycle
            .windows(2)
            .map(|w| u64::from(self.weight(w[0], w[1])))
            .sum();
        open + u64::from(self.weight(cycle[cycle.len() - 1], cycle[0]))
    }

    /// Weight of an explicitly closed tour, one that already ends with its
    /// starting node.
    pub fn tour_weight(&self, tour: &[NodeId]) -> u64 {
        tour.windows(2)
            .map(|w| u64::from(self.weight(w[0], w[1])))
            .sum()
    }

    /// First triple `(a, b, c)` with `w(a,b) + w(b,c) < w(a,c)`, if any.
    pub fn triangle_violation(&self) -> Option<(NodeId, NodeId, NodeId)> {
        for a in 0..self.n {
            for b in 0..self.n {
                if b == a {
                    continue;
                }
                for c in 0..self.n {
                    if c == a || c == b {
                        continue;
                    }
                    let detour = u64::from(self.weight(a, b)) + u64::from(self.weight(b, c));
                    if detour < u64::from(self.weight(a, c)) {
                        return Some((a, b, c));
                    }
                }
            }
        }
        None
    }

    pub fn is_metric(&self) -> bool {
        self.triangle_violation().is_none()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Four-node metric instance used across solver tests. Its optimal tour
    /// weight is 11.
    pub(crate) fn square() -> Graph {
        Graph::from_edges(
            4,
            &[
                (0, 1, 2),
                (0, 2, 3),
                (0, 3, 4),
                (1, 2, 5),
                (1, 3, 4),
                (2, 3, 2),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_square_is_metric() {
        let g = square();
        assert_eq!(g.node_count(), 4);
        assert!(g.is_metric());
        assert_eq!(g.weight(3, 2), 2);
        assert_eq!(g.weight(2, 3), 2);
    }

    #[test]
    fn test_neighbours_ascending() {
        let g = square();
        let ns: Vec<_> = g.neighbours(2).collect();
        assert_eq!(ns, vec![(0, 3), (1, 5), (3, 2)]);
    }

    #[test]
    fn test_cycle_and_tour_weight_agree() {
        let g = square();
        assert_eq!(g.cycle_weight(&[0, 1, 3, 2]), 11);
        assert_eq!(g.tour_weight(&[0, 1, 3, 2, 0]), 11);
        assert_eq!(g.cycle_weight(&[0, 1, 2, 3]), 13);
    }

    #[test]
    fn test_violation_detected() {
        let g = Graph::from_edges(3, &[(0, 1, 1), (1, 2, 1), (0, 2, 5)]).unwrap();
        assert!(!g.is_metric());
        let (a, b, c) = g.triangle_violation().unwrap();
        assert!(g.weight(a, b) + g.weight(b, c) < g.weight(a, c));
    }

    #[test]
    fn test_from_edges_rejects_missing_edge() {
        let err = Graph::from_edges(3, &[(0, 1, 1), (1, 2, 1)]).unwrap_err();
        assert!(matches!(err, TspError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_matrix_rejects_asymmetry() {
        let m = vec![vec![0, 1, 2], vec![1, 0, 3], vec![2, 4, 0]];
        assert!(Graph::from_matrix(&m).is_err());

        let ragged = vec![vec![0, 1, 2], vec![1, 0, 3], vec![2]];
        assert!(matches!(
            Graph::from_matrix(&ragged),
            Err(TspError::InvalidConfig(_))
        ));

        let m = vec![vec![0, 1, 2], vec![1, 0, 3], vec![2, 3, 0]];
        let g = Graph::from_matrix(&m).unwrap();
        assert_eq!(g.weight(2, 1), 3);
    }

    #[test]
    fn test_lower_triangle_is_symmetric() {
        let rows = vec![vec![], vec![4], vec![2, 3]];
        let g = Graph::from_lower_triangle(&rows);
        assert_eq!(g.weight(0, 1), 4);
        assert_eq!(g.weight(1, 0), 4);
        assert_eq!(g.weight(0, 2), 2);
        assert_eq!(g.weight(2, 1), 3);
    }
}
