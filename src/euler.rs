use crate::error::{Result, TspError};
use crate::graph::NodeId;

/// Undirected multigraph kept as an edge list. Parallel edges are distinct
/// entries.
#[derive(Debug, Clone, Default)]
pub struct MultiGraph {
    n: usize,
    edges: Vec<(NodeId, NodeId)>,
}

impl MultiGraph {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            edges: Vec::new(),
        }
    }

    pub fn add_edge(&mut self, u: NodeId, v: NodeId) {
        self.edges.push((u, v));
    }

    pub fn extend<I: IntoIterator<Item = (NodeId, NodeId)>>(&mut self, edges: I) {
        self.edges.extend(edges);
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn degree(&self, v: NodeId) -> usize {
        self.edges
            .iter()
            .map(|&(a, b)| usize::from(a == v) + usize::from(b == v))
            .sum()
    }

    /// Eulerian circuit from `start` by Hierholzer's algorithm, as the
    /// sequence of visited nodes. The first and last entries are `start`.
    ///
    /// Incident edges are taken in insertion order. Fails with
    /// [`TspError::InfeasibleInstance`] when a node has odd degree or some
    /// edge is unreachable from `start`.
    pub fn eulerian_circuit(&self, start: NodeId) -> Result<Vec<NodeId>> {
        let infeasible = TspError::InfeasibleInstance { nodes: self.n };
        if start >= self.n {
            return Err(infeasible);
        }

        let mut incident: Vec<Vec<usize>> = vec![Vec::new(); self.n];
        for (e, &(u, v)) in self.edges.iter().enumerate() {
            incident[u].push(e);
            if v != u {
                incident[v].push(e);
            }
        }
        if (0..self.n).any(|v| self.degree(v) % 2 == 1) {
            return Err(infeasible);
        }

        let mut used = vec![false; self.edges.len()];
        let mut cursor = vec![0usize; self.n];
        let mut stack = vec![start];
        let mut circuit = Vec::with_capacity(self.edges.len() + 1);

        while let Some(&v) = stack.last() {
            let adj = &incident[v];
            while cursor[v] < adj.len() && used[adj[cursor[v]]] {
                cursor[v] += 1;
            }
            match adj.get(cursor[v]) {
                Some(&e) => {
                    used[e] = true;
                    let (a, b) = self.edges[e];
                    stack.push(if a == v { b } else { a });
                }
                None => {
                    stack.pop();
                    circuit.push(v);
                }
            }
        }

        if used.iter().any(|&u| !u) {
            return Err(infeasible);
        }
        circuit.reverse();
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_circuit(g: &MultiGraph, circuit: &[NodeId]) {
        assert_eq!(circuit.len(), g.edge_count() + 1);
        assert_eq!(circuit.first(), circuit.last());
        let mut remaining = g.edges.clone();
        for w in circuit.windows(2) {
            let idx = remaining
                .iter()
                .position(|&(a, b)| (a, b) == (w[0], w[1]) || (a, b) == (w[1], w[0]))
                .expect("step along a missing edge");
            remaining.swap_remove(idx);
        }
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_square_with_chord() {
        let mut g = MultiGraph::new(4);
        g.extend([(0, 1), (0, 2), (2, 3), (1, 3)]);
        let circuit = g.eulerian_circuit(0).unwrap();
        assert_eq!(circuit, vec![0, 1, 3, 2, 0]);
    }

    #[test]
    fn test_parallel_edges() {
        let mut g = MultiGraph::new(2);
        g.add_edge(0, 1);
        g.add_edge(0, 1);
        assert_eq!(g.degree(0), 2);
        assert_eq!(g.eulerian_circuit(0).unwrap(), vec![0, 1, 0]);
    }

    #[test]
    fn test_bowtie() {
        let mut g = MultiGraph::new(5);
        g.extend([(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2)]);
        let circuit = g.eulerian_circuit(0).unwrap();
        assert_circuit(&g, &circuit);
        assert_eq!(circuit[0], 0);
    }

    #[test]
    fn test_odd_degree_rejected() {
        let mut g = MultiGraph::new(3);
        g.extend([(0, 1), (1, 2)]);
        assert!(g.eulerian_circuit(0).is_err());
    }

    #[test]
    fn test_disconnected_rejected() {
        let mut g = MultiGraph::new(4);
        g.extend([(0, 1), (0, 1), (2, 3), (2, 3)]);
        assert_eq!(
            g.eulerian_circuit(0),
            Err(TspError::InfeasibleInstance { nodes: 4 })
        );
    }
}
