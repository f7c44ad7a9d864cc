use crate::graph::{Graph, NodeId, Weight};

/// Minimum spanning tree of a complete graph by Prim's algorithm.
///
/// Grows from node 0. The cheapest crossing edge is taken each round, ties
/// to the lowest node id, and a node's parent only changes on a strictly
/// cheaper edge. Returns `(parent, child)` pairs in the order nodes joined.
pub fn minimum_spanning_tree(graph: &Graph) -> Vec<(NodeId, NodeId)> {
    let n = graph.node_count();
    if n < 2 {
        return Vec::new();
    }

    let mut in_tree = vec![false; n];
    let mut cheapest = vec![Weight::MAX; n];
    let mut parent = vec![0; n];
    let mut edges = Vec::with_capacity(n - 1);

    in_tree[0] = true;
    for (v, w) in graph.neighbours(0) {
        cheapest[v] = w;
    }

    for _ in 1..n {
        let mut next = None;
        let mut best = Weight::MAX;
        for v in 0..n {
            if !in_tree[v] && (next.is_none() || cheapest[v] < best) {
                best = cheapest[v];
                next = Some(v);
            }
        }
        let Some(u) = next else { break };

        in_tree[u] = true;
        edges.push((parent[u], u));

        for (v, w) in graph.neighbours(u) {
            if !in_tree[v] && w < cheapest[v] {
                cheapest[v] = w;
                parent[v] = u;
            }
        }
    }
    edges
}

/// Nodes of odd degree in `edges`, ascending.
pub fn odd_degree_nodes(n: usize, edges: &[(NodeId, NodeId)]) -> Vec<NodeId> {
    let mut degree = vec![0usize; n];
    for &(u, v) in edges {
        degree[u] += 1;
        degree[v] += 1;
    }
    (0..n).filter(|&v| degree[v] % 2 == 1).collect()
}
