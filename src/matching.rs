//! Exact minimum-weight perfect matching on a complete subgraph.
//!
//! Edmonds' weighted blossom algorithm with dual variables, O(k^3) in the
//! number of matched nodes. Costs are turned into positive gains
//! `heaviest + 1 - w`, so on a complete graph with an even node count every
//! maximum-gain matching is perfect and has minimum cost.

use crate::error::{Result, TspError};
use crate::graph::{Graph, NodeId};

const NONE: usize = usize::MAX;

/// Exact minimum-weight perfect matching on the complete subgraph induced
/// by `nodes`, using the original edge weights.
///
/// Pairs come back as `(lower, higher)` by position in `nodes`, in the
/// order of their first member. An odd node count has no perfect matching
/// and yields `InfeasibleInstance`.
pub fn min_weight_perfect_matching(
    graph: &Graph,
    nodes: &[NodeId],
) -> Result<Vec<(NodeId, NodeId)>> {
    let k = nodes.len();
    if k % 2 == 1 {
        return Err(TspError::InfeasibleInstance { nodes: k });
    }
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut edges = Vec::with_capacity(k * (k - 1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            edges.push((i, j, i64::from(graph.weight(nodes[i], nodes[j]))));
        }
    }
    let heaviest = edges.iter().map(|e| e.2).max().unwrap_or(0);
    for e in &mut edges {
        e.2 = heaviest + 1 - e.2;
    }

    let mate = Blossom::new(k, edges).solve()?;

    let mut pairs = Vec::with_capacity(k / 2);
    for (i, &j) in mate.iter().enumerate() {
        if j == NONE {
            return Err(TspError::InfeasibleInstance { nodes: k });
        }
        if i < j {
            pairs.push((nodes[i], nodes[j]));
        }
    }
    Ok(pairs)
}

/// Maximum-weight matching state.
///
/// Edge `e` has endpoints `2e` and `2e + 1`; `endpoint[p]` is the node at
/// endpoint `p` and `p ^ 1` is the opposite end. Indices `0..n` are
/// single nodes, `n..2n` are blossoms. Labels: 0 free, 1 outer (S),
/// 2 inner (T), 5 marked during a scan.
struct Blossom {
    n: usize,
    edges: Vec<(usize, usize, i64)>,
    endpoint: Vec<usize>,
    neighbend: Vec<Vec<usize>>,
    /// Remote endpoint of the matched edge, or `NONE`.
    mate: Vec<usize>,
    label: Vec<u8>,
    labelend: Vec<usize>,
    inblossom: Vec<usize>,
    parent: Vec<usize>,
    childs: Vec<Vec<usize>>,
    base: Vec<usize>,
    endps: Vec<Vec<usize>>,
    bestedge: Vec<usize>,
    bestedges: Vec<Option<Vec<usize>>>,
    unused: Vec<usize>,
    dual: Vec<i64>,
    allowedge: Vec<bool>,
    queue: Vec<usize>,
}

impl Blossom {
    fn new(n: usize, edges: Vec<(usize, usize, i64)>) -> Self {
        let maxweight = edges.iter().map(|e| e.2).max().unwrap_or(0).max(0);
        let endpoint = (0..2 * edges.len())
            .map(|p| {
                let (i, j, _) = edges[p / 2];
                if p % 2 == 0 {
                    i
                } else {
                    j
                }
            })
            .collect();
        let mut neighbend = vec![Vec::new(); n];
        for (k, &(i, j, _)) in edges.iter().enumerate() {
            neighbend[i].push(2 * k + 1);
            neighbend[j].push(2 * k);
        }
        let m = edges.len();

        Self {
            n,
            edges,
            endpoint,
            neighbend,
            mate: vec![NONE; n],
            label: vec![0; 2 * n],
            labelend: vec![NONE; 2 * n],
            inblossom: (0..n).collect(),
            parent: vec![NONE; 2 * n],
            childs: vec![Vec::new(); 2 * n],
            base: (0..n).chain(std::iter::repeat(NONE).take(n)).collect(),
            endps: vec![Vec::new(); 2 * n],
            bestedge: vec![NONE; 2 * n],
            bestedges: vec![None; 2 * n],
            unused: (n..2 * n).collect(),
            dual: std::iter::repeat(maxweight)
                .take(n)
                .chain(std::iter::repeat(0).take(n))
                .collect(),
            allowedge: vec![false; m],
            queue: Vec::new(),
        }
    }

    fn slack(&self, k: usize) -> i64 {
        let (i, j, w) = self.edges[k];
        self.dual[i] + self.dual[j] - 2 * w
    }

    fn leaves(&self, b: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![b];
        while let Some(t) = stack.pop() {
            if t < self.n {
                out.push(t);
            } else {
                stack.extend(self.childs[t].iter().rev());
            }
        }
        out
    }

    fn child_index(&self, b: usize, child: usize) -> Result<usize> {
        self.childs[b]
            .iter()
            .position(|&c| c == child)
            .ok_or(TspError::InfeasibleInstance { nodes: self.n })
    }

    fn assign_label(&mut self, w: usize, t: u8, p: usize) {
        let b = self.inblossom[w];
        self.label[w] = t;
        self.label[b] = t;
        self.labelend[w] = p;
        self.labelend[b] = p;
        self.bestedge[w] = NONE;
        self.bestedge[b] = NONE;
        if t == 1 {
            let leaves = self.leaves(b);
            self.queue.extend(leaves);
        } else if t == 2 {
            let mb = self.mate[self.base[b]];
            let next = self.endpoint[mb];
            self.assign_label(next, 1, mb ^ 1);
        }
    }

    /// Walks back from `v` and `w` along alternating paths. Returns the base
    /// of a new blossom, or `NONE` when the paths reach two free nodes.
    fn scan_blossom(&mut self, mut v: usize, mut w: usize) -> usize {
        let mut path = Vec::new();
        let mut base = NONE;
        while v != NONE || w != NONE {
            let mut b = self.inblossom[v];
            if self.label[b] & 4 != 0 {
                base = self.base[b];
                break;
            }
            path.push(b);
            self.label[b] = 5;
            if self.labelend[b] == NONE {
                v = NONE;
            } else {
                v = self.endpoint[self.labelend[b]];
                b = self.inblossom[v];
                v = self.endpoint[self.labelend[b]];
            }
            if w != NONE {
                std::mem::swap(&mut v, &mut w);
            }
        }
        for b in path {
            self.label[b] = 1;
        }
        base
    }

    fn add_blossom(&mut self, base: usize, k: usize) -> Result<()> {
        let (v, w, _) = self.edges[k];
        let bb = self.inblossom[base];
        let mut bv = self.inblossom[v];
        let mut bw = self.inblossom[w];
        let b = self
            .unused
            .pop()
            .ok_or(TspError::InfeasibleInstance { nodes: self.n })?;
        self.base[b] = base;
        self.parent[b] = NONE;
        self.parent[bb] = b;

        let mut path = Vec::new();
        let mut endps = Vec::new();
        while bv != bb {
            self.parent[bv] = b;
            path.push(bv);
            endps.push(self.labelend[bv]);
            bv = self.inblossom[self.endpoint[self.labelend[bv]]];
        }
        path.push(bb);
        path.reverse();
        endps.reverse();
        endps.push(2 * k);
        while bw != bb {
            self.parent[bw] = b;
            path.push(bw);
            endps.push(self.labelend[bw] ^ 1);
            bw = self.inblossom[self.endpoint[self.labelend[bw]]];
        }
        self.childs[b] = path.clone();
        self.endps[b] = endps;

        self.label[b] = 1;
        self.labelend[b] = self.labelend[bb];
        self.dual[b] = 0;
        for v in self.leaves(b) {
            if self.label[self.inblossom[v]] == 2 {
                self.queue.push(v);
            }
            self.inblossom[v] = b;
        }

        let mut bestedgeto = vec![NONE; 2 * self.n];
        for &bv in &path {
            let known = self.bestedges[bv].take();
            let lists: Vec<Vec<usize>> = match known {
                Some(list) => vec![list],
                None => self
                    .leaves(bv)
                    .into_iter()
                    .map(|v| self.neighbend[v].iter().map(|p| p / 2).collect())
                    .collect(),
            };
            for k in lists.into_iter().flatten() {
                let (i, j, _) = self.edges[k];
                let j = if self.inblossom[j] == b { i } else { j };
                let bj = self.inblossom[j];
                if bj != b
                    && self.label[bj] == 1
                    && (bestedgeto[bj] == NONE || self.slack(k) < self.slack(bestedgeto[bj]))
                {
                    bestedgeto[bj] = k;
                }
            }
            self.bestedge[bv] = NONE;
        }
        let best: Vec<usize> = bestedgeto.into_iter().filter(|&k| k != NONE).collect();
        self.bestedge[b] = NONE;
        for &k in &best {
            if self.bestedge[b] == NONE || self.slack(k) < self.slack(self.bestedge[b]) {
                self.bestedge[b] = k;
            }
        }
        self.bestedges[b] = Some(best);
        Ok(())
    }

    fn expand_blossom(&mut self, b: usize, endstage: bool) -> Result<()> {
        let childs = self.childs[b].clone();
        for &s in &childs {
            self.parent[s] = NONE;
            if s < self.n {
                self.inblossom[s] = s;
            } else if endstage && self.dual[s] == 0 {
                self.expand_blossom(s, endstage)?;
            } else {
                for v in self.leaves(s) {
                    self.inblossom[v] = s;
                }
            }
        }

        if !endstage && self.label[b] == 2 {
            // Relabel the children on the even-length path from the entry
            // child to the base.
            let len = childs.len() as isize;
            let at = |j: isize| j.rem_euclid(len) as usize;
            let endps = self.endps[b].clone();
            let entry = self.inblossom[self.endpoint[self.labelend[b] ^ 1]];
            let mut j = self.child_index(b, entry)? as isize;
            let (jstep, trick): (isize, isize) = if j & 1 != 0 {
                j -= len;
                (1, 0)
            } else {
                (-1, 1)
            };

            let mut p = self.labelend[b];
            while j != 0 {
                let q = endps[at(j - trick)];
                self.label[self.endpoint[p ^ 1]] = 0;
                self.label[self.endpoint[q ^ trick as usize ^ 1]] = 0;
                let next = self.endpoint[p ^ 1];
                self.assign_label(next, 2, p);
                self.allowedge[q / 2] = true;
                j += jstep;
                p = endps[at(j - trick)] ^ trick as usize;
                self.allowedge[p / 2] = true;
                j += jstep;
            }

            let bv = childs[at(j)];
            let e = self.endpoint[p ^ 1];
            self.label[e] = 2;
            self.label[bv] = 2;
            self.labelend[e] = p;
            self.labelend[bv] = p;
            self.bestedge[bv] = NONE;
            j += jstep;

            while childs[at(j)] != entry {
                let bv = childs[at(j)];
                j += jstep;
                if self.label[bv] == 1 {
                    continue;
                }
                let reached = self.leaves(bv).into_iter().find(|&v| self.label[v] != 0);
                if let Some(v) = reached {
                    self.label[v] = 0;
                    let m = self.endpoint[self.mate[self.base[bv]]];
                    self.label[m] = 0;
                    let end = self.labelend[v];
                    self.assign_label(v, 2, end);
                }
            }
        }

        self.label[b] = 0;
        self.labelend[b] = NONE;
        self.childs[b].clear();
        self.endps[b].clear();
        self.base[b] = NONE;
        self.bestedges[b] = None;
        self.bestedge[b] = NONE;
        self.unused.push(b);
        Ok(())
    }

    /// Swaps matched and unmatched edges inside `b` so that `v` becomes its
    /// base.
    fn augment_blossom(&mut self, b: usize, v: usize) -> Result<()> {
        let mut t = v;
        while self.parent[t] != b {
            t = self.parent[t];
        }
        if t >= self.n {
            self.augment_blossom(t, v)?;
        }

        let childs = self.childs[b].clone();
        let endps = self.endps[b].clone();
        let len = childs.len() as isize;
        let at = |j: isize| j.rem_euclid(len) as usize;
        let i = self.child_index(b, t)?;
        let mut j = i as isize;
        let (jstep, trick): (isize, isize) = if i & 1 != 0 {
            j -= len;
            (1, 0)
        } else {
            (-1, 1)
        };

        while j != 0 {
            j += jstep;
            let t = childs[at(j)];
            let p = endps[at(j - trick)] ^ trick as usize;
            if t >= self.n {
                let e = self.endpoint[p];
                self.augment_blossom(t, e)?;
            }
            j += jstep;
            let t = childs[at(j)];
            if t >= self.n {
                let e = self.endpoint[p ^ 1];
                self.augment_blossom(t, e)?;
            }
            let (a, z) = (self.endpoint[p], self.endpoint[p ^ 1]);
            self.mate[a] = p ^ 1;
            self.mate[z] = p;
        }

        self.childs[b].rotate_left(i);
        self.endps[b].rotate_left(i);
        self.base[b] = self.base[self.childs[b][0]];
        Ok(())
    }

    fn augment_matching(&mut self, k: usize) -> Result<()> {
        let (v, w, _) = self.edges[k];
        for (mut s, mut p) in [(v, 2 * k + 1), (w, 2 * k)] {
            loop {
                let bs = self.inblossom[s];
                if bs >= self.n {
                    self.augment_blossom(bs, s)?;
                }
                self.mate[s] = p;
                if self.labelend[bs] == NONE {
                    break;
                }
                let t = self.endpoint[self.labelend[bs]];
                let bt = self.inblossom[t];
                s = self.endpoint[self.labelend[bt]];
                let j = self.endpoint[self.labelend[bt] ^ 1];
                if bt >= self.n {
                    self.augment_blossom(bt, j)?;
                }
                self.mate[j] = self.labelend[bt];
                p = self.labelend[bt] ^ 1;
            }
        }
        Ok(())
    }

    /// Scans the queue of outer nodes for tight edges. Returns true once the
    /// matching has been augmented.
    fn grow(&mut self) -> Result<bool> {
        while let Some(v) = self.queue.pop() {
            for idx in 0..self.neighbend[v].len() {
                let p = self.neighbend[v][idx];
                let k = p / 2;
                let w = self.endpoint[p];
                if self.inblossom[v] == self.inblossom[w] {
                    continue;
                }
                let mut kslack = 0;
                if !self.allowedge[k] {
                    kslack = self.slack(k);
                    if kslack <= 0 {
                        self.allowedge[k] = true;
                    }
                }
                let bw = self.inblossom[w];
                if self.allowedge[k] {
                    if self.label[bw] == 0 {
                        self.assign_label(w, 2, p ^ 1);
                    } else if self.label[bw] == 1 {
                        let base = self.scan_blossom(v, w);
                        if base != NONE {
                            self.add_blossom(base, k)?;
                        } else {
                            self.augment_matching(k)?;
                            return Ok(true);
                        }
                    } else if self.label[w] == 0 {
                        self.label[w] = 2;
                        self.labelend[w] = p ^ 1;
                    }
                } else if self.label[bw] == 1 {
                    let b = self.inblossom[v];
                    if self.bestedge[b] == NONE || kslack < self.slack(self.bestedge[b]) {
                        self.bestedge[b] = k;
                    }
                } else if self.label[w] == 0
                    && (self.bestedge[w] == NONE || kslack < self.slack(self.bestedge[w]))
                {
                    self.bestedge[w] = k;
                }
            }
        }
        Ok(false)
    }

    /// Adjusts the duals by the largest safe step. Returns false when the
    /// outer node duals hit zero and no further augmentation exists.
    fn step_duals(&mut self) -> Result<bool> {
        let n = self.n;
        let mut kind = 1;
        let mut delta = self.dual[..n].iter().copied().min().unwrap_or(0);
        let mut edge = NONE;
        let mut blossom = NONE;

        for v in 0..n {
            if self.label[self.inblossom[v]] == 0 && self.bestedge[v] != NONE {
                let d = self.slack(self.bestedge[v]);
                if d < delta {
                    delta = d;
                    kind = 2;
                    edge = self.bestedge[v];
                }
            }
        }
        for b in 0..2 * n {
            if self.parent[b] == NONE && self.label[b] == 1 && self.bestedge[b] != NONE {
                // Slack between two outer nodes is even for integer weights.
                let d = self.slack(self.bestedge[b]) / 2;
                if d < delta {
                    delta = d;
                    kind = 3;
                    edge = self.bestedge[b];
                }
            }
        }
        for b in n..2 * n {
            if self.base[b] != NONE
                && self.parent[b] == NONE
                && self.label[b] == 2
                && self.dual[b] < delta
            {
                delta = self.dual[b];
                kind = 4;
                blossom = b;
            }
        }

        for v in 0..n {
            match self.label[self.inblossom[v]] {
                1 => self.dual[v] -= delta,
                2 => self.dual[v] += delta,
                _ => {}
            }
        }
        for b in n..2 * n {
            if self.base[b] != NONE && self.parent[b] == NONE {
                match self.label[b] {
                    1 => self.dual[b] += delta,
                    2 => self.dual[b] -= delta,
                    _ => {}
                }
            }
        }

        match kind {
            1 => return Ok(false),
            2 => {
                self.allowedge[edge] = true;
                let (i, j, _) = self.edges[edge];
                let outer = if self.label[self.inblossom[i]] == 0 { j } else { i };
                self.queue.push(outer);
            }
            3 => {
                self.allowedge[edge] = true;
                self.queue.push(self.edges[edge].0);
            }
            _ => self.expand_blossom(blossom, false)?,
        }
        Ok(true)
    }

    /// Runs one stage per augmentation and returns the mate of every node,
    /// `NONE` for unmatched ones.
    fn solve(mut self) -> Result<Vec<usize>> {
        let n = self.n;
        for _ in 0..n {
            self.label.fill(0);
            self.bestedge.fill(NONE);
            for b in n..2 * n {
                self.bestedges[b] = None;
            }
            self.allowedge.fill(false);
            self.queue.clear();
            for v in 0..n {
                if self.mate[v] == NONE && self.label[self.inblossom[v]] == 0 {
                    self.assign_label(v, 1, NONE);
                }
            }

            let augmented = loop {
                if self.grow()? {
                    break true;
                }
                if !self.step_duals()? {
                    break false;
                }
            };
            if !augmented {
                break;
            }

            for b in n..2 * n {
                if self.parent[b] == NONE
                    && self.base[b] != NONE
                    && self.label[b] == 1
                    && self.dual[b] == 0
                {
                    self.expand_blossom(b, true)?;
                }
            }
        }

        Ok(self
            .mate
            .iter()
            .map(|&p| if p == NONE { NONE } else { self.endpoint[p] })
            .collect())
    }
}
