use bit_set::BitSet;
use ordered_float::OrderedFloat;

use crate::instance::{Instance, VertexId};

/** COLOR-SORT ordering of the vertices, fixed for a whole exact solve.

Vertices are sorted by decreasing degree, breaking ties by decreasing
neighborhood density and then by vertex id. Every candidate list handled by
the exact solver (and every ISEQ call) iterates in this order, which makes
the whole search deterministic. */
#[derive(Debug)]
pub struct ColorSortOrder {
    /// order[i]: vertex at position i
    order: Vec<VertexId>,
    /// rank[v]: position of vertex v in the ordering
    rank: Vec<usize>,
}

impl ColorSortOrder {

    /// computes the COLOR-SORT ordering of the instance
    pub fn new(inst:&Instance) -> Self {
        let order = color_sort(inst);
        let mut rank = vec![0 ; inst.n()];
        for (i,&v) in order.iter().enumerate() { rank[v] = i; }
        Self { order, rank }
    }

    /// the ordered vertices
    pub fn order(&self) -> &[VertexId] { &self.order }

    /// position of vertex v in the ordering
    pub fn rank(&self, v:VertexId) -> usize { self.rank[v] }

    /// sorts a vertex list in place by increasing rank
    pub fn sort_by_rank(&self, vertices:&mut Vec<VertexId>) {
        vertices.sort_by_key(|&v| self.rank[v]);
    }
}

/** COLOR-SORT: sorts the vertices by (degree desc, neighborhood density
desc, id asc). The density of v is |E(G[N(v)])| / C(d(v),2), and 0 when
d(v) < 2. */
pub fn color_sort(inst:&Instance) -> Vec<VertexId> {
    let density:Vec<OrderedFloat<f64>> = inst.vertices()
        .map(|v| OrderedFloat(neighborhood_density(inst, v))).collect();
    let mut order:Vec<VertexId> = inst.vertices().collect();
    order.sort_by(|&a,&b| inst.degree(b).cmp(&inst.degree(a))
        .then_with(|| density[b].cmp(&density[a]))
        .then_with(|| a.cmp(&b))
    );
    order
}

/// fraction of the pairs of neighbors of v that are themselves adjacent
fn neighborhood_density(inst:&Instance, v:VertexId) -> f64 {
    let d = inst.degree(v);
    if d < 2 { return 0.; }
    let mut sum_deg = 0; // ∑_{u ∈ N(v)} |N(u) ∩ N(v)| = 2 |E(G[N(v)])|
    for &u in inst.adj(v) {
        sum_deg += inst.neighbors_bitset(u)
            .intersection(inst.neighbors_bitset(v)).count();
    }
    (sum_deg as f64 / 2.) / ((d * (d-1) / 2) as f64)
}

/** runs a greedy algorithm to compute an initial clique (lower bound for
the exact search).

Vertices are scanned by decreasing degree; a vertex joins the clique iff it
is adjacent to every member. Once the clique holds 4 vertices, the vertices
not yet scanned are reordered after each addition, common neighbors of the
whole clique first (then degree, then id). */
pub fn greedy_clique(inst:&Instance) -> Vec<VertexId> {
    let mut order:Vec<VertexId> = inst.vertices().collect();
    order.sort_by(|&a,&b| inst.degree(b).cmp(&inst.degree(a)).then_with(|| a.cmp(&b)));
    let mut clique:Vec<VertexId> = Vec::new();
    let mut i = 0;
    while i < order.len() {
        let v = order[i];
        i += 1;
        if clique.iter().all(|&u| inst.are_adjacent(u,v)) {
            clique.push(v);
            if clique.len() >= 4 && i < order.len() {
                // common neighborhood of the current clique
                let mut common = inst.neighbors_bitset(clique[0]).clone();
                for &u in &clique[1..] {
                    common.intersect_with(inst.neighbors_bitset(u));
                }
                let mut tail = order.split_off(i);
                tail.sort_by(|&a,&b| common.contains(b).cmp(&common.contains(a))
                    .then_with(|| inst.degree(b).cmp(&inst.degree(a)))
                    .then_with(|| a.cmp(&b))
                );
                order.extend(tail);
            }
        }
    }
    clique
}
