use bit_set::BitSet;

use crate::instance::{Instance, VertexId};

/** one color class: pairwise non-adjacent vertices, kept in insertion
order (the caller's iteration order). */
pub type ColorClass = Vec<VertexId>;

/** ISEQ: greedy sequential coloring of a candidate list.

Every vertex of `cands` is placed in the first class where it has no
neighbor; a new class is opened only while fewer than `k_max` classes
exist. Vertices fitting in no class are left uncolored. `cands` must be
given in COLOR-SORT order: the partition produced (and therefore the whole
exact search) is deterministic in that order. */
pub fn iseq(inst:&Instance, cands:&[VertexId], k_max:usize) -> Vec<ColorClass> {
    let mut classes:Vec<ColorClass> = Vec::new();
    let mut class_members:Vec<BitSet> = Vec::new();
    for &v in cands {
        let neighbors = inst.neighbors_bitset(v);
        let mut placed = false;
        for (c,members) in class_members.iter_mut().enumerate() {
            if members.intersection(neighbors).next().is_none() {
                members.insert(v);
                classes[c].push(v);
                placed = true;
                break;
            }
        }
        if !placed && classes.len() < k_max {
            let mut members = BitSet::with_capacity(inst.n());
            members.insert(v);
            class_members.push(members);
            classes.push(vec![v]);
        }
    }
    classes
}

/// number of vertices covered by the color classes
pub fn colored_count(classes:&[ColorClass]) -> usize {
    classes.iter().map(|c| c.len()).sum()
}

/// returns true iff every vertex of `cands` fits in at most k classes
pub fn is_k_partite(inst:&Instance, cands:&[VertexId], k:usize) -> bool {
    colored_count(&iseq(inst, cands, k)) == cands.len()
}
