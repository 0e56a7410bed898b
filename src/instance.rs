use bit_set::BitSet;
use thiserror::Error;

/** Vertex Id */
pub type VertexId = usize;

/// error raised when an edge list does not describe a simple undirected graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    /// an edge joins a vertex with itself
    #[error("self-loop on vertex {0}")]
    SelfLoop(VertexId),
    /// an edge endpoint is outside 0..n
    #[error("edge ({0},{1}): endpoint out of range (n = {2})")]
    VertexOutOfRange(VertexId, VertexId, usize),
}

/** models a Maximum Clique instance.

The graph is simple and undirected. Vertices are numbered 0..n-1 using the
identifiers given at construction, so a clique reported by a solver lives in
the caller's identifier space. The adjacency matrix is stored as one bitset
per vertex: the inner loops of the solvers (coloring, candidate-set
construction, clique checking) are all bitset intersections. */
#[derive(Debug)]
pub struct Instance {
    /// nb vertices
    n: usize,
    /// nb edges
    m: usize,
    /// edges of the graph
    edges: Vec<(VertexId,VertexId)>,
    /// adj_list[i]: list of vertices adjacent to i
    adj_list: Vec<Vec<VertexId>>,
    /// adj_matrix[i]: bitset of the neighbors of i
    adj_matrix: Vec<BitSet>,
}

impl Instance {

    /** builds an instance from an edge list. Parallel edges are merged.
    Fails if an edge is a self-loop or has an endpoint outside 0..n. */
    pub fn from_edges(n:usize, edges:&[(VertexId,VertexId)]) -> Result<Self, InstanceError> {
        let mut adj_matrix = vec![BitSet::with_capacity(n) ; n];
        for &(u,v) in edges {
            if u == v { return Err(InstanceError::SelfLoop(u)); }
            if u >= n || v >= n {
                return Err(InstanceError::VertexOutOfRange(u, v, n));
            }
            adj_matrix[u].insert(v);
            adj_matrix[v].insert(u);
        }
        let adj_list:Vec<Vec<VertexId>> = adj_matrix.iter()
            .map(|neighbors| neighbors.iter().collect()).collect();
        let mut m = 0;
        for l in &adj_list { // at the end: m = ∑ d(v)
            m += l.len();
        }
        m /= 2; // m = (∑ d(v)) / 2
        let edge_list = Self::build_edges(&adj_list);
        Ok(Self { n, m, edges:edge_list, adj_list, adj_matrix })
    }

    /// number of vertices
    pub fn n(&self) -> usize { self.n }

    /// number of edges
    pub fn nb_edges(&self) -> usize { self.m }

    /// iterator over the vertices
    pub fn vertices(&self) -> std::ops::Range<VertexId> { 0..self.n }

    /// list of vertices adjacent to vertex i
    pub fn adj(&self, i:VertexId) -> &[VertexId] { &self.adj_list[i] }

    /// bitset of the neighbors of vertex i
    pub fn neighbors_bitset(&self, i:VertexId) -> &BitSet { &self.adj_matrix[i] }

    /// degree of vertex i
    pub fn degree(&self, i:VertexId) -> usize { self.adj_list[i].len() }

    /// returns true iff a and b are adjacent, in O(1)
    pub fn are_adjacent(&self, a:VertexId, b:VertexId) -> bool {
        self.adj_matrix[a].contains(b)
    }

    /// edge list (each edge appears once, smaller endpoint first)
    pub fn edges(&self) -> &[(VertexId, VertexId)] { &self.edges }

    /// builds the edge list
    fn build_edges(adj_list:&[Vec<VertexId>]) -> Vec<(VertexId,VertexId)> {
        let mut res = Vec::new();
        for (i,l) in adj_list.iter().enumerate() {
            for j in l {
                if i < *j {
                    res.push((i,*j));
                }
            }
        }
        res
    }

    /// print statistics of the instance
    pub fn display_statistics(&self) {
        println!("\t{} \t vertices", self.n());
        println!("\t{} \t edges", self.nb_edges());
        if self.n() == 0 { return; }
        let degrees:Vec<usize> = self.vertices().map(|i| self.degree(i)).collect();
        println!("\t{} \t min degree", degrees.iter().min().unwrap());
        println!("\t{} \t max degree", degrees.iter().max().unwrap());
    }
}

/** returns true iff the given vertices induce a complete subgraph.
Empty and singleton sets are cliques. Duplicate or out-of-range vertices are
rejected. Each member is checked against the others with one bitset
inclusion test, so the order of the vertices is irrelevant. */
pub fn is_clique(inst:&Instance, vertices:&[VertexId]) -> bool {
    let mut members = BitSet::with_capacity(inst.n());
    for &v in vertices {
        if v >= inst.n() || members.contains(v) { return false; }
        members.insert(v);
    }
    for &v in vertices {
        let mut others = members.clone();
        others.remove(v);
        if !others.is_subset(inst.neighbors_bitset(v)) { return false; }
    }
    true
}


#[cfg(test)]
mod tests {
    use super::*;

    /// K3 on {0,1,2} plus the pendant vertex 3 attached to 2
    fn triangle_with_pendant() -> Instance {
        Instance::from_edges(4, &[(0,1),(0,2),(1,2),(2,3)]).unwrap()
    }

    #[test]
    fn test_build_instance() {
        let inst = triangle_with_pendant();
        assert_eq!(inst.n(), 4);
        assert_eq!(inst.nb_edges(), 4);
        assert_eq!(inst.adj(0), &[1,2]);
        assert_eq!(inst.degree(2), 3);
        assert_eq!(inst.degree(3), 1);
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let inst = triangle_with_pendant();
        for u in inst.vertices() {
            for v in inst.vertices() {
                assert_eq!(inst.are_adjacent(u,v), inst.are_adjacent(v,u));
            }
        }
        assert!(!inst.are_adjacent(0,0)); // no self-loop
    }

    #[test]
    fn test_parallel_edges_are_merged() {
        let inst = Instance::from_edges(3, &[(0,1),(1,0),(0,1),(1,2)]).unwrap();
        assert_eq!(inst.nb_edges(), 2);
        assert_eq!(inst.edges(), &[(0,1),(1,2)]);
    }

    #[test]
    fn test_rejects_self_loop() {
        let err = Instance::from_edges(3, &[(0,1),(2,2)]).unwrap_err();
        assert_eq!(err, InstanceError::SelfLoop(2));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = Instance::from_edges(3, &[(0,3)]).unwrap_err();
        assert_eq!(err, InstanceError::VertexOutOfRange(0,3,3));
    }

    #[test]
    fn test_is_clique() {
        let inst = triangle_with_pendant();
        assert!(is_clique(&inst, &[]));
        assert!(is_clique(&inst, &[3]));
        assert!(is_clique(&inst, &[0,1,2]));
        assert!(is_clique(&inst, &[2,3]));
        assert!(!is_clique(&inst, &[0,1,3]));
        assert!(!is_clique(&inst, &[0,1,2,3]));
    }

    #[test]
    fn test_is_clique_is_order_independent() {
        let inst = triangle_with_pendant();
        assert_eq!(is_clique(&inst, &[0,1,2]), is_clique(&inst, &[2,0,1]));
        assert_eq!(is_clique(&inst, &[1,3]), is_clique(&inst, &[3,1]));
    }

    #[test]
    fn test_is_clique_rejects_duplicates() {
        let inst = triangle_with_pendant();
        assert!(!is_clique(&inst, &[0,0]));
        assert!(!is_clique(&inst, &[0,1,1]));
    }
}
