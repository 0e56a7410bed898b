use std::time::Instant;

use bit_set::BitSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dogs::search_algorithm::{NeverStoppingCriterion, StoppingCriterion, TimeStoppingCriterion};

use crate::instance::{is_clique, Instance, VertexId};
use crate::result::{CliqueResult, GraspStats};

/** parameters of the GRASP metaheuristic */
#[derive(Debug, Clone)]
pub struct GraspParams {
    /// greediness of the construction (0: purely greedy, 1: purely random)
    pub alpha: f64,
    /// maximum number of iterations
    pub max_iterations: usize,
    /// wall-clock budget in seconds (None: no limit)
    pub time_limit: Option<f32>,
    /// stop after this many iterations without improving the incumbent
    pub max_no_improvement: usize,
    /// nb consecutive local-search cycles allowed without a size gain
    pub local_search_intensity: usize,
    /// rng seed; identical seeds reproduce the solve exactly
    pub seed: Option<u64>,
    /// print incumbent improvements on stdout
    pub verbose: bool,
}

impl Default for GraspParams {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            max_iterations: 1000,
            time_limit: Some(300.),
            max_no_improvement: 100,
            local_search_intensity: 3,
            seed: None,
            verbose: false,
        }
    }
}

/// state of one GRASP solve
struct GraspSearch<'a> {
    /// instance to solve
    inst: &'a Instance,
    /// rng owned by this solve (never a process-global source)
    rng: StdRng,
    /// greediness of the construction
    alpha: f64,
    /// local-search stagnation cap
    intensity: usize,
}

impl<'a> GraspSearch<'a> {

    /** greedy randomized construction. The candidate set is kept adjacent
    to every clique member, so each remaining candidate is valid; the next
    member is drawn uniformly from the restricted candidate list of the
    best-scored candidates. */
    fn construct(&mut self) -> Vec<VertexId> {
        let mut clique:Vec<VertexId> = Vec::new();
        let mut candidates = BitSet::with_capacity(self.inst.n());
        for v in self.inst.vertices() { candidates.insert(v); }
        loop {
            let valid:Vec<VertexId> = candidates.iter().collect();
            if valid.is_empty() { break; }
            // effective degree: adjacency restricted to the candidate set
            let degrees:Vec<usize> = valid.iter()
                .map(|&v| self.inst.neighbors_bitset(v).intersection(&candidates).count())
                .collect();
            let d_max = *degrees.iter().max().unwrap();
            let d_min = *degrees.iter().min().unwrap();
            // α interpolates the entry threshold between pure greedy
            // (τ = d_max) and pure random (τ = d_min)
            let tau = d_max as f64 - self.alpha * ((d_max - d_min) as f64);
            let rcl:Vec<VertexId> = valid.iter().enumerate()
                .filter(|(i,_)| degrees[*i] as f64 >= tau)
                .map(|(_,&v)| v)
                .collect();
            let selected = rcl[self.rng.gen_range(0..rcl.len())];
            clique.push(selected);
            candidates.remove(selected);
            candidates.intersect_with(self.inst.neighbors_bitset(selected));
        }
        clique
    }

    /// ADD: first vertex (in id order) adjacent to the whole clique
    fn operator_add(&self, clique:&[VertexId]) -> Option<VertexId> {
        let mut members = BitSet::with_capacity(self.inst.n());
        for &u in clique { members.insert(u); }
        self.inst.vertices().find(|&v| {
            !members.contains(v) && clique.iter().all(|&u| self.inst.are_adjacent(u, v))
        })
    }

    /** SWAP: first exchange of a member for an outsider that keeps the set
    a clique. The size is unchanged; swapping moves the search to a
    different basin, from which ADD may succeed. */
    fn operator_swap(&self, clique:&[VertexId]) -> Option<Vec<VertexId>> {
        if clique.len() <= 1 { return None; }
        let mut members = BitSet::with_capacity(self.inst.n());
        for &u in clique { members.insert(u); }
        for i in 0..clique.len() {
            for v_in in self.inst.vertices() {
                if members.contains(v_in) { continue; }
                let fits = clique.iter().enumerate()
                    .all(|(j,&u)| j == i || self.inst.are_adjacent(u, v_in));
                if fits {
                    let mut swapped = clique.to_vec();
                    swapped[i] = v_in;
                    debug_assert!(is_clique(self.inst, &swapped));
                    return Some(swapped);
                }
            }
        }
        None
    }

    /** REMOVE-ADD: drops one member at a time and greedily re-expands the
    rest; the best strictly-larger expansion wins. */
    fn operator_remove_add(&self, clique:&[VertexId]) -> Vec<VertexId> {
        let mut best = clique.to_vec();
        if clique.len() <= 1 { return best; }
        for i in 0..clique.len() {
            let mut reduced = clique.to_vec();
            reduced.remove(i);
            let expanded = self.greedy_expansion(reduced);
            if expanded.len() > best.len() { best = expanded; }
        }
        best
    }

    /** repeatedly adds the feasible candidate with the highest effective
    degree (ties: smallest id) until no candidate remains. */
    fn greedy_expansion(&self, mut clique:Vec<VertexId>) -> Vec<VertexId> {
        let mut candidates = BitSet::with_capacity(self.inst.n());
        for v in self.inst.vertices() { candidates.insert(v); }
        for &u in &clique { candidates.intersect_with(self.inst.neighbors_bitset(u)); }
        while !candidates.is_empty() {
            let v = candidates.iter()
                .max_by(|&a,&b| {
                    let deg_a = self.inst.neighbors_bitset(a).intersection(&candidates).count();
                    let deg_b = self.inst.neighbors_bitset(b).intersection(&candidates).count();
                    deg_a.cmp(&deg_b).then_with(|| b.cmp(&a))
                }).unwrap();
            clique.push(v);
            candidates.remove(v);
            candidates.intersect_with(self.inst.neighbors_bitset(v));
        }
        clique
    }

    /** local search: ADD, SWAP and REMOVE-ADD applied in this order; a
    cycle without a strict size gain counts towards the stagnation cap. */
    fn local_search(&mut self, initial:Vec<VertexId>) -> Vec<VertexId> {
        let mut current = initial;
        let mut stalled = 0;
        while stalled < self.intensity {
            let mut improved = false;
            if let Some(v) = self.operator_add(&current) {
                current.push(v);
                improved = true;
            } else {
                if let Some(swapped) = self.operator_swap(&current) {
                    // a sideways move is kept only when ADD turns it into a
                    // strictly larger clique
                    let mut attempt = swapped;
                    while let Some(v) = self.operator_add(&attempt) { attempt.push(v); }
                    if attempt.len() > current.len() {
                        current = attempt;
                        improved = true;
                    }
                }
                if !improved {
                    let expanded = self.operator_remove_add(&current);
                    if expanded.len() > current.len() {
                        current = expanded;
                        improved = true;
                    }
                }
            }
            if improved { stalled = 0; } else { stalled += 1; }
        }
        current
    }
}

/** runs the GRASP metaheuristic with an explicit stopping criterion.

Each iteration builds a randomized greedy clique and drives it to a local
optimum; the incumbent is the largest local optimum seen. The solve stops
at `max_iterations`, at `max_no_improvement` stagnating iterations, or when
the stopping criterion fires. `is_optimal` is always false. */
pub fn grasp<Stopping:StoppingCriterion>(inst:&Instance, params:&GraspParams, stop:Stopping)
    -> (CliqueResult, GraspStats) {
    let t_start = Instant::now();
    let rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut search = GraspSearch {
        inst,
        rng,
        alpha: params.alpha,
        intensity: params.local_search_intensity,
    };
    let mut stats = GraspStats::default();
    let mut best:Vec<VertexId> = Vec::new();
    let mut iteration = 0;
    let mut no_improve = 0;
    while iteration < params.max_iterations
        && no_improve < params.max_no_improvement
        && !stop.is_finished() {
        let constructed = search.construct();
        let improved = search.local_search(constructed);
        iteration += 1;
        stats.clique_sizes_history.push(improved.len());
        if improved.len() > best.len() {
            debug_assert!(is_clique(inst, &improved));
            best = improved;
            stats.best_iteration = iteration;
            stats.improvements_found += 1;
            no_improve = 0;
            if params.verbose {
                println!("iteration {} \t new best clique! ({})", iteration, best.len());
            }
        } else {
            no_improve += 1;
        }
    }
    stats.total_iterations = iteration;
    let elapsed = t_start.elapsed().as_secs_f32();
    debug_assert!(is_clique(inst, &best));
    (CliqueResult::new(best, elapsed, false, Some(iteration)), stats)
}

/// runs the metaheuristic, taking the wall-clock budget from the parameters
pub fn solve_grasp(inst:&Instance, params:&GraspParams) -> (CliqueResult, GraspStats) {
    match params.time_limit {
        Some(t) => grasp(inst, params, TimeStoppingCriterion::new(t)),
        None => grasp(inst, params, NeverStoppingCriterion::default()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn k4_with_pendant() -> Instance {
        Instance::from_edges(5,
            &[(0,1),(0,2),(0,3),(1,2),(1,3),(2,3),(4,0),(4,1)]).unwrap()
    }

    fn seeded(seed:u64) -> GraspParams {
        GraspParams { seed: Some(seed), ..Default::default() }
    }

    #[test]
    fn test_finds_the_k4_greedily() {
        let inst = k4_with_pendant();
        let params = GraspParams { alpha: 0., max_iterations: 10, ..seeded(1) };
        let (res, _) = solve_grasp(&inst, &params);
        assert_eq!(res.size, 4);
        assert!(!res.is_optimal);
        assert!(is_clique(&inst, &res.clique));
    }

    #[test]
    fn test_complete_graph_first_iteration() {
        let mut edges = Vec::new();
        for u in 0..5 {
            for v in (u+1)..5 { edges.push((u,v)); }
        }
        let inst = Instance::from_edges(5, &edges).unwrap();
        for &alpha in &[0., 0.5, 1.] {
            let params = GraspParams { alpha, max_iterations: 1, ..seeded(3) };
            let (res, stats) = solve_grasp(&inst, &params);
            assert_eq!(res.size, 5);
            assert_eq!(stats.best_iteration, 1);
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let inst = k4_with_pendant();
        let params = GraspParams { alpha: 0.7, max_iterations: 25, ..seeded(99) };
        let (res1, stats1) = solve_grasp(&inst, &params);
        let (res2, stats2) = solve_grasp(&inst, &params);
        assert_eq!(res1.clique, res2.clique);
        assert_eq!(stats1, stats2);
    }

    #[test]
    fn test_planted_clique_is_found() {
        // planted K6 on {0..5}, every other pair present with probability 0.4
        let mut rng = StdRng::seed_from_u64(98765);
        let mut edges = Vec::new();
        for u in 0..20 {
            for v in (u+1)..20 {
                if v < 6 || rng.gen_bool(0.4) { edges.push((u,v)); }
            }
        }
        let inst = Instance::from_edges(20, &edges).unwrap();
        let params = GraspParams { alpha: 0.3, max_iterations: 50, ..seeded(7) };
        let (res, _) = solve_grasp(&inst, &params);
        assert!(res.size >= 5);
        assert!(is_clique(&inst, &res.clique));
    }

    #[test]
    fn test_local_search_escapes_a_poor_start() {
        // K3 on {2,3,4}; vertex 0 only sees 1, vertex 1 sees 0 and the K3
        let inst = Instance::from_edges(5,
            &[(0,1),(1,2),(1,3),(1,4),(2,3),(2,4),(3,4)]).unwrap();
        let mut search = GraspSearch {
            inst: &inst,
            rng: StdRng::seed_from_u64(0),
            alpha: 0.,
            intensity: 3,
        };
        // from {0,1}, ADD is stuck; SWAP trades 0 for a K3 member and ADD
        // then completes the K4 around vertex 1
        let improved = search.local_search(vec![0,1]);
        assert_eq!(improved.len(), 4);
        assert!(is_clique(&inst, &improved));
    }

    #[test]
    fn test_stagnation_stops_the_search() {
        let inst = k4_with_pendant();
        let params = GraspParams {
            alpha: 0.,
            max_iterations: 1000,
            max_no_improvement: 5,
            ..seeded(2)
        };
        let (res, stats) = solve_grasp(&inst, &params);
        assert_eq!(res.size, 4);
        // first iteration improves, then 5 stagnating iterations
        assert_eq!(stats.total_iterations, 6);
        assert_eq!(res.iterations, Some(6));
    }

    #[test]
    fn test_history_tracks_every_iteration() {
        let inst = k4_with_pendant();
        let params = GraspParams { max_iterations: 8, max_no_improvement: 100, ..seeded(5) };
        let (_, stats) = solve_grasp(&inst, &params);
        assert_eq!(stats.clique_sizes_history.len(), stats.total_iterations);
        assert!(stats.total_iterations <= 8);
    }

    #[test]
    fn test_empty_instance() {
        let inst = Instance::from_edges(0, &[]).unwrap();
        let (res, _) = solve_grasp(&inst, &seeded(1));
        assert_eq!(res.size, 0);
        assert!(res.clique.is_empty());
    }
}
