use std::collections::HashMap;
use std::time::Instant;

use bit_set::BitSet;

use dogs::search_algorithm::{NeverStoppingCriterion, StoppingCriterion, TimeStoppingCriterion};

use crate::coloring::{is_k_partite, iseq, ColorClass};
use crate::instance::{is_clique, Instance, VertexId};
use crate::ordering::{greedy_clique, ColorSortOrder};
use crate::result::{CliqueResult, SearchStats};
use crate::sat::{is_failed_literal, DpllSolver};

/** parameters of the exact solver */
#[derive(Debug, Clone)]
pub struct ClisatParams {
    /// wall-clock budget in seconds (None: run to completion)
    pub time_limit: Option<f32>,
    /// clique used to seed the incumbent (ignored unless it is a valid clique)
    pub warm_start: Option<Vec<VertexId>>,
    /// decision budget of each failed-literal SAT call
    pub sat_budget: usize,
    /// print incumbent improvements on stdout
    pub verbose: bool,
}

impl Default for ClisatParams {
    fn default() -> Self {
        Self {
            time_limit: None,
            warm_start: None,
            sat_budget: 100_000,
            verbose: false,
        }
    }
}

/** state of one exact solve: incumbent, counters, fixed ordering and the
reference-coloring cache of the filter phase. Updated only by the search
that owns it. */
struct Search<'a, Stopping> {
    /// instance to solve
    inst: &'a Instance,
    /// COLOR-SORT ordering, fixed for the whole solve
    order: ColorSortOrder,
    /// bounded DPLL shared by every failed-literal call
    sat: DpllSolver,
    /// cooperative stopping criterion
    stop: Stopping,
    /// incumbent clique (always valid)
    best: Vec<VertexId>,
    /// lower bound: size of the incumbent
    lb: usize,
    /// search counters
    stats: SearchStats,
    /// reference colorings of the filter phase, keyed by the candidate list
    coloring_cache: HashMap<Vec<VertexId>, Vec<ColorClass>>,
    /// true once the stopping criterion fired
    interrupted: bool,
    /// print incumbent improvements
    verbose: bool,
    /// start of the solve
    t_start: Instant,
}

impl<'a, Stopping:StoppingCriterion> Search<'a, Stopping> {

    /// adopts a clique as incumbent if it beats the current one
    fn update_incumbent(&mut self, clique:&[VertexId]) {
        if clique.len() > self.lb {
            debug_assert!(is_clique(self.inst, clique));
            self.best = clique.to_vec();
            self.lb = clique.len();
            if self.verbose {
                println!("new best clique! ({}) \t {} nodes \t {:.3}s",
                    self.lb, self.stats.nodes_explored, self.t_start.elapsed().as_secs_f32());
            }
        }
    }

    /** SATCOL: colors the candidates with ISEQ, then tries to move every
    uncolored vertex into the pruned set with a failed-literal test. Returns
    (P, B); only UNSAT verdicts move a vertex, so every vertex of P is
    provably unable to beat the incumbent together with the current clique. */
    fn satcol(&mut self, cands:&[VertexId], k_max:usize) -> (Vec<VertexId>, Vec<VertexId>) {
        let coloring = iseq(self.inst, cands, k_max);
        let mut colored = BitSet::with_capacity(self.inst.n());
        for class in &coloring {
            for &v in class { colored.insert(v); }
        }
        let mut pruned:Vec<VertexId> = cands.iter().cloned()
            .filter(|&v| colored.contains(v)).collect();
        let mut branching:Vec<VertexId> = Vec::new();
        for &v in cands.iter().filter(|&&u| !colored.contains(u)) {
            self.stats.sat_calls += 1;
            if is_failed_literal(self.inst, v, &coloring, &self.sat) {
                pruned.push(v);
            } else {
                branching.push(v);
            }
        }
        (pruned, branching)
    }

    /** FiltCOL: splits the candidates against a reference coloring of the
    subgraph, computed once and cached. The cache key is the candidate list
    itself: identical sibling subgraphs share their coloring and distinct
    ones can never alias. */
    fn filtcol(&mut self, cands:&[VertexId]) -> (Vec<VertexId>, Vec<VertexId>) {
        let k_ref = std::cmp::min(cands.len(), self.lb);
        let inst = self.inst;
        let coloring = self.coloring_cache.entry(cands.to_vec())
            .or_insert_with(|| iseq(inst, cands, k_ref));
        let mut colored = BitSet::with_capacity(self.inst.n());
        for class in coloring.iter() {
            for &v in class { colored.insert(v); }
        }
        let pruned:Vec<VertexId> = cands.iter().cloned()
            .filter(|&v| colored.contains(v)).collect();
        let branching:Vec<VertexId> = cands.iter().cloned()
            .filter(|&v| !colored.contains(v)).collect();
        (pruned, branching)
    }

    /** FiltSAT: failed-literal pass over the vertices left out by FiltCOL.
    Each vertex is tested against a fresh coloring of the subgraph induced on
    P ∪ {v} (one extra class allowed); P grows as vertices are moved. */
    fn filtsat(&mut self, pruned:Vec<VertexId>, branching:Vec<VertexId>)
        -> (Vec<VertexId>, Vec<VertexId>) {
        let mut pruned_final = pruned;
        let mut branching_final:Vec<VertexId> = Vec::new();
        for v in branching {
            let mut sub = pruned_final.clone();
            sub.push(v);
            self.order.sort_by_rank(&mut sub);
            let coloring = iseq(self.inst, &sub, pruned_final.len() + 1);
            self.stats.sat_calls += 1;
            if is_failed_literal(self.inst, v, &coloring, &self.sat) {
                pruned_final.push(v);
            } else {
                branching_final.push(v);
            }
        }
        (pruned_final, branching_final)
    }

    /// filter phase: FiltCOL then FiltSAT
    fn filter_phase(&mut self, cands:&[VertexId]) -> (Vec<VertexId>, Vec<VertexId>) {
        let (pruned, branching) = self.filtcol(cands);
        self.filtsat(pruned, branching)
    }

    /** one branch-and-bound node: splits the candidates into the pruned set
    P and the branching list B, then branches on every b ∈ B in COLOR-SORT
    order. `cands` must be sorted in COLOR-SORT order; `k_hat` is the clique
    under construction. */
    fn expand(&mut self, cands:&[VertexId], k_hat:&mut Vec<VertexId>) {
        self.stats.nodes_explored += 1;
        if self.stop.is_finished() { self.interrupted = true; return; }
        self.update_incumbent(k_hat);
        let k_max = self.lb.saturating_sub(k_hat.len());
        let (pruned, branching) = self.satcol(cands, k_max);
        if branching.is_empty() {
            self.stats.pruned_by_bound += 1;
            return;
        }
        for &b in &branching {
            if self.stop.is_finished() { self.interrupted = true; return; }
            // child candidates: pruned neighbors of b, plus branching
            // neighbors that precede b in the COLOR-SORT ordering
            let mut child:Vec<VertexId> = Vec::new();
            for &v in &pruned {
                if self.inst.are_adjacent(b, v) { child.push(v); }
            }
            for &v in &branching {
                if self.order.rank(v) < self.order.rank(b) && self.inst.are_adjacent(b, v) {
                    child.push(v);
                }
            }
            if child.is_empty() {
                // leaf: K ∪ {b} cannot be extended further
                let mut leaf = k_hat.clone();
                leaf.push(b);
                self.update_incumbent(&leaf);
                continue;
            }
            self.order.sort_by_rank(&mut child);
            // b joins the clique before the child is expanded, so the child
            // may only use lb − |K| − 1 color classes
            let k_child = self.lb.saturating_sub(k_hat.len() + 1);
            let (_, child_branching) = if is_k_partite(self.inst, &child, k_child) {
                self.stats.filter_calls += 1;
                self.filter_phase(&child)
            } else {
                self.stats.satcol_calls += 1;
                self.satcol(&child, k_child)
            };
            if child_branching.is_empty() {
                self.stats.pruned_by_bound += 1;
            } else {
                k_hat.push(b);
                self.expand(&child, k_hat);
                k_hat.pop();
            }
            if self.interrupted { return; }
        }
    }
}

/** runs the CliSAT-style exact search with an explicit stopping criterion.

The solver computes an initial clique greedily (possibly replaced by a
larger warm start), fixes the COLOR-SORT ordering, then expands every
vertex of the ordering against its earlier neighbors. The result carries
the incumbent; `is_optimal` is true iff the search was never interrupted. */
pub fn clisat<Stopping:StoppingCriterion>(inst:&Instance, params:&ClisatParams, stop:Stopping)
    -> (CliqueResult, SearchStats) {
    let t_start = Instant::now();
    let initial = greedy_clique(inst);
    let mut search = Search {
        inst,
        order: ColorSortOrder::new(inst),
        sat: DpllSolver::new(params.sat_budget),
        stop,
        lb: initial.len(),
        best: initial,
        stats: SearchStats::default(),
        coloring_cache: HashMap::new(),
        interrupted: false,
        verbose: params.verbose,
        t_start,
    };
    // warm start dominance: a valid warm-start clique that beats the greedy
    // one seeds the incumbent
    if let Some(warm) = &params.warm_start {
        if warm.len() > search.lb && is_clique(inst, warm) {
            search.best = warm.clone();
            search.lb = warm.len();
        }
    }
    if search.verbose {
        println!("initial clique: {}", search.lb);
    }
    let lb0 = search.lb;
    for i in lb0..inst.n() {
        let vi = search.order.order()[i];
        // candidates: vertices before vi in the ordering, adjacent to vi
        let cands:Vec<VertexId> = search.order.order()[..i].iter().cloned()
            .filter(|&v| inst.are_adjacent(vi, v)).collect();
        if cands.is_empty() { continue; }
        let mut k_hat = vec![vi];
        search.expand(&cands, &mut k_hat);
        if search.interrupted { break; }
    }
    let elapsed = t_start.elapsed().as_secs_f32();
    let is_optimal = !search.interrupted;
    debug_assert!(is_clique(inst, &search.best));
    (CliqueResult::new(search.best, elapsed, is_optimal, None), search.stats)
}

/// runs the exact search, taking the wall-clock budget from the parameters
pub fn solve_exact(inst:&Instance, params:&ClisatParams) -> (CliqueResult, SearchStats) {
    match params.time_limit {
        Some(t) => clisat(inst, params, TimeStoppingCriterion::new(t)),
        None => clisat(inst, params, NeverStoppingCriterion::default()),
    }
}
