use serde::Serialize;

use crate::instance::VertexId;

/** result record returned by every solver.
`size` always matches the clique length; the producing solver checks the
clique against the instance in debug builds. */
#[derive(Debug, Clone, Serialize)]
pub struct CliqueResult {
    /// vertices of the best clique found
    pub clique: Vec<VertexId>,
    /// size of the clique
    pub size: usize,
    /// wall-clock time spent by the solver (seconds)
    pub elapsed: f32,
    /// true iff the search completed without hitting its stopping criterion
    pub is_optimal: bool,
    /// number of iterations performed (metaheuristics only)
    pub iterations: Option<usize>,
}

impl CliqueResult {
    /// builds a result record from a clique
    pub fn new(clique:Vec<VertexId>, elapsed:f32, is_optimal:bool, iterations:Option<usize>) -> Self {
        let size = clique.len();
        Self { clique, size, elapsed, is_optimal, iterations }
    }
}

/** counters maintained by the exact solver. All counters are non-decreasing
during a solve. */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// nb branch-and-bound nodes entered
    pub nodes_explored: usize,
    /// nb failed-literal satisfiability checks
    pub sat_calls: usize,
    /// nb nodes closed because the branching set was empty
    pub pruned_by_bound: usize,
    /// nb child sets refined by the filter phase
    pub filter_calls: usize,
    /// nb child sets refined by SATCOL
    pub satcol_calls: usize,
}

impl SearchStats {
    /// registers the counters in a json structure
    pub fn json_statistics(&self, json:&mut serde_json::Value) {
        json["nodes_explored"] = serde_json::json!(self.nodes_explored);
        json["sat_calls"] = serde_json::json!(self.sat_calls);
        json["pruned_by_bound"] = serde_json::json!(self.pruned_by_bound);
        json["filter_calls"] = serde_json::json!(self.filter_calls);
        json["satcol_calls"] = serde_json::json!(self.satcol_calls);
    }
}

/** counters maintained across one GRASP solve. */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraspStats {
    /// nb iterations performed
    pub total_iterations: usize,
    /// nb times the incumbent improved
    pub improvements_found: usize,
    /// iteration at which the best clique was found
    pub best_iteration: usize,
    /// size of the locally-optimal clique of each iteration
    pub clique_sizes_history: Vec<usize>,
}

impl GraspStats {
    /// registers the counters in a json structure
    pub fn json_statistics(&self, json:&mut serde_json::Value) {
        json["total_iterations"] = serde_json::json!(self.total_iterations);
        json["improvements_found"] = serde_json::json!(self.improvements_found);
        json["best_iteration"] = serde_json::json!(self.best_iteration);
        json["clique_sizes_history"] = serde_json::json!(self.clique_sizes_history);
    }
}
