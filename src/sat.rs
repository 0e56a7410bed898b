use crate::coloring::ColorClass;
use crate::instance::{Instance, VertexId};

/** literal in DIMACS convention: `v` selects variable v, `-v` its negation
(variables are numbered from 1) */
pub type Lit = i32;

/** CNF formula fed to the DPLL solver */
#[derive(Debug, Clone, Default)]
pub struct Cnf {
    /// number of variables (numbered 1..=nb_vars)
    pub nb_vars: usize,
    /// clauses, each a disjunction of literals
    pub clauses: Vec<Vec<Lit>>,
}

impl Cnf {
    /// creates an empty formula over `nb_vars` variables
    pub fn new(nb_vars:usize) -> Self {
        Self { nb_vars, clauses: Vec::new() }
    }

    /// appends a clause
    pub fn add_clause(&mut self, clause:Vec<Lit>) {
        self.clauses.push(clause);
    }
}

/// verdict of a bounded satisfiability check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatVerdict {
    /// a model exists
    Sat,
    /// no model exists
    Unsat,
    /// budget exhausted before reaching a verdict; callers must not prune
    Unknown,
}

/** builds the P-MAX formula of a coloring: one variable per colored vertex,
one clause (¬x_u ∨ ¬x_v) for every non-adjacent pair inside a class, and one
at-least-one clause per class. A satisfying assignment selects at least one
vertex per class without pairing two non-adjacent vertices of a class. */
pub fn build_pmax(inst:&Instance, coloring:&[ColorClass]) -> Cnf {
    // var_of[v]: SAT variable of vertex v (0: not part of the formula)
    let mut var_of:Vec<usize> = vec![0 ; inst.n()];
    let mut nb_vars = 0;
    for class in coloring {
        for &v in class {
            if var_of[v] == 0 {
                nb_vars += 1;
                var_of[v] = nb_vars;
            }
        }
    }
    let mut cnf = Cnf::new(nb_vars);
    for class in coloring {
        for (i,&u) in class.iter().enumerate() {
            for &v in &class[i+1..] {
                if !inst.are_adjacent(u,v) {
                    cnf.add_clause(vec![ -(var_of[u] as Lit), -(var_of[v] as Lit) ]);
                }
            }
        }
        if !class.is_empty() {
            cnf.add_clause(class.iter().map(|&v| var_of[v] as Lit).collect());
        }
    }
    cnf
}

/** DPLL satisfiability solver with unit propagation and a decision budget.

The formulas built by `build_pmax` are small (one variable per colored
vertex), so a complete solver with a per-call budget replaces an external
one behind the same narrow contract: build a CNF, ask SAT/UNSAT, give up
with `Unknown` when the budget runs out. Branching is deterministic (a
literal of the first open clause, satisfying phase first). */
#[derive(Debug, Clone)]
pub struct DpllSolver {
    /// nb decisions allowed per call
    budget: usize,
}

impl DpllSolver {

    /// creates a solver allowing `budget` decisions per call
    pub fn new(budget:usize) -> Self {
        Self { budget }
    }

    /// checks the satisfiability of a formula within the decision budget
    pub fn solve(&self, cnf:&Cnf) -> SatVerdict {
        let mut assignment:Vec<Option<bool>> = vec![None ; cnf.nb_vars + 1];
        let mut decisions = 0;
        self.search(cnf, &mut assignment, &mut decisions)
    }

    /// value of a literal under the current partial assignment
    fn lit_value(assignment:&[Option<bool>], lit:Lit) -> Option<bool> {
        let var = lit.unsigned_abs() as usize;
        assignment[var].map(|value| if lit > 0 { value } else { !value })
    }

    fn search(&self, cnf:&Cnf, assignment:&mut Vec<Option<bool>>, decisions:&mut usize) -> SatVerdict {
        // literals assigned by this frame, undone before returning
        let mut trail:Vec<usize> = Vec::new();
        let verdict = self.propagate_and_branch(cnf, assignment, decisions, &mut trail);
        for var in trail {
            assignment[var] = None;
        }
        verdict
    }

    fn propagate_and_branch(&self, cnf:&Cnf, assignment:&mut Vec<Option<bool>>,
        decisions:&mut usize, trail:&mut Vec<usize>) -> SatVerdict {
        // unit propagation until fixpoint
        let branch_lit:Lit = loop {
            let mut unit:Option<Lit> = None;
            let mut open_lit:Option<Lit> = None;
            for clause in &cnf.clauses {
                let mut satisfied = false;
                let mut nb_unassigned = 0;
                let mut last_unassigned:Lit = 0;
                for &lit in clause {
                    match Self::lit_value(assignment, lit) {
                        Some(true) => { satisfied = true; break; }
                        Some(false) => {}
                        None => { nb_unassigned += 1; last_unassigned = lit; }
                    }
                }
                if satisfied { continue; }
                match nb_unassigned {
                    0 => { return SatVerdict::Unsat; } // falsified clause
                    1 => { unit = Some(last_unassigned); break; }
                    _ => { if open_lit.is_none() { open_lit = Some(last_unassigned); } }
                }
            }
            match (unit, open_lit) {
                (Some(lit), _) => {
                    let var = lit.unsigned_abs() as usize;
                    assignment[var] = Some(lit > 0);
                    trail.push(var);
                }
                (None, None) => { return SatVerdict::Sat; } // every clause satisfied
                (None, Some(lit)) => { break lit; }
            }
        };
        // branch on the chosen literal, positive phase first
        if *decisions >= self.budget { return SatVerdict::Unknown; }
        *decisions += 1;
        let var = branch_lit.unsigned_abs() as usize;
        for &phase in &[branch_lit > 0, branch_lit <= 0] {
            assignment[var] = Some(phase);
            match self.search(cnf, assignment, decisions) {
                SatVerdict::Sat => { trail.push(var); return SatVerdict::Sat; }
                SatVerdict::Unknown => { trail.push(var); return SatVerdict::Unknown; }
                SatVerdict::Unsat => { assignment[var] = None; }
            }
        }
        SatVerdict::Unsat
    }
}

/** failed-literal test: appends the singleton class {v} to the coloring and
checks the satisfiability of the extended P-MAX formula. UNSAT means that no
selection of one vertex per class is compatible with selecting v, so v
cannot extend the current clique within the coloring bound. `Unknown` (the
budget ran out) is treated as "cannot prune". */
pub fn is_failed_literal(inst:&Instance, v:VertexId, coloring:&[ColorClass], solver:&DpllSolver) -> bool {
    let mut extended = coloring.to_vec();
    extended.push(vec![v]);
    let cnf = build_pmax(inst, &extended);
    solver.solve(&cnf) == SatVerdict::Unsat
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::coloring::iseq;

    #[test]
    fn test_empty_formula_is_sat() {
        let solver = DpllSolver::new(1000);
        assert_eq!(solver.solve(&Cnf::new(0)), SatVerdict::Sat);
        assert_eq!(solver.solve(&Cnf::new(3)), SatVerdict::Sat);
    }

    #[test]
    fn test_unit_contradiction_is_unsat() {
        let mut cnf = Cnf::new(1);
        cnf.add_clause(vec![1]);
        cnf.add_clause(vec![-1]);
        let solver = DpllSolver::new(1000);
        assert_eq!(solver.solve(&cnf), SatVerdict::Unsat);
    }

    #[test]
    fn test_simple_sat_formula() {
        // (x1 ∨ x2) ∧ (¬x1 ∨ x2) ∧ (x1 ∨ ¬x2)
        let mut cnf = Cnf::new(2);
        cnf.add_clause(vec![1,2]);
        cnf.add_clause(vec![-1,2]);
        cnf.add_clause(vec![1,-2]);
        let solver = DpllSolver::new(1000);
        assert_eq!(solver.solve(&cnf), SatVerdict::Sat);
    }

    #[test]
    fn test_full_contradiction_is_unsat() {
        // all four clauses over two variables
        let mut cnf = Cnf::new(2);
        cnf.add_clause(vec![1,2]);
        cnf.add_clause(vec![-1,2]);
        cnf.add_clause(vec![1,-2]);
        cnf.add_clause(vec![-1,-2]);
        let solver = DpllSolver::new(1000);
        assert_eq!(solver.solve(&cnf), SatVerdict::Unsat);
    }

    #[test]
    fn test_budget_exhaustion_returns_unknown() {
        // pigeonhole-style contradiction, no unit clause to start from
        let mut cnf = Cnf::new(4);
        cnf.add_clause(vec![1,2]);
        cnf.add_clause(vec![3,4]);
        cnf.add_clause(vec![-1,-3]);
        cnf.add_clause(vec![-1,-4]);
        cnf.add_clause(vec![-2,-3]);
        cnf.add_clause(vec![-2,-4]);
        assert_eq!(DpllSolver::new(0).solve(&cnf), SatVerdict::Unknown);
        assert_eq!(DpllSolver::new(1000).solve(&cnf), SatVerdict::Unsat);
    }

    #[test]
    fn test_pmax_counts_variables_once() {
        let inst = Instance::from_edges(4, &[(0,1),(1,2),(2,3)]).unwrap();
        // vertex 1 colored and appended as a singleton: one variable, forced true
        let coloring = vec![vec![0,2], vec![1,3], vec![1]];
        let cnf = build_pmax(&inst, &coloring);
        assert_eq!(cnf.nb_vars, 4);
        let solver = DpllSolver::new(1000);
        assert_eq!(solver.solve(&cnf), SatVerdict::Sat);
    }

    #[test]
    fn test_failed_literal_on_a_path() {
        let inst = Instance::from_edges(3, &[(0,1),(1,2)]).unwrap();
        let coloring = iseq(&inst, &[0,1,2], 2);
        assert_eq!(coloring, vec![vec![0,2], vec![1]]);
        let solver = DpllSolver::new(1000);
        // forcing 0 excludes its class mate 2, but 0 itself covers the class
        assert!(!is_failed_literal(&inst, 0, &coloring, &solver));
    }

    #[test]
    fn test_failed_literal_keeps_class_representatives_selectable() {
        // classes produced by ISEQ are independent sets, so every class keeps
        // a selectable representative and the relaxed formula stays
        // satisfiable: the test may only prune, never by mistake
        let inst = Instance::from_edges(4, &[(3,0),(3,1),(3,2)]).unwrap();
        let solver = DpllSolver::new(1000);
        let coloring = iseq(&inst, &[0,1,2,3], 4);
        for v in inst.vertices() {
            assert!(!is_failed_literal(&inst, v, &coloring, &solver));
        }
    }
}
