//! Maximum clique solvers.

/// CliSAT-style exact branch-and-bound solver
pub mod clisat;

/// GRASP metaheuristic (randomized construction + local search)
pub mod grasp;
