//! Exact (CliSAT-style) and GRASP solvers for the Maximum Clique problem

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

// not sure if already by default in clippy
#![warn(clippy::similar_names)]
#![warn(clippy::shadow_unrelated)]
#![warn(clippy::shadow_same)]
#![warn(clippy::shadow_reuse)]


/// clique instance base type and solution checker
pub mod instance;

/// COLOR-SORT vertex ordering and greedy initial clique
pub mod ordering;

/// greedy sequential coloring (ISEQ independent color classes)
pub mod coloring;

/// CNF encoding and bounded DPLL solver used to refine coloring bounds
pub mod sat;

/// solver result and statistics records
pub mod result;

/// maximum clique solvers
pub mod solvers;
