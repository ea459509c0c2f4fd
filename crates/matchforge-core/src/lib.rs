//! MatchForge Core - Core types and traits for mentee/mentor matching
//!
//! This crate provides the fundamental abstractions for MatchForge:
//! - The cost type and the prohibitive sentinel
//! - Criterion contracts (necessary and progressive)
//! - Match result types
//! - The assignment solver contract and its dense matrix input
//! - Deferred values used to feed builders from background tasks

pub mod cost;
pub mod criterion;
pub mod deferred;
pub mod error;
pub mod matches;
pub mod solver;

pub use cost::{is_prohibitive, Cost, PROHIBITIVE_VALUE};
pub use criterion::{
    CriteriaConfiguration, NamedCriterion, NecessaryCriteria, NecessaryCriterion,
    ProgressiveCriteria, ProgressiveCriterion,
};
pub use deferred::{ready, Deferred, Ready, Supplier};
pub use error::{MatchForgeError, Result};
pub use matches::{Match, Matches};
pub use solver::{Assignment, AssignmentSolver, DenseMatrix, SolverBinding};
