//! Shared test fixtures for MatchForge crates.
//!
//! - [`person`] - a small participant type used as both mentee and mentor
//! - [`criteria`] - table driven criteria over [`Person`]
//! - [`solver`] - reference assignment solvers
//! - [`supplier`] - suppliers that count how often they are resolved
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! matchforge-test = { workspace = true }
//! ```

pub mod criteria;
pub mod person;
pub mod solver;
pub mod supplier;

pub use criteria::{cost_table, deny_pairs};
pub use person::{people, Person};
pub use solver::{ExhaustiveSolver, ScriptedSolver};
pub use supplier::{CountingSupplier, SingleUseSupplier};
