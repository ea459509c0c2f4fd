//! MatchForge - optimal mentee/mentor matching.
//!
//! Two populations are matched by solving an assignment problem over a cost
//! matrix built from configurable criteria. Hard exclusions (failed necessary
//! criteria, manually forbidden pairs) are made unreachable for the solver,
//! and the result can give every participant a deterministic outcome through
//! placeholder matches.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use matchforge::prelude::*;
//!
//! // A trivial solver pairing row i with column i.
//! let diagonal = |m: &DenseMatrix| {
//!     let pair = |index: usize, bound: usize| if index < bound { index as i64 } else { -1 };
//!     Assignment::new(
//!         (0..m.rows()).map(|i| pair(i, m.columns())).collect(),
//!         (0..m.columns()).map(|j| pair(j, m.rows())).collect(),
//!     )
//! };
//!
//! let handler = MatchesBuilderHandler::new(Arc::new(diagonal), -1);
//! handler.set_mentees_supplier(ready(vec!["Ann", "Bob"]));
//! handler.set_mentors_supplier(ready(vec!["Max"]));
//! handler.set_criteria_supplier(ready(CriteriaConfiguration::new()));
//! handler
//!     .set_placeholders_supplier(Some(ready("-")), Some(ready("-")))
//!     .unwrap();
//!
//! let matches = handler.get().unwrap().build().unwrap();
//! assert_eq!(matches.len(), 2);
//! assert!(matches.mentee_match(&"Bob").unwrap().is_prohibitive());
//! ```

pub mod console;
mod session;

#[cfg(test)]
mod session_tests;

pub use session::MatchMaker;

// Core types
pub use matchforge_core::{
    is_prohibitive, ready, Assignment, AssignmentSolver, Cost, CriteriaConfiguration, Deferred,
    DenseMatrix, Match, MatchForgeError, Matches, NamedCriterion, NecessaryCriteria,
    NecessaryCriterion, ProgressiveCriteria, ProgressiveCriterion, Ready, Result, SolverBinding,
    Supplier, PROHIBITIVE_VALUE,
};

// Engine
pub use matchforge_engine::{
    CostMatrix, ExclusionReason, ExclusionReasons, ForbiddenMatches, MatchesBuilder,
    MatchesBuilderHandler,
};

// Background execution
pub use matchforge_concurrency::{ConcurrencyHandler, SharedTask, TaskContext, TaskHandle};

// Configuration
pub use matchforge_config::{ConfigError, ExecutorConfig, LoggingConfig, MatchingConfig, SolverConfig};

pub mod prelude {
    pub use super::{
        ready, Assignment, AssignmentSolver, CriteriaConfiguration, DenseMatrix, Match,
        MatchForgeError, MatchMaker, Matches, MatchesBuilder, MatchesBuilderHandler,
        NamedCriterion, NecessaryCriterion, ProgressiveCriterion, PROHIBITIVE_VALUE,
    };
    pub use super::{ConcurrencyHandler, MatchingConfig};
}
