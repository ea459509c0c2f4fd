//! Matching engine for MatchForge.
//!
//! - [`CostMatrix`] evaluates progressive criteria over every pair and keeps
//!   an overlay of exclusions on top of the base costs
//! - [`ForbiddenMatches`] is the thread-safe registry of manually forbidden
//!   pairs, replayed onto a cost matrix on demand
//! - [`MatchesBuilder`] turns a cost matrix and a solver into [`Matches`]
//! - [`MatchesBuilderHandler`] assembles builders from deferred inputs and
//!   caches them until an input changes
//!
//! [`Matches`]: matchforge_core::Matches

pub mod builder;
pub mod cost_matrix;
pub mod exclusion;
pub mod forbidden;
pub mod handler;

#[cfg(test)]
mod cost_matrix_tests;
#[cfg(test)]
mod handler_tests;

pub use builder::MatchesBuilder;
pub use cost_matrix::CostMatrix;
pub use exclusion::{ExclusionReason, ExclusionReasons};
pub use forbidden::ForbiddenMatches;
pub use handler::MatchesBuilderHandler;
