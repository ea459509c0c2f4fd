//! Matching work submitted to the background worker.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use matchforge_concurrency::{ConcurrencyHandler, TaskHandle};
use matchforge_config::MatchingConfig;
use matchforge_core::{AssignmentSolver, Match, Matches, Result};
use matchforge_engine::MatchesBuilderHandler;
use tracing::debug;

/// Runs matching operations on a shared [`ConcurrencyHandler`].
///
/// Every operation is submitted to the worker thread and returns a
/// [`TaskHandle`] immediately, so [`MatchesBuilderHandler::get`] and the
/// solver never run on the calling thread. Forbid and allow requests are
/// queued behind earlier work and take effect for the matches computed after
/// them.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use matchforge::prelude::*;
///
/// let identity = |m: &DenseMatrix| {
///     let pair = |index: usize, bound: usize| if index < bound { index as i64 } else { -1 };
///     Assignment::new(
///         (0..m.rows()).map(|i| pair(i, m.columns())).collect(),
///         (0..m.columns()).map(|j| pair(j, m.rows())).collect(),
///     )
/// };
/// let maker = MatchMaker::from_config(&MatchingConfig::default(), Arc::new(identity));
/// maker.handler().set_mentees_supplier(ready(vec![1_u32, 2]));
/// maker.handler().set_mentors_supplier(ready(vec![10_u32, 20]));
/// maker.handler().set_criteria_supplier(ready(CriteriaConfiguration::new()));
///
/// let matches = maker.make_matches().unwrap().wait().unwrap();
/// assert_eq!(matches.len(), 2);
/// assert!(maker.shutdown());
/// ```
pub struct MatchMaker<Mentee, Mentor> {
    executor: Arc<ConcurrencyHandler>,
    handler: Arc<MatchesBuilderHandler<Mentee, Mentor>>,
}

impl<Mentee, Mentor> MatchMaker<Mentee, Mentor>
where
    Mentee: Clone + Eq + Hash + Send + Sync + 'static,
    Mentor: Clone + Eq + Hash + Send + Sync + 'static,
{
    pub fn new(
        executor: Arc<ConcurrencyHandler>,
        handler: Arc<MatchesBuilderHandler<Mentee, Mentor>>,
    ) -> Self {
        Self { executor, handler }
    }

    /// Creates a dedicated executor and handler from `config`.
    ///
    /// `solver` is bound to `config.solver.unassigned_sentinel`.
    pub fn from_config(config: &MatchingConfig, solver: Arc<dyn AssignmentSolver>) -> Self {
        let executor = ConcurrencyHandler::new(config.executor.clone());
        let handler = MatchesBuilderHandler::new(solver, config.solver.unassigned_sentinel);
        Self::new(Arc::new(executor), Arc::new(handler))
    }

    pub fn executor(&self) -> &Arc<ConcurrencyHandler> {
        &self.executor
    }

    /// The handler to configure suppliers on.
    pub fn handler(&self) -> &Arc<MatchesBuilderHandler<Mentee, Mentor>> {
        &self.handler
    }

    /// Computes the matches for the current inputs.
    pub fn make_matches(&self) -> Result<TaskHandle<Matches<Mentee, Mentor>>> {
        let handler = Arc::clone(&self.handler);
        self.executor.submit_fallible(move |context| {
            context.check()?;
            let builder = handler.get()?;
            context.check()?;
            builder.build()
        })
    }

    /// Evaluates a single pair with the current criteria.
    pub fn make_single_match(
        &self,
        mentee: Mentee,
        mentor: Mentor,
    ) -> Result<TaskHandle<Match<Mentee, Mentor>>> {
        let handler = Arc::clone(&self.handler);
        self.executor.submit_fallible(move |context| {
            context.check()?;
            handler.get()?.build_single_match(&mentee, &mentor)
        })
    }

    /// Forbids a pair; the handle resolves to whether it was newly forbidden.
    ///
    /// The registry is looked up when the task runs, so the pair lands in
    /// the registry of the populations current at that point.
    pub fn forbid_match(&self, mentee: Mentee, mentor: Mentor) -> Result<TaskHandle<bool>> {
        let handler = Arc::clone(&self.handler);
        self.executor.submit(move |_| {
            let added = handler.forbidden_matches().forbid(mentee, mentor);
            debug!(event = "match_forbidden", added);
            added
        })
    }

    /// Allows a pair; the handle resolves to whether it was forbidden.
    pub fn allow_match(&self, mentee: Mentee, mentor: Mentor) -> Result<TaskHandle<bool>> {
        let handler = Arc::clone(&self.handler);
        self.executor.submit(move |_| {
            let removed = handler.forbidden_matches().allow(&mentee, &mentor);
            debug!(event = "match_allowed", removed);
            removed
        })
    }

    /// Shuts the executor down with its configured timeout.
    ///
    /// Returns whether the worker terminated in time.
    pub fn shutdown(&self) -> bool {
        self.executor
            .shutdown_within(self.executor.config().shutdown_timeout())
    }
}

impl<Mentee, Mentor> Clone for MatchMaker<Mentee, Mentor> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<Mentee, Mentor> fmt::Debug for MatchMaker<Mentee, Mentor> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchMaker")
            .field("executor", &self.executor)
            .field("handler", &self.handler)
            .finish()
    }
}
