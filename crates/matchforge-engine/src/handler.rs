//! Long-lived, memoizing factory of [`MatchesBuilder`]s.
//!
//! Inputs arrive as [`Supplier`]s: values that may still be in production
//! upstream. The handler only resolves them when a builder is requested after
//! one of them was replaced, and never while holding its lock.

use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use matchforge_core::{
    AssignmentSolver, CriteriaConfiguration, MatchForgeError, Result, SolverBinding, Supplier,
};
use tracing::{debug, info};

use crate::builder::MatchesBuilder;
use crate::forbidden::ForbiddenMatches;

type Placeholders<Mentee, Mentor> = (Supplier<Mentee>, Supplier<Mentor>);

struct CachedBuilder<Mentee, Mentor> {
    generation: u64,
    forbidden_revision: u64,
    builder: Arc<MatchesBuilder<Mentee, Mentor>>,
}

struct HandlerState<Mentee, Mentor> {
    mentees: Option<Supplier<Vec<Mentee>>>,
    mentors: Option<Supplier<Vec<Mentor>>>,
    criteria: Option<Supplier<CriteriaConfiguration<Mentee, Mentor>>>,
    placeholders: Option<Placeholders<Mentee, Mentor>>,
    forbidden: Arc<ForbiddenMatches<Mentee, Mentor>>,
    generation: u64,
    cached: Option<CachedBuilder<Mentee, Mentor>>,
}

/// Everything needed to rebuild, copied out of the lock.
struct Snapshot<Mentee, Mentor> {
    generation: u64,
    mentees: Supplier<Vec<Mentee>>,
    mentors: Supplier<Vec<Mentor>>,
    criteria: Supplier<CriteriaConfiguration<Mentee, Mentor>>,
    placeholders: Option<Placeholders<Mentee, Mentor>>,
    forbidden: Arc<ForbiddenMatches<Mentee, Mentor>>,
}

enum Plan<Mentee, Mentor> {
    Rebuild(Snapshot<Mentee, Mentor>),
    Reapply {
        generation: u64,
        builder: Arc<MatchesBuilder<Mentee, Mentor>>,
        forbidden: Arc<ForbiddenMatches<Mentee, Mentor>>,
    },
}

impl<Mentee, Mentor> HandlerState<Mentee, Mentor>
where
    Mentee: Eq + Hash,
    Mentor: Eq + Hash,
{
    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn reset_forbidden(&mut self) {
        self.forbidden = Arc::new(ForbiddenMatches::new());
    }

    fn snapshot(&self) -> Result<Snapshot<Mentee, Mentor>> {
        let mut missing = Vec::new();
        if self.mentees.is_none() {
            missing.push("mentees supplier");
        }
        if self.mentors.is_none() {
            missing.push("mentors supplier");
        }
        if self.criteria.is_none() {
            missing.push("criteria supplier");
        }
        match (&self.mentees, &self.mentors, &self.criteria) {
            (Some(mentees), Some(mentors), Some(criteria)) => Ok(Snapshot {
                generation: self.generation,
                mentees: Arc::clone(mentees),
                mentors: Arc::clone(mentors),
                criteria: Arc::clone(criteria),
                placeholders: self.placeholders.clone(),
                forbidden: Arc::clone(&self.forbidden),
            }),
            _ => Err(MatchForgeError::MissingSuppliers(missing)),
        }
    }
}

/// Produces [`MatchesBuilder`]s from deferred inputs, rebuilding only when
/// an input was replaced.
///
/// The mentees, mentors and criteria suppliers are mandatory; placeholders
/// are optional. Replacing the mentees or the mentors supplier also replaces
/// the [`ForbiddenMatches`] registry with an empty one.
///
/// [`get`](Self::get) blocks while suppliers resolve. Call it from a worker
/// thread, not from a thread that must stay responsive.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use matchforge_core::{ready, Assignment, CriteriaConfiguration, DenseMatrix};
/// use matchforge_engine::MatchesBuilderHandler;
///
/// let nobody = |m: &DenseMatrix| Assignment::unassigned(m.rows(), m.columns(), -1);
/// let handler = MatchesBuilderHandler::new(Arc::new(nobody), -1);
/// handler.set_mentees_supplier(ready(vec!["Ann"]));
/// handler.set_mentors_supplier(ready(vec!["Max"]));
/// handler.set_criteria_supplier(ready(CriteriaConfiguration::new()));
///
/// let first = handler.get().unwrap();
/// let second = handler.get().unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub struct MatchesBuilderHandler<Mentee, Mentor> {
    solver: SolverBinding,
    state: Mutex<HandlerState<Mentee, Mentor>>,
}

impl<Mentee, Mentor> MatchesBuilderHandler<Mentee, Mentor>
where
    Mentee: Clone + Eq + Hash + Send + Sync + 'static,
    Mentor: Clone + Eq + Hash + Send + Sync + 'static,
{
    /// Creates a handler whose builders use `solver`, which marks unassigned
    /// rows and columns with `unassigned`.
    pub fn new(solver: Arc<dyn AssignmentSolver>, unassigned: i64) -> Self {
        Self::with_solver_binding(SolverBinding::new(solver, unassigned))
    }

    pub fn with_solver_binding(solver: SolverBinding) -> Self {
        Self {
            solver,
            state: Mutex::new(HandlerState {
                mentees: None,
                mentors: None,
                criteria: None,
                placeholders: None,
                forbidden: Arc::new(ForbiddenMatches::new()),
                generation: 0,
                cached: None,
            }),
        }
    }

    /// Replaces the mentees supplier and starts a fresh forbidden registry.
    pub fn set_mentees_supplier(&self, supplier: Supplier<Vec<Mentee>>) {
        let mut state = self.lock();
        state.mentees = Some(supplier);
        state.reset_forbidden();
        state.touch();
    }

    /// Replaces the mentors supplier and starts a fresh forbidden registry.
    pub fn set_mentors_supplier(&self, supplier: Supplier<Vec<Mentor>>) {
        let mut state = self.lock();
        state.mentors = Some(supplier);
        state.reset_forbidden();
        state.touch();
    }

    pub fn set_criteria_supplier(
        &self,
        supplier: Supplier<CriteriaConfiguration<Mentee, Mentor>>,
    ) {
        let mut state = self.lock();
        state.criteria = Some(supplier);
        state.touch();
    }

    /// Sets or unsets the placeholder mentee and mentor.
    ///
    /// Both must be given, or neither. Giving only one is a
    /// [`MatchForgeError::Config`] error and leaves the handler unchanged.
    pub fn set_placeholders_supplier(
        &self,
        default_mentee: Option<Supplier<Mentee>>,
        default_mentor: Option<Supplier<Mentor>>,
    ) -> Result<()> {
        let placeholders = match (default_mentee, default_mentor) {
            (Some(mentee), Some(mentor)) => Some((mentee, mentor)),
            (None, None) => None,
            _ => {
                return Err(MatchForgeError::Config(
                    "default mentee and default mentor must be set together".to_string(),
                ))
            }
        };
        let mut state = self.lock();
        state.placeholders = placeholders;
        state.touch();
        Ok(())
    }

    /// The registry replayed onto every builder returned by [`get`](Self::get).
    ///
    /// Changes made to it are picked up by the next `get`. The returned
    /// registry is detached once the mentees or mentors supplier is
    /// replaced.
    pub fn forbidden_matches(&self) -> Arc<ForbiddenMatches<Mentee, Mentor>> {
        Arc::clone(&self.lock().forbidden)
    }

    /// Returns a builder consistent with the latest inputs.
    ///
    /// With no setter called since the last successful call, the cached
    /// builder is returned without resolving anything; if only the forbidden
    /// registry changed, it is replayed onto a copy of the cached builder.
    /// Otherwise every supplier is resolved outside the lock and a new builder
    /// is assembled.
    ///
    /// Concurrent calls may build redundantly. A build that finishes after a
    /// setter was called is returned to its caller but not cached.
    pub fn get(&self) -> Result<Arc<MatchesBuilder<Mentee, Mentor>>> {
        let plan = {
            let state = self.lock();
            match &state.cached {
                Some(cached) if cached.generation == state.generation => {
                    if cached.forbidden_revision == state.forbidden.revision() {
                        debug!(event = "builder_cache_hit", generation = state.generation);
                        return Ok(Arc::clone(&cached.builder));
                    }
                    Plan::Reapply {
                        generation: state.generation,
                        builder: Arc::clone(&cached.builder),
                        forbidden: Arc::clone(&state.forbidden),
                    }
                }
                _ => Plan::Rebuild(state.snapshot()?),
            }
        };

        let (generation, revision, builder) = match plan {
            Plan::Reapply {
                generation,
                builder,
                forbidden,
            } => {
                let mut builder = MatchesBuilder::clone(&builder);
                let revision = builder.apply_forbidden_matches(&forbidden);
                debug!(event = "forbidden_matches_reapplied", generation, revision);
                (generation, revision, builder)
            }
            Plan::Rebuild(snapshot) => self.rebuild(snapshot)?,
        };

        let builder = Arc::new(builder);
        self.store(generation, revision, &builder);
        Ok(builder)
    }

    fn rebuild(
        &self,
        snapshot: Snapshot<Mentee, Mentor>,
    ) -> Result<(u64, u64, MatchesBuilder<Mentee, Mentor>)> {
        let mentees = snapshot.mentees.resolve()?;
        let mentors = snapshot.mentors.resolve()?;
        let criteria = snapshot.criteria.resolve()?;
        let placeholders = match &snapshot.placeholders {
            Some((mentee, mentor)) => Some((mentee.resolve()?, mentor.resolve()?)),
            None => None,
        };
        let (mentee_count, mentor_count) = (mentees.len(), mentors.len());

        let mut builder = MatchesBuilder::from_configuration(mentees, mentors, &criteria)?
            .with_solver_binding(self.solver.clone());
        if let Some((mentee, mentor)) = placeholders {
            builder = builder.with_placeholders(mentee, mentor);
        }
        let revision = builder.apply_forbidden_matches(&snapshot.forbidden);

        info!(
            event = "builder_rebuilt",
            generation = snapshot.generation,
            mentees = mentee_count,
            mentors = mentor_count,
            forbidden_revision = revision,
        );
        Ok((snapshot.generation, revision, builder))
    }

    fn store(
        &self,
        generation: u64,
        revision: u64,
        builder: &Arc<MatchesBuilder<Mentee, Mentor>>,
    ) {
        let mut state = self.lock();
        if state.generation != generation {
            debug!(
                event = "stale_builder_discarded",
                built = generation,
                current = state.generation,
            );
            return;
        }
        let newer_cached = state.cached.as_ref().is_some_and(|cached| {
            cached.generation == generation && cached.forbidden_revision > revision
        });
        if !newer_cached {
            state.cached = Some(CachedBuilder {
                generation,
                forbidden_revision: revision,
                builder: Arc::clone(builder),
            });
        }
    }

    fn lock(&self) -> MutexGuard<'_, HandlerState<Mentee, Mentor>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<Mentee, Mentor> fmt::Debug for MatchesBuilderHandler<Mentee, Mentor> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("MatchesBuilderHandler")
            .field("solver", &self.solver)
            .field("generation", &state.generation)
            .field("cached", &state.cached.is_some())
            .finish_non_exhaustive()
    }
}
