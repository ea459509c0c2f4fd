//! One-shot orchestration from criteria to [`Matches`].

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use matchforge_core::{
    is_prohibitive, Assignment, AssignmentSolver, CriteriaConfiguration, Match, MatchForgeError,
    Matches, NecessaryCriteria, ProgressiveCriteria, Result, SolverBinding, PROHIBITIVE_VALUE,
};
use tracing::info;

use crate::cost_matrix::{pair_cost, CostMatrix};
use crate::forbidden::ForbiddenMatches;

/// Builds the optimal [`Matches`] between two populations.
///
/// Everything but the constructor arguments is optional. `build` does not
/// consume or reset the builder: it can be called any number of times, and
/// [`build_single_match`](Self::build_single_match) can be used in between.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use matchforge_core::{Assignment, CriteriaConfiguration, DenseMatrix};
/// use matchforge_engine::MatchesBuilder;
///
/// // Pairs row i with column i; good enough for a diagonal example.
/// let diagonal = |m: &DenseMatrix| {
///     let pair = |index: usize, bound: usize| if index < bound { index as i64 } else { -1 };
///     Assignment::new(
///         (0..m.rows()).map(|i| pair(i, m.columns())).collect(),
///         (0..m.columns()).map(|j| pair(j, m.rows())).collect(),
///     )
/// };
/// let criteria = CriteriaConfiguration::<&str, &str>::new()
///     .with_progressive(|_: &&str, _: &&str| 3_i64);
///
/// let matches = MatchesBuilder::from_configuration(vec!["Ann"], vec!["Max"], &criteria)
///     .unwrap()
///     .with_solver(Arc::new(diagonal), -1)
///     .build()
///     .unwrap();
/// assert_eq!(matches.total_cost(), 3);
/// ```
#[derive(Clone)]
pub struct MatchesBuilder<Mentee, Mentor> {
    cost_matrix: CostMatrix<Mentee, Mentor>,
    progressive: ProgressiveCriteria<Mentee, Mentor>,
    necessary: NecessaryCriteria<Mentee, Mentor>,
    solver: Option<SolverBinding>,
    placeholders: Option<(Mentee, Mentor)>,
}

impl<Mentee: Sync, Mentor: Sync> MatchesBuilder<Mentee, Mentor> {
    /// Computes the cost matrix from the progressive criteria.
    pub fn new(
        mentees: impl Into<Arc<[Mentee]>>,
        mentors: impl Into<Arc<[Mentor]>>,
        progressive: ProgressiveCriteria<Mentee, Mentor>,
    ) -> Result<Self> {
        let cost_matrix = CostMatrix::new(mentees, mentors, &progressive)?;
        Ok(Self {
            cost_matrix,
            progressive,
            necessary: Vec::new(),
            solver: None,
            placeholders: None,
        })
    }

    /// Creates a builder applying both kinds of criteria from `criteria`.
    pub fn from_configuration(
        mentees: impl Into<Arc<[Mentee]>>,
        mentors: impl Into<Arc<[Mentor]>>,
        criteria: &CriteriaConfiguration<Mentee, Mentor>,
    ) -> Result<Self> {
        Ok(Self::new(mentees, mentors, criteria.progressive_criteria().clone())?
            .with_necessary_criteria(criteria.necessary_criteria().clone()))
    }

    /// Replaces the necessary criteria and re-evaluates them on every pair.
    pub fn with_necessary_criteria(
        mut self,
        necessary: NecessaryCriteria<Mentee, Mentor>,
    ) -> Self {
        self.cost_matrix.apply_necessary_criteria(&necessary);
        self.necessary = necessary;
        self
    }
}

impl<Mentee, Mentor> MatchesBuilder<Mentee, Mentor> {
    /// Uses `solver`, which marks unassigned rows and columns with
    /// `unassigned`.
    pub fn with_solver(self, solver: Arc<dyn AssignmentSolver>, unassigned: i64) -> Self {
        self.with_solver_binding(SolverBinding::new(solver, unassigned))
    }

    pub fn with_solver_binding(mut self, binding: SolverBinding) -> Self {
        self.solver = Some(binding);
        self
    }

    /// Makes `build` report every participant, pairing the unmatched ones
    /// with these placeholders at [`PROHIBITIVE_VALUE`].
    pub fn with_placeholders(mut self, default_mentee: Mentee, default_mentor: Mentor) -> Self {
        self.placeholders = Some((default_mentee, default_mentor));
        self
    }

    pub fn cost_matrix(&self) -> &CostMatrix<Mentee, Mentor> {
        &self.cost_matrix
    }

    pub fn solver(&self) -> Option<&SolverBinding> {
        self.solver.as_ref()
    }

    pub fn placeholders(&self) -> Option<&(Mentee, Mentor)> {
        self.placeholders.as_ref()
    }

    fn is_valid(&self, mentee: usize, mentor: usize) -> bool {
        !is_prohibitive(self.cost_matrix.solver_cost(mentee, mentor))
    }

    /// The mentor mutually assigned to `mentee` through an admissible pair.
    fn assigned_mentor(
        &self,
        binding: &SolverBinding,
        assignment: &Assignment,
        mentee: usize,
    ) -> Option<usize> {
        let raw = *assignment.row_assignments().get(mentee)?;
        let mentor = binding.resolve_index(raw, self.cost_matrix.mentor_count())?;
        let back = *assignment.column_assignments().get(mentor)?;
        (binding.resolve_index(back, self.cost_matrix.mentee_count()) == Some(mentee)
            && self.is_valid(mentee, mentor))
        .then_some(mentor)
    }
}

impl<Mentee, Mentor> MatchesBuilder<Mentee, Mentor>
where
    Mentee: Eq + Hash,
    Mentor: Eq + Hash,
{
    /// Replays `registry` onto the cost matrix.
    pub fn with_forbidden_matches(mut self, registry: &ForbiddenMatches<Mentee, Mentor>) -> Self {
        self.apply_forbidden_matches(registry);
        self
    }

    /// Replays `registry` in place, replacing earlier manual exclusions.
    ///
    /// Identities listed several times resolve to their first position.
    /// Returns the registry revision that was applied.
    pub fn apply_forbidden_matches(&mut self, registry: &ForbiddenMatches<Mentee, Mentor>) -> u64 {
        let mentees = Arc::clone(self.cost_matrix.mentees());
        let mentors = Arc::clone(self.cost_matrix.mentors());
        let mentee_positions = first_positions(&mentees);
        let mentor_positions = first_positions(&mentors);
        registry.apply_to(
            &mut self.cost_matrix,
            |mentee| mentee_positions.get(mentee).copied(),
            |mentor| mentor_positions.get(mentor).copied(),
        )
    }
}

impl<Mentee: Clone, Mentor: Clone> MatchesBuilder<Mentee, Mentor> {
    /// Solves the full matrix and formats the result.
    ///
    /// Without placeholders, only mutually assigned pairs whose cost is not
    /// prohibitive are reported. With placeholders, every mentee appears
    /// exactly once, followed by one placeholder match per mentor left
    /// without a valid mentee.
    pub fn build(&self) -> Result<Matches<Mentee, Mentor>> {
        let binding = self.solver.as_ref().ok_or_else(|| {
            MatchForgeError::Config("no assignment solver configured".to_string())
        })?;
        let rows = self.cost_matrix.mentee_count();
        let columns = self.cost_matrix.mentor_count();

        info!(event = "solve_start", mentees = rows, mentors = columns);
        let assignment = if rows == 0 || columns == 0 {
            Assignment::unassigned(rows, columns, binding.unassigned())
        } else {
            self.cost_matrix.solve(binding.solver())
        };

        let matches = match &self.placeholders {
            Some((default_mentee, default_mentor)) => {
                self.format_with_placeholders(binding, &assignment, default_mentee, default_mentor)
            }
            None => self.format_valid(binding, &assignment),
        };

        info!(
            event = "solve_end",
            matches = matches.len(),
            total_cost = matches.total_cost(),
        );
        Ok(matches)
    }

    /// Evaluates one pair directly, without the solver.
    ///
    /// Fails with [`MatchForgeError::InfeasiblePair`] naming the first
    /// necessary criterion that rejects the pair. Manually forbidden pairs
    /// are not consulted.
    pub fn build_single_match(
        &self,
        mentee: &Mentee,
        mentor: &Mentor,
    ) -> Result<Match<Mentee, Mentor>> {
        if let Some(criterion) = self
            .necessary
            .iter()
            .find(|criterion| !criterion.test(mentee, mentor))
        {
            return Err(MatchForgeError::InfeasiblePair(format!(
                "necessary criterion {} rejects the requested pair",
                criterion.name()
            )));
        }
        let cost = pair_cost(&self.progressive, mentee, mentor, &"the requested pair")?;
        Ok(Match::new(mentee.clone(), mentor.clone(), cost))
    }

    fn format_valid(
        &self,
        binding: &SolverBinding,
        assignment: &Assignment,
    ) -> Matches<Mentee, Mentor> {
        (0..self.cost_matrix.mentee_count())
            .filter_map(|i| {
                let j = self.assigned_mentor(binding, assignment, i)?;
                Some(self.real_match(i, j))
            })
            .collect()
    }

    fn format_with_placeholders(
        &self,
        binding: &SolverBinding,
        assignment: &Assignment,
        default_mentee: &Mentee,
        default_mentor: &Mentor,
    ) -> Matches<Mentee, Mentor> {
        let mentees = self.cost_matrix.mentees();
        let mentors = self.cost_matrix.mentors();
        let mut matched_mentors = vec![false; mentors.len()];
        let mut matches = Vec::with_capacity(mentees.len() + mentors.len());

        for (i, mentee) in mentees.iter().enumerate() {
            match self.assigned_mentor(binding, assignment, i) {
                Some(j) => {
                    matched_mentors[j] = true;
                    matches.push(self.real_match(i, j));
                }
                None => matches.push(Match::new(
                    mentee.clone(),
                    default_mentor.clone(),
                    PROHIBITIVE_VALUE,
                )),
            }
        }
        for (mentor, _) in mentors
            .iter()
            .zip(matched_mentors)
            .filter(|(_, matched)| !matched)
        {
            matches.push(Match::new(
                default_mentee.clone(),
                mentor.clone(),
                PROHIBITIVE_VALUE,
            ));
        }
        Matches::new(matches)
    }

    fn real_match(&self, mentee: usize, mentor: usize) -> Match<Mentee, Mentor> {
        Match::new(
            self.cost_matrix.mentees()[mentee].clone(),
            self.cost_matrix.mentors()[mentor].clone(),
            self.cost_matrix.base_cost(mentee, mentor),
        )
    }
}

impl<Mentee, Mentor> fmt::Debug for MatchesBuilder<Mentee, Mentor> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchesBuilder")
            .field("cost_matrix", &self.cost_matrix)
            .field("progressive", &self.progressive.len())
            .field("necessary", &self.necessary.len())
            .field("solver", &self.solver)
            .field("placeholders", &self.placeholders.is_some())
            .finish()
    }
}

fn first_positions<T: Eq + Hash>(items: &[T]) -> HashMap<&T, usize> {
    let mut positions = HashMap::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        positions.entry(item).or_insert(index);
    }
    positions
}
