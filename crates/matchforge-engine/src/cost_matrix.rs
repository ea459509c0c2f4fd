//! Cost matrix with an exclusion overlay.
//!
//! Base costs are computed once from the progressive criteria and never
//! change. Exclusions live in a parallel flat array of [`ExclusionReasons`];
//! only the matrix handed to a solver merges the two, replacing every
//! excluded cell with [`PROHIBITIVE_VALUE`].

use std::fmt;
use std::sync::Arc;

use matchforge_core::{
    Assignment, AssignmentSolver, Cost, DenseMatrix, MatchForgeError, NecessaryCriterion,
    ProgressiveCriterion, Result, PROHIBITIVE_VALUE,
};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::exclusion::{ExclusionReason, ExclusionReasons};

/// Mentees as rows, mentors as columns.
///
/// # Examples
///
/// ```
/// use matchforge_core::CriteriaConfiguration;
/// use matchforge_engine::CostMatrix;
///
/// let criteria = CriteriaConfiguration::<u32, u32>::new()
///     .with_progressive(|a: &u32, b: &u32| i64::from(a.abs_diff(*b)));
/// let mut matrix =
///     CostMatrix::new(vec![20_u32, 30], vec![25_u32], criteria.progressive_criteria()).unwrap();
///
/// assert_eq!(matrix.base_cost(1, 0), 5);
/// assert!(matrix.forbid(1, 0));
/// assert!(!matrix.is_allowed(1, 0));
/// assert_eq!(matrix.base_cost(1, 0), 5);
/// ```
pub struct CostMatrix<Mentee, Mentor> {
    mentees: Arc<[Mentee]>,
    mentors: Arc<[Mentor]>,
    base_costs: Vec<Cost>,
    exclusions: Vec<ExclusionReasons>,
}

impl<Mentee: Sync, Mentor: Sync> CostMatrix<Mentee, Mentor> {
    /// Evaluates every progressive criterion on every pair.
    ///
    /// Fails with [`MatchForgeError::InvariantViolation`] when a criterion
    /// scores a pair below zero or when the sum for a pair overflows.
    pub fn new(
        mentees: impl Into<Arc<[Mentee]>>,
        mentors: impl Into<Arc<[Mentor]>>,
        criteria: &[Arc<dyn ProgressiveCriterion<Mentee, Mentor>>],
    ) -> Result<Self> {
        let mentees = mentees.into();
        let mentors = mentors.into();
        let columns = mentors.len();
        let mut base_costs = vec![0; mentees.len() * columns];

        if columns > 0 {
            let rows: &[Mentee] = &mentees;
            let cols: &[Mentor] = &mentors;
            base_costs
                .par_chunks_mut(columns)
                .enumerate()
                .try_for_each(|(i, row)| {
                    for (j, cell) in row.iter_mut().enumerate() {
                        *cell = pair_cost(criteria, &rows[i], &cols[j], &PairIndex(i, j))?;
                    }
                    Ok::<(), MatchForgeError>(())
                })?;
        }

        info!(
            event = "cost_matrix_built",
            mentees = mentees.len(),
            mentors = columns,
            criteria = criteria.len(),
        );

        let exclusions = vec![ExclusionReasons::empty(); base_costs.len()];
        Ok(Self {
            mentees,
            mentors,
            base_costs,
            exclusions,
        })
    }

    /// Re-evaluates `criteria` on every pair.
    ///
    /// Sets [`ExclusionReason::ForbiddenByCriteria`] where any criterion fails
    /// and clears it everywhere else, so calling it again with other criteria
    /// leaves nothing stale behind. Manual exclusions are untouched.
    pub fn apply_necessary_criteria(
        &mut self,
        criteria: &[Arc<dyn NecessaryCriterion<Mentee, Mentor>>],
    ) {
        let columns = self.mentors.len();
        if columns == 0 {
            return;
        }
        let rows: &[Mentee] = &self.mentees;
        let cols: &[Mentor] = &self.mentors;
        self.exclusions
            .par_chunks_mut(columns)
            .enumerate()
            .for_each(|(i, row)| {
                for (j, reasons) in row.iter_mut().enumerate() {
                    let viable = criteria
                        .iter()
                        .all(|criterion| criterion.test(&rows[i], &cols[j]));
                    reasons.set(ExclusionReason::ForbiddenByCriteria, !viable);
                }
            });

        debug!(
            event = "necessary_criteria_applied",
            criteria = criteria.len(),
            excluded = self.count(ExclusionReason::ForbiddenByCriteria),
        );
    }
}

impl<Mentee, Mentor> CostMatrix<Mentee, Mentor> {
    pub fn mentees(&self) -> &Arc<[Mentee]> {
        &self.mentees
    }

    pub fn mentors(&self) -> &Arc<[Mentor]> {
        &self.mentors
    }

    pub fn mentee_count(&self) -> usize {
        self.mentees.len()
    }

    pub fn mentor_count(&self) -> usize {
        self.mentors.len()
    }

    /// Manually forbids the pair; returns true if it was not already.
    ///
    /// A pair outside the matrix is left alone and reported as unchanged.
    pub fn forbid(&mut self, mentee: usize, mentor: usize) -> bool {
        self.checked_cell(mentee, mentor).is_some_and(|cell| {
            self.exclusions[cell].insert(ExclusionReason::ManuallyForbidden)
        })
    }

    /// Lifts a manual exclusion; returns true if there was one.
    ///
    /// A pair rejected by a necessary criterion stays excluded. A pair
    /// outside the matrix is reported as unchanged.
    pub fn allow(&mut self, mentee: usize, mentor: usize) -> bool {
        self.checked_cell(mentee, mentor).is_some_and(|cell| {
            self.exclusions[cell].remove(ExclusionReason::ManuallyForbidden)
        })
    }

    /// Lifts every manual exclusion, keeping criteria-derived ones.
    pub fn clear_manual_exclusions(&mut self) {
        for reasons in &mut self.exclusions {
            reasons.remove(ExclusionReason::ManuallyForbidden);
        }
    }

    /// True if nothing excludes the pair. A pair outside the matrix is never
    /// allowed.
    pub fn is_allowed(&self, mentee: usize, mentor: usize) -> bool {
        self.checked_cell(mentee, mentor)
            .is_some_and(|cell| self.exclusions[cell].is_empty())
    }

    /// # Panics
    ///
    /// Panics if either index is out of range, as do [`CostMatrix::base_cost`]
    /// and [`CostMatrix::solver_cost`].
    pub fn exclusion_reasons(&self, mentee: usize, mentor: usize) -> ExclusionReasons {
        self.exclusions[self.cell(mentee, mentor)]
    }

    /// Sum of the progressive criteria for the pair, whether excluded or not.
    pub fn base_cost(&self, mentee: usize, mentor: usize) -> Cost {
        self.base_costs[self.cell(mentee, mentor)]
    }

    /// The cost the solver sees: the base cost, or [`PROHIBITIVE_VALUE`] for
    /// an excluded pair.
    pub fn solver_cost(&self, mentee: usize, mentor: usize) -> Cost {
        let cell = self.cell(mentee, mentor);
        if self.exclusions[cell].is_empty() {
            self.base_costs[cell]
        } else {
            PROHIBITIVE_VALUE
        }
    }

    /// Builds the solver-facing matrix restricted to the given rows and
    /// columns, in the order given.
    pub fn solver_matrix(&self, mentees: &[usize], mentors: &[usize]) -> DenseMatrix {
        DenseMatrix::from_fn(mentees.len(), mentors.len(), |i, j| {
            self.solver_cost(mentees[i], mentors[j])
        })
    }

    /// Solves the whole matrix and returns the solver's raw result.
    pub fn solve(&self, solver: &dyn AssignmentSolver) -> Assignment {
        let mentees: Vec<usize> = (0..self.mentee_count()).collect();
        let mentors: Vec<usize> = (0..self.mentor_count()).collect();
        self.solve_subset(solver, &mentees, &mentors)
    }

    /// Solves the sub-matrix formed by the given rows and columns.
    ///
    /// The result indexes positions in `mentees` and `mentors`, not in the
    /// full matrix.
    pub fn solve_subset(
        &self,
        solver: &dyn AssignmentSolver,
        mentees: &[usize],
        mentors: &[usize],
    ) -> Assignment {
        let matrix = self.solver_matrix(mentees, mentors);
        debug!(
            event = "solver_invoked",
            rows = matrix.rows(),
            columns = matrix.columns(),
        );
        solver.solve(&matrix)
    }

    fn count(&self, reason: ExclusionReason) -> usize {
        self.exclusions
            .iter()
            .filter(|reasons| reasons.contains(reason))
            .count()
    }

    fn checked_cell(&self, mentee: usize, mentor: usize) -> Option<usize> {
        (mentee < self.mentees.len() && mentor < self.mentors.len())
            .then(|| mentee * self.mentors.len() + mentor)
    }

    fn cell(&self, mentee: usize, mentor: usize) -> usize {
        match self.checked_cell(mentee, mentor) {
            Some(cell) => cell,
            None => panic!(
                "pair ({mentee}, {mentor}) out of a {}x{} cost matrix",
                self.mentees.len(),
                self.mentors.len()
            ),
        }
    }
}

impl<Mentee, Mentor> Clone for CostMatrix<Mentee, Mentor> {
    fn clone(&self) -> Self {
        Self {
            mentees: Arc::clone(&self.mentees),
            mentors: Arc::clone(&self.mentors),
            base_costs: self.base_costs.clone(),
            exclusions: self.exclusions.clone(),
        }
    }
}

impl<Mentee, Mentor> fmt::Debug for CostMatrix<Mentee, Mentor> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CostMatrix")
            .field("mentees", &self.mentees.len())
            .field("mentors", &self.mentors.len())
            .field(
                "manually_forbidden",
                &self.count(ExclusionReason::ManuallyForbidden),
            )
            .field(
                "forbidden_by_criteria",
                &self.count(ExclusionReason::ForbiddenByCriteria),
            )
            .finish()
    }
}

struct PairIndex(usize, usize);

impl fmt::Display for PairIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mentee #{} and mentor #{}", self.0, self.1)
    }
}

/// Sums the progressive criteria for one pair, checking every step.
pub(crate) fn pair_cost<Mentee, Mentor>(
    criteria: &[Arc<dyn ProgressiveCriterion<Mentee, Mentor>>],
    mentee: &Mentee,
    mentor: &Mentor,
    pair: &dyn fmt::Display,
) -> Result<Cost> {
    criteria.iter().try_fold(0, |total: Cost, criterion| {
        let score = criterion.score(mentee, mentor);
        if score < 0 {
            return Err(MatchForgeError::InvariantViolation(format!(
                "criterion {} scored {pair} at {score}, scores must not be negative",
                criterion.name()
            )));
        }
        total.checked_add(score).ok_or_else(|| {
            MatchForgeError::InvariantViolation(format!(
                "cost of {pair} overflows after criterion {}",
                criterion.name()
            ))
        })
    })
}
