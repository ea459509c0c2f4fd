//! Tests for the cost matrix engine.

use std::sync::Arc;

use matchforge_core::{
    CriteriaConfiguration, MatchForgeError, NamedCriterion, NecessaryCriteria, ProgressiveCriteria,
    PROHIBITIVE_VALUE,
};
use matchforge_test::{cost_table, deny_pairs, people, ExhaustiveSolver, Person, ScriptedSolver};

use super::{CostMatrix, ExclusionReason};

fn two_by_two() -> CostMatrix<Person, Person> {
    let criteria = CriteriaConfiguration::<Person, Person>::new()
        .with_progressive(cost_table(&[("A", "X", 1), ("A", "Y", 5), ("B", "X", 5), ("B", "Y", 1)]))
        .with_progressive(cost_table(&[("A", "X", 10)]));
    CostMatrix::new(people(&["A", "B"]), people(&["X", "Y"]), criteria.progressive_criteria())
        .unwrap()
}

#[test]
fn test_base_cost_sums_every_criterion() {
    let matrix = two_by_two();

    assert_eq!(matrix.base_cost(0, 0), 11);
    assert_eq!(matrix.base_cost(0, 1), 5);
    assert_eq!(matrix.base_cost(1, 0), 5);
    assert_eq!(matrix.base_cost(1, 1), 1);
}

#[test]
fn test_no_criteria_costs_nothing() {
    let matrix = CostMatrix::new(
        people(&["A", "B", "C"]),
        people(&["X"]),
        &ProgressiveCriteria::new(),
    )
    .unwrap();

    for i in 0..3 {
        assert_eq!(matrix.base_cost(i, 0), 0);
        assert!(matrix.is_allowed(i, 0));
    }
}

#[test]
fn test_negative_score_is_an_invariant_violation() {
    let criteria = CriteriaConfiguration::<Person, Person>::new()
        .with_progressive(cost_table(&[("B", "Y", -2)]));
    let result = CostMatrix::new(
        people(&["A", "B"]),
        people(&["X", "Y"]),
        criteria.progressive_criteria(),
    );

    match result {
        Err(MatchForgeError::InvariantViolation(message)) => {
            assert!(message.contains("cost table"), "{message}");
            assert!(message.contains("mentee #1 and mentor #1"), "{message}");
        }
        other => panic!("expected an invariant violation, got {other:?}"),
    }
}

#[test]
fn test_overflowing_sum_is_an_invariant_violation() {
    let criteria = CriteriaConfiguration::<Person, Person>::new()
        .with_progressive(|_: &Person, _: &Person| i64::MAX - 1)
        .with_progressive(NamedCriterion::new("two", |_: &Person, _: &Person| 2_i64));
    let result = CostMatrix::new(people(&["A"]), people(&["X"]), criteria.progressive_criteria());

    match result {
        Err(MatchForgeError::InvariantViolation(message)) => {
            assert!(message.contains("overflows after criterion two"), "{message}");
        }
        other => panic!("expected an invariant violation, got {other:?}"),
    }
}

#[test]
fn test_empty_populations() {
    let no_mentors =
        CostMatrix::<Person, Person>::new(people(&["A"]), Vec::new(), &ProgressiveCriteria::new())
            .unwrap();
    assert_eq!(no_mentors.mentee_count(), 1);
    assert_eq!(no_mentors.mentor_count(), 0);
    let matrix = no_mentors.solver_matrix(&[0], &[]);
    assert_eq!((matrix.rows(), matrix.columns()), (1, 0));

    let mut no_mentees =
        CostMatrix::<Person, Person>::new(Vec::new(), people(&["X"]), &ProgressiveCriteria::new())
            .unwrap();
    no_mentees.apply_necessary_criteria(&NecessaryCriteria::new());
    assert_eq!(no_mentees.mentee_count(), 0);
}

#[test]
fn test_forbid_and_allow_report_changes() {
    let mut matrix = two_by_two();

    assert!(matrix.forbid(0, 1));
    assert!(!matrix.forbid(0, 1));
    assert!(!matrix.is_allowed(0, 1));

    assert!(matrix.allow(0, 1));
    assert!(!matrix.allow(0, 1));
    assert!(matrix.is_allowed(0, 1));
}

#[test]
fn test_necessary_criteria_are_reevaluated() {
    let mut matrix = two_by_two();
    let deny_ax: NecessaryCriteria<Person, Person> = vec![Arc::new(deny_pairs(&[("A", "X")]))];
    let deny_by: NecessaryCriteria<Person, Person> = vec![Arc::new(deny_pairs(&[("B", "Y")]))];

    matrix.apply_necessary_criteria(&deny_ax);
    matrix.apply_necessary_criteria(&deny_ax);
    assert!(!matrix.is_allowed(0, 0));
    assert!(matrix.is_allowed(1, 1));

    matrix.apply_necessary_criteria(&deny_by);
    assert!(matrix.is_allowed(0, 0));
    assert!(!matrix.is_allowed(1, 1));

    matrix.apply_necessary_criteria(&NecessaryCriteria::new());
    assert!(matrix.is_allowed(1, 1));
}

#[test]
fn test_reasons_are_tracked_separately() {
    let mut matrix = two_by_two();
    let deny_ax: NecessaryCriteria<Person, Person> = vec![Arc::new(deny_pairs(&[("A", "X")]))];
    matrix.apply_necessary_criteria(&deny_ax);
    matrix.forbid(0, 0);
    matrix.forbid(1, 0);

    let reasons = matrix.exclusion_reasons(0, 0);
    assert!(reasons.contains(ExclusionReason::ManuallyForbidden));
    assert!(reasons.contains(ExclusionReason::ForbiddenByCriteria));

    matrix.clear_manual_exclusions();
    assert!(!matrix.is_allowed(0, 0));
    assert!(matrix.is_allowed(1, 0));
    assert!(!matrix
        .exclusion_reasons(0, 0)
        .contains(ExclusionReason::ManuallyForbidden));
}

#[test]
fn test_base_cost_ignores_exclusions() {
    let mut matrix = two_by_two();
    matrix.forbid(1, 1);

    assert_eq!(matrix.base_cost(1, 1), 1);
    assert_eq!(matrix.solver_cost(1, 1), PROHIBITIVE_VALUE);
    assert_eq!(matrix.solver_cost(0, 1), 5);
}

#[test]
fn test_solver_sees_prohibitive_cells() {
    let mut matrix = two_by_two();
    matrix.forbid(0, 0);
    let solver = ScriptedSolver::new(vec![1, 0], vec![1, 0]);

    let assignment = matrix.solve(&solver);

    assert_eq!(assignment.row_assignments(), &[1, 0]);
    assert_eq!(
        solver.last_matrix().unwrap().to_rows(),
        vec![vec![PROHIBITIVE_VALUE, 5], vec![5, 1]]
    );
}

#[test]
fn test_solve_subset_indexes_positions() {
    let criteria = CriteriaConfiguration::<Person, Person>::new().with_progressive(cost_table(&[
        ("A", "Y", 9),
        ("C", "X", 9),
        ("C", "Z", 2),
    ]));
    let matrix = CostMatrix::new(
        people(&["A", "B", "C"]),
        people(&["X", "Y", "Z"]),
        criteria.progressive_criteria(),
    )
    .unwrap();

    let subset = matrix.solver_matrix(&[2, 0], &[0, 1]);
    assert_eq!(subset.to_rows(), vec![vec![9, 0], vec![0, 9]]);

    let assignment = matrix.solve_subset(&ExhaustiveSolver::new(), &[2, 0], &[0, 1]);
    assert_eq!(assignment.row_assignments(), &[1, 0]);
}

#[test]
fn test_clone_is_independent() {
    let matrix = two_by_two();
    let mut copy = matrix.clone();
    copy.forbid(0, 0);

    assert!(matrix.is_allowed(0, 0));
    assert!(!copy.is_allowed(0, 0));
}

#[test]
#[should_panic(expected = "out of a 2x2 cost matrix")]
fn test_out_of_range_pair_panics() {
    two_by_two().base_cost(2, 0);
}

#[test]
fn test_toggles_outside_the_matrix_change_nothing() {
    let mut matrix = two_by_two();

    assert!(!matrix.forbid(2, 0));
    assert!(!matrix.forbid(0, 7));
    assert!(!matrix.allow(5, 5));
    assert!(!matrix.is_allowed(2, 0));
    for i in 0..2 {
        for j in 0..2 {
            assert!(matrix.is_allowed(i, j));
        }
    }
}
