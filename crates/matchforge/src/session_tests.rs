//! Tests for the match maker task layer.

use std::sync::Arc;
use std::thread;

use matchforge_config::MatchingConfig;
use matchforge_core::{ready, CriteriaConfiguration, MatchForgeError};
use matchforge_test::{cost_table, deny_pairs, people, ExhaustiveSolver, Person};

use super::MatchMaker;

fn maker() -> MatchMaker<Person, Person> {
    let config = MatchingConfig::new()
        .with_thread_name("match-maker-test")
        .with_shutdown_timeout_ms(1_000);
    let maker = MatchMaker::from_config(&config, Arc::new(ExhaustiveSolver::new()));
    maker.handler().set_mentees_supplier(ready(people(&["A", "B"])));
    maker.handler().set_mentors_supplier(ready(people(&["X", "Y"])));
    let criteria = CriteriaConfiguration::<Person, Person>::new()
        .with_progressive(cost_table(&[
            ("A", "X", 1),
            ("A", "Y", 5),
            ("B", "X", 5),
            ("B", "Y", 1),
        ]))
        .with_necessary(deny_pairs(&[("B", "Z")]));
    maker.handler().set_criteria_supplier(ready(criteria));
    maker
}

#[test]
fn test_make_matches_runs_on_the_worker() {
    let maker = maker();
    let worker_name = maker
        .executor()
        .submit(|_| thread::current().name().map(str::to_string))
        .unwrap()
        .wait()
        .unwrap();

    let matches = maker.make_matches().unwrap().wait().unwrap();

    assert_eq!(worker_name.as_deref(), Some("match-maker-test"));
    assert_eq!(matches.total_cost(), 2);
}

#[test]
fn test_forbid_then_allow_through_the_worker() {
    let maker = maker();

    assert!(maker
        .forbid_match(Person::new("A"), Person::new("X"))
        .unwrap()
        .wait()
        .unwrap());
    let forbidden = maker.make_matches().unwrap();
    assert!(maker
        .allow_match(Person::new("A"), Person::new("X"))
        .unwrap()
        .wait()
        .unwrap());
    let allowed = maker.make_matches().unwrap();

    assert_eq!(forbidden.wait().unwrap().total_cost(), 10);
    assert_eq!(allowed.wait().unwrap().total_cost(), 2);
    assert!(!maker
        .allow_match(Person::new("A"), Person::new("X"))
        .unwrap()
        .wait()
        .unwrap());
}

#[test]
fn test_single_match_errors_reach_the_handle() {
    let maker = maker();

    let single = maker
        .make_single_match(Person::new("A"), Person::new("Y"))
        .unwrap()
        .wait()
        .unwrap();
    assert_eq!(single.cost(), 5);

    let infeasible = maker
        .make_single_match(Person::new("B"), Person::new("Z"))
        .unwrap()
        .wait();
    assert!(matches!(infeasible, Err(MatchForgeError::InfeasiblePair(_))));
}

#[test]
fn test_missing_supplier_fails_the_task_not_the_submission() {
    let maker: MatchMaker<Person, Person> =
        MatchMaker::from_config(&MatchingConfig::default(), Arc::new(ExhaustiveSolver::new()));

    let handle = maker.make_matches().unwrap();

    assert!(matches!(
        handle.wait(),
        Err(MatchForgeError::MissingSuppliers(_))
    ));
}

#[test]
fn test_shutdown_rejects_further_work() {
    let maker = maker();
    maker.make_matches().unwrap().wait().unwrap();

    assert!(maker.shutdown());
    assert!(matches!(
        maker.make_matches(),
        Err(MatchForgeError::RejectedSubmission(_))
    ));
    assert!(matches!(
        maker.clone().forbid_match(Person::new("A"), Person::new("X")),
        Err(MatchForgeError::RejectedSubmission(_))
    ));
}
