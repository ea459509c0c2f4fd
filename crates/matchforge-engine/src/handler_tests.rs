//! Tests for the builder handler.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use matchforge_core::{ready, CriteriaConfiguration, MatchForgeError, Result, Supplier};
use matchforge_test::{
    cost_table, deny_pairs, people, CountingSupplier, ExhaustiveSolver, Person, SingleUseSupplier,
};

use super::MatchesBuilderHandler;

fn criteria() -> CriteriaConfiguration<Person, Person> {
    CriteriaConfiguration::<Person, Person>::new().with_progressive(cost_table(&[
        ("A", "X", 1),
        ("A", "Y", 5),
        ("B", "X", 5),
        ("B", "Y", 1),
    ]))
}

fn handler() -> MatchesBuilderHandler<Person, Person> {
    MatchesBuilderHandler::new(Arc::new(ExhaustiveSolver::new()), -1)
}

fn configured() -> MatchesBuilderHandler<Person, Person> {
    let handler = handler();
    handler.set_mentees_supplier(ready(people(&["A", "B"])));
    handler.set_mentors_supplier(ready(people(&["X", "Y"])));
    handler.set_criteria_supplier(ready(criteria()));
    handler
}

#[test]
fn test_missing_suppliers_are_named() {
    let handler = handler();
    match handler.get() {
        Err(MatchForgeError::MissingSuppliers(missing)) => assert_eq!(
            missing,
            vec!["mentees supplier", "mentors supplier", "criteria supplier"]
        ),
        other => panic!("expected missing suppliers, got {other:?}"),
    }

    handler.set_mentees_supplier(ready(people(&["A"])));
    handler.set_criteria_supplier(ready(criteria()));
    let error = handler.get().unwrap_err();
    assert_eq!(error, MatchForgeError::MissingSuppliers(vec!["mentors supplier"]));
    assert!(error.to_string().contains("mentors supplier"));
}

#[test]
fn test_get_builds_optimal_matches() {
    let matches = configured().get().unwrap().build().unwrap();

    assert_eq!(matches.total_cost(), 2);
    assert_eq!(matches.len(), 2);
}

#[test]
fn test_second_get_reuses_the_cached_builder() {
    let mentees = SingleUseSupplier::new(people(&["A", "B"]));
    let mentors = SingleUseSupplier::new(people(&["X", "Y"]));
    let criteria = SingleUseSupplier::new(criteria());
    let handler = handler();
    handler.set_mentees_supplier(mentees.supplier());
    handler.set_mentors_supplier(mentors.supplier());
    handler.set_criteria_supplier(criteria.supplier());

    let first = handler.get().unwrap();
    let second = handler.get().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(mentees.calls(), 1);
    assert_eq!(mentors.calls(), 1);
    assert_eq!(criteria.calls(), 1);
}

#[test]
fn test_any_setter_forces_a_rebuild() {
    let mentees = CountingSupplier::new(people(&["A", "B"]));
    let handler = configured();
    handler.set_mentees_supplier(mentees.supplier());

    let first = handler.get().unwrap();
    handler.set_criteria_supplier(ready(criteria()));
    let second = handler.get().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(mentees.calls(), 2);
}

#[test]
fn test_placeholders_must_be_set_together() {
    let handler = configured();
    let first = handler.get().unwrap();

    let result = handler.set_placeholders_supplier(Some(ready(Person::new("nobody"))), None);
    assert!(matches!(result, Err(MatchForgeError::Config(_))));
    let result = handler.set_placeholders_supplier(None, Some(ready(Person::new("M0"))));
    assert!(matches!(result, Err(MatchForgeError::Config(_))));

    assert!(Arc::ptr_eq(&first, &handler.get().unwrap()));
}

#[test]
fn test_placeholders_reach_the_builder() {
    let handler = configured();
    handler.set_mentees_supplier(ready(people(&["A", "B", "C"])));
    handler.set_criteria_supplier(ready(
        criteria().with_necessary(deny_pairs(&[("C", "X"), ("C", "Y")])),
    ));
    handler
        .set_placeholders_supplier(
            Some(ready(Person::new("nobody"))),
            Some(ready(Person::new("M0"))),
        )
        .unwrap();

    let matches = handler.get().unwrap().build().unwrap();
    let c = matches.mentee_match(&Person::new("C")).unwrap();
    assert_eq!(c.mentor(), &Person::new("M0"));
    assert!(c.is_prohibitive());
    assert_eq!(matches.len(), 3);

    handler.set_placeholders_supplier(None, None).unwrap();
    let matches = handler.get().unwrap().build().unwrap();
    assert_eq!(matches.len(), 2);
}

#[test]
fn test_registry_changes_apply_without_resolving_suppliers() {
    let mentees = SingleUseSupplier::new(people(&["A", "B"]));
    let handler = configured();
    handler.set_mentees_supplier(mentees.supplier());
    assert_eq!(handler.get().unwrap().build().unwrap().total_cost(), 2);

    let registry = handler.forbidden_matches();
    registry.forbid(Person::new("A"), Person::new("X"));
    assert_eq!(handler.get().unwrap().build().unwrap().total_cost(), 10);

    registry.allow(&Person::new("A"), &Person::new("X"));
    let builder = handler.get().unwrap();
    assert_eq!(builder.build().unwrap().total_cost(), 2);
    assert!(Arc::ptr_eq(&builder, &handler.get().unwrap()));
    assert_eq!(mentees.calls(), 1);
}

#[test]
fn test_population_change_resets_the_registry() {
    let handler = configured();
    let registry = handler.forbidden_matches();
    registry.forbid(Person::new("A"), Person::new("X"));
    assert!(Arc::ptr_eq(&registry, &handler.forbidden_matches()));

    handler.set_criteria_supplier(ready(criteria()));
    assert!(Arc::ptr_eq(&registry, &handler.forbidden_matches()));

    handler.set_mentors_supplier(ready(people(&["X", "Y"])));
    let fresh = handler.forbidden_matches();
    assert!(!Arc::ptr_eq(&registry, &fresh));
    assert!(fresh.is_empty());
    assert_eq!(handler.get().unwrap().build().unwrap().total_cost(), 2);
}

#[test]
fn test_supplier_failure_is_not_cached() {
    let fail = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&fail);
    let mentors: Supplier<Vec<Person>> = Arc::new(move || -> Result<Vec<Person>> {
        if flag.load(Ordering::SeqCst) {
            Err(MatchForgeError::Interrupted("parsing was cancelled".to_string()))
        } else {
            Ok(people(&["X", "Y"]))
        }
    });
    let handler = configured();
    handler.set_mentors_supplier(mentors);

    assert!(matches!(handler.get(), Err(MatchForgeError::Interrupted(_))));

    fail.store(false, Ordering::SeqCst);
    assert_eq!(handler.get().unwrap().build().unwrap().total_cost(), 2);
}

#[test]
fn test_invariant_violation_aborts_get() {
    let handler = configured();
    let negative =
        CriteriaConfiguration::<Person, Person>::new().with_progressive(cost_table(&[("B", "X", -4)]));
    handler.set_criteria_supplier(ready(negative));

    assert!(matches!(
        handler.get(),
        Err(MatchForgeError::InvariantViolation(_))
    ));
}

#[test]
fn test_stale_build_is_returned_but_not_cached() {
    let barrier = Arc::new(Barrier::new(2));
    let calls = Arc::new(AtomicUsize::new(0));
    let mentees: Supplier<Vec<Person>> = {
        let barrier = Arc::clone(&barrier);
        let calls = Arc::clone(&calls);
        Arc::new(move || -> Result<Vec<Person>> {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                barrier.wait();
                barrier.wait();
            }
            Ok(people(&["A", "B"]))
        })
    };
    let handler = Arc::new(configured());
    handler.set_mentees_supplier(mentees);

    let background = {
        let handler = Arc::clone(&handler);
        thread::spawn(move || handler.get())
    };
    barrier.wait();
    handler.set_criteria_supplier(ready(criteria()));
    barrier.wait();

    let stale = background.join().unwrap().unwrap();
    let current = handler.get().unwrap();

    assert!(!Arc::ptr_eq(&stale, &current));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(Arc::ptr_eq(&current, &handler.get().unwrap()));
}

#[test]
fn test_setters_do_not_wait_for_resolution() {
    let barrier = Arc::new(Barrier::new(2));
    let mentors: Supplier<Vec<Person>> = {
        let barrier = Arc::clone(&barrier);
        Arc::new(move || -> Result<Vec<Person>> {
            barrier.wait();
            barrier.wait();
            Ok(people(&["X", "Y"]))
        })
    };
    let handler = Arc::new(configured());
    handler.set_mentors_supplier(mentors);

    let background = {
        let handler = Arc::clone(&handler);
        thread::spawn(move || handler.get().map(|builder| builder.build()))
    };
    barrier.wait();
    // The resolving thread is parked inside the supplier.
    handler.set_placeholders_supplier(None, None).unwrap();
    handler.forbidden_matches().forbid(Person::new("A"), Person::new("Y"));
    barrier.wait();

    let matches = background.join().unwrap().unwrap().unwrap();
    assert_eq!(matches.len(), 2);
}
