//! Table driven criteria.
//!
//! # Example
//!
//! ```
//! use matchforge_core::ProgressiveCriterion;
//! use matchforge_test::{cost_table, Person};
//!
//! let table = cost_table(&[("A", "X", 3)]);
//! assert_eq!(table.score(&Person::new("A"), &Person::new("X")), 3);
//! assert_eq!(table.score(&Person::new("A"), &Person::new("Y")), 0);
//! ```

use std::collections::{HashMap, HashSet};

use matchforge_core::{Cost, NamedCriterion, NecessaryCriterion, ProgressiveCriterion};

use crate::person::Person;

/// Scores pairs by name from a table; pairs not listed cost 0.
pub fn cost_table(entries: &[(&str, &str, Cost)]) -> impl ProgressiveCriterion<Person, Person> {
    let table: HashMap<(String, String), Cost> = entries
        .iter()
        .map(|(mentee, mentor, cost)| ((mentee.to_string(), mentor.to_string()), *cost))
        .collect();
    NamedCriterion::new("cost table", move |mentee: &Person, mentor: &Person| {
        table
            .get(&(mentee.name.clone(), mentor.name.clone()))
            .copied()
            .unwrap_or(0)
    })
}

/// Rejects the listed pairs by name and accepts everything else.
pub fn deny_pairs(pairs: &[(&str, &str)]) -> impl NecessaryCriterion<Person, Person> {
    let denied: HashSet<(String, String)> = pairs
        .iter()
        .map(|(mentee, mentor)| (mentee.to_string(), mentor.to_string()))
        .collect();
    NamedCriterion::new("deny pairs", move |mentee: &Person, mentor: &Person| {
        !denied.contains(&(mentee.name.clone(), mentor.name.clone()))
    })
}
