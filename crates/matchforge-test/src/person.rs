//! Participant fixture.
//!
//! # Example
//!
//! ```
//! use matchforge_test::person::{people, Person};
//!
//! let mentees = people(&["A", "B"]);
//! assert_eq!(mentees[1], Person::new("B"));
//! ```

use std::fmt;

/// A participant identified by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Person {
    pub name: String,
    pub year: u16,
}

impl Person {
    /// Creates a person with year 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            year: 0,
        }
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = year;
        self
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Creates one person per name, in order.
pub fn people(names: &[&str]) -> Vec<Person> {
    names.iter().map(|name| Person::new(*name)).collect()
}
