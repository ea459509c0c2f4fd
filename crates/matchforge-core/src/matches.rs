//! Match results.

use std::slice;

use crate::cost::{is_prohibitive, Cost};

/// An immutable pairing of one mentee with one mentor and its cost.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Match<Mentee, Mentor> {
    mentee: Mentee,
    mentor: Mentor,
    cost: Cost,
}

impl<Mentee, Mentor> Match<Mentee, Mentor> {
    pub fn new(mentee: Mentee, mentor: Mentor, cost: Cost) -> Self {
        Self {
            mentee,
            mentor,
            cost,
        }
    }

    pub fn mentee(&self) -> &Mentee {
        &self.mentee
    }

    pub fn mentor(&self) -> &Mentor {
        &self.mentor
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Returns true when this match carries a prohibitive cost, which is the
    /// case for every placeholder match.
    pub fn is_prohibitive(&self) -> bool {
        is_prohibitive(self.cost)
    }

    pub fn into_parts(self) -> (Mentee, Mentor, Cost) {
        (self.mentee, self.mentor, self.cost)
    }
}

/// Ordered, immutable collection of [`Match`] values.
///
/// # Examples
///
/// ```
/// use matchforge_core::{Match, Matches};
///
/// let matches: Matches<&str, &str> = vec![
///     Match::new("Alice", "Xavier", 1),
///     Match::new("Bob", "Yasmine", 3),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(matches.len(), 2);
/// assert_eq!(matches.mentee_match(&"Bob").map(|m| m.cost()), Some(3));
/// assert_eq!(matches.total_cost(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Matches<Mentee, Mentor> {
    matches: Vec<Match<Mentee, Mentor>>,
}

impl<Mentee, Mentor> Matches<Mentee, Mentor> {
    pub fn new(matches: Vec<Match<Mentee, Mentor>>) -> Self {
        Self { matches }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Match<Mentee, Mentor>> {
        self.matches.iter()
    }

    pub fn as_slice(&self) -> &[Match<Mentee, Mentor>] {
        &self.matches
    }

    /// Sum of the costs of every non-prohibitive match, saturating at
    /// `Cost::MAX`.
    pub fn total_cost(&self) -> Cost {
        self.matches
            .iter()
            .filter(|m| !m.is_prohibitive())
            .fold(0, |total, m| total.saturating_add(m.cost()))
    }
}

impl<Mentee: PartialEq, Mentor: PartialEq> Matches<Mentee, Mentor> {
    /// Returns the first match involving `mentee`.
    pub fn mentee_match(&self, mentee: &Mentee) -> Option<&Match<Mentee, Mentor>> {
        self.matches.iter().find(|m| m.mentee() == mentee)
    }

    /// Returns the first match involving `mentor`.
    pub fn mentor_match(&self, mentor: &Mentor) -> Option<&Match<Mentee, Mentor>> {
        self.matches.iter().find(|m| m.mentor() == mentor)
    }

    pub fn contains_mentee(&self, mentee: &Mentee) -> bool {
        self.mentee_match(mentee).is_some()
    }

    pub fn contains_mentor(&self, mentor: &Mentor) -> bool {
        self.mentor_match(mentor).is_some()
    }
}

impl<Mentee, Mentor> Default for Matches<Mentee, Mentor> {
    fn default() -> Self {
        Self {
            matches: Vec::new(),
        }
    }
}

impl<Mentee, Mentor> FromIterator<Match<Mentee, Mentor>> for Matches<Mentee, Mentor> {
    fn from_iter<I: IntoIterator<Item = Match<Mentee, Mentor>>>(iter: I) -> Self {
        Self {
            matches: iter.into_iter().collect(),
        }
    }
}

impl<Mentee, Mentor> IntoIterator for Matches<Mentee, Mentor> {
    type Item = Match<Mentee, Mentor>;
    type IntoIter = std::vec::IntoIter<Match<Mentee, Mentor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a, Mentee, Mentor> IntoIterator for &'a Matches<Mentee, Mentor> {
    type Item = &'a Match<Mentee, Mentor>;
    type IntoIter = slice::Iter<'a, Match<Mentee, Mentor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::PROHIBITIVE_VALUE;

    fn sample() -> Matches<&'static str, &'static str> {
        Matches::new(vec![
            Match::new("Alice", "Xavier", 2),
            Match::new("Bob", "NO MENTOR", PROHIBITIVE_VALUE),
            Match::new("NO MENTEE", "Yasmine", PROHIBITIVE_VALUE),
        ])
    }

    #[test]
    fn lookups_by_person() {
        let matches = sample();

        assert!(matches.contains_mentee(&"Bob"));
        assert!(matches.contains_mentor(&"Yasmine"));
        assert!(!matches.contains_mentee(&"Carol"));
        assert_eq!(matches.mentor_match(&"Xavier").map(Match::mentee), Some(&"Alice"));
    }

    #[test]
    fn total_cost_skips_prohibitive_matches() {
        assert_eq!(sample().total_cost(), 2);
    }

    #[test]
    fn iteration_preserves_order() {
        let mentees: Vec<_> = sample().iter().map(|m| *m.mentee()).collect();
        assert_eq!(mentees, vec!["Alice", "Bob", "NO MENTEE"]);
    }

    #[test]
    fn empty_matches() {
        let matches = Matches::<u8, u8>::default();
        assert!(matches.is_empty());
        assert_eq!(matches.total_cost(), 0);
    }
}
