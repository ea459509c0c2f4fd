//! Criterion contracts consumed from configuration.
//!
//! A criterion compares one mentee with one mentor. Criteria need not be
//! symmetric (and often cannot be, when `Mentee` and `Mentor` are different
//! types), but they must be stable: given unchanged inputs, a criterion always
//! returns the same value.

use std::fmt;
use std::sync::Arc;

use crate::cost::Cost;

/// A hard, pass/fail rule that must hold for a pairing to be viable.
///
/// Any closure `Fn(&Mentee, &Mentor) -> bool` is a necessary criterion.
///
/// # Examples
///
/// ```
/// use matchforge_core::NecessaryCriterion;
///
/// let same_year = |mentee: &u16, mentor: &u16| mentee == mentor;
/// let criterion: &dyn NecessaryCriterion<u16, u16> = &same_year;
/// assert!(criterion.test(&2021, &2021));
/// assert!(!criterion.test(&2021, &2019));
/// ```
pub trait NecessaryCriterion<Mentee, Mentor>: Send + Sync {
    /// Returns true when the pair may be matched.
    fn test(&self, mentee: &Mentee, mentor: &Mentor) -> bool;

    /// Label used in error messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A soft rule contributing to the cost of a pairing.
///
/// The higher the score, the less viable the pairing. Every call must return a
/// value greater than or equal to zero; the engine rejects negative scores.
pub trait ProgressiveCriterion<Mentee, Mentor>: Send + Sync {
    /// Returns the (non-negative) cost contribution of the pair.
    fn score(&self, mentee: &Mentee, mentor: &Mentor) -> Cost;

    /// Label used in error messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<Mentee, Mentor, F> NecessaryCriterion<Mentee, Mentor> for F
where
    F: Fn(&Mentee, &Mentor) -> bool + Send + Sync,
{
    fn test(&self, mentee: &Mentee, mentor: &Mentor) -> bool {
        self(mentee, mentor)
    }
}

impl<Mentee, Mentor, F> ProgressiveCriterion<Mentee, Mentor> for F
where
    F: Fn(&Mentee, &Mentor) -> Cost + Send + Sync,
{
    fn score(&self, mentee: &Mentee, mentor: &Mentor) -> Cost {
        self(mentee, mentor)
    }
}

/// Wraps a criterion with a human-readable label.
///
/// # Examples
///
/// ```
/// use matchforge_core::{NamedCriterion, ProgressiveCriterion};
///
/// let age_gap = NamedCriterion::new("age gap", |a: &u32, b: &u32| i64::from(a.abs_diff(*b)));
/// let criterion: &dyn ProgressiveCriterion<u32, u32> = &age_gap;
/// assert_eq!(criterion.name(), "age gap");
/// assert_eq!(criterion.score(&30, &45), 15);
/// ```
#[derive(Clone)]
pub struct NamedCriterion<C> {
    name: String,
    criterion: C,
}

impl<C> NamedCriterion<C> {
    pub fn new(name: impl Into<String>, criterion: C) -> Self {
        Self {
            name: name.into(),
            criterion,
        }
    }
}

impl<C> fmt::Debug for NamedCriterion<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedCriterion")
            .field("name", &self.name)
            .finish()
    }
}

impl<Mentee, Mentor, C> NecessaryCriterion<Mentee, Mentor> for NamedCriterion<C>
where
    C: NecessaryCriterion<Mentee, Mentor>,
{
    fn test(&self, mentee: &Mentee, mentor: &Mentor) -> bool {
        self.criterion.test(mentee, mentor)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<Mentee, Mentor, C> ProgressiveCriterion<Mentee, Mentor> for NamedCriterion<C>
where
    C: ProgressiveCriterion<Mentee, Mentor>,
{
    fn score(&self, mentee: &Mentee, mentor: &Mentor) -> Cost {
        self.criterion.score(mentee, mentor)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Shared collection of necessary criteria.
pub type NecessaryCriteria<Mentee, Mentor> = Vec<Arc<dyn NecessaryCriterion<Mentee, Mentor>>>;

/// Shared collection of progressive criteria.
pub type ProgressiveCriteria<Mentee, Mentor> = Vec<Arc<dyn ProgressiveCriterion<Mentee, Mentor>>>;

/// The full set of criteria used to match one population against another.
///
/// Cloning is cheap: criteria are reference counted.
pub struct CriteriaConfiguration<Mentee, Mentor> {
    progressive: ProgressiveCriteria<Mentee, Mentor>,
    necessary: NecessaryCriteria<Mentee, Mentor>,
}

impl<Mentee, Mentor> CriteriaConfiguration<Mentee, Mentor> {
    /// Creates an empty configuration: every pair costs 0 and is allowed.
    pub fn new() -> Self {
        Self {
            progressive: Vec::new(),
            necessary: Vec::new(),
        }
    }

    /// Creates a configuration from already shared criteria.
    pub fn from_parts(
        progressive: ProgressiveCriteria<Mentee, Mentor>,
        necessary: NecessaryCriteria<Mentee, Mentor>,
    ) -> Self {
        Self {
            progressive,
            necessary,
        }
    }

    /// Adds a progressive criterion.
    pub fn with_progressive<C>(mut self, criterion: C) -> Self
    where
        C: ProgressiveCriterion<Mentee, Mentor> + 'static,
    {
        self.progressive.push(Arc::new(criterion));
        self
    }

    /// Adds a necessary criterion.
    pub fn with_necessary<C>(mut self, criterion: C) -> Self
    where
        C: NecessaryCriterion<Mentee, Mentor> + 'static,
    {
        self.necessary.push(Arc::new(criterion));
        self
    }

    pub fn progressive_criteria(&self) -> &ProgressiveCriteria<Mentee, Mentor> {
        &self.progressive
    }

    pub fn necessary_criteria(&self) -> &NecessaryCriteria<Mentee, Mentor> {
        &self.necessary
    }
}

impl<Mentee, Mentor> Default for CriteriaConfiguration<Mentee, Mentor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Mentee, Mentor> Clone for CriteriaConfiguration<Mentee, Mentor> {
    fn clone(&self) -> Self {
        Self {
            progressive: self.progressive.clone(),
            necessary: self.necessary.clone(),
        }
    }
}

impl<Mentee, Mentor> fmt::Debug for CriteriaConfiguration<Mentee, Mentor> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let progressive: Vec<&str> = self.progressive.iter().map(|c| c.name()).collect();
        let necessary: Vec<&str> = self.necessary.iter().map(|c| c.name()).collect();
        f.debug_struct("CriteriaConfiguration")
            .field("progressive", &progressive)
            .field("necessary", &necessary)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_criteria() {
        let config = CriteriaConfiguration::<u32, u32>::new()
            .with_progressive(|a: &u32, b: &u32| i64::from(a + b))
            .with_necessary(|a: &u32, b: &u32| a != b);

        assert_eq!(config.progressive_criteria().len(), 1);
        assert_eq!(config.necessary_criteria().len(), 1);
        assert_eq!(config.progressive_criteria()[0].score(&2, &3), 5);
        assert!(!config.necessary_criteria()[0].test(&4, &4));
    }

    #[test]
    fn named_criterion_reports_its_label() {
        let config = CriteriaConfiguration::<u32, u32>::new()
            .with_necessary(NamedCriterion::new("distinct", |a: &u32, b: &u32| a != b));

        assert_eq!(config.necessary_criteria()[0].name(), "distinct");
        assert!(format!("{config:?}").contains("distinct"));
    }

    #[test]
    fn clone_shares_criteria() {
        let config = CriteriaConfiguration::<u32, u32>::new()
            .with_progressive(|_: &u32, _: &u32| 1_i64);
        let copy = config.clone();

        assert!(Arc::ptr_eq(
            &config.progressive_criteria()[0],
            &copy.progressive_criteria()[0]
        ));
    }
}
