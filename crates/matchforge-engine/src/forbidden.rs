//! Registry of manually forbidden pairs.
//!
//! The registry knows identities only. Index information is supplied by the
//! caller when the registry is replayed onto a [`CostMatrix`], which is the
//! only way its content reaches a matrix.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::cost_matrix::CostMatrix;

type Registry<Mentee, Mentor> = HashMap<Mentee, HashSet<Mentor>>;

/// Thread-safe mentee to forbidden mentors mapping.
///
/// Every operation runs under the registry's own lock, so pairs can be
/// forbidden or allowed from any thread, including while a replay is in
/// progress elsewhere.
///
/// # Examples
///
/// ```
/// use matchforge_engine::ForbiddenMatches;
///
/// let registry = ForbiddenMatches::new();
/// assert!(registry.forbid("Alice", "Xavier"));
/// assert!(!registry.forbid("Alice", "Xavier"));
/// assert!(registry.allow(&"Alice", &"Xavier"));
/// assert!(registry.is_empty());
/// ```
pub struct ForbiddenMatches<Mentee, Mentor> {
    registry: Mutex<Registry<Mentee, Mentor>>,
    /// Only bumped while `registry` is locked; read without the lock.
    revision: AtomicU64,
}

impl<Mentee, Mentor> ForbiddenMatches<Mentee, Mentor>
where
    Mentee: Eq + Hash,
    Mentor: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(HashMap::new()),
            revision: AtomicU64::new(0),
        }
    }

    /// Forbids the pair; returns true if it was not already forbidden.
    pub fn forbid(&self, mentee: Mentee, mentor: Mentor) -> bool {
        let mut registry = self.lock();
        let added = registry.entry(mentee).or_default().insert(mentor);
        if added {
            self.bump();
        }
        added
    }

    /// Allows a previously forbidden pair; returns true if it was forbidden.
    pub fn allow(&self, mentee: &Mentee, mentor: &Mentor) -> bool {
        let mut registry = self.lock();
        let Some(mentors) = registry.get_mut(mentee) else {
            return false;
        };
        let removed = mentors.remove(mentor);
        if mentors.is_empty() {
            registry.remove(mentee);
        }
        if removed {
            self.bump();
        }
        removed
    }

    pub fn is_forbidden(&self, mentee: &Mentee, mentor: &Mentor) -> bool {
        self.lock()
            .get(mentee)
            .is_some_and(|mentors| mentors.contains(mentor))
    }

    /// Allows every pair; returns how many were forbidden.
    pub fn clear(&self) -> usize {
        let mut registry = self.lock();
        let count = registry.values().map(HashSet::len).sum();
        if count > 0 {
            registry.clear();
            self.bump();
        }
        count
    }

    /// Number of forbidden pairs.
    pub fn len(&self) -> usize {
        self.lock().values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Counter bumped on every change to the set of forbidden pairs.
    ///
    /// Does not take the registry lock, so it never waits for a replay.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Snapshot of the forbidden pairs, in no particular order.
    pub fn pairs(&self) -> Vec<(Mentee, Mentor)>
    where
        Mentee: Clone,
        Mentor: Clone,
    {
        self.lock()
            .iter()
            .flat_map(|(mentee, mentors)| {
                mentors
                    .iter()
                    .map(move |mentor| (mentee.clone(), mentor.clone()))
            })
            .collect()
    }

    /// Replays the registry onto `cost_matrix`.
    ///
    /// Manual exclusions already on the matrix are cleared first, so the
    /// matrix ends up excluding exactly the registered pairs. Identities the
    /// lookups do not resolve are skipped. Returns the revision that was
    /// applied.
    pub fn apply_to<A, B>(
        &self,
        cost_matrix: &mut CostMatrix<A, B>,
        mentee_index: impl Fn(&Mentee) -> Option<usize>,
        mentor_index: impl Fn(&Mentor) -> Option<usize>,
    ) -> u64 {
        let registry = self.lock();
        let revision = self.revision();
        cost_matrix.clear_manual_exclusions();

        let mut applied = 0;
        let mut skipped = 0;
        for (mentee, mentors) in registry.iter() {
            let row = mentee_index(mentee).filter(|&i| i < cost_matrix.mentee_count());
            for mentor in mentors {
                let column = mentor_index(mentor).filter(|&j| j < cost_matrix.mentor_count());
                match (row, column) {
                    (Some(i), Some(j)) => {
                        cost_matrix.forbid(i, j);
                        applied += 1;
                    }
                    _ => skipped += 1,
                }
            }
        }

        if skipped > 0 {
            warn!(
                event = "forbidden_pairs_skipped",
                skipped,
                revision,
            );
        }
        debug!(
            event = "forbidden_matches_applied",
            applied,
            revision,
        );
        revision
    }

    fn lock(&self) -> MutexGuard<'_, Registry<Mentee, Mentor>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }
}

impl<Mentee, Mentor> Default for ForbiddenMatches<Mentee, Mentor>
where
    Mentee: Eq + Hash,
    Mentor: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Mentee, Mentor> fmt::Debug for ForbiddenMatches<Mentee, Mentor>
where
    Mentee: Eq + Hash,
    Mentor: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForbiddenMatches")
            .field("pairs", &self.len())
            .field("revision", &self.revision())
            .finish()
    }
}
