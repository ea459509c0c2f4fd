//! Why a pair is excluded from matching.

use std::fmt;

/// A single reason for excluding a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionReason {
    /// Forbidden through the registry of forbidden matches.
    ManuallyForbidden,
    /// Rejected by at least one necessary criterion.
    ForbiddenByCriteria,
}

impl ExclusionReason {
    pub const ALL: [ExclusionReason; 2] = [
        ExclusionReason::ManuallyForbidden,
        ExclusionReason::ForbiddenByCriteria,
    ];

    const fn bit(self) -> u8 {
        match self {
            ExclusionReason::ManuallyForbidden => 0b01,
            ExclusionReason::ForbiddenByCriteria => 0b10,
        }
    }
}

/// Set of [`ExclusionReason`]s stored per cell.
///
/// A pair is allowed exactly when the set is empty. Both reasons are tracked
/// independently so that clearing one never resurrects a pair excluded by the
/// other.
///
/// # Examples
///
/// ```
/// use matchforge_engine::{ExclusionReason, ExclusionReasons};
///
/// let mut reasons = ExclusionReasons::empty();
/// assert!(reasons.insert(ExclusionReason::ManuallyForbidden));
/// assert!(reasons.insert(ExclusionReason::ForbiddenByCriteria));
/// reasons.remove(ExclusionReason::ManuallyForbidden);
/// assert!(!reasons.is_empty());
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExclusionReasons(u8);

impl ExclusionReasons {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, reason: ExclusionReason) -> bool {
        self.0 & reason.bit() != 0
    }

    /// Adds `reason`; returns true if it was not present.
    pub fn insert(&mut self, reason: ExclusionReason) -> bool {
        let added = !self.contains(reason);
        self.0 |= reason.bit();
        added
    }

    /// Removes `reason`; returns true if it was present.
    pub fn remove(&mut self, reason: ExclusionReason) -> bool {
        let removed = self.contains(reason);
        self.0 &= !reason.bit();
        removed
    }

    pub fn set(&mut self, reason: ExclusionReason, present: bool) {
        if present {
            self.insert(reason);
        } else {
            self.remove(reason);
        }
    }

    pub fn iter(self) -> impl Iterator<Item = ExclusionReason> {
        ExclusionReason::ALL
            .into_iter()
            .filter(move |reason| self.contains(*reason))
    }
}

impl From<ExclusionReason> for ExclusionReasons {
    fn from(reason: ExclusionReason) -> Self {
        Self(reason.bit())
    }
}

impl fmt::Debug for ExclusionReasons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_are_independent() {
        let mut reasons = ExclusionReasons::from(ExclusionReason::ForbiddenByCriteria);
        assert!(!reasons.remove(ExclusionReason::ManuallyForbidden));
        assert!(reasons.contains(ExclusionReason::ForbiddenByCriteria));

        reasons.set(ExclusionReason::ManuallyForbidden, true);
        reasons.set(ExclusionReason::ForbiddenByCriteria, false);
        assert_eq!(
            reasons.iter().collect::<Vec<_>>(),
            vec![ExclusionReason::ManuallyForbidden]
        );
    }

    #[test]
    fn insert_reports_novelty() {
        let mut reasons = ExclusionReasons::empty();
        assert!(reasons.insert(ExclusionReason::ManuallyForbidden));
        assert!(!reasons.insert(ExclusionReason::ManuallyForbidden));
        assert_eq!(format!("{reasons:?}"), "{ManuallyForbidden}");
    }
}
