//! Pairing cost and the prohibitive sentinel.

/// Cost of pairing a mentee with a mentor. Lower is better.
pub type Cost = i64;

/// A cost such that every candidate match carrying it is considered invalid.
///
/// Cells the solver must never select are fed to it with this value.
pub const PROHIBITIVE_VALUE: Cost = Cost::MAX;

/// Returns true when `cost` must be treated as "never select".
///
/// Any value at or above [`PROHIBITIVE_VALUE`] qualifies, not only the exact
/// sentinel.
///
/// # Examples
///
/// ```
/// use matchforge_core::{is_prohibitive, PROHIBITIVE_VALUE};
///
/// assert!(is_prohibitive(PROHIBITIVE_VALUE));
/// assert!(!is_prohibitive(42));
/// ```
#[inline]
pub fn is_prohibitive(cost: Cost) -> bool {
    cost >= PROHIBITIVE_VALUE
}
