//! Deferred values produced upstream and resolved on demand.
//!
//! Builders are fed from background work (parsing, configuration loading).
//! A [`Deferred`] stands for such a value: resolving it may block until the
//! producer is done, and may be done several times.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// A value that may not be available yet.
///
/// Implementations must tolerate repeated calls to [`Deferred::resolve`] from
/// any thread. Any closure `Fn() -> Result<T>` is a deferred value.
pub trait Deferred<T>: Send + Sync {
    /// Blocks until the value is available, then returns a copy of it.
    fn resolve(&self) -> Result<T>;
}

/// Shared handle on a deferred value, as stored by builder handlers.
pub type Supplier<T> = Arc<dyn Deferred<T>>;

impl<T, F> Deferred<T> for F
where
    F: Fn() -> Result<T> + Send + Sync,
{
    fn resolve(&self) -> Result<T> {
        self()
    }
}

/// A deferred value that is already available.
#[derive(Clone)]
pub struct Ready<T>(T);

impl<T> Ready<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }
}

impl<T: Clone + Send + Sync> Deferred<T> for Ready<T> {
    fn resolve(&self) -> Result<T> {
        Ok(self.0.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for Ready<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ready").field(&self.0).finish()
    }
}

/// Wraps an available value into a [`Supplier`].
///
/// # Examples
///
/// ```
/// use matchforge_core::{ready, Deferred};
///
/// let mentees = ready(vec!["Alice", "Bob"]);
/// assert_eq!(mentees.resolve().unwrap(), vec!["Alice", "Bob"]);
/// ```
pub fn ready<T>(value: T) -> Supplier<T>
where
    T: Clone + Send + Sync + 'static,
{
    Arc::new(Ready(value))
}
