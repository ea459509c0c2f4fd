//! Suppliers that observe how often they are resolved.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use matchforge_core::{Deferred, MatchForgeError, Result, Supplier};

/// Returns a clone of its value and counts every resolution.
pub struct CountingSupplier<T> {
    value: T,
    calls: AtomicUsize,
}

impl<T: Clone + Send + Sync + 'static> CountingSupplier<T> {
    pub fn new(value: T) -> Arc<Self> {
        Arc::new(Self {
            value,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Coerces a shared handle into a [`Supplier`].
    pub fn supplier(self: &Arc<Self>) -> Supplier<T> {
        Arc::clone(self) as Supplier<T>
    }
}

impl<T: Clone + Send + Sync> Deferred<T> for CountingSupplier<T> {
    fn resolve(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value.clone())
    }
}

/// Resolves once, then fails on every later call.
pub struct SingleUseSupplier<T> {
    inner: Arc<CountingSupplier<T>>,
}

impl<T: Clone + Send + Sync + 'static> SingleUseSupplier<T> {
    pub fn new(value: T) -> Arc<Self> {
        Arc::new(Self {
            inner: CountingSupplier::new(value),
        })
    }

    pub fn calls(&self) -> usize {
        self.inner.calls()
    }

    pub fn supplier(self: &Arc<Self>) -> Supplier<T> {
        Arc::clone(self) as Supplier<T>
    }
}

impl<T: Clone + Send + Sync + 'static> Deferred<T> for SingleUseSupplier<T> {
    fn resolve(&self) -> Result<T> {
        if self.inner.calls() > 0 {
            return Err(MatchForgeError::Config(
                "single-use supplier resolved twice".to_string(),
            ));
        }
        self.inner.resolve()
    }
}
