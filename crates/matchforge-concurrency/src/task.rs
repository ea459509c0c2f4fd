//! Handles on submitted tasks.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use matchforge_core::{Deferred, MatchForgeError, Result, Supplier};
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Execution context handed to every task.
///
/// Rust threads cannot be interrupted from outside, so shutdown is
/// cooperative: long tasks should poll [`TaskContext::is_interrupted`] (or
/// call [`TaskContext::check`]) and return early once it turns true.
#[derive(Debug, Clone)]
pub struct TaskContext {
    interrupted: Arc<AtomicBool>,
}

impl TaskContext {
    pub(crate) fn new(interrupted: Arc<AtomicBool>) -> Self {
        Self { interrupted }
    }

    /// Returns true once the executor has been asked to shut down.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Fails with [`MatchForgeError::Interrupted`] once shutdown was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_interrupted() {
            Err(MatchForgeError::Interrupted(
                "executor is shutting down".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

fn cancelled() -> MatchForgeError {
    MatchForgeError::Interrupted("task was dropped before completion".to_string())
}

/// Handle to await the completion of a submitted task.
///
/// The handle can be waited on synchronously with [`TaskHandle::wait`] or
/// awaited as a [`Future`]. A task discarded at shutdown before it started
/// resolves to [`MatchForgeError::Interrupted`]; a task that panicked resolves
/// to [`MatchForgeError::TaskFailed`].
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(receiver: oneshot::Receiver<Result<T>>) -> Self {
        Self { receiver }
    }

    /// Blocks the calling thread until the task completes.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context; await
    /// the handle there instead.
    pub fn wait(self) -> Result<T> {
        self.receiver.blocking_recv().unwrap_or_else(|_| Err(cancelled()))
    }

    /// Returns the outcome if the task already completed, without blocking.
    pub fn try_result(&mut self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(cancelled())),
        }
    }

    /// Converts this handle into a memoized, shareable one.
    pub fn shared(self) -> SharedTask<T> {
        SharedTask::new(self)
    }

    /// Converts this handle into a builder input.
    pub fn into_supplier(self) -> Supplier<T>
    where
        T: Clone + Send + 'static,
    {
        Arc::new(self.shared())
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().receiver)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or_else(|_| Err(cancelled())))
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle").finish_non_exhaustive()
    }
}

struct SharedState<T> {
    pending: Option<TaskHandle<T>>,
    outcome: Option<Result<T>>,
}

/// A task handle whose outcome is computed once and then cloned to every
/// caller.
///
/// The first caller of [`SharedTask::get`] blocks until the task completes;
/// concurrent callers block on the same outcome.
pub struct SharedTask<T> {
    state: Mutex<SharedState<T>>,
}

impl<T> SharedTask<T> {
    fn new(handle: TaskHandle<T>) -> Self {
        Self {
            state: Mutex::new(SharedState {
                pending: Some(handle),
                outcome: None,
            }),
        }
    }
}

impl<T: Clone> SharedTask<T> {
    /// Blocks until the task completes, then returns a copy of its outcome.
    pub fn get(&self) -> Result<T> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = state.pending.take() {
            state.outcome = Some(handle.wait());
        }
        state.outcome.clone().unwrap_or_else(|| Err(cancelled()))
    }
}

impl<T: Clone + Send> Deferred<T> for SharedTask<T> {
    fn resolve(&self) -> Result<T> {
        self.get()
    }
}

impl<T> fmt::Debug for SharedTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved = self
            .state
            .lock()
            .map(|state| state.outcome.is_some())
            .unwrap_or(false);
        f.debug_struct("SharedTask")
            .field("resolved", &resolved)
            .finish()
    }
}
