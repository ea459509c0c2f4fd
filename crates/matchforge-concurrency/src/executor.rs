//! Managed single-worker executor.
//!
//! A [`ConcurrencyHandler`] lazily creates exactly one worker thread on the
//! first submission. All tasks run sequentially on that thread, so the
//! submitting thread never blocks on `submit` itself. The handler is meant to
//! be constructed once and shared by reference (usually an `Arc`) with every
//! component that needs background execution.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use matchforge_config::ExecutorConfig;
use matchforge_core::{MatchForgeError, Result};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::task::{TaskContext, TaskHandle};

type Job = Box<dyn FnOnce(&TaskContext) + Send + 'static>;

enum ExecutorState {
    /// No task was ever submitted.
    Idle,
    Running(Worker),
    ShutDown,
}

struct Worker {
    jobs: Sender<Job>,
    interrupted: Arc<AtomicBool>,
    /// Disconnected once the worker thread leaves its loop.
    terminated: Receiver<()>,
    thread: JoinHandle<()>,
}

impl Worker {
    fn spawn(config: &ExecutorConfig) -> Result<Self> {
        if config.thread_name.contains('\0') {
            return Err(rejected("worker thread name contains a NUL byte"));
        }
        let (jobs, queue) = channel::unbounded::<Job>();
        let (done, terminated) = channel::bounded::<()>(0);
        let interrupted = Arc::new(AtomicBool::new(false));
        let context = TaskContext::new(Arc::clone(&interrupted));

        let thread = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                let _done = done;
                for job in queue.iter() {
                    if context.is_interrupted() {
                        // Dropping the job resolves its handle as interrupted.
                        continue;
                    }
                    job(&context);
                }
            })
            .map_err(|e| {
                MatchForgeError::RejectedSubmission(format!("cannot start worker thread: {e}"))
            })?;

        info!(event = "worker_started", thread = %config.thread_name);

        Ok(Self {
            jobs,
            interrupted,
            terminated,
            thread,
        })
    }

    /// Interrupts the worker and waits up to `timeout` for it to terminate.
    ///
    /// Called from the worker thread itself, this only signals the worker:
    /// it stops once the current task returns, so nothing is waited for and
    /// the result is false.
    fn stop(self, timeout: Duration) -> bool {
        let Worker {
            jobs,
            interrupted,
            terminated,
            thread,
        } = self;

        interrupted.store(true, Ordering::SeqCst);
        drop(jobs);

        if thread.thread().id() == thread::current().id() {
            info!(event = "executor_shutdown", terminated = false, from_worker = true);
            return false;
        }

        match terminated.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = thread.join();
                info!(event = "executor_shutdown", terminated = true);
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    event = "executor_shutdown",
                    terminated = false,
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "worker still busy after shutdown timeout"
                );
                false
            }
        }
    }
}

/// Lazily started, gracefully shut down single-worker executor.
///
/// # Example
///
/// ```
/// use matchforge_concurrency::ConcurrencyHandler;
/// use matchforge_config::ExecutorConfig;
///
/// let executor = ConcurrencyHandler::new(ExecutorConfig::default());
/// let handle = executor.submit(|_ctx| 6 * 7).unwrap();
/// assert_eq!(handle.wait().unwrap(), 42);
///
/// assert!(executor.shutdown(1_000).unwrap());
/// assert!(executor.submit(|_ctx| ()).is_err());
/// ```
pub struct ConcurrencyHandler {
    config: ExecutorConfig,
    state: Mutex<ExecutorState>,
}

impl ConcurrencyHandler {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ExecutorState::Idle),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ExecutorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submits a task for background execution.
    ///
    /// The worker thread is created on the first call.
    ///
    /// # Errors
    ///
    /// Returns [`MatchForgeError::RejectedSubmission`] if the executor has been
    /// shut down, including when it was shut down before ever starting.
    pub fn submit<T, F>(&self, task: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce(&TaskContext) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit_fallible(move |context| Ok(task(context)))
    }

    /// Submits a task that can fail.
    ///
    /// An error returned by the task resolves the handle like a panic or an
    /// interruption would, so callers see a single [`Result`].
    ///
    /// # Errors
    ///
    /// Same as [`ConcurrencyHandler::submit`].
    pub fn submit_fallible<T, F>(&self, task: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce(&TaskContext) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let job: Job = Box::new(move |context| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| task(context)))
                .unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    warn!(event = "task_panicked", message = %message);
                    Err(MatchForgeError::TaskFailed(message))
                });
            // The caller may have dropped its handle.
            let _ = sender.send(outcome);
        });

        let mut state = self.lock_state();
        if let ExecutorState::Idle = *state {
            *state = ExecutorState::Running(Worker::spawn(&self.config)?);
        }
        match &*state {
            ExecutorState::Running(worker) => worker
                .jobs
                .send(job)
                .map_err(|_| rejected("worker thread has stopped"))?,
            _ => return Err(rejected("Tried to perform task on shutdown service")),
        }
        debug!(event = "task_submitted");

        Ok(TaskHandle::new(receiver))
    }

    /// Shuts the executor down.
    ///
    /// After this call every submission is rejected. If a worker was started,
    /// running tasks are interrupted, queued tasks are discarded, and the call
    /// blocks up to `timeout_millis` waiting for the worker to terminate. If no
    /// worker was ever started this only marks the executor as shut down.
    ///
    /// Returns whether the worker terminated within the timeout. Called from a
    /// task running on the worker, it does not wait and returns false.
    ///
    /// # Errors
    ///
    /// Returns [`MatchForgeError::Config`] if `timeout_millis` is negative; the
    /// executor is left untouched in that case.
    pub fn shutdown(&self, timeout_millis: i64) -> Result<bool> {
        let timeout = u64::try_from(timeout_millis)
            .map(Duration::from_millis)
            .map_err(|_| {
                MatchForgeError::Config(format!(
                    "Tried to shut down with timeout {timeout_millis} ms, should be positive"
                ))
            })?;
        Ok(self.shutdown_within(timeout))
    }

    /// Same as [`ConcurrencyHandler::shutdown`] with a typed timeout.
    pub fn shutdown_within(&self, timeout: Duration) -> bool {
        let previous = std::mem::replace(&mut *self.lock_state(), ExecutorState::ShutDown);
        match previous {
            ExecutorState::Running(worker) => worker.stop(timeout),
            ExecutorState::Idle => {
                info!(event = "executor_shutdown", started = false);
                true
            }
            ExecutorState::ShutDown => true,
        }
    }

    /// Returns true once [`ConcurrencyHandler::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        matches!(*self.lock_state(), ExecutorState::ShutDown)
    }

    /// Returns true while a worker thread is alive and accepting tasks.
    pub fn is_running(&self) -> bool {
        matches!(*self.lock_state(), ExecutorState::Running(_))
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }
}

impl Default for ConcurrencyHandler {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

impl Drop for ConcurrencyHandler {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let ExecutorState::Running(worker) = std::mem::replace(state, ExecutorState::ShutDown) {
            worker.stop(self.config.shutdown_timeout());
        }
    }
}

impl fmt::Debug for ConcurrencyHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match *self.lock_state() {
            ExecutorState::Idle => "idle",
            ExecutorState::Running(_) => "running",
            ExecutorState::ShutDown => "shut down",
        };
        f.debug_struct("ConcurrencyHandler")
            .field("thread_name", &self.config.thread_name)
            .field("status", &status)
            .finish()
    }
}

fn rejected(reason: &str) -> MatchForgeError {
    MatchForgeError::RejectedSubmission(reason.to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}
