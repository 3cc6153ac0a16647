//! Task representation and the bundled closure-based task.
//!
//! The scheduler only sees `Box<dyn Task>`: something it can run once and
//! identify in diagnostics. Recording the result somewhere a waiter can find
//! it is the task's own business. [`FnTask`] is the implementation shipped
//! with the crate; it reports through a [`TaskHandle`].

use super::panic_handler::panic_message;
use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Allocate the next process-wide task id.
    pub fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a task's run ended, as reported back to the scheduler.
///
/// Used for accounting and logging only. Waiters learn the outcome through
/// whatever completion channel the task itself carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed(String),
    Cancelled,
}

/// A unit of work the scheduler can run exactly once.
pub trait Task: Send + 'static {
    fn id(&self) -> TaskId;

    /// Optional label shown in pending-task snapshots.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Run the body and record its result in the task's completion slot.
    fn run(self: Box<Self>) -> TaskOutcome;
}

/// Diagnostic view of a queued task.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub id: TaskId,
    pub name: Option<String>,
    pub queued_at: Instant,
}

impl TaskInfo {
    /// How long the task has been waiting in the queue.
    pub fn waiting_for(&self) -> Duration {
        self.queued_at.elapsed()
    }
}

// Sending half of a task's result. Marks the task finished when it goes away,
// whether or not a result was sent first.
struct Completion<R> {
    tx: Sender<Result<R>>,
    finished: Arc<AtomicBool>,
}

impl<R> Completion<R> {
    fn complete(self, result: Result<R>) {
        // the waiter may have dropped its handle; nobody to tell in that case
        let _ = self.tx.send(result);
    }
}

impl<R> Drop for Completion<R> {
    fn drop(&mut self) {
        self.finished.store(true, Ordering::Release);
    }
}

/// Closure-backed task whose result is delivered to a [`TaskHandle`].
pub struct FnTask<F, R> {
    id: TaskId,
    name: Option<String>,
    func: F,
    completion: Completion<R>,
    cancelled: Arc<AtomicBool>,
}

impl<F, R> FnTask<F, R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    pub fn new(func: F) -> (Self, TaskHandle<R>) {
        Self::build(None, func)
    }

    pub fn named<S: Into<String>>(name: S, func: F) -> (Self, TaskHandle<R>) {
        Self::build(Some(name.into()), func)
    }

    fn build(name: Option<String>, func: F) -> (Self, TaskHandle<R>) {
        let id = TaskId::next();
        let (tx, rx) = bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));

        let task = FnTask {
            id,
            name,
            func,
            completion: Completion {
                tx,
                finished: finished.clone(),
            },
            cancelled: cancelled.clone(),
        };
        let handle = TaskHandle {
            id,
            rx,
            cancelled,
            finished,
        };

        (task, handle)
    }
}

impl<F, R> Task for FnTask<F, R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    fn id(&self) -> TaskId {
        self.id
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn run(self: Box<Self>) -> TaskOutcome {
        let FnTask {
            func,
            completion,
            cancelled,
            ..
        } = *self;

        if cancelled.load(Ordering::Acquire) {
            completion.complete(Err(Error::Cancelled));
            return TaskOutcome::Cancelled;
        }

        match catch_unwind(AssertUnwindSafe(func)) {
            Ok(value) => {
                completion.complete(Ok(value));
                TaskOutcome::Completed
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                completion.complete(Err(Error::task_failed(message.clone())));
                TaskOutcome::Failed(message)
            }
        }
    }
}

impl<F, R> fmt::Debug for FnTask<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTask")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("cancelled", &self.cancelled.load(Ordering::Relaxed))
            .field("finished", &self.completion.finished.load(Ordering::Relaxed))
            .finish()
    }
}

/// Receiving side of an [`FnTask`].
///
/// A task dropped without running (for example one abandoned in the queue of
/// a disposed scheduler) resolves to [`Error::Abandoned`].
#[derive(Debug)]
pub struct TaskHandle<R> {
    id: TaskId,
    rx: Receiver<Result<R>>,
    cancelled: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl<R> TaskHandle<R> {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Block until the task has run or been dropped.
    pub fn join(self) -> Result<R> {
        self.rx.recv().unwrap_or(Err(Error::Abandoned))
    }

    pub fn join_timeout(&self, timeout: Duration) -> Result<R> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(Error::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(Error::Abandoned),
        }
    }

    /// Non-blocking poll; `None` while the task is still pending.
    pub fn try_join(&self) -> Option<Result<R>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::Abandoned)),
        }
    }

    /// Whether the task has run, been skipped as cancelled, or been dropped.
    /// Once `true`, `try_join` no longer returns `None` (until the result is taken).
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Ask the task not to run its body. Has no effect once it has started.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
