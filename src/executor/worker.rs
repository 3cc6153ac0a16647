// the single worker and its loop
use super::panic_handler::{PanicHandler, PanicStrategy};
use super::queue::{Dequeue, TaskQueue};
use super::task::{Task, TaskInfo, TaskOutcome};
use crate::error::{Error, Result};
use crate::telemetry::SchedulerStats;
use std::cell::RefCell;
use std::sync::{Arc, OnceLock, Weak};
use std::thread::{self, ThreadId};
use std::time::Instant;
use tracing::{debug, trace, warn};

thread_local! {
    // Worker whose loop is running on this thread, if any.
    static CURRENT_WORKER: RefCell<Option<Weak<Worker>>> = RefCell::new(None);
}

/// How `submit` disposed of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Appended to the queue for the worker to pick up.
    Queued,
    /// Run to completion on the caller's stack, which was the worker thread.
    Inlined,
}

pub(crate) struct Worker {
    queue: TaskQueue,
    // written once, by whichever thread becomes the worker
    thread: OnceLock<ThreadId>,
    panic_handler: PanicHandler,
    stats: SchedulerStats,
    name: String,
}

impl Worker {
    pub fn new(name: String, panic_strategy: PanicStrategy) -> Self {
        Self {
            queue: TaskQueue::new(),
            thread: OnceLock::new(),
            panic_handler: PanicHandler::new(panic_strategy),
            stats: SchedulerStats::new(),
            name,
        }
    }

    /// Bind the calling thread as the worker. Fails if any thread, this one
    /// included, was bound before, or if the worker was already disposed.
    pub fn bind_current_thread(&self) -> Result<()> {
        if self.queue.is_cancelled() {
            return Err(Error::Disposed);
        }

        let id = thread::current().id();
        self.thread.set(id).map_err(|_| Error::AlreadyBound)?;

        debug!(worker = %self.name, thread = ?id, "worker thread bound");
        Ok(())
    }

    pub fn thread_id(&self) -> Option<ThreadId> {
        self.thread.get().copied()
    }

    pub fn is_current_thread(&self) -> bool {
        self.thread.get() == Some(&thread::current().id())
    }

    pub fn is_bound(&self) -> bool {
        self.thread.get().is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.queue.is_cancelled()
    }

    // main loop; only ever entered by the bound thread
    pub fn run(self: &Arc<Self>) {
        debug_assert!(self.is_current_thread());
        let _current = CurrentGuard::enter(self);

        debug!(worker = %self.name, "worker loop started");

        loop {
            match self.queue.dequeue() {
                Dequeue::Task(task) => self.execute(task),
                Dequeue::Cancelled => break,
            }
        }

        debug!(
            worker = %self.name,
            abandoned = self.queue.len(),
            "worker loop stopped"
        );
    }

    pub fn submit(&self, task: Box<dyn Task>) -> Submission {
        if self.is_current_thread() {
            trace!(worker = %self.name, task = %task.id(), "running task inline");
            self.stats.record_inlined();
            self.execute(task);
            return Submission::Inlined;
        }

        trace!(worker = %self.name, task = %task.id(), "task queued");
        self.stats.record_queued();
        self.queue.enqueue(task);
        Submission::Queued
    }

    fn execute(&self, task: Box<dyn Task>) {
        let id = task.id();
        let start = Instant::now();

        let result = self.panic_handler.execute(id, move || task.run());

        self.stats.record_busy_time(start.elapsed());

        match result {
            Ok(TaskOutcome::Completed) => self.stats.record_completed(),
            Ok(TaskOutcome::Failed(message)) => {
                warn!(worker = %self.name, task = %id, %message, "task failed");
                self.stats.record_failed();
            }
            Ok(TaskOutcome::Cancelled) => {
                trace!(worker = %self.name, task = %id, "task cancelled before start");
                self.stats.record_cancelled();
            }
            // already reported by the panic handler
            Err(_) => self.stats.record_panic(),
        }
    }

    /// Signal cancellation. Returns `true` for the first call only.
    pub fn dispose(&self) -> bool {
        let first = self.queue.cancel();
        if first {
            debug!(worker = %self.name, pending = self.queue.len(), "scheduler disposed");
        }
        first
    }

    pub fn pending(&self) -> Vec<TaskInfo> {
        self.queue.snapshot()
    }

    /// Drop queued tasks without running them.
    pub fn discard_pending(&self) -> usize {
        let discarded = self.queue.clear();
        if discarded > 0 {
            debug!(worker = %self.name, discarded, "dropped abandoned tasks");
        }
        discarded
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    pub fn panic_count(&self) -> usize {
        self.panic_handler.panic_count()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("name", &self.name)
            .field("thread", &self.thread.get())
            .field("queue", &self.queue)
            .finish()
    }
}

/// The worker whose loop is running on the calling thread.
pub(crate) fn current() -> Option<Arc<Worker>> {
    CURRENT_WORKER.with(|current| current.borrow().as_ref().and_then(Weak::upgrade))
}

struct CurrentGuard {
    previous: Option<Weak<Worker>>,
}

impl CurrentGuard {
    fn enter(worker: &Arc<Worker>) -> Self {
        let previous = CURRENT_WORKER
            .with(|current| current.borrow_mut().replace(Arc::downgrade(worker)));
        CurrentGuard { previous }
    }
}

impl Drop for CurrentGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_WORKER.with(|current| *current.borrow_mut() = previous);
    }
}
