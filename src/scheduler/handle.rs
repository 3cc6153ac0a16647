use crate::error::Result;
use crate::executor::task::{FnTask, Task, TaskHandle, TaskInfo};
use crate::executor::worker::{self, Submission, Worker};
use crate::telemetry::StatsSnapshot;
use std::sync::Arc;
use std::thread::ThreadId;

/// Lifecycle of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No worker thread yet; tasks accumulate in the queue.
    Unbound,
    Running,
    /// Cancellation signaled. The loop exits at its next wait.
    Disposed,
}

/// Cheap, cloneable access to a scheduler from any thread.
///
/// Holding a handle keeps the queue alive but not the worker loop: once the
/// scheduler is disposed, submissions through a handle are queued and never
/// run.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    pub(crate) worker: Arc<Worker>,
}

impl SchedulerHandle {
    pub(crate) fn new(worker: Arc<Worker>) -> Self {
        Self { worker }
    }

    /// Handle to the scheduler whose worker loop is running on this thread.
    pub fn current() -> Option<SchedulerHandle> {
        worker::current().map(SchedulerHandle::new)
    }

    /// Donate the calling thread as the worker and run the loop on it.
    ///
    /// Blocks until the scheduler is disposed. Fails without running anything
    /// if a worker thread is already bound or the scheduler was disposed.
    pub fn run_on_current_thread(&self) -> Result<()> {
        self.worker.bind_current_thread()?;
        self.worker.run();
        Ok(())
    }

    /// Run `task` inline when called from the worker thread, queue it otherwise.
    pub fn submit(&self, task: Box<dyn Task>) -> Submission {
        self.worker.submit(task)
    }

    pub fn submit_fn<F, R>(&self, f: F) -> TaskHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (task, handle) = FnTask::new(f);
        self.worker.submit(Box::new(task));
        handle
    }

    /// Submit a closure whose result nobody waits for.
    pub fn spawn<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let (task, _) = FnTask::new(f);
        self.worker.submit(Box::new(task));
    }

    /// Snapshot of queued tasks. Diagnostic only; stale as soon as it returns.
    pub fn pending_tasks(&self) -> Vec<TaskInfo> {
        self.worker.pending()
    }

    pub fn pending_count(&self) -> usize {
        self.worker.pending_len()
    }

    /// Signal the worker loop to stop. Idempotent and non-blocking.
    pub fn dispose(&self) {
        self.worker.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.worker.is_disposed()
    }

    pub fn state(&self) -> SchedulerState {
        if self.worker.is_disposed() {
            SchedulerState::Disposed
        } else if self.worker.is_bound() {
            SchedulerState::Running
        } else {
            SchedulerState::Unbound
        }
    }

    pub fn worker_thread(&self) -> Option<ThreadId> {
        self.worker.thread_id()
    }

    pub fn is_worker_thread(&self) -> bool {
        self.worker.is_current_thread()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.worker.stats().snapshot()
    }

    /// Number of panics that escaped `Task::run` and were caught by the worker.
    pub fn panic_count(&self) -> usize {
        self.worker.panic_count()
    }

    pub fn name(&self) -> &str {
        self.worker.name()
    }

    /// Whether both handles refer to the same scheduler.
    pub fn same_scheduler(&self, other: &SchedulerHandle) -> bool {
        Arc::ptr_eq(&self.worker, &other.worker)
    }
}
