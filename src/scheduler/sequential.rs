use super::handle::{SchedulerHandle, SchedulerState};
use crate::config::{Config, ThreadMode};
use crate::error::{Error, Result};
use crate::executor::panic_handler::panic_message;
use crate::executor::task::{Task, TaskHandle, TaskInfo};
use crate::executor::worker::{Submission, Worker};
use crate::telemetry::StatsSnapshot;
use crossbeam_channel::bounded;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use tracing::debug;

/// Runs every submitted task on one thread, one at a time, in submission order.
///
/// Tasks submitted from the worker thread itself run inline, so a task may
/// submit nested work and wait for it without deadlocking the worker.
///
/// Dropping the scheduler disposes it and drops any tasks still queued, but
/// does not wait for the worker thread; use [`join`](Self::join) for that.
pub struct SequentialScheduler {
    handle: SchedulerHandle,
    thread: Mutex<Option<JoinHandle<()>>>,
    mode: ThreadMode,
}

impl SequentialScheduler {
    /// `true` spawns a dedicated worker thread now; `false` waits for a
    /// caller to donate one through [`run_on_current_thread`](Self::run_on_current_thread).
    pub fn new(bind_own_thread: bool) -> Result<Self> {
        let config = Config {
            thread_mode: ThreadMode::from_bind_own_thread(bind_own_thread),
            ..Config::default()
        };
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let worker = Arc::new(Worker::new(
            config.thread_name.clone(),
            config.panic_strategy,
        ));

        let thread = match config.thread_mode {
            ThreadMode::Owned => Some(spawn_worker(&worker, &config)?),
            ThreadMode::Donated => None,
        };

        Ok(Self {
            handle: SchedulerHandle::new(worker),
            thread: Mutex::new(thread),
            mode: config.thread_mode,
        })
    }

    /// Donate the calling thread as the worker. Blocks until disposed.
    ///
    /// Fails with [`Error::AlreadyBound`] if a thread is already bound
    /// (including the scheduler's own thread) and with [`Error::Disposed`]
    /// after [`dispose`](Self::dispose).
    pub fn run_on_current_thread(&self) -> Result<()> {
        self.handle.run_on_current_thread()
    }

    pub fn submit(&self, task: Box<dyn Task>) -> Submission {
        self.handle.submit(task)
    }

    pub fn submit_fn<F, R>(&self, f: F) -> TaskHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.handle.submit_fn(f)
    }

    pub fn spawn<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.spawn(f)
    }

    pub fn pending_tasks(&self) -> Vec<TaskInfo> {
        self.handle.pending_tasks()
    }

    /// Signal cancellation. Idempotent; does not wait for the worker to exit.
    ///
    /// The task currently running, if any, finishes. Queued tasks are left
    /// in the queue and never run.
    pub fn dispose(&self) {
        self.handle.dispose();
    }

    /// Wait for the owned worker thread to exit.
    ///
    /// Only meaningful after [`dispose`](Self::dispose); otherwise blocks for
    /// as long as the worker keeps running.
    pub fn join(&self) -> Result<()> {
        if self.mode != ThreadMode::Owned {
            return Err(Error::NotOwned);
        }
        if self.handle.is_worker_thread() {
            return Err(Error::JoinFromWorker);
        }

        let thread = self.thread.lock().take();
        match thread {
            Some(thread) => thread
                .join()
                .map_err(|payload| Error::WorkerPanic(panic_message(payload.as_ref()))),
            // already joined
            None => Ok(()),
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> SchedulerState {
        self.handle.state()
    }

    pub fn is_disposed(&self) -> bool {
        self.handle.is_disposed()
    }

    pub fn worker_thread(&self) -> Option<ThreadId> {
        self.handle.worker_thread()
    }

    pub fn is_worker_thread(&self) -> bool {
        self.handle.is_worker_thread()
    }

    pub fn thread_mode(&self) -> ThreadMode {
        self.mode
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.handle.stats()
    }
}

impl std::fmt::Debug for SequentialScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialScheduler")
            .field("name", &self.handle.name())
            .field("mode", &self.mode)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for SequentialScheduler {
    fn drop(&mut self) {
        self.dispose();
        // Queued tasks may hold handles back to this scheduler; dropping them
        // here breaks that cycle and resolves their waiters as abandoned.
        self.handle.worker.discard_pending();
    }
}

// Spawns the owned thread and waits until it has bound itself, so no caller
// can win a race to `run_on_current_thread` against it.
fn spawn_worker(worker: &Arc<Worker>, config: &Config) -> Result<JoinHandle<()>> {
    let (ready_tx, ready_rx) = bounded::<Result<()>>(1);
    let worker = worker.clone();

    let mut builder = thread::Builder::new().name(config.thread_name.clone());
    if let Some(stack_size) = config.stack_size {
        builder = builder.stack_size(stack_size);
    }

    let thread = builder
        .spawn(move || {
            let bound = worker.bind_current_thread();
            let ok = bound.is_ok();
            let _ = ready_tx.send(bound);

            if ok {
                worker.run();
            }
        })
        .map_err(Error::Spawn)?;

    ready_rx
        .recv()
        .unwrap_or_else(|_| Err(Error::WorkerPanic("worker exited before binding".into())))?;

    debug!(thread = ?thread.thread().id(), "spawned owned worker thread");
    Ok(thread)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;
    use std::time::Duration;

    #[test]
    fn test_owned_thread_is_bound_on_return() {
        let scheduler = SequentialScheduler::new(true).unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(scheduler.thread_mode(), ThreadMode::Owned);
        assert!(scheduler.worker_thread().is_some());
        assert!(!scheduler.is_worker_thread());
    }

    #[test]
    fn test_worker_thread_uses_configured_name() {
        let config = Config::builder().thread_name("render-loop").build().unwrap();
        let scheduler = SequentialScheduler::with_config(config).unwrap();

        let name = scheduler
            .submit_fn(|| thread::current().name().map(str::to_owned))
            .join()
            .unwrap();
        assert_eq!(name.as_deref(), Some("render-loop"));
    }

    #[test]
    fn test_donated_mode_starts_unbound() {
        let scheduler = SequentialScheduler::new(false).unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Unbound);
        assert!(scheduler.worker_thread().is_none());
        assert!(matches!(scheduler.join(), Err(Error::NotOwned)));
    }

    #[test]
    fn test_run_after_owned_construction_fails() {
        let scheduler = SequentialScheduler::new(true).unwrap();

        let err = scheduler.run_on_current_thread().unwrap_err();
        assert!(matches!(err, Error::AlreadyBound));
        assert!(err.is_usage_error());
    }

    #[test]
    fn test_join_after_dispose() {
        let scheduler = SequentialScheduler::new(true).unwrap();
        let worker = scheduler.worker_thread().unwrap();

        let seen = scheduler
            .submit_fn(|| thread::current().id())
            .join()
            .unwrap();
        assert_eq!(seen, worker);

        scheduler.dispose();
        scheduler.join().unwrap();
        // second join is a no-op
        scheduler.join().unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Disposed);
    }

    #[test]
    fn test_join_from_worker_is_rejected() {
        let scheduler = Arc::new(SequentialScheduler::new(true).unwrap());
        let result = Arc::new(PlMutex::new(None));

        {
            let scheduler_ref = scheduler.clone();
            let result = result.clone();
            scheduler
                .submit_fn(move || {
                    *result.lock() = Some(scheduler_ref.join());
                })
                .join_timeout(Duration::from_secs(5))
                .unwrap();
        }

        let outcome = result.lock().take().unwrap();
        assert!(matches!(outcome, Err(Error::JoinFromWorker)));

        scheduler.dispose();
        scheduler.join().unwrap();
    }

    #[test]
    fn test_drop_disposes() {
        let scheduler = SequentialScheduler::new(true).unwrap();
        let handle = scheduler.handle();

        drop(scheduler);
        assert_eq!(handle.state(), SchedulerState::Disposed);
    }
}
