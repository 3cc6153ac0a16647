//! A task scheduler that runs every submitted task on one thread.
//!
//! All work handed to a [`SequentialScheduler`] executes sequentially, in
//! submission order, on a single worker thread, while submission itself is
//! safe from any number of threads. Use it when callback- or
//! continuation-style code must observe single-threaded semantics without
//! managing a thread by hand.
//!
//! # Quick Start
//!
//! ```no_run
//! use sequential_scheduler::prelude::*;
//!
//! let scheduler = SequentialScheduler::new(true).unwrap();
//!
//! let answer = scheduler.submit_fn(|| 6 * 7);
//! assert_eq!(answer.join().unwrap(), 42);
//!
//! scheduler.dispose();
//! scheduler.join().unwrap();
//! ```
//!
//! # Thread modes
//!
//! - **Owned**: the scheduler spawns its worker thread at construction.
//! - **Donated**: a caller lends a thread by calling
//!   [`SequentialScheduler::run_on_current_thread`], which blocks until the
//!   scheduler is disposed. Tasks submitted earlier wait in the queue.
//!
//! # Inline execution
//!
//! A task submitted from the worker thread runs immediately on the caller's
//! stack instead of being queued, so a running task can submit nested work
//! and wait for it. Submissions from every other thread are queued.

#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod scheduler;
pub mod telemetry;

pub use config::{Config, ConfigBuilder, ThreadMode};
pub use error::{Error, Result};
pub use executor::{FnTask, PanicStrategy, Submission, Task, TaskHandle, TaskId, TaskOutcome};
pub use scheduler::{SchedulerHandle, SchedulerState, SequentialScheduler};

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_basic_submit() {
        let scheduler = SequentialScheduler::new(true).unwrap();

        let value = scheduler.submit_fn(|| "done").join().unwrap();
        assert_eq!(value, "done");

        scheduler.dispose();
        scheduler.join().unwrap();
    }

    #[test]
    fn test_current_handle_inside_task() {
        let scheduler = SequentialScheduler::new(true).unwrap();
        let outer = scheduler.handle();

        let same = scheduler
            .submit_fn(move || {
                SchedulerHandle::current()
                    .map(|h| h.same_scheduler(&outer))
                    .unwrap_or(false)
            })
            .join()
            .unwrap();

        assert!(same);
        assert!(SchedulerHandle::current().is_none());
    }

    #[test]
    fn test_nested_spawn_runs_inline() {
        let scheduler = SequentialScheduler::new(true).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        let handle = scheduler.handle();
        let inner_log = log.clone();
        scheduler
            .submit_fn(move || {
                inner_log.lock().push("outer-start");
                let nested_log = inner_log.clone();
                handle.spawn(move || nested_log.lock().push("nested"));
                inner_log.lock().push("outer-end");
            })
            .join()
            .unwrap();

        assert_eq!(*log.lock(), vec!["outer-start", "nested", "outer-end"]);
    }
}
