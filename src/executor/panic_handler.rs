use super::task::TaskId;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// How the worker reports a panic that escapes `Task::run`.
///
/// Either way the panic is contained and the worker moves on to the next task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicStrategy {
    /// Count it silently.
    Isolate,
    /// Count it and emit a `warn` event.
    LogAndContinue,
}

impl Default for PanicStrategy {
    fn default() -> Self {
        PanicStrategy::LogAndContinue
    }
}

// Last line of defence around `Task::run` for tasks that do not catch their
// own panics.
#[derive(Debug)]
pub(crate) struct PanicHandler {
    strategy: PanicStrategy,
    caught: AtomicUsize,
}

impl PanicHandler {
    pub fn new(strategy: PanicStrategy) -> Self {
        Self {
            strategy,
            caught: AtomicUsize::new(0),
        }
    }

    /// Run `f` on behalf of task `id`; a panic comes back as its message.
    pub fn execute<F, R>(&self, id: TaskId, f: F) -> Result<R, String>
    where
        F: FnOnce() -> R,
    {
        catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
            self.caught.fetch_add(1, Ordering::Relaxed);

            let message = panic_message(payload.as_ref());
            if self.strategy == PanicStrategy::LogAndContinue {
                warn!(task = %id, %message, "task panicked");
            }
            message
        })
    }

    pub fn panic_count(&self) -> usize {
        self.caught.load(Ordering::Relaxed)
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
