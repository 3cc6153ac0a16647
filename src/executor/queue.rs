//! Unbounded blocking FIFO between producers and the worker.

use super::task::{Task, TaskInfo};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::Instant;

struct Queued {
    task: Box<dyn Task>,
    queued_at: Instant,
}

struct QueueState {
    tasks: VecDeque<Queued>,
    cancelled: bool,
}

/// Result of a blocking dequeue.
pub(crate) enum Dequeue {
    Task(Box<dyn Task>),
    /// Cancellation was signaled; the worker loop must stop.
    Cancelled,
}

pub(crate) struct TaskQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                cancelled: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Append to the tail. Accepted even after cancellation; such tasks are
    /// simply never dequeued.
    pub fn enqueue(&self, task: Box<dyn Task>) {
        let mut state = self.state.lock();
        state.tasks.push_back(Queued {
            task,
            queued_at: Instant::now(),
        });
        drop(state);

        self.available.notify_one();
    }

    /// Block until a task is available or cancellation is signaled.
    /// Cancellation wins over pending tasks.
    pub fn dequeue(&self) -> Dequeue {
        let mut state = self.state.lock();

        loop {
            if state.cancelled {
                return Dequeue::Cancelled;
            }

            if let Some(queued) = state.tasks.pop_front() {
                return Dequeue::Task(queued.task);
            }

            self.available.wait(&mut state);
        }
    }

    /// Signal cancellation. Returns `true` only for the call that flipped it.
    pub fn cancel(&self) -> bool {
        let mut state = self.state.lock();
        if state.cancelled {
            return false;
        }
        state.cancelled = true;
        drop(state);

        self.available.notify_all();
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    /// Drop every queued task without running it. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let drained = std::mem::take(&mut self.state.lock().tasks);
        let count = drained.len();
        // dropped outside the lock: a task's destructor may call back into us
        drop(drained);
        count
    }

    pub fn snapshot(&self) -> Vec<TaskInfo> {
        self.state
            .lock()
            .tasks
            .iter()
            .map(|queued| TaskInfo {
                id: queued.task.id(),
                name: queued.task.name().map(str::to_owned),
                queued_at: queued.queued_at,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TaskQueue")
            .field("len", &state.tasks.len())
            .field("cancelled", &state.cancelled)
            .finish()
    }
}
