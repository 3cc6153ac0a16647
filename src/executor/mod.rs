//! Task execution infrastructure.
//!
//! This module provides the task abstraction, the blocking task queue, the
//! single worker that drains it, and panic containment for task bodies.

pub mod panic_handler;
pub mod task;
pub mod worker;

pub(crate) mod queue;

pub use panic_handler::PanicStrategy;
pub use task::{FnTask, Task, TaskHandle, TaskId, TaskInfo, TaskOutcome};
pub use worker::Submission;
