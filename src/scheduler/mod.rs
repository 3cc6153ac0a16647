//! The public scheduler types.
//!
//! [`SequentialScheduler`] owns the scheduler's lifecycle and, in owned mode,
//! its worker thread. [`SchedulerHandle`] is the cloneable view handed to
//! producers and to tasks that need to submit nested work.

pub mod handle;
pub mod sequential;

pub use handle::{SchedulerHandle, SchedulerState};
pub use sequential::SequentialScheduler;
