pub use crate::config::{Config, ConfigBuilder, ThreadMode};
pub use crate::error::{Error, Result};
pub use crate::executor::{
    FnTask, PanicStrategy, Submission, Task, TaskHandle, TaskId, TaskInfo, TaskOutcome,
};
pub use crate::scheduler::{SchedulerHandle, SchedulerState, SequentialScheduler};
pub use crate::telemetry::StatsSnapshot;
