//! Counters describing what a scheduler has done so far.

pub mod stats;

pub use stats::{SchedulerStats, StatsSnapshot};
