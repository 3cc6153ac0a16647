use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Per-scheduler task counters
#[derive(Debug)]
pub struct SchedulerStats {
    tasks_queued: AtomicU64,
    tasks_inlined: AtomicU64,
    tasks_completed: AtomicU64,
    tasks_failed: AtomicU64,
    tasks_cancelled: AtomicU64,
    tasks_panicked: AtomicU64,
    busy_time_ns: AtomicU64,
    start_time: Instant,
}

impl SchedulerStats {
    pub fn new() -> Self {
        Self {
            tasks_queued: AtomicU64::new(0),
            tasks_inlined: AtomicU64::new(0),
            tasks_completed: AtomicU64::new(0),
            tasks_failed: AtomicU64::new(0),
            tasks_cancelled: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
            busy_time_ns: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_queued(&self) {
        self.tasks_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inlined(&self) {
        self.tasks_inlined.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.tasks_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_panic(&self) {
        self.tasks_panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Accumulate worker busy time, pinning at `u64::MAX` nanoseconds.
    pub fn record_busy_time(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .busy_time_ns
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |total| {
                Some(total.saturating_add(nanos))
            });
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime: self.start_time.elapsed(),
            queued: self.tasks_queued.load(Ordering::Relaxed),
            inlined: self.tasks_inlined.load(Ordering::Relaxed),
            completed: self.tasks_completed.load(Ordering::Relaxed),
            failed: self.tasks_failed.load(Ordering::Relaxed),
            cancelled: self.tasks_cancelled.load(Ordering::Relaxed),
            panicked: self.tasks_panicked.load(Ordering::Relaxed),
            busy_time: Duration::from_nanos(self.busy_time_ns.load(Ordering::Relaxed)),
        }
    }
}

impl Default for SchedulerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`SchedulerStats`]
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    pub uptime: Duration,
    pub queued: u64,
    pub inlined: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub panicked: u64,
    pub busy_time: Duration,
}

impl StatsSnapshot {
    /// Tasks that reached the worker and finished running, however they ended.
    pub fn executed(&self) -> u64 {
        self.completed + self.failed + self.cancelled + self.panicked
    }

    /// Fraction of uptime the worker spent running task bodies.
    pub fn utilization(&self) -> f64 {
        let uptime = self.uptime.as_secs_f64();
        if uptime == 0.0 {
            return 0.0;
        }
        (self.busy_time.as_secs_f64() / uptime).min(1.0)
    }
}
