// Domain models (ported from the original C programs)

use chrono::{DateTime, Utc};

/// Aggregate CPU time counters from one read of the kernel statistics
/// source, in jiffies. A single sample carries no utilization
/// information; only the difference between two samples does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuSample {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
}

impl CpuSample {
    pub fn active(&self) -> u64 {
        self.user + self.nice + self.system
    }

    pub fn total(&self) -> u64 {
        self.active() + self.idle
    }

    /// Utilization over the interval from `earlier` to `self`, in percent,
    /// clamped to [0, 100]. A zero total delta (no elapsed ticks, e.g. a
    /// paused or cloned environment) reports 0.0 instead of dividing.
    pub fn utilization_since(&self, earlier: &CpuSample) -> f64 {
        let active = self.active().saturating_sub(earlier.active());
        let total = self.total().saturating_sub(earlier.total());
        if total == 0 {
            return 0.0;
        }
        (100.0 * active as f64 / total as f64).clamp(0.0, 100.0)
    }
}

/// Physical memory totals, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryStats {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl MemoryStats {
    pub fn free_kib(&self) -> u64 {
        self.free_bytes / 1024
    }

    pub fn free_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (100.0 * self.free_bytes as f64 / self.total_bytes as f64).clamp(0.0, 100.0)
    }
}

/// One host status report: the body of a single queued datagram.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub timestamp: DateTime<Utc>,
    pub host: String,
    pub cpu_percent: f64,
    pub free_kib: u64,
    pub free_percent: f64,
}

impl StatusReport {
    /// Fixed-layout text body: UTC time, host, CPU utilization
    /// (two decimals, zero-padded to width 5), free memory in KiB,
    /// free memory percentage.
    pub fn render(&self) -> String {
        format!(
            "Time: {}\nHost: {}\nCPU: {:05.2}%\nFree memory: {} KiB\nFree memory: {:.2}%",
            self.timestamp.format("%H:%M:%S"),
            self.host,
            self.cpu_percent,
            self.free_kib,
            self.free_percent,
        )
    }
}
