// Host status sampling: raw /proc CPU counters plus sysinfo memory and hostname

mod linux;

pub use linux::parse_cpu_line;

use crate::models::{MemoryStats, StatusReport};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::System;
use tracing::instrument;

pub struct MetricsRepo {
    sys: Arc<std::sync::Mutex<System>>,
    sample_delay: Duration,
}

impl MetricsRepo {
    pub fn new(sample_delay: Duration) -> Self {
        Self {
            sys: Arc::new(std::sync::Mutex::new(System::new())),
            sample_delay,
        }
    }

    /// Build one status report: UTC time and hostname, then two CPU
    /// counter reads `sample_delay` apart for the utilization delta,
    /// then memory totals. Each call is self-contained; nothing is
    /// carried over between reports.
    #[instrument(skip(self), fields(repo = "metrics", operation = "build_report"))]
    pub async fn build_report(&self) -> anyhow::Result<StatusReport> {
        let timestamp = Utc::now();
        let host = System::host_name().unwrap_or_else(|| "unknown".into());

        let first = tokio::task::spawn_blocking(linux::read_cpu_sample)
            .await
            .map_err(|e| anyhow::anyhow!("cpu sample task join: {}", e))??;
        tokio::time::sleep(self.sample_delay).await;
        let second = tokio::task::spawn_blocking(linux::read_cpu_sample)
            .await
            .map_err(|e| anyhow::anyhow!("cpu sample task join: {}", e))??;

        let cpu_percent = second.utilization_since(&first);
        let memory = self.memory_stats().await?;

        Ok(StatusReport {
            timestamp,
            host,
            cpu_percent,
            free_kib: memory.free_kib(),
            free_percent: memory.free_percent(),
        })
    }

    #[instrument(skip(self), fields(repo = "metrics", operation = "memory_stats"))]
    async fn memory_stats(&self) -> anyhow::Result<MemoryStats> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_memory();
            Ok(MemoryStats {
                total_bytes: sys.total_memory(),
                free_bytes: sys.free_memory(),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}
