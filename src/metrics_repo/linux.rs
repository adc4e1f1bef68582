// Linux-specific helpers: aggregate CPU counters from /proc/stat.

use crate::models::CpuSample;
use anyhow::{Context, bail};

const PROC_STAT: &str = "/proc/stat";

/// One read of the aggregate counters. The source is a live view of the
/// current kernel counters; a later read returns fresh (equal or larger)
/// values, never the same snapshot.
pub(super) fn read_cpu_sample() -> anyhow::Result<CpuSample> {
    let content = std::fs::read_to_string(PROC_STAT)
        .with_context(|| format!("failed to read {}", PROC_STAT))?;
    let line = content
        .lines()
        .next()
        .with_context(|| format!("{} is empty", PROC_STAT))?;
    parse_cpu_line(line)
}

/// Parse the aggregate "cpu" line: a label token followed by at least four
/// counters (user, nice, system, idle). Later fields (iowait, irq, ...)
/// are ignored.
pub fn parse_cpu_line(line: &str) -> anyhow::Result<CpuSample> {
    let mut fields = line.split_whitespace();
    if fields.next() != Some("cpu") {
        bail!("not an aggregate cpu line: {:?}", line);
    }
    let counters = fields
        .take(4)
        .map(|s| {
            s.parse::<u64>()
                .with_context(|| format!("non-numeric cpu counter {:?} in {:?}", s, line))
        })
        .collect::<anyhow::Result<Vec<u64>>>()?;
    if counters.len() < 4 {
        bail!(
            "expected four cpu counters, found {} in {:?}",
            counters.len(),
            line
        );
    }
    Ok(CpuSample {
        user: counters[0],
        nice: counters[1],
        system: counters[2],
        idle: counters[3],
    })
}
