//! Parsers for `/proc` and `/sys` files.
//!
//! These are pure functions that parse the content of various kernel
//! interfaces into structured data. They are designed to be easily testable
//! with string inputs; attaching the file path is the sampler's job.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

/// Parses a thermal zone `temp` file: a single integer in milli-degrees Celsius.
pub fn parse_thermal_millidegrees(content: &str) -> Result<i64, ParseError> {
    let value = content.trim();
    value
        .parse()
        .map_err(|_| ParseError::new(format!("invalid temperature value {:?}", value)))
}

/// Parsed data from `/proc/meminfo`, in kB as the kernel reports it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
    pub mem_available: u64,
}

/// Parses `/proc/meminfo` content.
///
/// `MemTotal`, `MemFree` and `MemAvailable` must all be present and numeric;
/// every other key is ignored.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut total = None;
    let mut free = None;
    let mut available = None;

    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let slot = match key.trim() {
            "MemTotal" => &mut total,
            "MemFree" => &mut free,
            "MemAvailable" => &mut available,
            _ => continue,
        };
        let kb = rest
            .split_whitespace()
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| ParseError::new(format!("invalid value for {}", key.trim())))?;
        *slot = Some(kb);
    }

    let require = |value: Option<u64>, name: &str| {
        value.ok_or_else(|| ParseError::new(format!("missing {} in meminfo", name)))
    };

    Ok(MemInfo {
        mem_total: require(total, "MemTotal")?,
        mem_free: require(free, "MemFree")?,
        mem_available: require(available, "MemAvailable")?,
    })
}

/// Cumulative CPU time counters (jiffies) from the aggregate `cpu` line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
}

impl CpuTimes {
    /// Ticks spent doing work, including waiting on I/O.
    ///
    /// Sums wrap like the kernel counters they are built from.
    pub fn busy(&self) -> u64 {
        self.user
            .wrapping_add(self.nice)
            .wrapping_add(self.system)
            .wrapping_add(self.iowait)
    }

    pub fn total(&self) -> u64 {
        self.busy().wrapping_add(self.idle)
    }
}

/// Parses the aggregate `cpu ` line out of `/proc/stat` content.
///
/// Per-core lines (`cpu0`, `cpu1`, ...) are skipped. The first five counters
/// (user, nice, system, idle, iowait) are required.
pub fn parse_aggregate_cpu(content: &str) -> Result<CpuTimes, ParseError> {
    let line = content
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ParseError::new("aggregate cpu line not found"))?;

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 6 {
        return Err(ParseError::new(format!(
            "not enough fields in cpu line: expected 5+, got {}",
            parts.len() - 1
        )));
    }

    let parse_field = |idx: usize, name: &str| -> Result<u64, ParseError> {
        parts[idx]
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {}", name)))
    };

    Ok(CpuTimes {
        user: parse_field(1, "user")?,
        nice: parse_field(2, "nice")?,
        system: parse_field(3, "system")?,
        idle: parse_field(4, "idle")?,
        iowait: parse_field(5, "iowait")?,
    })
}

/// Busy percentage between two counter snapshots.
///
/// Returns `None` when no ticks elapsed, since the ratio is undefined.
/// Counters that went backwards count as zero progress.
pub fn cpu_usage_percent(before: &CpuTimes, after: &CpuTimes) -> Option<f64> {
    let busy_diff = after.busy().saturating_sub(before.busy());
    let total_diff = after.total().saturating_sub(before.total());
    if total_diff == 0 {
        return None;
    }
    Some(busy_diff as f64 / total_diff as f64 * 100.0)
}

/// Parsed data from `/proc/loadavg`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadAvg {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

/// Parses `/proc/loadavg` content.
///
/// Only the three averages on the first line are read; the trailing
/// `running/total` and last-pid fields are ignored.
pub fn parse_loadavg(content: &str) -> Result<LoadAvg, ParseError> {
    let line = content.lines().next().unwrap_or("");
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(ParseError::new("invalid loadavg format"));
    }

    let load1 = parts[0]
        .parse()
        .map_err(|_| ParseError::new("invalid load1"))?;
    let load5 = parts[1]
        .parse()
        .map_err(|_| ParseError::new("invalid load5"))?;
    let load15 = parts[2]
        .parse()
        .map_err(|_| ParseError::new("invalid load15"))?;

    Ok(LoadAvg {
        load1,
        load5,
        load15,
    })
}
