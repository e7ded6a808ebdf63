//! System sampler reading host-wide metrics from `/proc` and `/sys`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;

use crate::collector::error::CollectError;
use crate::collector::model::{CpuSample, LoadSample, MemorySample, TemperatureSample};
use crate::collector::procfs::parser::{
    CpuTimes, ParseError, cpu_usage_percent, parse_aggregate_cpu, parse_loadavg, parse_meminfo,
    parse_thermal_millidegrees,
};
use crate::collector::traits::FileSystem;

/// Gap between the two `/proc/stat` reads of the CPU sampler.
pub const DEFAULT_CPU_INTERVAL: Duration = Duration::from_secs(1);

/// Thermal zone read by the temperature sampler, relative to the sys root.
const THERMAL_ZONE: &str = "class/thermal/thermal_zone0/temp";

/// Reads one typed sample per call from the kernel interfaces.
///
/// Every method is stateless and blocking; the collector runs each one on its
/// own worker. `sample_cpu` additionally sleeps for `cpu_interval`.
pub struct SystemSampler<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
    sys_path: PathBuf,
    cpu_interval: Duration,
}

impl<F: FileSystem> SystemSampler<F> {
    /// Creates a new system sampler.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    /// * `sys_path` - Base path to sysfs (usually "/sys")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>, sys_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            sys_path: sys_path.into(),
            cpu_interval: DEFAULT_CPU_INTERVAL,
        }
    }

    /// Overrides the gap between the two CPU counter reads.
    pub fn with_cpu_interval(mut self, interval: Duration) -> Self {
        self.cpu_interval = interval;
        self
    }

    pub fn cpu_interval(&self) -> Duration {
        self.cpu_interval
    }

    /// Path of the thermal zone file this sampler reads.
    pub fn thermal_zone_path(&self) -> PathBuf {
        self.sys_path.join(THERMAL_ZONE)
    }

    /// Whether the thermal zone exists on this host.
    pub fn has_thermal_zone(&self) -> bool {
        self.fs.exists(&self.thermal_zone_path())
    }

    fn read(&self, path: &Path) -> Result<String, CollectError> {
        self.fs
            .read_to_string(path)
            .map_err(|e| CollectError::read(path, e))
    }

    /// Samples thermal zone 0 (milli-degrees Celsius).
    pub fn sample_temperature(&self) -> Result<TemperatureSample, CollectError> {
        let path = self.thermal_zone_path();
        let content = self.read(&path)?;
        let millidegrees =
            parse_thermal_millidegrees(&content).map_err(|e| CollectError::parse(&path, e))?;

        Ok(TemperatureSample {
            celsius: millidegrees as f64 / 1000.0,
            timestamp: Utc::now(),
        })
    }

    /// Samples `/proc/meminfo`, converting kB to MB by integer division by 1000.
    pub fn sample_memory(&self) -> Result<MemorySample, CollectError> {
        let path = self.proc_path.join("meminfo");
        let content = self.read(&path)?;
        let info = parse_meminfo(&content).map_err(|e| CollectError::parse(&path, e))?;
        if info.mem_total == 0 {
            return Err(CollectError::parse(
                &path,
                ParseError::new("MemTotal is zero"),
            ));
        }

        Ok(MemorySample {
            total_mb: info.mem_total / 1000,
            free_mb: info.mem_free / 1000,
            available_mb: info.mem_available / 1000,
            timestamp: Utc::now(),
        })
    }

    fn read_cpu_times(&self, path: &Path) -> Result<CpuTimes, CollectError> {
        let content = self.read(path)?;
        parse_aggregate_cpu(&content).map_err(|e| CollectError::parse(path, e))
    }

    /// Samples aggregate CPU usage over `cpu_interval`.
    ///
    /// Blocks the calling thread for the whole interval.
    pub fn sample_cpu(&self) -> Result<CpuSample, CollectError> {
        let path = self.proc_path.join("stat");
        let before = self.read_cpu_times(&path)?;
        std::thread::sleep(self.cpu_interval);
        let after = self.read_cpu_times(&path)?;

        let usage_percent =
            cpu_usage_percent(&before, &after).ok_or(CollectError::Stalled { path })?;

        Ok(CpuSample {
            usage_percent,
            core_id: -1,
            timestamp: Utc::now(),
        })
    }

    /// Samples `/proc/loadavg`.
    pub fn sample_load(&self) -> Result<LoadSample, CollectError> {
        let path = self.proc_path.join("loadavg");
        let content = self.read(&path)?;
        let info = parse_loadavg(&content).map_err(|e| CollectError::parse(&path, e))?;

        Ok(LoadSample {
            one: info.load1,
            five: info.load5,
            fifteen: info.load15,
            timestamp: Utc::now(),
        })
    }
}
