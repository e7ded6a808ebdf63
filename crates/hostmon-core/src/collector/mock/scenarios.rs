//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` and `/sys` states for testing
//! various host conditions. Paths assume the default `/proc` and `/sys` roots.

use super::filesystem::MockFs;

/// Thermal zone file read by the temperature sampler under the default `/sys` root.
pub const THERMAL_ZONE0: &str = "/sys/class/thermal/thermal_zone0/temp";

const MEMINFO: &str = "\
MemTotal:        8000000 kB
MemFree:         2000000 kB
MemAvailable:    4000000 kB
Buffers:          512000 kB
Cached:          1024000 kB
SwapCached:            0 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
";

// Between the two snapshots busy advances by 30 ticks and idle by 70.
const STAT_BEFORE: &str = "\
cpu  1000 0 500 8000 0 0 0 0 0 0
cpu0 500 0 250 4000 0 0 0 0 0 0
cpu1 500 0 250 4000 0 0 0 0 0 0
ctxt 500000
btime 1700000000
";

const STAT_AFTER: &str = "\
cpu  1020 0 510 8070 0 0 0 0 0 0
cpu0 510 0 255 4035 0 0 0 0 0 0
cpu1 510 0 255 4035 0 0 0 0 0 0
ctxt 500100
btime 1700000000
";

impl MockFs {
    /// Creates a healthy host with every interface the samplers read.
    ///
    /// Expected readings: 45.5 °C, 8000/2000/4000 MB total/free/available,
    /// 30% CPU between the two `/proc/stat` reads, load 0.50/1.25/2.00.
    pub fn typical_host() -> Self {
        let mut fs = Self::new();
        fs.add_file(THERMAL_ZONE0, "45500\n");
        fs.add_file("/proc/meminfo", MEMINFO);
        fs.add_file_sequence("/proc/stat", [STAT_BEFORE, STAT_AFTER]);
        fs.add_file("/proc/loadavg", "0.50 1.25 2.00 3/456 7890\n");
        fs
    }

    /// A typical host without a thermal zone (most VMs and containers).
    pub fn host_without_thermal() -> Self {
        let mut fs = Self::typical_host();
        fs.remove_file(THERMAL_ZONE0);
        fs
    }

    /// A host whose CPU counters do not move between the two reads.
    pub fn host_with_stalled_cpu() -> Self {
        let mut fs = Self::typical_host();
        fs.remove_file("/proc/stat");
        fs.add_file("/proc/stat", STAT_BEFORE);
        fs
    }

    /// A host whose `/proc/meminfo` lacks `MemAvailable` (pre-3.14 kernels).
    pub fn host_with_partial_meminfo() -> Self {
        let mut fs = Self::typical_host();
        fs.add_file(
            "/proc/meminfo",
            "MemTotal:        8000000 kB\nMemFree:         2000000 kB\n",
        );
        fs
    }
}
