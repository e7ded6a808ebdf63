//! Typed measurements produced by the samplers.
//!
//! Every sample is an immutable value created fresh each cycle. Timestamps
//! are taken when the underlying read completes, not when the cycle starts.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::collector::error::CollectError;

/// Reading of thermal zone 0.
///
/// Source: `/sys/class/thermal/thermal_zone0/temp`
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSample {
    pub celsius: f64,
    pub timestamp: DateTime<Utc>,
}

/// Memory totals in MB (kernel kB divided by 1000).
///
/// Source: `/proc/meminfo`
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySample {
    pub total_mb: u64,
    pub free_mb: u64,
    /// Reclaimable-aware free memory as estimated by the kernel.
    pub available_mb: u64,
    pub timestamp: DateTime<Utc>,
}

/// Busy share of CPU time between two `/proc/stat` reads.
///
/// Source: `/proc/stat` aggregate `cpu` line
#[derive(Debug, Clone, PartialEq)]
pub struct CpuSample {
    /// Nominally 0–100.
    pub usage_percent: f64,
    /// -1 for the aggregate across all cores.
    pub core_id: i16,
    pub timestamp: DateTime<Utc>,
}

/// Raw load averages.
///
/// Source: `/proc/loadavg`
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSample {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
    pub timestamp: DateTime<Utc>,
}

/// One measurement from any sampler.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Temperature(TemperatureSample),
    Memory(MemorySample),
    Cpu(CpuSample),
    Load(LoadSample),
}

impl Sample {
    /// The sampler kind that produces this variant.
    pub fn kind(&self) -> SamplerKind {
        match self {
            Sample::Temperature(_) => SamplerKind::Temperature,
            Sample::Memory(_) => SamplerKind::Memory,
            Sample::Cpu(_) => SamplerKind::Cpu,
            Sample::Load(_) => SamplerKind::Load,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Sample::Temperature(s) => s.timestamp,
            Sample::Memory(s) => s.timestamp,
            Sample::Cpu(s) => s.timestamp,
            Sample::Load(s) => s.timestamp,
        }
    }
}

/// The four standard samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SamplerKind {
    Temperature,
    Memory,
    Cpu,
    Load,
}

impl SamplerKind {
    pub const ALL: [SamplerKind; 4] = [
        SamplerKind::Temperature,
        SamplerKind::Memory,
        SamplerKind::Cpu,
        SamplerKind::Load,
    ];

    /// Stable lowercase name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            SamplerKind::Temperature => "temperature",
            SamplerKind::Memory => "memory",
            SamplerKind::Cpu => "cpu",
            SamplerKind::Load => "load",
        }
    }
}

impl fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result envelope a sampler worker sends back to the collector.
///
/// Carries either a sample or the reason there is none, never both.
#[derive(Debug)]
pub struct CollectionOutcome {
    pub kind: SamplerKind,
    pub result: Result<Sample, CollectError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_kind_matches_variant() {
        let now = Utc::now();
        let samples = [
            Sample::Temperature(TemperatureSample {
                celsius: 40.0,
                timestamp: now,
            }),
            Sample::Memory(MemorySample {
                total_mb: 1,
                free_mb: 1,
                available_mb: 1,
                timestamp: now,
            }),
            Sample::Cpu(CpuSample {
                usage_percent: 1.0,
                core_id: -1,
                timestamp: now,
            }),
            Sample::Load(LoadSample {
                one: 0.0,
                five: 0.0,
                fifteen: 0.0,
                timestamp: now,
            }),
        ];

        let kinds: Vec<SamplerKind> = samples.iter().map(Sample::kind).collect();
        assert_eq!(kinds, SamplerKind::ALL);
        assert!(samples.iter().all(|s| s.timestamp() == now));
    }

    #[test]
    fn test_sampler_kind_names() {
        let names: Vec<String> = SamplerKind::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(names, ["temperature", "memory", "cpu", "load"]);
    }
}
