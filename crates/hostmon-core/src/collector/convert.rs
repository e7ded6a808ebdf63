//! Conversion of typed samples into named metrics.

use crate::collector::model::{CpuSample, LoadSample, MemorySample, Sample, TemperatureSample};
use crate::metrics::{self, MetricSet};

impl Sample {
    /// Flattens the sample into the metrics it contributes to a cycle.
    pub fn to_metrics(&self) -> MetricSet {
        let mut set = MetricSet::new();
        match self {
            Sample::Temperature(s) => temperature_metrics(s, &mut set),
            Sample::Memory(s) => memory_metrics(s, &mut set),
            Sample::Cpu(s) => cpu_metrics(s, &mut set),
            Sample::Load(s) => load_metrics(s, &mut set),
        }
        set
    }
}

fn temperature_metrics(sample: &TemperatureSample, set: &mut MetricSet) {
    set.insert(metrics::SYSTEM_TEMPERATURE_CELSIUS, sample.celsius);
}

fn memory_metrics(sample: &MemorySample, set: &mut MetricSet) {
    let used_mb = sample.total_mb.saturating_sub(sample.available_mb);

    set.insert(metrics::MEMORY_TOTAL_MB, sample.total_mb as f64);
    set.insert(metrics::MEMORY_AVAILABLE_MB, sample.available_mb as f64);
    set.insert(metrics::MEMORY_FREE_MB, sample.free_mb as f64);
    set.insert(metrics::MEMORY_USED_MB, used_mb as f64);
    // The sampler rejects a zero MemTotal, but a hand-built sample may not.
    if sample.total_mb > 0 {
        set.insert(
            metrics::MEMORY_USAGE_PERCENT,
            used_mb as f64 / sample.total_mb as f64 * 100.0,
        );
    }
}

fn cpu_metrics(sample: &CpuSample, set: &mut MetricSet) {
    set.insert(metrics::CPU_USAGE_PERCENT, sample.usage_percent);
}

fn load_metrics(sample: &LoadSample, set: &mut MetricSet) {
    set.insert(metrics::LOAD_AVERAGE_1MIN, sample.one);
    set.insert(metrics::LOAD_AVERAGE_5MIN, sample.five);
    set.insert(metrics::LOAD_AVERAGE_15MIN, sample.fifteen);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_memory_conversion() {
        let sample = Sample::Memory(MemorySample {
            total_mb: 8000,
            free_mb: 2000,
            available_mb: 4000,
            timestamp: Utc::now(),
        });
        let set = sample.to_metrics();

        assert_eq!(set.len(), 5);
        assert_eq!(set.get(metrics::MEMORY_TOTAL_MB), Some(8000.0));
        assert_eq!(set.get(metrics::MEMORY_AVAILABLE_MB), Some(4000.0));
        assert_eq!(set.get(metrics::MEMORY_FREE_MB), Some(2000.0));
        assert_eq!(set.get(metrics::MEMORY_USED_MB), Some(4000.0));
        assert_eq!(set.get(metrics::MEMORY_USAGE_PERCENT), Some(50.0));
    }

    #[test]
    fn test_memory_conversion_zero_total_skips_percent() {
        let sample = Sample::Memory(MemorySample {
            total_mb: 0,
            free_mb: 0,
            available_mb: 0,
            timestamp: Utc::now(),
        });
        let set = sample.to_metrics();
        assert!(!set.contains(metrics::MEMORY_USAGE_PERCENT));
        assert_eq!(set.get(metrics::MEMORY_USED_MB), Some(0.0));
    }

    #[test]
    fn test_temperature_conversion() {
        let sample = Sample::Temperature(TemperatureSample {
            celsius: 45.5,
            timestamp: Utc::now(),
        });
        let set = sample.to_metrics();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(metrics::SYSTEM_TEMPERATURE_CELSIUS), Some(45.5));
    }

    #[test]
    fn test_cpu_conversion() {
        let sample = Sample::Cpu(CpuSample {
            usage_percent: 30.0,
            core_id: -1,
            timestamp: Utc::now(),
        });
        let set = sample.to_metrics();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(metrics::CPU_USAGE_PERCENT), Some(30.0));
    }

    #[test]
    fn test_load_conversion() {
        let sample = Sample::Load(LoadSample {
            one: 0.5,
            five: 1.25,
            fifteen: 2.0,
            timestamp: Utc::now(),
        });
        let set = sample.to_metrics();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(metrics::LOAD_AVERAGE_1MIN), Some(0.5));
        assert_eq!(set.get(metrics::LOAD_AVERAGE_5MIN), Some(1.25));
        assert_eq!(set.get(metrics::LOAD_AVERAGE_15MIN), Some(2.0));
    }
}
