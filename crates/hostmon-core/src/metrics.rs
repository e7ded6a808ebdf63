//! Flat metric set produced by one collection cycle.
//!
//! A `MetricSet` maps metric names to `f64` values. It is what the ingestion
//! client serializes, one `name value` line per entry.

use std::collections::BTreeMap;

pub const SYSTEM_TEMPERATURE_CELSIUS: &str = "system_temperature_celsius";
pub const MEMORY_TOTAL_MB: &str = "memory_total_mb";
pub const MEMORY_AVAILABLE_MB: &str = "memory_available_mb";
pub const MEMORY_FREE_MB: &str = "memory_free_mb";
pub const MEMORY_USED_MB: &str = "memory_used_mb";
pub const MEMORY_USAGE_PERCENT: &str = "memory_usage_percent";
pub const CPU_USAGE_PERCENT: &str = "cpu_usage_percent";
pub const LOAD_AVERAGE_1MIN: &str = "load_average_1min";
pub const LOAD_AVERAGE_5MIN: &str = "load_average_5min";
pub const LOAD_AVERAGE_15MIN: &str = "load_average_15min";

/// Metric name to value mapping.
///
/// Keys are unique; inserting an existing name overwrites the previous value.
/// Iteration is in name order so serialized bodies are stable across cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSet {
    values: BTreeMap<String, f64>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, returning the value it replaced, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    /// Merges every entry of `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: MetricSet) {
        self.values.extend(other.values);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for MetricSet {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut set = MetricSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}
