//! Prometheus text exposition lines.
//!
//! Each metric becomes one `name value` line without labels or timestamp;
//! the store stamps samples on arrival.

use crate::metrics::MetricSet;

/// Formats a value as a decimal floating-point number, never in exponent form.
///
/// Non-finite values use the exposition format spellings `NaN`, `+Inf`
/// and `-Inf`.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else {
        format!("{value}")
    }
}

/// Serializes every metric as one `name value` line, joined by `\n`.
///
/// An empty set yields an empty string.
pub fn encode_lines(metrics: &MetricSet) -> String {
    metrics
        .iter()
        .map(|(name, value)| format!("{name} {}", format_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}
