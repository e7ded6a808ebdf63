//! hostmon-core - host metrics collection and delivery.
//!
//! Provides:
//! - `collector` - `/proc` and `/sys` samplers and the concurrent collector
//! - `metrics` - metric names and the `MetricSet` map
//! - `ingest` - VictoriaMetrics client and line encoding
//! - `cycle` - one health-check, collect and push cycle
//! - `config` - validated runtime configuration

pub mod collector;
pub mod config;
pub mod cycle;
pub mod ingest;
pub mod metrics;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
