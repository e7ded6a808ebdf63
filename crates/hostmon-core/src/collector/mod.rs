//! Host metrics collector for Linux.
//!
//! This module provides the samplers that read host-wide metrics from the
//! Linux `/proc` and `/sys` filesystems, and the collector that runs them
//! concurrently, with support for mocking for testing on macOS.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                          Collector                            │
//! │   spawn_blocking per enabled sampler ──► shared channel ──►   │
//! │   merge into MetricSet (deadline-bounded)                     │
//! │                                                               │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │                    SystemSampler                        │  │
//! │  │  temperature  /sys/class/thermal/thermal_zone0/temp     │  │
//! │  │  memory       /proc/meminfo                             │  │
//! │  │  cpu          /proc/stat (two reads, 1s apart)          │  │
//! │  │  load         /proc/loadavg                             │  │
//! │  └────────────────────────────┬────────────────────────────┘  │
//! │                               │                               │
//! │                        ┌──────▼──────┐                        │
//! │                        │  FileSystem │ (trait)                │
//! │                        └──────┬──────┘                        │
//! └───────────────────────────────┼───────────────────────────────┘
//!                                 │
//!                   ┌─────────────┴─────────────┐
//!                   │                           │
//!            ┌──────▼──────┐             ┌──────▼──────┐
//!            │   RealFs    │             │   MockFs    │
//!            │  (Linux)    │             │  (Testing)  │
//!            └─────────────┘             └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use hostmon_core::collector::{Collector, RealFs, SystemSampler};
//! use hostmon_core::config::SamplerToggles;
//!
//! let sampler = SystemSampler::new(RealFs::new(), "/proc", "/sys");
//! let collector = Collector::for_host(sampler, &SamplerToggles::all());
//! let collection = collector.collect(deadline).await;
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use hostmon_core::collector::{MockFs, SystemSampler};
//!
//! let sampler = SystemSampler::new(MockFs::typical_host(), "/proc", "/sys");
//! let memory = sampler.sample_memory().unwrap();
//! assert_eq!(memory.total_mb, 8000);
//! ```

#[allow(clippy::module_inception)]
mod collector;
mod convert;
mod error;
pub mod mock;
pub mod model;
pub mod procfs;
pub mod traits;

pub use collector::{Collection, Collector, SampleFn, SamplerEntry, SamplerFailure};
pub use error::CollectError;
pub use mock::MockFs;
pub use model::{
    CollectionOutcome, CpuSample, LoadSample, MemorySample, Sample, SamplerKind,
    TemperatureSample,
};
pub use procfs::SystemSampler;
pub use traits::{FileSystem, RealFs};
