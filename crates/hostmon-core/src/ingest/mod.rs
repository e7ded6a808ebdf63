//! Delivery of metric sets to a time-series store.
//!
//! [`IngestClient`] speaks the VictoriaMetrics HTTP API: `GET /health` for
//! liveness and `POST /api/v1/import/prometheus` for data, one
//! `name value` line per metric. The cycle driver only depends on the
//! [`MetricsSink`] trait, so tests can swap in a recording sink.

mod client;
mod error;
pub mod format;

use std::future::Future;

use tokio::time::Instant;

use crate::metrics::MetricSet;

pub use client::{HEALTH_PATH, IMPORT_PATH, IngestClient};
pub use error::IngestError;

/// Destination for collected metrics.
pub trait MetricsSink: Send + Sync {
    /// Checks that the destination is reachable and healthy.
    fn ping(&self, deadline: Instant) -> impl Future<Output = Result<(), IngestError>> + Send;

    /// Delivers `metrics`, returning how many were sent.
    fn push(
        &self,
        metrics: &MetricSet,
        deadline: Instant,
    ) -> impl Future<Output = Result<usize, IngestError>> + Send;
}
