//! One collection cycle: health check, collect, push.

use std::time::{Duration, Instant as StdInstant};

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::collector::{Collector, SamplerKind};
use crate::ingest::{IngestError, MetricsSink};

/// Summary of a completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Whether the health check before collection succeeded.
    pub healthy: bool,
    /// Number of metrics merged from the samplers.
    pub collected: usize,
    /// Samplers that reported an error.
    pub failed: Vec<SamplerKind>,
    /// Samplers that did not report before the deadline.
    pub missing: Vec<SamplerKind>,
    /// Number of metrics the sink accepted.
    pub pushed: usize,
    pub elapsed: Duration,
}

/// Runs a single cycle against `sink`, bounded by `deadline`.
///
/// A failed health check is only logged: the push is still attempted and
/// reports the real error if the store is down. Sampler failures are part of
/// the report; only a failed push fails the cycle.
pub async fn run_cycle<S>(
    collector: &Collector,
    sink: &S,
    deadline: Instant,
) -> Result<CycleReport, IngestError>
where
    S: MetricsSink,
{
    let started = StdInstant::now();

    let healthy = match sink.ping(deadline).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "health check failed, attempting push anyway");
            false
        }
    };

    let collection = collector.collect(deadline).await;
    let failed: Vec<SamplerKind> = collection.failures.iter().map(|f| f.kind).collect();
    let collected = collection.metrics.len();

    let pushed = if collection.metrics.is_empty() {
        info!("no metrics collected, nothing to send");
        0
    } else {
        let pushed = sink.push(&collection.metrics, deadline).await?;
        debug!(count = pushed, "metrics sent");
        pushed
    };

    Ok(CycleReport {
        healthy,
        collected,
        failed,
        missing: collection.missing,
        pushed,
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MockFs, SystemSampler};
    use crate::config::SamplerToggles;
    use crate::metrics::{self, MetricSet};
    use reqwest::StatusCode;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Sink that records pushes and fails on request.
    #[derive(Default)]
    struct RecordingSink {
        unhealthy: bool,
        reject_push: bool,
        pings: AtomicUsize,
        pushes: Mutex<Vec<MetricSet>>,
    }

    impl MetricsSink for RecordingSink {
        async fn ping(&self, _deadline: Instant) -> Result<(), IngestError> {
            self.pings.fetch_add(1, Ordering::SeqCst);
            if self.unhealthy {
                return Err(IngestError::Status {
                    stage: "ping",
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: String::new(),
                });
            }
            Ok(())
        }

        async fn push(&self, metrics: &MetricSet, _deadline: Instant) -> Result<usize, IngestError> {
            self.pushes.lock().unwrap().push(metrics.clone());
            if self.reject_push {
                return Err(IngestError::Status {
                    stage: "push",
                    status: StatusCode::BAD_REQUEST,
                    body: "cannot parse line".to_string(),
                });
            }
            Ok(metrics.len())
        }
    }

    fn host_collector(fs: MockFs, toggles: SamplerToggles) -> Collector {
        let sampler =
            SystemSampler::new(fs, "/proc", "/sys").with_cpu_interval(Duration::ZERO);
        Collector::for_host(sampler, &toggles)
    }

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(10)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cycle_pushes_collected_metrics() {
        let collector = host_collector(MockFs::typical_host(), SamplerToggles::all());
        let sink = RecordingSink::default();

        let report = run_cycle(&collector, &sink, deadline()).await.unwrap();
        assert!(report.healthy);
        assert_eq!(report.collected, 10);
        assert_eq!(report.pushed, 10);
        assert!(report.failed.is_empty());
        assert!(report.missing.is_empty());

        let pushes = sink.pushes.lock().unwrap();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].get(metrics::CPU_USAGE_PERCENT), Some(30.0));
        assert_eq!(pushes[0].get(metrics::MEMORY_USAGE_PERCENT), Some(50.0));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_health_check_still_pushes() {
        let collector = host_collector(MockFs::typical_host(), SamplerToggles::all());
        let sink = RecordingSink {
            unhealthy: true,
            ..RecordingSink::default()
        };

        let report = run_cycle(&collector, &sink, deadline()).await.unwrap();
        assert!(!report.healthy);
        assert_eq!(report.pushed, 10);
        assert_eq!(sink.pings.load(Ordering::SeqCst), 1);
        assert_eq!(sink.pushes.lock().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_push_failure_fails_the_cycle() {
        let collector = host_collector(MockFs::typical_host(), SamplerToggles::all());
        let sink = RecordingSink {
            reject_push: true,
            ..RecordingSink::default()
        };

        let err = run_cycle(&collector, &sink, deadline()).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_nothing_collected_skips_push() {
        let collector = host_collector(MockFs::typical_host(), SamplerToggles::none());
        let sink = RecordingSink::default();

        let report = run_cycle(&collector, &sink, deadline()).await.unwrap();
        assert_eq!(report.collected, 0);
        assert_eq!(report.pushed, 0);
        assert!(sink.pushes.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sampler_failures_are_reported_not_fatal() {
        let collector = host_collector(MockFs::host_without_thermal(), SamplerToggles::all());
        let sink = RecordingSink::default();

        let report = run_cycle(&collector, &sink, deadline()).await.unwrap();
        assert_eq!(report.failed, vec![SamplerKind::Temperature]);
        assert_eq!(report.pushed, 9);
        let pushes = sink.pushes.lock().unwrap();
        assert!(!pushes[0].contains(metrics::SYSTEM_TEMPERATURE_CELSIUS));
    }
}
