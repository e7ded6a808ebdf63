//! Collector that fans samplers out and merges their results.
//!
//! The `Collector` launches every enabled sampler on its own blocking worker
//! before awaiting anything, then drains a single shared channel until every
//! launched sampler has reported or the caller's deadline passes.

use std::sync::Arc;
use std::time::Instant as StdInstant;

use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

use crate::collector::error::CollectError;
use crate::collector::model::{CollectionOutcome, Sample, SamplerKind};
use crate::collector::procfs::SystemSampler;
use crate::collector::traits::FileSystem;
use crate::config::SamplerToggles;
use crate::metrics::MetricSet;

/// Blocking sampler invocation shared with the worker that runs it.
pub type SampleFn = Arc<dyn Fn() -> Result<Sample, CollectError> + Send + Sync>;

/// One registered sampler.
#[derive(Clone)]
pub struct SamplerEntry {
    pub kind: SamplerKind,
    pub enabled: bool,
    pub sample: SampleFn,
}

impl SamplerEntry {
    pub fn new<S>(kind: SamplerKind, enabled: bool, sample: S) -> Self
    where
        S: Fn() -> Result<Sample, CollectError> + Send + Sync + 'static,
    {
        Self {
            kind,
            enabled,
            sample: Arc::new(sample),
        }
    }
}

/// A sampler that reported an error this cycle.
#[derive(Debug)]
pub struct SamplerFailure {
    pub kind: SamplerKind,
    pub error: CollectError,
}

/// Everything one `collect` call produced.
#[derive(Debug, Default)]
pub struct Collection {
    /// Merged metrics of every sampler that succeeded.
    pub metrics: MetricSet,
    /// Samplers that reported an error.
    pub failures: Vec<SamplerFailure>,
    /// Samplers that never reported: still running at the deadline, or panicked.
    pub missing: Vec<SamplerKind>,
    /// Samplers that reported a sample.
    pub succeeded: Vec<SamplerKind>,
}

impl Collection {
    fn absorb(&mut self, outcome: CollectionOutcome) {
        match outcome.result {
            Ok(sample) => {
                let metrics = sample.to_metrics();
                debug!(
                    sampler = %outcome.kind,
                    count = metrics.len(),
                    "metrics collected"
                );
                self.metrics.merge(metrics);
                self.succeeded.push(outcome.kind);
            }
            Err(error) => {
                error!(sampler = %outcome.kind, error = %error, "error collecting metrics");
                self.failures.push(SamplerFailure {
                    kind: outcome.kind,
                    error,
                });
            }
        }
    }
}

/// Runs the registered samplers concurrently and merges their metrics.
pub struct Collector {
    samplers: Vec<SamplerEntry>,
    span: Span,
}

impl Collector {
    /// Creates a collector over an arbitrary set of samplers.
    pub fn new(samplers: Vec<SamplerEntry>) -> Self {
        Self {
            samplers,
            span: info_span!("collector"),
        }
    }

    /// Creates a collector over the four standard host samplers.
    pub fn for_host<F>(sampler: SystemSampler<F>, toggles: &SamplerToggles) -> Self
    where
        F: FileSystem + 'static,
    {
        let sampler = Arc::new(sampler);
        let entries = SamplerKind::ALL
            .into_iter()
            .map(|kind| {
                let sampler = Arc::clone(&sampler);
                let enabled = toggles.is_enabled(kind);
                match kind {
                    SamplerKind::Temperature => SamplerEntry::new(kind, enabled, move || {
                        sampler.sample_temperature().map(Sample::Temperature)
                    }),
                    SamplerKind::Memory => SamplerEntry::new(kind, enabled, move || {
                        sampler.sample_memory().map(Sample::Memory)
                    }),
                    SamplerKind::Cpu => SamplerEntry::new(kind, enabled, move || {
                        sampler.sample_cpu().map(Sample::Cpu)
                    }),
                    SamplerKind::Load => SamplerEntry::new(kind, enabled, move || {
                        sampler.sample_load().map(Sample::Load)
                    }),
                }
            })
            .collect();
        Self::new(entries)
    }

    /// Emits this collector's events inside `span` instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn samplers(&self) -> &[SamplerEntry] {
        &self.samplers
    }

    /// Kinds of the samplers that will run on `collect`.
    pub fn enabled(&self) -> Vec<SamplerKind> {
        self.samplers
            .iter()
            .filter(|entry| entry.enabled)
            .map(|entry| entry.kind)
            .collect()
    }

    /// Runs every enabled sampler and merges the results.
    ///
    /// Sampler errors are logged and skipped. The wait for results ends at
    /// `deadline`; samplers still running then are listed in
    /// [`Collection::missing`] and their late results are discarded. Workers
    /// are not interrupted, they finish their read in the background.
    pub async fn collect(&self, deadline: Instant) -> Collection {
        self.collect_inner(deadline)
            .instrument(self.span.clone())
            .await
    }

    async fn collect_inner(&self, deadline: Instant) -> Collection {
        let started = StdInstant::now();
        // Unbounded so a worker abandoned at the deadline never blocks on send.
        let (tx, mut rx) = mpsc::unbounded_channel::<CollectionOutcome>();
        let mut pending: Vec<SamplerKind> = Vec::new();

        for entry in &self.samplers {
            if !entry.enabled {
                debug!(sampler = %entry.kind, "sampler disabled, skipping");
                continue;
            }

            pending.push(entry.kind);
            let tx = tx.clone();
            let kind = entry.kind;
            let sample = Arc::clone(&entry.sample);
            let span = Span::current();
            tokio::task::spawn_blocking(move || {
                let _enter = span.enter();
                let result = sample();
                // Receiver is gone once the deadline passed; the result is stale then.
                let _ = tx.send(CollectionOutcome { kind, result });
            });
        }
        drop(tx);

        let mut collection = Collection::default();

        if pending.is_empty() {
            warn!("no samplers enabled");
            return collection;
        }

        debug!(samplers = pending.len(), "starting metric collection");

        while !pending.is_empty() {
            match timeout_at(deadline, rx.recv()).await {
                Ok(Some(outcome)) => {
                    if let Some(pos) = pending.iter().position(|k| *k == outcome.kind) {
                        pending.remove(pos);
                    }
                    collection.absorb(outcome);
                }
                Ok(None) => {
                    // Every sender is gone, so the remaining workers panicked.
                    error!(missing = ?pending, "samplers exited without reporting");
                    break;
                }
                Err(_) => {
                    warn!(missing = ?pending, "deadline reached before all samplers reported");
                    break;
                }
            }
        }
        collection.missing = pending;

        info!(
            total_count = collection.metrics.len(),
            failed = collection.failures.len(),
            missing = collection.missing.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "all metrics collected"
        );
        collection
    }
}
