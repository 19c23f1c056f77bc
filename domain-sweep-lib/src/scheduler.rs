//! Batch scheduler.
//!
//! Candidates are split into consecutive batches of at most `batch_size`.
//! Every probe of a batch starts together and the whole batch is joined before
//! the next one begins, so at most `batch_size` lookups are ever in flight.
//! That cap is the only back-pressure in the system.
//!
//! Cancellation is cooperative: once the token fires no new batch starts and
//! every probe still in flight is cut short the same way a timeout would cut
//! it, counting as `Error`. The sink is flushed and the statistics gathered so
//! far are returned.

use crate::error::SweepError;
use crate::generate::generate_candidates;
use crate::probe::{probe, Resolver};
use crate::progress::ProgressReporter;
use crate::sink::ResultSink;
use crate::stats::RunStats;
use crate::types::{ProbeOutcome, RunSummary, SweepConfig};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Drives a full sweep over a candidate list.
///
/// # Example
///
/// ```rust,no_run
/// use domain_sweep_lib::{DnsResolver, LineSink, NoopReporter, SweepConfig, Sweeper};
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = SweepConfig::default();
///     let sweeper = Sweeper::new(DnsResolver::new(config.timeout), config.clone());
///     let sink = LineSink::create(&config.output_path)?;
///
///     let summary = sweeper
///         .sweep("go*.dev", &sink, &NoopReporter, &CancellationToken::new())
///         .await?;
///     println!("{} available", summary.stats.available);
///     Ok(())
/// }
/// ```
pub struct Sweeper<R> {
    config: SweepConfig,
    resolver: R,
}

impl<R: Resolver> Sweeper<R> {
    pub fn new(resolver: R, config: SweepConfig) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Generate the candidates for `pattern` and run them.
    ///
    /// Fails only if the pattern cannot be expanded; probing itself never fails.
    pub async fn sweep<S: ResultSink + ?Sized>(
        &self,
        pattern: &str,
        sink: &S,
        reporter: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, SweepError> {
        let candidates = generate_candidates(pattern, &self.config.alphabet, self.config.order)?;
        Ok(self.run(&candidates, sink, reporter, cancel).await)
    }

    /// Probe every candidate in order, batch by batch.
    pub async fn run<S: ResultSink + ?Sized>(
        &self,
        candidates: &[String],
        sink: &S,
        reporter: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> RunSummary {
        let stats = RunStats::new(candidates.len());
        let batch_size = self.config.batch_size.max(1);

        info!(
            total = candidates.len(),
            batch_size,
            timeout_ms = self.config.timeout.as_millis() as u64,
            "starting sweep"
        );

        for (index, batch) in candidates.chunks(batch_size).enumerate() {
            if cancel.is_cancelled() {
                info!(batch = index, "interrupted, not starting further batches");
                break;
            }
            self.run_batch(batch, &stats, sink, reporter, cancel).await;
        }

        if let Err(e) = sink.flush() {
            warn!(error = %e, "failed to flush result sink");
        }

        let snapshot = stats.snapshot();
        let interrupted = cancel.is_cancelled() && snapshot.checked < snapshot.total;
        info!(
            checked = snapshot.checked,
            available = snapshot.available,
            errors = snapshot.errors,
            interrupted,
            "sweep finished"
        );

        RunSummary {
            stats: snapshot,
            interrupted,
        }
    }

    async fn run_batch<S: ResultSink + ?Sized>(
        &self,
        batch: &[String],
        stats: &RunStats,
        sink: &S,
        reporter: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) {
        let interval = self.config.progress_interval.max(1);
        let timeout = self.config.timeout;

        // Domains still in flight, in candidate order.
        let mut pending: Vec<&str> = batch.iter().map(String::as_str).collect();

        let mut in_flight: FuturesUnordered<_> = batch
            .iter()
            .map(|domain| async move {
                let outcome = tokio::select! {
                    outcome = probe(&self.resolver, domain, timeout) => outcome,
                    _ = cancel.cancelled() => {
                        debug!(domain, "lookup abandoned on interrupt");
                        ProbeOutcome::Error
                    }
                };
                (domain.as_str(), outcome)
            })
            .collect();

        while let Some((domain, outcome)) = in_flight.next().await {
            let snapshot = stats.record(domain, outcome);
            debug!(domain, %outcome, checked = snapshot.checked, "probe finished");

            if outcome.is_available() {
                if let Err(e) = sink.append(domain) {
                    warn!(domain, error = %e, "available domain could not be written");
                    stats.record_sink_failure();
                }
            }

            if let Some(pos) = pending.iter().position(|d| *d == domain) {
                pending.remove(pos);
            }

            if snapshot.checked % interval == 0 || pending.is_empty() {
                let current = pending.first().copied().unwrap_or(domain);
                reporter.render(&stats.snapshot(), current);
            }
        }
    }
}
