//! Poller — fixed-interval tick loop driving the classification fetches.
//!
//! One request per tick, at most one in flight at any time. A tick that
//! fires while the previous request is still outstanding is skipped
//! entirely: no queueing, no cancellation of the outstanding request. The
//! fixed interval is also the retry schedule — failed polls are reported
//! and simply waited out.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::aggregator::Aggregator;
use crate::client::ClassificationService;

/// Final polling statistics, returned by [`Poller::run`] for the shutdown
/// summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollerStats {
    /// Timer ticks observed (including skipped ones)
    pub ticks_fired: u64,
    /// Ticks skipped because a request was still in flight
    pub ticks_skipped: u64,
    /// Requests actually issued
    pub requests_issued: u64,
    /// Successful polls folded into the engine state
    pub batches_applied: u64,
    /// Failed polls reported to the engine state
    pub polls_failed: u64,
}

/// Completion counters shared with the spawned request tasks.
#[derive(Default)]
struct CompletionCounters {
    applied: AtomicU64,
    failed: AtomicU64,
}

/// Owns the polling timer, the in-flight guard, and the request lifecycle.
///
/// Built with [`new()`](Poller::new), then consumed by [`run()`](Poller::run),
/// which loops until the cancellation token fires. Cancellation is
/// cooperative: the timer stops immediately, an outstanding request is
/// allowed to complete, and its late result is discarded without touching
/// engine state.
pub struct Poller<S: ClassificationService> {
    service: Arc<S>,
    aggregator: Arc<Aggregator>,
    interval: Duration,
    cancel_token: CancellationToken,
    in_flight: Arc<AtomicBool>,
}

impl<S: ClassificationService> Poller<S> {
    pub fn new(
        service: S,
        aggregator: Arc<Aggregator>,
        interval: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            service: Arc::new(service),
            aggregator,
            interval,
            cancel_token,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run the polling loop until cancellation.
    ///
    /// Returns final polling statistics.
    pub async fn run(self) -> PollerStats {
        let mut interval = tokio::time::interval(self.interval);
        let counters = Arc::new(CompletionCounters::default());

        info!(
            endpoint = %self.service.endpoint_name(),
            interval_ms = self.interval.as_millis() as u64,
            "📡 Polling classification service"
        );

        let mut ticks_fired = 0u64;
        let mut ticks_skipped = 0u64;
        let mut requests_issued = 0u64;

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    info!("[Poller] Shutdown signal received");
                    break;
                }
                _ = interval.tick() => {}
            }

            ticks_fired += 1;

            // In-flight guard: the tick is skipped entirely while a request
            // is outstanding. Checked atomically with the decision to issue.
            if self
                .in_flight
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                ticks_skipped += 1;
                debug!("Previous request still in flight — skipping tick");
                continue;
            }

            requests_issued += 1;

            // The request runs as its own task so a slow service never
            // blocks the timer.
            let service = Arc::clone(&self.service);
            let aggregator = Arc::clone(&self.aggregator);
            let cancel_token = self.cancel_token.clone();
            let in_flight = Arc::clone(&self.in_flight);
            let counters = Arc::clone(&counters);

            tokio::spawn(async move {
                let outcome = service.fetch_batch().await;

                // Stale completion: the poller was stopped while this
                // request was outstanding. Discard the result.
                if cancel_token.is_cancelled() {
                    in_flight.store(false, Ordering::Release);
                    debug!("Discarding completion that arrived after shutdown");
                    return;
                }

                match outcome {
                    Ok(batch) => {
                        debug!(samples = batch.len(), "Batch received");
                        aggregator.apply_batch(&batch, Utc::now());
                        counters.applied.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        warn!(error = %e, "Poll failed — next scheduled tick is the retry");
                        aggregator.apply_error(e.to_string());
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                    }
                }

                // Release the guard only after the fold is applied, so the
                // next request can never race this completion's write.
                in_flight.store(false, Ordering::Release);
            });
        }

        PollerStats {
            ticks_fired,
            ticks_skipped,
            requests_issued,
            batches_applied: counters.applied.load(Ordering::Relaxed),
            polls_failed: counters.failed.load(Ordering::Relaxed),
        }
    }
}
