//! Aggregator — single writer over engine state, snapshot publisher.
//!
//! Wraps the pure [`EngineState`] folds with an `ArcSwap` so every
//! transition is an atomic whole-state replacement, and broadcasts the
//! resulting [`Snapshot`] on a watch channel. Readers either load the
//! current state or subscribe to updates; neither path can observe a
//! partially-updated value.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::state::EngineState;
use crate::types::{ClassificationLabel, Snapshot};

/// Owns the engine state and fans out snapshots to consumers.
///
/// The poller's completion handler is the only writer (serialized by the
/// in-flight guard); `subscribe()` hands out any number of readers.
pub struct Aggregator {
    state: ArcSwap<EngineState>,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl Aggregator {
    /// Create an aggregator with empty state and publish the initial
    /// (all-zero) snapshot.
    pub fn new() -> Self {
        let state = EngineState::new();
        let (snapshot_tx, _) = watch::channel(state.snapshot());
        Self {
            state: ArcSwap::from_pointee(state),
            snapshot_tx,
        }
    }

    /// Fold a successful poll into the state and publish the new snapshot.
    pub fn apply_batch(&self, batch: &[ClassificationLabel], timestamp: DateTime<Utc>) {
        let next = self.state.load().apply_batch(batch, timestamp);
        self.publish(next);
    }

    /// Record a failed poll and publish the new snapshot.
    ///
    /// Previously aggregated totals and window entries are preserved.
    pub fn apply_error(&self, message: impl Into<String>) {
        let next = self.state.load().apply_error(message);
        self.publish(next);
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.state.load().snapshot()
    }

    /// Subscribe to snapshot updates.
    ///
    /// The receiver immediately holds the current snapshot and is notified
    /// on every subsequent transition, successful or failed.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    fn publish(&self, next: EngineState) {
        let snapshot = next.snapshot();
        self.state.store(Arc::new(next));
        // send_replace never fails; with no subscribers the value is simply
        // retained for the next subscribe()
        self.snapshot_tx.send_replace(snapshot);
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
