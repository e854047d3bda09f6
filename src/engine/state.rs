//! Engine state — the rolling window, cumulative totals, and last error.
//!
//! Transitions are pure: each returns a new `EngineState` rather than
//! mutating in place, so the aggregator can publish whole states atomically
//! and readers never observe a half-applied update.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::config::defaults::WINDOW_CAPACITY;
use crate::types::{ClassificationLabel, CumulativeTotals, Snapshot, TickSummary};

/// Aggregated engine state.
///
/// Created empty at engine start, advanced only by
/// [`apply_batch`](EngineState::apply_batch) and
/// [`apply_error`](EngineState::apply_error), discarded at engine stop.
/// Invariants:
///
/// - the window holds at most [`WINDOW_CAPACITY`] summaries, oldest first;
/// - totals equal the sum of counts over every summary ever produced,
///   including summaries already evicted from the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineState {
    window: VecDeque<TickSummary>,
    totals: CumulativeTotals,
    last_error: Option<String>,
}

impl EngineState {
    /// Empty state: zero totals, empty window, no error.
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW_CAPACITY),
            totals: CumulativeTotals::default(),
            last_error: None,
        }
    }

    /// Fold one successful poll into the state.
    ///
    /// Counts the batch into a [`TickSummary`], increments totals, appends
    /// to the window (evicting the oldest entry past capacity), and clears
    /// any stored error. An empty batch still produces a zero summary and
    /// consumes a window slot — the timeline advances on every success.
    pub fn apply_batch(
        &self,
        batch: &[ClassificationLabel],
        timestamp: DateTime<Utc>,
    ) -> EngineState {
        let summary = TickSummary::from_batch(batch, timestamp);

        let mut window = self.window.clone();
        if window.len() >= WINDOW_CAPACITY {
            window.pop_front();
        }
        window.push_back(summary.clone());

        EngineState {
            window,
            totals: self.totals.plus(&summary),
            last_error: None,
        }
    }

    /// Record a failed poll.
    ///
    /// Totals and window are untouched; stale-but-valid data is preferred
    /// over blanking the display.
    pub fn apply_error(&self, message: impl Into<String>) -> EngineState {
        EngineState {
            window: self.window.clone(),
            totals: self.totals,
            last_error: Some(message.into()),
        }
    }

    /// Read-only projection for consumers.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            window: self.window.iter().cloned().collect(),
            totals: self.totals,
            last_error: self.last_error.clone(),
        }
    }

    /// Current window contents, oldest first.
    pub fn window(&self) -> &VecDeque<TickSummary> {
        &self.window
    }

    /// Running totals since engine start.
    pub fn totals(&self) -> CumulativeTotals {
        self.totals
    }

    /// Message from the most recent failed poll, if the last poll failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Batch;

    fn batch_of(codes: &[i64]) -> Batch {
        codes.iter().map(|&c| ClassificationLabel::from_code(c)).collect()
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = EngineState::new();
        assert!(state.window().is_empty());
        assert_eq!(state.totals(), CumulativeTotals::default());
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_apply_batch_counts_labels() {
        let state = EngineState::new().apply_batch(&batch_of(&[1, 0, 0]), Utc::now());

        assert_eq!(state.window().len(), 1);
        let summary = &state.window()[0];
        assert_eq!(summary.attack_count, 1);
        assert_eq!(summary.normal_count, 2);
        assert_eq!(state.totals().total_attacks, 1);
        assert_eq!(state.totals().total_normal, 2);
    }

    #[test]
    fn test_scenario_three_batches() {
        let mut state = EngineState::new();
        for codes in [&[1, 0, 0][..], &[1, 1][..], &[][..]] {
            state = state.apply_batch(&batch_of(codes), Utc::now());
        }

        assert_eq!(state.totals().total_attacks, 3);
        assert_eq!(state.totals().total_normal, 2);

        let counts: Vec<(u64, u64)> = state
            .window()
            .iter()
            .map(|s| (s.attack_count, s.normal_count))
            .collect();
        assert_eq!(counts, vec![(1, 2), (2, 0), (0, 0)]);
    }

    #[test]
    fn test_empty_batch_consumes_window_slot() {
        let state = EngineState::new().apply_batch(&[], Utc::now());

        assert_eq!(state.window().len(), 1);
        assert_eq!(state.window()[0].attack_count, 0);
        assert_eq!(state.window()[0].normal_count, 0);
        assert_eq!(state.totals(), CumulativeTotals::default());
    }

    #[test]
    fn test_window_evicts_fifo_at_capacity() {
        let mut state = EngineState::new();
        // 21 applies: one attack in batch i so entries are distinguishable
        for i in 0..=WINDOW_CAPACITY as u64 {
            let mut codes = vec![0i64; i as usize];
            codes.push(1);
            state = state.apply_batch(&batch_of(&codes), Utc::now());
            assert!(state.window().len() <= WINDOW_CAPACITY);
        }

        assert_eq!(state.window().len(), WINDOW_CAPACITY);
        // First summary (normal_count 0) evicted; 21st is the last element
        assert_eq!(state.window().front().unwrap().normal_count, 1);
        assert_eq!(
            state.window().back().unwrap().normal_count,
            WINDOW_CAPACITY as u64
        );
    }

    #[test]
    fn test_totals_survive_eviction() {
        let mut state = EngineState::new();
        for _ in 0..WINDOW_CAPACITY + 5 {
            state = state.apply_batch(&batch_of(&[1, 0]), Utc::now());
        }

        assert_eq!(state.window().len(), WINDOW_CAPACITY);
        assert_eq!(state.totals().total_attacks, (WINDOW_CAPACITY + 5) as u64);
        assert_eq!(state.totals().total_normal, (WINDOW_CAPACITY + 5) as u64);
    }

    #[test]
    fn test_apply_error_preserves_aggregates() {
        let state = EngineState::new()
            .apply_batch(&batch_of(&[1, 1, 0]), Utc::now());
        let failed = state.apply_error("connection refused");

        assert_eq!(failed.window(), state.window());
        assert_eq!(failed.totals(), state.totals());
        assert_eq!(failed.last_error(), Some("connection refused"));
    }

    #[test]
    fn test_success_clears_error() {
        let state = EngineState::new()
            .apply_error("connection refused")
            .apply_batch(&batch_of(&[0]), Utc::now());

        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_transitions_leave_input_untouched() {
        let state = EngineState::new().apply_batch(&batch_of(&[1]), Utc::now());
        let before = state.clone();

        let _ = state.apply_batch(&batch_of(&[1, 1]), Utc::now());
        let _ = state.apply_error("boom");

        assert_eq!(state, before);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let state = EngineState::new()
            .apply_batch(&batch_of(&[1, 0]), Utc::now())
            .apply_error("timeout");
        let snap = state.snapshot();

        assert_eq!(snap.window.len(), 1);
        assert_eq!(snap.totals, state.totals());
        assert_eq!(snap.last_error.as_deref(), Some("timeout"));
        assert_eq!(snap.latest().unwrap().attack_count, 1);
    }
}
