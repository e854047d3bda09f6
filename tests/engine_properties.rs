//! Aggregation invariant tests against the public engine API.
//!
//! Exercises the aggregator the way the poller's completion handler does:
//! fold batches and errors, read back snapshots and watch updates.

use chrono::Utc;
use trafficwatch::config::defaults::WINDOW_CAPACITY;
use trafficwatch::{Aggregator, Batch, ClassificationLabel};

/// Helper: decode raw codes into a batch
fn batch_of(codes: &[i64]) -> Batch {
    codes.iter().map(|&c| ClassificationLabel::from_code(c)).collect()
}

/// Test: totals equal the sum over every batch ever applied, including
/// batches whose summaries have been evicted from the window
#[test]
fn test_totals_count_evicted_batches() {
    let agg = Aggregator::new();

    // Deterministic mixed sequence, far longer than the window
    let mut expected_attacks = 0u64;
    let mut expected_normal = 0u64;
    for i in 0..(3 * WINDOW_CAPACITY as i64) {
        let codes: Vec<i64> = (0..(i % 5)).map(|j| (i + j) % 3).collect();
        expected_attacks += codes.iter().filter(|&&c| c == 1).count() as u64;
        expected_normal += codes.iter().filter(|&&c| c != 1).count() as u64;
        agg.apply_batch(&batch_of(&codes), Utc::now());
    }

    let snap = agg.snapshot();
    assert_eq!(snap.window.len(), WINDOW_CAPACITY);
    assert_eq!(snap.totals.total_attacks, expected_attacks);
    assert_eq!(snap.totals.total_normal, expected_normal);

    // Window accounts for fewer samples than the totals — eviction happened
    let windowed: u64 = snap.window.iter().map(|s| s.sample_count()).sum();
    assert!(windowed < expected_attacks + expected_normal);
}

/// Test: after capacity + 1 applications the first summary is gone and the
/// newest is the last element, in arrival order
#[test]
fn test_window_ordering_after_eviction() {
    let agg = Aggregator::new();

    for i in 1..=(WINDOW_CAPACITY as u64 + 1) {
        // i normal samples in batch i, so each summary is identifiable
        let codes = vec![0i64; i as usize];
        agg.apply_batch(&batch_of(&codes), Utc::now());
    }

    let snap = agg.snapshot();
    assert_eq!(snap.window.len(), WINDOW_CAPACITY);
    assert_eq!(snap.window.first().unwrap().normal_count, 2);
    assert_eq!(
        snap.window.last().unwrap().normal_count,
        WINDOW_CAPACITY as u64 + 1
    );

    // Strictly chronological
    for pair in snap.window.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
        assert_eq!(pair[0].normal_count + 1, pair[1].normal_count);
    }
}

/// Test: errors never change totals or window contents
#[test]
fn test_error_preserves_aggregates() {
    let agg = Aggregator::new();
    agg.apply_batch(&batch_of(&[1, 1, 0]), Utc::now());
    agg.apply_batch(&batch_of(&[0]), Utc::now());
    let before = agg.snapshot();

    agg.apply_error("connection refused");
    agg.apply_error("server returned status 500");

    let after = agg.snapshot();
    assert_eq!(after.window, before.window);
    assert_eq!(after.totals, before.totals);
    assert_eq!(after.last_error.as_deref(), Some("server returned status 500"));
}

/// Test: an empty batch advances the window with a zero summary, up to the cap
#[test]
fn test_empty_batches_advance_window() {
    let agg = Aggregator::new();

    for _ in 0..WINDOW_CAPACITY + 3 {
        agg.apply_batch(&[], Utc::now());
    }

    let snap = agg.snapshot();
    assert_eq!(snap.window.len(), WINDOW_CAPACITY);
    assert!(snap.window.iter().all(|s| s.sample_count() == 0));
    assert_eq!(snap.totals.total_attacks, 0);
    assert_eq!(snap.totals.total_normal, 0);
}

/// Test: every transition — success or failure — publishes on the watch channel
#[tokio::test]
async fn test_watch_publishes_on_every_transition() {
    let agg = Aggregator::new();
    let mut rx = agg.subscribe();

    agg.apply_batch(&batch_of(&[1]), Utc::now());
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().totals.total_attacks, 1);

    agg.apply_error("boom");
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().last_error.is_some());

    agg.apply_batch(&batch_of(&[]), Utc::now());
    rx.changed().await.unwrap();
    let snap = rx.borrow_and_update().clone();
    // Success cleared the error and consumed a window slot
    assert!(snap.last_error.is_none());
    assert_eq!(snap.window.len(), 2);
}
