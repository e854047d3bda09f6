//! Core data model for the monitoring engine.
//!
//! Verdicts arrive from the classification service as raw integer codes and
//! are decoded into [`ClassificationLabel`]s. Each successful poll folds into
//! one [`TickSummary`]; the engine keeps a bounded window of summaries plus
//! [`CumulativeTotals`] that survive window eviction. Consumers only ever see
//! the immutable [`Snapshot`] projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Classification Labels
// ============================================================================

/// Binary verdict for one classified traffic sample.
///
/// Derived from the service's integer code: `1` means Attack, any other
/// value (including negatives) means Normal. The service is trusted as-is;
/// no stricter validation is applied to out-of-range codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationLabel {
    /// Sample classified as DDoS attack traffic
    Attack,
    /// Sample classified as benign traffic
    Normal,
}

impl ClassificationLabel {
    /// Decode a raw prediction code from the service.
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            ClassificationLabel::Attack
        } else {
            ClassificationLabel::Normal
        }
    }

    /// True for [`ClassificationLabel::Attack`].
    pub fn is_attack(self) -> bool {
        matches!(self, ClassificationLabel::Attack)
    }
}

impl std::fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassificationLabel::Attack => write!(f, "DDoS"),
            ClassificationLabel::Normal => write!(f, "Normal"),
        }
    }
}

/// Ordered sequence of labels produced by a single poll. May be empty.
pub type Batch = Vec<ClassificationLabel>;

// ============================================================================
// Per-Tick Summary
// ============================================================================

/// Aggregated counts for one polling cycle.
///
/// Immutable once created; exactly one is produced per successful poll,
/// including polls that return an empty batch (the tick still advances the
/// timeline with a zero summary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    /// Wall-clock time at which the batch was applied
    pub timestamp: DateTime<Utc>,

    /// Samples classified as attack traffic in this batch
    pub attack_count: u64,

    /// Samples classified as benign traffic in this batch
    pub normal_count: u64,
}

impl TickSummary {
    /// Build a summary by counting labels in a batch.
    pub fn from_batch(batch: &[ClassificationLabel], timestamp: DateTime<Utc>) -> Self {
        let attack_count = batch.iter().filter(|l| l.is_attack()).count() as u64;
        let normal_count = batch.len() as u64 - attack_count;
        Self {
            timestamp,
            attack_count,
            normal_count,
        }
    }

    /// Total samples in this tick's batch.
    pub fn sample_count(&self) -> u64 {
        self.attack_count + self.normal_count
    }
}

// ============================================================================
// Cumulative Totals
// ============================================================================

/// Running totals since engine start.
///
/// Monotonically non-decreasing — window eviction never rolls these back,
/// and errors never reset them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeTotals {
    /// Total samples classified as attacks across all polls
    pub total_attacks: u64,

    /// Total samples classified as benign across all polls
    pub total_normal: u64,
}

impl CumulativeTotals {
    /// Return totals incremented by one tick's counts.
    pub fn plus(self, summary: &TickSummary) -> Self {
        Self {
            total_attacks: self.total_attacks + summary.attack_count,
            total_normal: self.total_normal + summary.normal_count,
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Read-only projection of engine state published after every transition.
///
/// Consumers (logger, dashboard, metrics exporter) receive this over the
/// aggregator's watch channel. A snapshot is always internally consistent:
/// it is built from a single complete state, never from a state mid-update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// The most recent per-tick summaries, oldest first (bounded window)
    pub window: Vec<TickSummary>,

    /// Running totals since engine start
    pub totals: CumulativeTotals,

    /// Message from the most recent failed poll, cleared by the next success
    pub last_error: Option<String>,
}

impl Snapshot {
    /// Counts from the most recent tick, if any poll has succeeded yet.
    pub fn latest(&self) -> Option<&TickSummary> {
        self.window.last()
    }
}
