//! Named constants shared across the engine.
//!
//! Values that carry invariants live here rather than in the TOML config:
//! changing them changes engine semantics, not deployment tuning.

/// Classification service base URL when no override is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Polling interval between ticks, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Maximum per-tick summaries kept in the rolling window.
///
/// Oldest entries are evicted FIFO once the window is full; cumulative
/// totals are unaffected by eviction.
pub const WINDOW_CAPACITY: usize = 20;
