//! TrafficWatch: real-time DDoS detection monitor.
//!
//! Polling client for a remote traffic-classification service: one request
//! per tick, binary verdicts folded into cumulative totals and a bounded
//! rolling window of per-tick summaries.
//!
//! ## Architecture
//!
//! - **Client**: HTTP boundary to the `POST /predict` endpoint
//! - **Poller**: fixed-interval timer with an in-flight guard — at most one
//!   outstanding request, skipped ticks instead of queueing
//! - **Aggregator**: pure state folds published as atomic snapshot
//!   replacements over a watch channel

pub mod client;
pub mod config;
pub mod engine;
pub mod types;

// Re-export the engine surface
pub use client::{ClassificationService, PredictClient, PredictError};
pub use engine::{Aggregator, EngineState, Poller, PollerStats};

// Re-export the data model
pub use types::{Batch, ClassificationLabel, CumulativeTotals, Snapshot, TickSummary};
