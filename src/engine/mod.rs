//! Polling/aggregation engine.
//!
//! The [`Poller`] drives timing and failure handling; the [`Aggregator`]
//! owns the rolling statistical state and publishes an immutable
//! [`Snapshot`](crate::types::Snapshot) after every transition. Consumers
//! subscribe to snapshot updates via [`Aggregator::subscribe`].

pub mod aggregator;
pub mod poller;
pub mod state;

pub use aggregator::Aggregator;
pub use poller::{Poller, PollerStats};
pub use state::EngineState;
