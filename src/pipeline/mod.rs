//! Link-to-record pipeline.
//!
//! ## Module Structure
//!
//! - `aggregator`: merges per-URL records by title
//! - `guard`: at-most-once processing (recency window or durable marker)
//! - `formatter`: quoting and post composition
//! - `trigger`: precondition checks on reaction triggers
//! - `orchestrator`: the `LinkPipeline` tying it all together

pub mod aggregator;
pub mod formatter;
pub mod guard;
pub mod orchestrator;
pub mod trigger;

pub use guard::{MarkerGuard, MarkerStore, ProcessingGuard, RecencyWindow};
pub use orchestrator::{LinkPipeline, PostSink};
pub use trigger::{TriggerEvent, TriggerFilter};
