//! Block processing pipeline.
//!
//! - `PollingLoop`: walks finalized heights, drives `EventProcessor`
//! - `EventProcessor`: decodes a block's bond events, applies `DropPolicy`
//! - `DropPolicy`: decides whether a bond earns a drop

pub mod drop_policy;
pub mod event_processor;
pub mod polling_loop;

pub use drop_policy::{DropDecision, DropPolicy, SkipReason};
pub use event_processor::{BlockReport, EventProcessor, ProcessError};
pub use polling_loop::{LoopFailure, PollError, PollingLoop};
