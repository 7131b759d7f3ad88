//! Streaming text generation.
//!
//! This module provides the provider boundary and the aggregation that sits
//! on top of it:
//!
//! - [`StreamingProvider`] opens a session and yields [`StreamEvent`]s
//! - [`StreamingAggregator`] folds the text deltas into one string
//! - [`ChunkSink`] receives each delta live when the caller wants it

mod aggregate;
mod error;
mod event;
mod provider;
mod sink;
mod types;

pub use aggregate::{StreamingAggregator, aggregate_text};
pub use error::{GenerationError, SinkError};
pub use event::{EventStream, StreamEvent};
pub use provider::StreamingProvider;
pub use sink::ChunkSink;
pub use types::{InvocationRequest, Message, StopReason, StreamContext, Usage};
