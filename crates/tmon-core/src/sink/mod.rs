//! Sink abstraction for completed task records and pairing errors.
//!
//! The recorder hands every completed [`tmon_model::TaskStatRecord`] and every pairing error to a [`StatSink`].
//! Hosts plug in their own sinks (logging, prometheus, queues) via [`SinkHandle`].
mod backend;
pub use backend::{SinkHandle, StatSink};

mod noop;
pub use noop::NoOpSink;

mod channel;
pub use channel::{ChannelSink, PairingEvent, SinkReceiver};

mod fanout;
pub use fanout::FanoutSink;

use std::sync::Arc;

/// Create a no-op sink handle.
#[inline]
pub fn noop_sink() -> SinkHandle {
    Arc::new(NoOpSink)
}
