//! Observability for task monitoring: global logger setup, a tracing-backed sink
//! and (with the default `sweeper` feature) a background stale-task sweeper.
mod logger;
pub use logger::*;

mod sink;
pub use sink::LogSink;

#[cfg(feature = "sweeper")]
mod sweeper;
#[cfg(feature = "sweeper")]
pub use sweeper::{SweeperConfig, spawn_stale_sweeper};
