//! Prometheus exposition of task monitoring results.
//!
//! [`PrometheusSink`] is a [`tmon_core::StatSink`]: plug it into a recorder
//! (alone or through a `FanoutSink`) and serve [`PrometheusSink::gather`] from the
//! host's own `/metrics` endpoint. No HTTP server is provided here.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tmon_core::{RecorderConfig, TaskStatRecorder};
//! use tmon_prometheus::PrometheusSink;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusSink::new()?;
//! let recorder = TaskStatRecorder::new(RecorderConfig::default(), Arc::new(metrics.clone()));
//!
//! let id = recorder.new_identity("resize");
//! recorder.on_task_started(&id)?;
//! recorder.on_task_finished(&id)?;
//!
//! assert!(metrics.encode_text()?.contains("tmon_tasks_completed_total"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `tmon_tasks_completed_total{key}` - Counter
//! - `tmon_task_duration_seconds{key}` - Histogram
//! - `tmon_pairing_errors_total{kind}` - Counter

mod sink;
pub use sink::PrometheusSink;

pub use prometheus::{Encoder, Registry, TextEncoder};
