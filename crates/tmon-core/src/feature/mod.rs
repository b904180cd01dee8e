//! Monitor features: pluggable, weighted, toggleable instrumentation units.
//!
//! A feature is registered in a [`crate::FeatureRegistry`] and receives enable/disable and
//! lifecycle events from it. Task features additionally expose [`TaskHooks`] so the registry
//! can nest several of them around one task body.
mod handle;
pub use handle::{JoinError, TaskHandle};

mod task;
pub use task::{ExecutorTaskMonitor, TaskMonitor, TaskMonitorFeature};

use std::fmt;

use tmon_model::TaskKey;

use crate::recorder::TaskScope;

/// Event broadcast by the registry to every feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureEvent {
    /// Start instrumenting newly submitted work.
    Enable,
    /// Stop instrumenting newly submitted work.
    Disable,
    /// Monitoring session started.
    TurnOn,
    /// Monitoring session stopped.
    TurnOff,
}

impl fmt::Display for FeatureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeatureEvent::Enable => "enable",
            FeatureEvent::Disable => "disable",
            FeatureEvent::TurnOn => "turn-on",
            FeatureEvent::TurnOff => "turn-off",
        };
        f.write_str(s)
    }
}

/// Pluggable unit of instrumentation.
///
/// `weight` is fixed for the lifetime of the feature and orders features ascending;
/// when several features wrap one task, the lowest weight wraps outermost.
pub trait MonitorFeature: Send + Sync + 'static {
    /// Feature name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Ordering key within a [`crate::FeatureRegistry`]. Must not change once registered.
    fn weight(&self) -> i32;

    fn is_enabled(&self) -> bool;

    /// Toggle instrumentation for work submitted after this call.
    fn set_enabled(&self, enabled: bool);

    /// Called when the monitoring session starts.
    fn on_turn_on(&self) {}

    /// Called when the monitoring session stops.
    fn on_turn_off(&self) {}

    fn on_event(&self, event: FeatureEvent) {
        match event {
            FeatureEvent::Enable => self.set_enabled(true),
            FeatureEvent::Disable => self.set_enabled(false),
            FeatureEvent::TurnOn => self.on_turn_on(),
            FeatureEvent::TurnOff => self.on_turn_off(),
        }
    }

    /// Task start/finish hooks, for features that observe task execution.
    fn task_hooks(&self) -> Option<&dyn TaskHooks> {
        None
    }
}

/// Per-task hooks of a task-observing feature.
pub trait TaskHooks: Send + Sync {
    /// Start timing a task under `key`.
    ///
    /// Returns `None` when the feature is disabled; otherwise the returned scope
    /// records the finish when dropped.
    fn begin_task(&self, key: &TaskKey) -> Option<TaskScope>;
}
