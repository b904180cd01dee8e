//! Task-accounting core: recorder, sinks, executor adapters, monitor features and their registry.
pub mod clock;
pub mod error;
pub mod executor;
pub mod feature;
pub mod recorder;
pub mod registry;
pub mod sink;

pub use clock::{Clock, ClockHandle, ManualClock, MonotonicClock};
pub use error::{ConfigError, CoreError, PairingError};
pub use executor::{Executor, ExecutorHandle, InlineExecutor, Job, ThreadExecutor, TokioExecutor};
pub use feature::{
    ExecutorTaskMonitor, FeatureEvent, JoinError, MonitorFeature, TaskHandle, TaskHooks,
    TaskMonitor, TaskMonitorFeature,
};
pub use recorder::{
    RecordSnapshot, RecorderConfig, RecorderHandle, RecorderMetrics, TaskScope, TaskStatRecorder,
};
pub use registry::FeatureRegistry;
pub use sink::{
    ChannelSink, FanoutSink, NoOpSink, PairingEvent, SinkHandle, SinkReceiver, StatSink,
    noop_sink,
};

pub mod prelude {
    pub use crate::error::{ConfigError, CoreError, PairingError};
    pub use crate::executor::{Executor, ExecutorHandle};
    pub use crate::feature::{MonitorFeature, TaskHandle, TaskMonitor, TaskMonitorFeature};
    pub use crate::recorder::{RecorderConfig, RecorderHandle, TaskStatRecorder};
    pub use crate::registry::FeatureRegistry;
    pub use crate::sink::{SinkHandle, StatSink};
    pub use tmon_model::{PairingErrorKind, TaskIdentity, TaskStatRecord};
}
