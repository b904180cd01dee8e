use std::{
    any::type_name,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tracing::debug;

use tmon_model::TaskKey;

use crate::{
    executor::{ExecutorHandle, Job},
    feature::{MonitorFeature, TaskHooks, handle::TaskHandle},
    recorder::{RecorderHandle, TaskScope},
};

/// Wrapping engine shared by task-observing features.
///
/// Concrete task features embed one and expose it through [`TaskMonitorFeature::monitor`].
/// The enabled flag is read once per submission: work already submitted keeps the state
/// it saw, later toggles only affect later submissions.
pub struct TaskMonitor {
    weight: i32,
    enabled: AtomicBool,
    recorder: RecorderHandle,
    executor: ExecutorHandle,
}

impl TaskMonitor {
    /// Create a disabled monitor.
    pub fn new(weight: i32, recorder: RecorderHandle, executor: ExecutorHandle) -> Self {
        Self {
            weight,
            enabled: AtomicBool::new(false),
            recorder,
            executor,
        }
    }

    /// Builder-style initial state, applied before the monitor is shared.
    pub fn with_enabled(self, enabled: bool) -> Self {
        self.enabled.store(enabled, Ordering::Relaxed);
        self
    }

    /// Ordering weight within the registry; lower wraps outermost.
    #[inline]
    pub fn weight(&self) -> i32 {
        self.weight
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turn instrumentation on or off for later submissions.
    ///
    /// Work already submitted keeps the state it was submitted under.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use tmon_core::{InlineExecutor, TaskMonitor, TaskStatRecorder};
    ///
    /// let recorder = TaskStatRecorder::default().into_handle();
    /// let monitor = TaskMonitor::new(0, recorder.clone(), Arc::new(InlineExecutor));
    ///
    /// monitor.run("cold", || ());
    /// monitor.set_enabled(true);
    /// monitor.run("warm", || ());
    ///
    /// assert_eq!(recorder.identities_issued(), 1);
    /// assert_eq!(recorder.snapshot().len(), 1);
    /// ```
    pub fn set_enabled(&self, enabled: bool) {
        let was = self.enabled.swap(enabled, Ordering::Relaxed);
        if was != enabled {
            debug!(enabled, "task monitor toggled");
        }
    }

    /// Recorder that receives this monitor's starts and finishes.
    pub fn recorder(&self) -> &RecorderHandle {
        &self.recorder
    }

    /// Executor that [`submit`](Self::submit) hands work to.
    pub fn executor(&self) -> &ExecutorHandle {
        &self.executor
    }

    /// Start timing a task under `key` if enabled.
    ///
    /// The key is only converted when enabled, so the disabled path allocates nothing.
    pub fn begin(&self, key: impl Into<TaskKey>) -> Option<TaskScope> {
        if !self.is_enabled() {
            return None;
        }
        let identity = self.recorder.new_identity(key);
        Some(self.recorder.begin(identity))
    }

    /// Run `body` on the current thread, timed under `key` if enabled.
    pub fn run<F, T>(&self, key: impl Into<TaskKey>, body: F) -> T
    where
        F: FnOnce() -> T,
    {
        let _scope = self.begin(key);
        body()
    }

    /// Submit `task` to the executor, keyed by its type name.
    pub fn submit<F, T>(&self, task: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit_keyed(type_name::<F>(), task)
    }

    /// Submit `task` to the executor under an explicit key.
    ///
    /// When enabled, the identity is allocated here, the start is recorded when the body
    /// begins on the worker, and the finish on every exit path of the body.
    /// When disabled, the body runs untouched: no identity, no recorder calls.
    pub fn submit_keyed<K, F, T>(&self, key: K, task: F) -> TaskHandle<T>
    where
        K: Into<TaskKey>,
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (done, handle) = TaskHandle::channel();

        let job: Job = if self.is_enabled() {
            let identity = self.recorder.new_identity(key);
            let recorder = Arc::clone(&self.recorder);
            Box::new(move || {
                let outcome = catch_unwind(AssertUnwindSafe(move || {
                    let _scope = recorder.begin(identity);
                    task()
                }));
                let _ = done.send(outcome);
            })
        } else {
            Box::new(move || {
                let _ = done.send(catch_unwind(AssertUnwindSafe(task)));
            })
        };

        self.executor.run(job);
        handle
    }
}

impl TaskHooks for TaskMonitor {
    fn begin_task(&self, key: &TaskKey) -> Option<TaskScope> {
        self.begin(Arc::clone(key))
    }
}

/// Monitor feature that instruments task execution.
///
/// Implementors only provide [`monitor`](Self::monitor); submission delegates to it.
pub trait TaskMonitorFeature: MonitorFeature {
    /// The embedded wrapping engine.
    fn monitor(&self) -> &TaskMonitor;

    /// See [`TaskMonitor::submit`].
    fn submit<F, T>(&self, task: F) -> TaskHandle<T>
    where
        Self: Sized,
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.monitor().submit(task)
    }

    /// See [`TaskMonitor::submit_keyed`].
    fn submit_keyed<K, F, T>(&self, key: K, task: F) -> TaskHandle<T>
    where
        Self: Sized,
        K: Into<TaskKey>,
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.monitor().submit_keyed(key, task)
    }

    /// See [`TaskMonitor::run`].
    fn run<F, T>(&self, key: impl Into<TaskKey>, body: F) -> T
    where
        Self: Sized,
        F: FnOnce() -> T,
    {
        self.monitor().run(key, body)
    }
}

/// Task feature that times every task submitted through it.
pub struct ExecutorTaskMonitor {
    monitor: TaskMonitor,
}

impl ExecutorTaskMonitor {
    pub const NAME: &'static str = "executor-task";

    /// Create a disabled feature with weight `0`.
    pub fn new(recorder: RecorderHandle, executor: ExecutorHandle) -> Self {
        Self::with_weight(0, recorder, executor)
    }

    /// Create a disabled feature ordered by `weight` among other features.
    pub fn with_weight(weight: i32, recorder: RecorderHandle, executor: ExecutorHandle) -> Self {
        Self {
            monitor: TaskMonitor::new(weight, recorder, executor),
        }
    }
}

impl MonitorFeature for ExecutorTaskMonitor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn weight(&self) -> i32 {
        self.monitor.weight()
    }

    fn is_enabled(&self) -> bool {
        self.monitor.is_enabled()
    }

    fn set_enabled(&self, enabled: bool) {
        self.monitor.set_enabled(enabled)
    }

    fn on_turn_off(&self) {
        let open = self.monitor.recorder().open_count();
        if open > 0 {
            debug!(feature = Self::NAME, open, "turned off with tasks still open");
        }
    }

    fn task_hooks(&self) -> Option<&dyn TaskHooks> {
        Some(&self.monitor)
    }
}

impl TaskMonitorFeature for ExecutorTaskMonitor {
    fn monitor(&self) -> &TaskMonitor {
        &self.monitor
    }
}
