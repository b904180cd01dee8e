//! Registry of active monitor features.
//!
//! Features are kept sorted by ascending weight; equal weights keep registration order.
//! At most one instance of each concrete feature type can be registered.
use std::{
    any::{Any, TypeId},
    sync::Arc,
};

use tracing::{debug, instrument, trace};

use tmon_model::TaskKey;

use crate::{
    error::ConfigError,
    feature::{FeatureEvent, MonitorFeature},
    recorder::TaskScope,
};

/// Single registered feature.
struct FeatureEntry {
    type_id: TypeId,
    feature: Arc<dyn MonitorFeature>,
    /// Same instance, kept for typed lookup.
    any: Arc<dyn Any + Send + Sync>,
}

/// Process-wide set of monitor features for one monitoring session.
///
/// Owned by the host; features are added before monitoring starts and never removed.
#[derive(Default)]
pub struct FeatureRegistry {
    entries: Vec<FeatureEntry>,
}

impl FeatureRegistry {
    /// Empty registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a feature.
    ///
    /// Fails with [`ConfigError::DuplicateFeature`] if a feature of the same concrete type is already present.
    #[instrument(level = "debug", skip_all, fields(feature = feature.name(), weight = feature.weight()))]
    pub fn register<F: MonitorFeature>(&mut self, feature: Arc<F>) -> Result<(), ConfigError> {
        let type_id = TypeId::of::<F>();
        if self.entries.iter().any(|e| e.type_id == type_id) {
            return Err(ConfigError::DuplicateFeature {
                name: feature.name(),
            });
        }

        self.entries.push(FeatureEntry {
            type_id,
            feature: feature.clone(),
            any: feature,
        });
        // stable: equal weights keep registration order
        self.entries.sort_by_key(|e| e.feature.weight());
        debug!("feature registered");
        Ok(())
    }

    /// Typed lookup of a registered feature.
    pub fn get<F: MonitorFeature>(&self) -> Option<Arc<F>> {
        let type_id = TypeId::of::<F>();
        self.entries
            .iter()
            .find(|e| e.type_id == type_id)
            .and_then(|e| Arc::clone(&e.any).downcast::<F>().ok())
    }

    /// Registered features in ascending weight order.
    pub fn features(&self) -> impl Iterator<Item = &Arc<dyn MonitorFeature>> + '_ {
        self.entries.iter().map(|e| &e.feature)
    }

    /// Feature names in ascending weight order.
    pub fn names(&self) -> Vec<&'static str> {
        self.features().map(|f| f.name()).collect()
    }

    /// Number of registered features.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Broadcast `event` to every feature in weight order.
    pub fn dispatch(&self, event: FeatureEvent) {
        trace!(%event, features = self.entries.len(), "dispatching feature event");
        for feature in self.features() {
            feature.on_event(event);
        }
    }

    /// Send [`FeatureEvent::Enable`] to every feature, lowest weight first.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use tmon_core::{ExecutorTaskMonitor, FeatureRegistry, InlineExecutor, MonitorFeature, TaskStatRecorder};
    ///
    /// let recorder = TaskStatRecorder::default().into_handle();
    /// let mut registry = FeatureRegistry::new();
    /// registry
    ///     .register(Arc::new(ExecutorTaskMonitor::new(recorder, Arc::new(InlineExecutor))))
    ///     .unwrap();
    ///
    /// registry.enable_all();
    /// assert!(registry.features().all(|f| f.is_enabled()));
    /// ```
    pub fn enable_all(&self) {
        self.dispatch(FeatureEvent::Enable);
    }

    /// Send [`FeatureEvent::Disable`] to every feature.
    pub fn disable_all(&self) {
        self.dispatch(FeatureEvent::Disable);
    }

    /// Session start. Features only observe it; enabling is separate.
    pub fn turn_on(&self) {
        self.dispatch(FeatureEvent::TurnOn);
    }

    /// Session end.
    pub fn turn_off(&self) {
        self.dispatch(FeatureEvent::TurnOff);
    }

    /// Run `body` on the current thread wrapped by every enabled task feature.
    ///
    /// The lowest weight wraps outermost: it starts first and finishes last.
    pub fn run_wrapped<T>(&self, key: impl Into<TaskKey>, body: impl FnOnce() -> T) -> T {
        let key = key.into();
        let _scopes = ScopeStack(
            self.features()
                .filter_map(|f| f.task_hooks())
                .filter_map(|hooks| hooks.begin_task(&key))
                .collect(),
        );
        body()
    }
}

/// Finishes nested scopes innermost first.
struct ScopeStack(Vec<TaskScope>);

impl Drop for ScopeStack {
    fn drop(&mut self) {
        while let Some(scope) = self.0.pop() {
            drop(scope);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use super::*;
    use crate::{
        executor::InlineExecutor,
        feature::{ExecutorTaskMonitor, TaskHooks, TaskMonitor, TaskMonitorFeature},
        recorder::{RecorderHandle, TaskStatRecorder},
    };

    /// Feature without task hooks that logs the events it sees.
    struct Journal {
        name: &'static str,
        weight: i32,
        enabled: AtomicBool,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Journal {
        fn new(name: &'static str, weight: i32, seen: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                weight,
                enabled: AtomicBool::new(false),
                seen,
            }
        }
    }

    impl MonitorFeature for Journal {
        fn name(&self) -> &'static str {
            self.name
        }

        fn weight(&self) -> i32 {
            self.weight
        }

        fn is_enabled(&self) -> bool {
            self.enabled.load(Ordering::Relaxed)
        }

        fn set_enabled(&self, enabled: bool) {
            self.enabled.store(enabled, Ordering::Relaxed);
        }

        fn on_event(&self, event: FeatureEvent) {
            self.seen.lock().unwrap().push(format!("{}:{event}", self.name));
            match event {
                FeatureEvent::Enable => self.set_enabled(true),
                FeatureEvent::Disable => self.set_enabled(false),
                _ => {}
            }
        }
    }

    /// Second task feature type, so two task features can coexist.
    struct OuterTaskMonitor {
        monitor: TaskMonitor,
    }

    impl MonitorFeature for OuterTaskMonitor {
        fn name(&self) -> &'static str {
            "outer-task"
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

        fn task_hooks(&self) -> Option<&dyn TaskHooks> {
            Some(&self.monitor)
        }
    }

    impl TaskMonitorFeature for OuterTaskMonitor {
        fn monitor(&self) -> &TaskMonitor {
            &self.monitor
        }
    }

    fn recorder() -> RecorderHandle {
        TaskStatRecorder::default().into_handle()
    }

    #[test]
    fn rejects_second_instance_of_same_type() {
        let rec = recorder();
        let mut registry = FeatureRegistry::new();

        registry
            .register(Arc::new(ExecutorTaskMonitor::new(rec.clone(), Arc::new(InlineExecutor))))
            .unwrap();
        let err = registry
            .register(Arc::new(ExecutorTaskMonitor::new(rec, Arc::new(InlineExecutor))))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::DuplicateFeature {
                name: ExecutorTaskMonitor::NAME
            }
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn orders_by_weight_then_registration() {
        struct A(Journal);
        struct B(Journal);
        struct C(Journal);

        macro_rules! delegate {
            ($t:ident) => {
                impl MonitorFeature for $t {
                    fn name(&self) -> &'static str {
                        self.0.name()
                    }
                    fn weight(&self) -> i32 {
                        self.0.weight()
                    }
                    fn is_enabled(&self) -> bool {
                        self.0.is_enabled()
                    }
                    fn set_enabled(&self, enabled: bool) {
                        self.0.set_enabled(enabled)
                    }
                    fn on_event(&self, event: FeatureEvent) {
                        self.0.on_event(event)
                    }
                }
            };
        }
        delegate!(A);
        delegate!(B);
        delegate!(C);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = FeatureRegistry::new();
        registry.register(Arc::new(A(Journal::new("a", 5, seen.clone())))).unwrap();
        registry.register(Arc::new(B(Journal::new("b", -1, seen.clone())))).unwrap();
        registry.register(Arc::new(C(Journal::new("c", 5, seen.clone())))).unwrap();

        assert_eq!(registry.names(), vec!["b", "a", "c"]);

        registry.enable_all();
        registry.turn_on();
        assert!(registry.features().all(|f| f.is_enabled()));
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["b:enable", "a:enable", "c:enable", "b:turn-on", "a:turn-on", "c:turn-on"]
        );

        registry.disable_all();
        assert!(registry.features().all(|f| !f.is_enabled()));
    }

    #[test]
    fn typed_lookup_returns_registered_instance() {
        let rec = recorder();
        let feat = Arc::new(ExecutorTaskMonitor::new(rec, Arc::new(InlineExecutor)));
        let mut registry = FeatureRegistry::new();
        registry.register(feat.clone()).unwrap();

        let found = registry.get::<ExecutorTaskMonitor>().expect("registered");
        assert!(Arc::ptr_eq(&found, &feat));
        assert!(registry.get::<OuterTaskMonitor>().is_none());
    }

    #[test]
    fn run_wrapped_nests_by_weight() {
        let rec = recorder();
        let mut registry = FeatureRegistry::new();
        registry
            .register(Arc::new(ExecutorTaskMonitor::with_weight(
                10,
                rec.clone(),
                Arc::new(InlineExecutor),
            )))
            .unwrap();
        registry
            .register(Arc::new(OuterTaskMonitor {
                monitor: TaskMonitor::new(1, rec.clone(), Arc::new(InlineExecutor)),
            }))
            .unwrap();

        // disabled features do not wrap
        assert_eq!(registry.run_wrapped("job", || 1), 1);
        assert!(rec.snapshot().is_empty());

        registry.enable_all();
        let r = rec.clone();
        let out = registry.run_wrapped("job", move || r.open_count());
        assert_eq!(out, 2);

        let snap = rec.snapshot();
        assert_eq!(snap.len(), 2);
        // outer (weight 1) started first and finished last
        let (inner, outer) = (&snap.as_slice()[0], &snap.as_slice()[1]);
        assert!(outer.identity.instance() < inner.identity.instance());
        assert!(outer.started_at_nanos <= inner.started_at_nanos);
        assert!(outer.finished_at_nanos >= inner.finished_at_nanos);
    }
}
