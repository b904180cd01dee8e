use std::sync::Arc;

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use tmon_core::StatSink;
use tmon_model::{PairingErrorKind, TaskIdentity, TaskStatRecord};

const NAMESPACE: &str = "tmon";

/// Prometheus-backed [`StatSink`].
///
/// ## Label cardinality
/// - `key`: one value per task key; keys default to type names, so keep them bounded
///   (avoid per-request keys).
/// - `kind`: `lost_start`, `duplicate_start`, `lost_finish`.
#[derive(Clone)]
pub struct PrometheusSink {
    completed: CounterVec,
    duration: HistogramVec,
    pairing_errors: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusSink {
    /// Register the task metrics in `registry`.
    ///
    /// Fails if metrics with the same names already live there.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let completed = CounterVec::new(
            Opts::new("tasks_completed_total", "Tasks with a matched start and finish")
                .namespace(NAMESPACE),
            &["key"],
        )?;
        registry.register(Box::new(completed.clone()))?;

        let duration = HistogramVec::new(
            HistogramOpts::new("task_duration_seconds", "Wall time between task start and finish")
                .namespace(NAMESPACE)
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0, 30.0]),
            &["key"],
        )?;
        registry.register(Box::new(duration.clone()))?;

        let pairing_errors = CounterVec::new(
            Opts::new("pairing_errors_total", "Start/finish events that could not be paired")
                .namespace(NAMESPACE),
            &["kind"],
        )?;
        registry.register(Box::new(pairing_errors.clone()))?;

        Ok(Self {
            completed,
            duration,
            pairing_errors,
            registry,
        })
    }

    /// Create the sink with a private registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metric families of the underlying registry.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render [`Self::gather`] in the text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Registry the task metrics live in; register host metrics alongside them.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl StatSink for PrometheusSink {
    fn on_record(&self, record: &TaskStatRecord) {
        let key = [record.identity.key()];
        self.completed.with_label_values(&key).inc();
        self.duration
            .with_label_values(&key)
            .observe(record.duration().as_secs_f64());
    }

    fn on_pairing_error(&self, _identity: &TaskIdentity, kind: PairingErrorKind) {
        self.pairing_errors
            .with_label_values(&[kind.as_label()])
            .inc();
    }
}
