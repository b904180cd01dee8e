//! Task start/finish pairing.
//!
//! [`TaskStatRecorder`] keeps an open-task table keyed by [`TaskIdentity`].
//! A start inserts an entry, the matching finish removes it and produces a [`TaskStatRecord`].
//! The table is a sharded concurrent map: distinct identities never contend on a shared lock,
//! and racing calls for the same identity serialize on one shard so that only one removal wins.
//! Completed records go to a lock-free history ring, so [`TaskStatRecorder::snapshot`]
//! never stalls a finish.
mod config;
pub use config::RecorderConfig;

mod scope;
pub use scope::TaskScope;

mod snapshot;
pub use snapshot::RecordSnapshot;

mod history;
use history::History;

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use dashmap::{DashMap, mapref::entry::Entry};
use tracing::{debug, trace};

use tmon_model::{OpenTask, PairingErrorKind, TaskIdentity, TaskKey, TaskStatRecord};

use crate::{
    clock::{ClockHandle, MonotonicClock},
    error::PairingError,
    sink::{SinkHandle, noop_sink},
};

/// Shared handle to a recorder.
pub type RecorderHandle = Arc<TaskStatRecorder>;

/// Open-task table value.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    started_at: u64,
    stale_reported: bool,
}

/// Recorder health counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderMetrics {
    /// Tasks currently between start and finish.
    pub open_count: usize,
    /// Age of the oldest open task in milliseconds.
    pub oldest_open_age_ms: Option<u64>,
    /// Records produced since creation.
    pub completed: u64,
    /// Pairing errors reported since creation (all kinds).
    pub pairing_errors: u64,
    /// Open tasks reported as lost finishes since creation.
    pub stale_detected: u64,
}

/// Pairs task start/finish events and emits completed records to a sink.
pub struct TaskStatRecorder {
    open: DashMap<TaskIdentity, OpenEntry>,
    history: History,
    config: RecorderConfig,
    clock: ClockHandle,
    sink: SinkHandle,
    issued: AtomicU64,
    completed: AtomicU64,
    pairing_errors: AtomicU64,
    stale_detected: AtomicU64,
}

impl TaskStatRecorder {
    /// Create a recorder with a monotonic clock.
    pub fn new(config: RecorderConfig, sink: SinkHandle) -> Self {
        Self {
            open: DashMap::new(),
            history: History::new(config.history_capacity),
            config,
            clock: Arc::new(MonotonicClock::new()),
            sink,
            issued: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            pairing_errors: AtomicU64::new(0),
            stale_detected: AtomicU64::new(0),
        }
    }

    /// Replace the clock and return the updated recorder.
    pub fn with_clock(mut self, clock: ClockHandle) -> Self {
        self.clock = clock;
        self
    }

    /// Wrap into a shared handle.
    pub fn into_handle(self) -> RecorderHandle {
        Arc::new(self)
    }

    /// Configuration the recorder was built with.
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Allocate a fresh identity under `key`.
    ///
    /// Instances come from a per-recorder monotonic counter,
    /// so identities issued by one recorder never collide.
    pub fn new_identity(&self, key: impl Into<TaskKey>) -> TaskIdentity {
        let instance = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        TaskIdentity::new(key, instance)
    }

    /// Number of identities handed out by [`Self::new_identity`].
    pub fn identities_issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    /// Record the start of `identity`.
    ///
    /// A second start for an identity that is still open is reported as
    /// [`PairingErrorKind::DuplicateStart`]; the existing entry is kept untouched.
    pub fn on_task_started(&self, identity: &TaskIdentity) -> Result<(), PairingError> {
        let now = self.clock.now_nanos();
        let inserted = match self.open.entry(identity.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(OpenEntry {
                    started_at: now,
                    stale_reported: false,
                });
                true
            }
        };

        if !inserted {
            return Err(self.report(identity, PairingErrorKind::DuplicateStart));
        }
        trace!(task = %identity, started_at = now, "task started");
        Ok(())
    }

    /// Record the finish of `identity` and emit the completed record.
    ///
    /// Without an open start this is a [`PairingErrorKind::LostStart`] and nothing is emitted.
    pub fn on_task_finished(&self, identity: &TaskIdentity) -> Result<TaskStatRecord, PairingError> {
        let now = self.clock.now_nanos();
        let Some((identity, entry)) = self.open.remove(identity) else {
            return Err(self.report(identity, PairingErrorKind::LostStart));
        };

        let record = TaskStatRecord::new(identity, entry.started_at, now);
        trace!(
            task = %record.identity,
            duration_ns = record.duration_nanos,
            "task finished"
        );

        self.completed.fetch_add(1, Ordering::Relaxed);
        self.history.push(record.clone());
        self.sink.on_record(&record);
        Ok(record)
    }

    /// Start `identity` and return a guard that finishes it on drop.
    pub fn begin(self: &Arc<Self>, identity: TaskIdentity) -> TaskScope {
        let identity = self.on_task_started(&identity).ok().map(|_| identity);
        TaskScope::new(Arc::clone(self), identity)
    }

    /// Copy of the retained records, oldest first.
    ///
    /// Runs concurrently with starts and finishes without blocking them;
    /// records completing while the copy is taken may or may not be included.
    pub fn snapshot(&self) -> RecordSnapshot {
        RecordSnapshot::new(self.history.snapshot())
    }

    /// Number of tasks currently open.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// All open tasks, oldest first.
    pub fn open_tasks(&self) -> Vec<OpenTask> {
        let now = self.clock.now_nanos();
        let mut tasks: Vec<OpenTask> = self
            .open
            .iter()
            .map(|entry| OpenTask {
                identity: entry.key().clone(),
                started_at_nanos: entry.value().started_at,
                age_nanos: now.saturating_sub(entry.value().started_at),
            })
            .collect();

        tasks.sort_by(|a, b| b.age_nanos.cmp(&a.age_nanos));
        tasks
    }

    /// Open tasks older than `threshold`, oldest first.
    pub fn stale_tasks(&self, threshold: Duration) -> Vec<OpenTask> {
        let threshold = duration_nanos(threshold);
        let mut tasks = self.open_tasks();
        tasks.retain(|t| t.age_nanos > threshold);
        tasks
    }

    /// Report open tasks older than `threshold` as [`PairingErrorKind::LostFinish`].
    ///
    /// Each entry is reported at most once and stays in the table,
    /// so a late finish still produces a record.
    /// Returns the number of newly reported entries.
    pub fn sweep_stale(&self, threshold: Duration) -> usize {
        let now = self.clock.now_nanos();
        let threshold = duration_nanos(threshold);

        let mut newly_stale = Vec::new();
        for mut entry in self.open.iter_mut() {
            let value = entry.value_mut();
            if !value.stale_reported && now.saturating_sub(value.started_at) > threshold {
                value.stale_reported = true;
                newly_stale.push(entry.key().clone());
            }
        }

        for identity in &newly_stale {
            self.stale_detected.fetch_add(1, Ordering::Relaxed);
            self.report(identity, PairingErrorKind::LostFinish);
        }
        if !newly_stale.is_empty() {
            debug!(count = newly_stale.len(), "stale open tasks detected");
        }
        newly_stale.len()
    }

    /// [`Self::sweep_stale`] with the configured threshold.
    pub fn sweep(&self) -> usize {
        self.sweep_stale(self.config.stale_after())
    }

    pub fn metrics(&self) -> RecorderMetrics {
        let now = self.clock.now_nanos();
        let oldest = self
            .open
            .iter()
            .map(|entry| now.saturating_sub(entry.value().started_at))
            .max();

        RecorderMetrics {
            open_count: self.open.len(),
            oldest_open_age_ms: oldest.map(|ns| ns / 1_000_000),
            completed: self.completed.load(Ordering::Relaxed),
            pairing_errors: self.pairing_errors.load(Ordering::Relaxed),
            stale_detected: self.stale_detected.load(Ordering::Relaxed),
        }
    }

    fn report(&self, identity: &TaskIdentity, kind: PairingErrorKind) -> PairingError {
        self.pairing_errors.fetch_add(1, Ordering::Relaxed);
        // sinks log pairing errors at warn/error
        debug!(task = %identity, kind = %kind, "task start/finish pairing failed");

        self.sink.on_pairing_error(identity, kind);
        PairingError {
            identity: identity.clone(),
            kind,
        }
    }
}

impl Default for TaskStatRecorder {
    fn default() -> Self {
        Self::new(RecorderConfig::default(), noop_sink())
    }
}

impl fmt::Debug for TaskStatRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStatRecorder")
            .field("open", &self.open.len())
            .field("config", &self.config)
            .field("sink", &"<handle>")
            .finish()
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
