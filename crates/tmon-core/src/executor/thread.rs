use std::{
    sync::atomic::{AtomicU64, Ordering},
    thread,
};

use tracing::error;

use crate::executor::{Executor, Job};

/// Spawns one named OS thread per job.
///
/// Thread names follow `{prefix}-{seq:x}` with a per-executor sequence.
#[derive(Debug)]
pub struct ThreadExecutor {
    prefix: String,
    seq: AtomicU64,
}

impl ThreadExecutor {
    /// Spawn one named OS thread per job.
    ///
    /// # Arguments
    /// - `prefix`: thread name prefix; the per-executor sequence is appended in hex
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            seq: AtomicU64::new(1),
        }
    }

    fn next_name(&self) -> String {
        format!(
            "{}-{:x}",
            self.prefix,
            self.seq.fetch_add(1, Ordering::Relaxed)
        )
    }
}

impl Default for ThreadExecutor {
    fn default() -> Self {
        Self::new("tmon-worker")
    }
}

impl Executor for ThreadExecutor {
    fn name(&self) -> &'static str {
        "thread"
    }

    fn run(&self, job: Job) {
        let name = self.next_name();
        if let Err(e) = thread::Builder::new().name(name.clone()).spawn(job) {
            // the job is dropped with the failed builder; its completion handle observes that
            error!(thread = %name, error = %e, "failed to spawn worker thread");
        }
    }
}
