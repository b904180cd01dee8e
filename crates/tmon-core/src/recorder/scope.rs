use std::{fmt, sync::Arc};

use tmon_model::TaskIdentity;

use crate::recorder::TaskStatRecorder;

/// Guard that records the finish of a started task when dropped.
///
/// Drop runs on normal return, on early return and while unwinding from a panic,
/// so every started task gets exactly one finish.
/// A scope whose start was rejected as a duplicate holds no identity and records nothing:
/// the open entry belongs to another task.
#[must_use = "dropping the scope immediately records the task as finished"]
pub struct TaskScope {
    recorder: Arc<TaskStatRecorder>,
    identity: Option<TaskIdentity>,
}

impl TaskScope {
    pub(crate) fn new(recorder: Arc<TaskStatRecorder>, identity: Option<TaskIdentity>) -> Self {
        Self { recorder, identity }
    }

    /// Identity being timed, `None` if the start was rejected.
    pub fn identity(&self) -> Option<&TaskIdentity> {
        self.identity.as_ref()
    }

    /// Returns `true` if dropping this scope will record a finish.
    pub fn is_active(&self) -> bool {
        self.identity.is_some()
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        if let Some(identity) = self.identity.take() {
            let _ = self.recorder.on_task_finished(&identity);
        }
    }
}

impl fmt::Debug for TaskScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskScope")
            .field("identity", &self.identity)
            .finish()
    }
}
