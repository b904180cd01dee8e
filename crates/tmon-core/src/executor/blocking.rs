use tokio::runtime::Handle;

use crate::executor::{Executor, Job};

/// Runs jobs on the blocking pool of a tokio runtime.
///
/// Pool width is the runtime's `max_blocking_threads`.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    /// Run jobs on the blocking pool of `handle`'s runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime of the current context, if there is one.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Executor for TokioExecutor {
    fn name(&self) -> &'static str {
        "tokio-blocking"
    }

    fn run(&self, job: Job) {
        // detached: completion is observed through the task handle, not the join handle
        drop(self.handle.spawn_blocking(job));
    }
}
