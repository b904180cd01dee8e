//! Executor adapters.
//!
//! The monitoring layer never schedules work itself: it hands a boxed job to an [`Executor`]
//! and makes no assumption about timing, thread identity or queueing.
mod inline;
pub use inline::InlineExecutor;

mod thread;
pub use thread::ThreadExecutor;

mod blocking;
pub use blocking::TokioExecutor;

use std::sync::Arc;

/// Unit of work handed to an executor.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs, possibly on another thread.
pub trait Executor: Send + Sync + 'static {
    /// Executor name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Run `job` exactly once.
    fn run(&self, job: Job);
}

/// Shared handle to an executor.
pub type ExecutorHandle = Arc<dyn Executor>;
