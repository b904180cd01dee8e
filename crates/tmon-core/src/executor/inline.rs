use crate::executor::{Executor, Job};

/// Runs every job on the calling thread before returning.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn name(&self) -> &'static str {
        "inline"
    }

    #[inline]
    fn run(&self, job: Job) {
        job()
    }
}
