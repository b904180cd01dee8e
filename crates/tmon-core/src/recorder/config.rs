use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Recorder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Completed records kept for [`crate::TaskStatRecorder::snapshot`]; oldest dropped first.
    ///
    /// `0` keeps nothing. The sink sees every record regardless.
    pub history_capacity: usize,
    /// Age after which an open task is reported as a lost finish.
    pub stale_after_ms: u64,
}

impl RecorderConfig {
    #[inline]
    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            history_capacity: 4096,
            stale_after_ms: 60_000,
        }
    }
}
