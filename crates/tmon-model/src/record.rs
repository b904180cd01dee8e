use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::TaskIdentity;

/// Completed task timing: one matched start/finish pair.
///
/// Timestamps are nanoseconds on the recorder's monotonic clock, not wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatRecord {
    pub identity: TaskIdentity,
    pub started_at_nanos: u64,
    pub finished_at_nanos: u64,
    pub duration_nanos: u64,
}

impl TaskStatRecord {
    /// Build a record from a matched pair of timestamps.
    ///
    /// Duration saturates at zero if the finish timestamp is behind the start.
    pub fn new(identity: TaskIdentity, started_at_nanos: u64, finished_at_nanos: u64) -> Self {
        Self {
            identity,
            started_at_nanos,
            finished_at_nanos,
            duration_nanos: finished_at_nanos.saturating_sub(started_at_nanos),
        }
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.duration_nanos)
    }
}

/// Diagnostic view of an open-task table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTask {
    pub identity: TaskIdentity,
    pub started_at_nanos: u64,
    pub age_nanos: u64,
}

impl OpenTask {
    #[inline]
    pub fn age(&self) -> Duration {
        Duration::from_nanos(self.age_nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_difference_of_timestamps() {
        let rec = TaskStatRecord::new(TaskIdentity::new("k", 1), 1_000, 4_500);
        assert_eq!(rec.duration_nanos, 3_500);
        assert_eq!(rec.duration(), Duration::from_nanos(3_500));
    }

    #[test]
    fn duration_never_negative() {
        let rec = TaskStatRecord::new(TaskIdentity::new("k", 1), 9, 3);
        assert_eq!(rec.duration_nanos, 0);
    }

    #[test]
    fn record_serializes_with_flat_fields() {
        let rec = TaskStatRecord::new(TaskIdentity::new("k", 2), 10, 30);
        let json = serde_json::to_value(&rec).unwrap();

        assert_eq!(json["identity"]["key"], "k");
        assert_eq!(json["identity"]["instance"], 2);
        assert_eq!(json["duration_nanos"], 20);
    }
}
