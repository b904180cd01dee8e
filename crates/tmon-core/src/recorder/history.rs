//! Bounded record history.
//!
//! Finishes push into a lock-free ring; only snapshots take the archive lock,
//! moving pending records over before copying. A slow snapshot therefore never
//! holds up a finishing task.
use std::{collections::VecDeque, sync::Arc};

use crossbeam::queue::ArrayQueue;
use parking_lot::Mutex;

use tmon_model::TaskStatRecord;

pub(crate) struct History {
    capacity: usize,
    /// `None` when nothing is retained.
    pending: Option<ArrayQueue<TaskStatRecord>>,
    archive: Mutex<VecDeque<TaskStatRecord>>,
}

impl History {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pending: (capacity > 0).then(|| ArrayQueue::new(capacity)),
            archive: Mutex::new(VecDeque::new()),
        }
    }

    /// Append a record without blocking; the oldest pending record is dropped when full.
    pub(crate) fn push(&self, record: TaskStatRecord) {
        if let Some(pending) = &self.pending {
            let _ = pending.force_push(record);
        }
    }

    /// Newest `capacity` records, oldest first.
    pub(crate) fn snapshot(&self) -> Arc<[TaskStatRecord]> {
        let Some(pending) = &self.pending else {
            return Arc::from(Vec::new());
        };

        let mut archive = self.archive.lock();
        // bounded so that a steady stream of finishes cannot keep us here
        for _ in 0..pending.len() {
            match pending.pop() {
                Some(record) => archive.push_back(record),
                None => break,
            }
        }
        let excess = archive.len().saturating_sub(self.capacity);
        archive.drain(..excess);
        archive.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, thread, time::Duration};

    use tmon_model::TaskIdentity;

    use super::*;

    fn record(instance: u64) -> TaskStatRecord {
        TaskStatRecord::new(TaskIdentity::new("h", instance), 0, instance)
    }

    fn instances(records: &[TaskStatRecord]) -> Vec<u64> {
        records.iter().map(|r| r.identity.instance()).collect()
    }

    #[test]
    fn keeps_newest_across_snapshots() {
        let history = History::new(3);
        history.push(record(1));
        history.push(record(2));
        assert_eq!(instances(&history.snapshot()), vec![1, 2]);

        history.push(record(3));
        history.push(record(4));
        assert_eq!(instances(&history.snapshot()), vec![2, 3, 4]);

        for i in 5..=9 {
            history.push(record(i));
        }
        assert_eq!(instances(&history.snapshot()), vec![7, 8, 9]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let history = History::new(0);
        history.push(record(1));
        assert!(history.snapshot().is_empty());
    }

    #[test]
    fn push_proceeds_while_archive_is_locked() {
        let history = Arc::new(History::new(16));
        let held = history.archive.lock();

        let (tx, rx) = mpsc::channel();
        let h = Arc::clone(&history);
        thread::spawn(move || {
            h.push(record(1));
            let _ = tx.send(());
        });

        rx.recv_timeout(Duration::from_secs(5))
            .expect("push must not wait for the archive lock");
        drop(held);
        assert_eq!(instances(&history.snapshot()), vec![1]);
    }
}
