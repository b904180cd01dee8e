use std::{slice, sync::Arc};

use tmon_model::TaskStatRecord;

/// Point-in-time copy of the recorder history, in finish order.
///
/// Cheap to clone; iterating does not touch the recorder, and can be restarted any number of times.
#[derive(Debug, Clone)]
pub struct RecordSnapshot {
    records: Arc<[TaskStatRecord]>,
}

impl RecordSnapshot {
    pub(crate) fn new(records: Arc<[TaskStatRecord]>) -> Self {
        Self { records }
    }

    /// Records oldest finish first.
    ///
    /// # Examples
    /// ```
    /// use tmon_core::TaskStatRecorder;
    ///
    /// let recorder = TaskStatRecorder::default();
    /// for key in ["parse", "index"] {
    ///     let id = recorder.new_identity(key);
    ///     recorder.on_task_started(&id).unwrap();
    ///     recorder.on_task_finished(&id).unwrap();
    /// }
    ///
    /// let snap = recorder.snapshot();
    /// let keys: Vec<_> = snap.iter().map(|r| r.identity.key().to_string()).collect();
    /// assert_eq!(keys, ["parse", "index"]);
    /// ```
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, TaskStatRecord> {
        self.records.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow the records as a slice, in the same order as [`iter`](Self::iter).
    #[inline]
    pub fn as_slice(&self) -> &[TaskStatRecord] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a RecordSnapshot {
    type Item = &'a TaskStatRecord;
    type IntoIter = slice::Iter<'a, TaskStatRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
