use tokio::sync::mpsc;
use tracing::trace;

use tmon_model::{PairingErrorKind, TaskIdentity, TaskStatRecord};

use crate::sink::backend::StatSink;

/// Pairing error as delivered on the error channel.
pub type PairingEvent = (TaskIdentity, PairingErrorKind);

/// Sink that forwards everything into unbounded queues.
///
/// Sending never blocks, so it is safe to call from worker threads.
/// Events are silently discarded once the receiving side is dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    records: mpsc::UnboundedSender<TaskStatRecord>,
    errors: mpsc::UnboundedSender<PairingEvent>,
}

/// Receiving half of a [`ChannelSink`], owned by the host.
#[derive(Debug)]
pub struct SinkReceiver {
    /// Completed records, in finish order per worker.
    pub records: mpsc::UnboundedReceiver<TaskStatRecord>,
    pub errors: mpsc::UnboundedReceiver<PairingEvent>,
}

impl ChannelSink {
    /// Create a connected sink and receiver pair.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use tmon_core::{ChannelSink, RecorderConfig, TaskStatRecorder};
    ///
    /// let (sink, mut rx) = ChannelSink::new();
    /// let recorder = TaskStatRecorder::new(RecorderConfig::default(), Arc::new(sink));
    ///
    /// let id = recorder.new_identity("compact");
    /// recorder.on_task_started(&id).unwrap();
    /// recorder.on_task_finished(&id).unwrap();
    ///
    /// assert_eq!(rx.records.try_recv().unwrap().identity, id);
    /// assert!(rx.errors.try_recv().is_err());
    /// ```
    pub fn new() -> (Self, SinkReceiver) {
        let (records_tx, records_rx) = mpsc::unbounded_channel();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        (
            Self {
                records: records_tx,
                errors: errors_tx,
            },
            SinkReceiver {
                records: records_rx,
                errors: errors_rx,
            },
        )
    }
}

impl StatSink for ChannelSink {
    fn on_record(&self, record: &TaskStatRecord) {
        if self.records.send(record.clone()).is_err() {
            trace!(task = %record.identity, "record receiver closed; dropping record");
        }
    }

    fn on_pairing_error(&self, identity: &TaskIdentity, kind: PairingErrorKind) {
        if self.errors.send((identity.clone(), kind)).is_err() {
            trace!(task = %identity, kind = %kind, "error receiver closed; dropping pairing error");
        }
    }
}
