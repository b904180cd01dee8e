use std::sync::Arc;

use tmon_model::{PairingErrorKind, TaskIdentity, TaskStatRecord};

/// Receiver of task accounting output.
///
/// Called synchronously from whichever worker thread finished the task,
/// so implementations must be cheap and must not block.
pub trait StatSink: Send + Sync + 'static {
    /// Called once for every matched start/finish pair.
    ///
    /// # Arguments
    /// - `record`: the completed task, with both timestamps from the recorder clock
    fn on_record(&self, record: &TaskStatRecord);

    /// Called for every start/finish event that could not be paired.
    ///
    /// # Arguments
    /// - `identity`: task the event belongs to
    /// - `kind`: lost start, duplicate start or lost finish
    fn on_pairing_error(&self, identity: &TaskIdentity, kind: PairingErrorKind);
}

/// Shared handle to a sink.
///
/// Stored in the recorder and shared with whoever else needs to publish into it.
pub type SinkHandle = Arc<dyn StatSink>;
