use tmon_model::{PairingErrorKind, TaskIdentity, TaskStatRecord};

use crate::sink::backend::StatSink;

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl StatSink for NoOpSink {
    #[inline(always)]
    fn on_record(&self, _: &TaskStatRecord) {}

    #[inline(always)]
    fn on_pairing_error(&self, _: &TaskIdentity, _: PairingErrorKind) {}
}
