use tmon_model::{PairingErrorKind, TaskIdentity, TaskStatRecord};

use crate::sink::backend::{SinkHandle, StatSink};

/// Forwards every event to each inner sink, in order.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<SinkHandle>,
}

impl FanoutSink {
    /// Fan out to `sinks`, called in the given order.
    pub fn new(sinks: Vec<SinkHandle>) -> Self {
        Self { sinks }
    }

    /// Add a sink and return the updated fanout.
    pub fn with(mut self, sink: SinkHandle) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of inner sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl StatSink for FanoutSink {
    fn on_record(&self, record: &TaskStatRecord) {
        for sink in &self.sinks {
            sink.on_record(record);
        }
    }

    fn on_pairing_error(&self, identity: &TaskIdentity, kind: PairingErrorKind) {
        for sink in &self.sinks {
            sink.on_pairing_error(identity, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sink::ChannelSink;

    #[test]
    fn every_sink_receives_every_event() {
        let (a, mut rx_a) = ChannelSink::new();
        let (b, mut rx_b) = ChannelSink::new();
        let fanout = FanoutSink::default()
            .with(Arc::new(a))
            .with(Arc::new(b));
        assert_eq!(fanout.len(), 2);

        let id = TaskIdentity::new("k", 1);
        fanout.on_record(&TaskStatRecord::new(id.clone(), 0, 5));
        fanout.on_pairing_error(&id, PairingErrorKind::LostFinish);

        for rx in [&mut rx_a, &mut rx_b] {
            assert_eq!(rx.records.try_recv().unwrap().duration_nanos, 5);
            assert_eq!(rx.errors.try_recv().unwrap().1, PairingErrorKind::LostFinish);
        }
    }
}
