//! [`StatSink`] that turns completed records and pairing errors into `tracing` events.
use tracing::{debug, error, trace, warn};

use tmon_core::StatSink;
use tmon_model::{PairingErrorKind, TaskIdentity, TaskStatRecord};

/// Logs every completed task and every pairing error.
///
/// Records go out at `trace` (or `debug` when verbose); pairing errors at `warn`,
/// except a finish without a start, which is logged at `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink {
    verbose: bool,
}

impl LogSink {
    /// Log completed records at `trace`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use tmon_core::{RecorderConfig, TaskStatRecorder};
    /// use tmon_observe::LogSink;
    ///
    /// let recorder = TaskStatRecorder::new(RecorderConfig::default(), Arc::new(LogSink::new()));
    /// let id = recorder.new_identity("flush");
    /// recorder.on_task_started(&id).unwrap();
    /// assert!(recorder.on_task_finished(&id).is_ok());
    /// ```
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Log completed records at `debug` instead of `trace`.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl StatSink for LogSink {
    fn on_record(&self, record: &TaskStatRecord) {
        let duration_us = record.duration_nanos / 1_000;
        if self.verbose {
            debug!(task = %record.identity, duration_us, "task completed");
        } else {
            trace!(task = %record.identity, duration_us, "task completed");
        }
    }

    fn on_pairing_error(&self, identity: &TaskIdentity, kind: PairingErrorKind) {
        let msg = message_for(kind);
        match kind {
            PairingErrorKind::LostStart => error!(task = %identity, kind = kind.as_label(), "{msg}"),
            PairingErrorKind::DuplicateStart | PairingErrorKind::LostFinish => {
                warn!(task = %identity, kind = kind.as_label(), "{msg}")
            }
        }
    }
}

#[inline]
fn message_for(kind: PairingErrorKind) -> &'static str {
    match kind {
        PairingErrorKind::LostStart => "task finished without a recorded start",
        PairingErrorKind::DuplicateStart => "task started twice under one identity",
        PairingErrorKind::LostFinish => "task still open past the stale threshold",
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use tmon_core::{RecorderConfig, TaskStatRecorder};
    use tracing::Level;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture(max: Level, f: impl FnOnce()) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(max)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        out.text()
    }

    fn record() -> TaskStatRecord {
        TaskStatRecord::new(TaskIdentity::new("upload", 0x2a), 1_000, 3_501_000)
    }

    #[test]
    fn records_are_trace_by_default() {
        let at_debug = capture(Level::DEBUG, || LogSink::new().on_record(&record()));
        assert!(at_debug.is_empty());

        let at_trace = capture(Level::TRACE, || LogSink::new().on_record(&record()));
        assert!(at_trace.contains("TRACE"));
        assert!(at_trace.contains("task=upload#2a"));
        assert!(at_trace.contains("duration_us=3500"));
    }

    #[test]
    fn verbose_records_are_debug() {
        let out = capture(Level::DEBUG, || LogSink::verbose().on_record(&record()));
        assert!(out.contains("DEBUG"));
        assert!(out.contains("task completed"));
    }

    #[test]
    fn pairing_errors_map_to_levels() {
        let id = TaskIdentity::new("sync", 7);
        let out = capture(Level::WARN, || {
            let sink = LogSink::new();
            sink.on_pairing_error(&id, PairingErrorKind::LostStart);
            sink.on_pairing_error(&id, PairingErrorKind::DuplicateStart);
            sink.on_pairing_error(&id, PairingErrorKind::LostFinish);
        });

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("ERROR") && lines[0].contains("kind=\"lost_start\""));
        assert!(lines[1].contains("WARN") && lines[1].contains("kind=\"duplicate_start\""));
        assert!(lines[2].contains("WARN") && lines[2].contains("stale threshold"));
    }

    #[test]
    fn recorder_pairing_error_is_logged_once_above_debug() {
        let recorder = TaskStatRecorder::new(RecorderConfig::default(), Arc::new(LogSink::new()));
        let id = TaskIdentity::new("sync", 9);

        let out = capture(Level::WARN, || {
            assert!(recorder.on_task_finished(&id).is_err());
        });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("ERROR") && lines[0].contains("without a recorded start"));

        let out = capture(Level::DEBUG, || {
            assert!(recorder.on_task_finished(&id).is_err());
        });
        let debug_lines = out.lines().filter(|l| l.contains("DEBUG")).count();
        assert_eq!(out.lines().count(), 2);
        assert_eq!(debug_lines, 1);
    }
}
