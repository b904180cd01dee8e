//! Periodic detection of tasks that started but never finished.
//!
//! The sweeper reports every open task older than the recorder's stale threshold
//! as a lost finish, once per task. It never removes entries.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use tmon_core::RecorderHandle;

/// Background sweeper settings. The stale threshold itself lives in the recorder config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Pause between sweeps, in milliseconds.
    pub interval_ms: u64,
}

impl SweeperConfig {
    /// Sweep period, at least one millisecond.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self { interval_ms: 5_000 }
    }
}

/// Spawn the sweeper on the current tokio runtime.
///
/// Runs until `token` is cancelled.
///
/// # Panics
/// Outside of a tokio runtime.
pub fn spawn_stale_sweeper(
    recorder: RecorderHandle,
    cfg: &SweeperConfig,
    token: CancellationToken,
) -> JoinHandle<()> {
    let period = cfg.interval();
    tokio::spawn(async move {
        let mut tick = time::interval(period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(interval_ms = period.as_millis() as u64, "stale sweeper started");

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tick.tick() => {
                    let reported = recorder.sweep();
                    trace!(reported, open = recorder.open_count(), "stale sweep done");
                }
            }
        }
        debug!("stale sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tmon_core::{ChannelSink, ManualClock, RecorderConfig, TaskStatRecorder};
    use tmon_model::{PairingErrorKind, TaskIdentity};

    use super::*;

    #[test]
    fn interval_never_zero() {
        let cfg = SweeperConfig { interval_ms: 0 };
        assert_eq!(cfg.interval(), Duration::from_millis(1));
    }

    #[test]
    fn config_defaults_from_empty_json() {
        let cfg: SweeperConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, SweeperConfig::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reports_stale_task_once_and_stops_on_cancel() {
        let clock = Arc::new(ManualClock::new(0));
        let (sink, mut rx) = ChannelSink::new();
        let cfg = RecorderConfig {
            stale_after_ms: 100,
            ..Default::default()
        };
        let recorder = TaskStatRecorder::new(cfg, Arc::new(sink))
            .with_clock(clock.clone())
            .into_handle();

        let id = TaskIdentity::new("hung", 1);
        recorder.on_task_started(&id).unwrap();
        clock.advance(Duration::from_millis(250));

        let token = CancellationToken::new();
        let handle = spawn_stale_sweeper(
            recorder.clone(),
            &SweeperConfig { interval_ms: 10 },
            token.clone(),
        );

        let (reported, kind) = time::timeout(Duration::from_secs(5), rx.errors.recv())
            .await
            .expect("sweeper reported in time")
            .expect("channel open");
        assert_eq!(reported, id);
        assert_eq!(kind, PairingErrorKind::LostFinish);

        // several more sweeps; the entry must not be reported again
        time::sleep(Duration::from_millis(60)).await;
        assert!(rx.errors.try_recv().is_err());
        assert_eq!(recorder.open_count(), 1);
        assert_eq!(recorder.metrics().stale_detected, 1);

        token.cancel();
        time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweeper stopped")
            .unwrap();
    }
}
