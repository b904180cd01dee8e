//! Disabled-vs-enabled overhead benchmark for executor task monitoring.
//!
//! Usage: `tmon-bench [config.json]`
mod config;

use std::{
    env,
    path::PathBuf,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, anyhow};
use tokio::runtime::{Builder, Handle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tmon_core::{
    ExecutorTaskMonitor, FanoutSink, FeatureRegistry, SinkHandle, TaskMonitorFeature,
    TaskStatRecorder, TokioExecutor,
};
use tmon_observe::{LogSink, init_logger, spawn_stale_sweeper};
use tmon_prometheus::PrometheusSink;

use crate::config::BenchConfig;

const TASK_KEY: &str = "bench-sleep";

fn main() -> anyhow::Result<()> {
    let path = env::args_os().nth(1).map(PathBuf::from);
    let cfg = BenchConfig::load(path.as_deref())?;

    init_logger(&cfg.logger)?;
    info!(
        tasks = cfg.tasks,
        task_sleep_ms = cfg.task_sleep_ms,
        workers = cfg.workers,
        "benchmark configured"
    );

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(cfg.workers.max(1))
        .thread_name("tmon-bench")
        .build()
        .context("building tokio runtime")?;

    runtime.block_on(run(cfg))
}

async fn run(cfg: BenchConfig) -> anyhow::Result<()> {
    // 1) sinks
    let metrics = PrometheusSink::new()?;
    let sinks: Vec<SinkHandle> = vec![Arc::new(LogSink::new()), Arc::new(metrics.clone())];
    let sink = FanoutSink::new(sinks);

    // 2) recorder + executor
    let recorder = TaskStatRecorder::new(cfg.recorder.clone(), Arc::new(sink)).into_handle();
    let executor = Arc::new(TokioExecutor::new(Handle::current()));

    // 3) features
    let mut registry = FeatureRegistry::new();
    registry.register(Arc::new(ExecutorTaskMonitor::new(recorder.clone(), executor)))?;
    let monitor = registry
        .get::<ExecutorTaskMonitor>()
        .context("task monitor missing from registry")?;

    // 4) stale sweeper
    let token = CancellationToken::new();
    let sweeper = spawn_stale_sweeper(recorder.clone(), &cfg.sweeper, token.clone());

    registry.turn_on();

    let disabled = batch(&monitor, &cfg).await?;
    info!(elapsed_ms = millis(disabled), "disabled batch done");

    registry.enable_all();
    let enabled = batch(&monitor, &cfg).await?;
    registry.disable_all();
    info!(elapsed_ms = millis(enabled), "enabled batch done");

    registry.turn_off();
    token.cancel();
    sweeper.await?;

    let overhead = enabled.saturating_sub(disabled);
    let per_task_us = overhead.as_secs_f64() * 1e6 / cfg.tasks.max(1) as f64;
    let stats = recorder.metrics();
    info!(
        disabled_ms = millis(disabled),
        enabled_ms = millis(enabled),
        overhead_ms = millis(overhead),
        per_task_us,
        records = stats.completed,
        "benchmark finished"
    );

    if stats.completed != cfg.tasks as u64 || stats.pairing_errors > 0 {
        warn!(
            expected = cfg.tasks,
            records = stats.completed,
            pairing_errors = stats.pairing_errors,
            open = stats.open_count,
            "enabled batch was not fully accounted"
        );
    }

    print!("{}", metrics.encode_text()?);
    Ok(())
}

/// Submit `cfg.tasks` sleeping tasks and wait for all of them.
async fn batch(monitor: &ExecutorTaskMonitor, cfg: &BenchConfig) -> anyhow::Result<Duration> {
    let sleep = cfg.task_sleep();
    let started = Instant::now();

    let handles: Vec<_> = (0..cfg.tasks)
        .map(|_| monitor.submit_keyed(TASK_KEY, move || thread::sleep(sleep)))
        .collect();
    for handle in handles {
        handle.await.map_err(|e| anyhow!("benchmark task failed: {e}"))?;
    }

    Ok(started.elapsed())
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
