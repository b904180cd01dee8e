use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::logger::{LoggerConfig, LoggerError, UtcRfc3339};

pub(super) fn text(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let layer = fmt::layer()
        .with_ansi(cfg.ansi())
        .with_target(cfg.with_targets)
        .with_thread_names(cfg.with_thread_names)
        .with_timer(UtcRfc3339);

    install(tracing_subscriber::registry().with(cfg.level.to_env_filter()).with(layer))
}

pub(super) fn json(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_thread_names(cfg.with_thread_names)
        .with_timer(UtcRfc3339);

    install(tracing_subscriber::registry().with(cfg.level.to_env_filter()).with(layer))
}

#[cfg(target_os = "linux")]
pub(super) fn journald(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let layer =
        tracing_journald::layer().map_err(|e| LoggerError::JournaldInitFailed(e.to_string()))?;

    install(tracing_subscriber::registry().with(cfg.level.to_env_filter()).with(layer))
}

#[cfg(not(target_os = "linux"))]
pub(super) fn journald(_cfg: &LoggerConfig) -> Result<(), LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

fn install<S>(subscriber: S) -> Result<(), LoggerError>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}
