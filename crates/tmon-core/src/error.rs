use thiserror::Error;

use tmon_model::{PairingErrorKind, TaskIdentity};

/// Start/finish events that could not be matched.
///
/// Observational only: reported to the sink and logged, never propagated into the task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pairing error for task {identity}: {kind}")]
pub struct PairingError {
    pub identity: TaskIdentity,
    pub kind: PairingErrorKind,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("feature '{name}' is already registered")]
    DuplicateFeature { name: &'static str },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Pairing(#[from] PairingError),
}
