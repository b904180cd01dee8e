use std::fmt;

use serde::{Deserialize, Serialize};

/// Reason a start/finish pair could not be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingErrorKind {
    /// Finish observed with no open start.
    LostStart,
    /// Start observed for an identity that is already open.
    DuplicateStart,
    /// Start observed but no finish within the stale threshold.
    LostFinish,
}

impl PairingErrorKind {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            PairingErrorKind::LostStart => "lost_start",
            PairingErrorKind::DuplicateStart => "duplicate_start",
            PairingErrorKind::LostFinish => "lost_finish",
        }
    }
}

impl fmt::Display for PairingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
