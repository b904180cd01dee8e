use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{LoggerFormat, LoggerLevel};

/// Global logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directives.
    pub level: LoggerLevel,
    /// Print the event target (module path).
    pub with_targets: bool,
    /// Print the emitting thread's name; useful with named worker threads.
    pub with_thread_names: bool,
    /// Colorize text output when stdout is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: LoggerLevel::default(),
            with_targets: true,
            with_thread_names: false,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Color only when requested and stdout is a terminal.
    pub fn ansi(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}
