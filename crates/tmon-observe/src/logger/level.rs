use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::LoggerError;

/// Validated `EnvFilter` directive string, e.g. `"info"` or `"tmon_core=trace,info"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    /// Validate and wrap a filter directive.
    ///
    /// Fails with [`LoggerError::InvalidLevel`] when `EnvFilter` rejects the directive.
    ///
    /// # Examples
    /// ```
    /// use tmon_observe::LoggerLevel;
    ///
    /// let lvl = LoggerLevel::new("debug").unwrap();
    /// assert_eq!(lvl.as_str(), "debug");
    /// assert!(LoggerLevel::new("tmon_core=loud").is_err());
    /// ```
    pub fn new(filter: impl Into<String>) -> Result<Self, LoggerError> {
        Self::try_from(filter.into())
    }

    /// The directive exactly as configured.
    ///
    /// # Examples
    /// ```
    /// use tmon_observe::LoggerLevel;
    ///
    /// let lvl = "tmon_core=trace,warn".parse::<LoggerLevel>().unwrap();
    /// assert_eq!(lvl.as_str(), "tmon_core=trace,warn");
    /// ```
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the filter. The directive was validated on construction.
    ///
    /// # Examples
    /// ```
    /// use tmon_observe::LoggerLevel;
    ///
    /// let lvl = "tmon_core=trace,info".parse::<LoggerLevel>().unwrap();
    /// let _ = lvl.to_env_filter();
    /// ```
    pub fn to_env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.0).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_owned())
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;

    fn try_from(filter: String) -> Result<Self, Self::Error> {
        match EnvFilter::try_new(&filter) {
            Ok(_) => Ok(Self(filter)),
            Err(e) => Err(LoggerError::InvalidLevel {
                reason: e.to_string(),
                filter,
            }),
        }
    }
}

impl From<LoggerLevel> for String {
    fn from(level: LoggerLevel) -> Self {
        level.0
    }
}
