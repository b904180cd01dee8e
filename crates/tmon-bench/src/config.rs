use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use tmon_core::RecorderConfig;
use tmon_observe::{LoggerConfig, SweeperConfig};

/// Benchmark settings; every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Tasks per batch.
    pub tasks: usize,
    /// How long each task sleeps.
    pub task_sleep_ms: u64,
    /// Blocking-pool width of the runtime.
    pub workers: usize,
    pub logger: LoggerConfig,
    pub recorder: RecorderConfig,
    pub sweeper: SweeperConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            tasks: 100,
            task_sleep_ms: 100,
            workers: 16,
            logger: LoggerConfig::default(),
            recorder: RecorderConfig::default(),
            sweeper: SweeperConfig::default(),
        }
    }
}

impl BenchConfig {
    /// Read the config from `path`, or use defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading bench config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing bench config {}", path.display()))
    }

    pub fn task_sleep(&self) -> Duration {
        Duration::from_millis(self.task_sleep_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::{env, process};

    use super::*;

    #[test]
    fn no_path_means_defaults() {
        let cfg = BenchConfig::load(None).unwrap();
        assert_eq!(cfg, BenchConfig::default());
        assert_eq!(cfg.tasks, 100);
        assert_eq!(cfg.task_sleep(), Duration::from_millis(100));
    }

    #[test]
    fn nested_sections_are_partial() {
        let cfg: BenchConfig = serde_json::from_str(
            r#"{"tasks": 8, "recorder": {"stale_after_ms": 500}, "logger": {"format": "json"}}"#,
        )
        .unwrap();

        assert_eq!(cfg.tasks, 8);
        assert_eq!(cfg.workers, 16);
        assert_eq!(cfg.recorder.stale_after_ms, 500);
        assert_eq!(cfg.recorder.history_capacity, RecorderConfig::default().history_capacity);
        assert_eq!(cfg.logger.format.as_str(), "json");
    }

    #[test]
    fn loads_from_file() {
        let path = env::temp_dir().join(format!("tmon-bench-{}.json", process::id()));
        fs::write(&path, r#"{"workers": 4, "task_sleep_ms": 5}"#).unwrap();

        let cfg = BenchConfig::load(Some(&path));
        let _ = fs::remove_file(&path);

        let cfg = cfg.unwrap();
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.task_sleep_ms, 5);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = BenchConfig::load(Some(Path::new("/nonexistent/tmon-bench.json"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tmon-bench.json"));
    }
}
